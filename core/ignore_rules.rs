use crate::error::Result;
use log;
use regex::Regex;

#[derive(Debug, Clone)]
enum CompiledRule {
    /// Exact path, or any path under a segment with this name.
    Literal(String),
    /// `*` wildcard tested against the basename only.
    Wildcard(Regex),
}

/// Ignore rules compiled once per run. A path is ignored when any rule
/// matches; there is no rule priority or negation.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<CompiledRule>,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(rules: &[S]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let rule = rule.as_ref();
            if rule.contains('*') {
                let pattern = format!(
                    "^{}$",
                    rule.split('*')
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(".*")
                );
                log::trace!("Compiled wildcard ignore rule '{}' as {}", rule, pattern);
                compiled.push(CompiledRule::Wildcard(Regex::new(&pattern)?));
            } else {
                compiled.push(CompiledRule::Literal(rule.to_string()));
            }
        }
        Ok(Self { rules: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        let normalized = normalize_relative_path(relative_path);
        let basename = normalized.rsplit('/').next().unwrap_or("");

        self.rules.iter().any(|rule| match rule {
            CompiledRule::Wildcard(regex) => regex.is_match(basename),
            CompiledRule::Literal(rule) => literal_matches(&normalized, rule),
        })
    }
}

fn literal_matches(path: &str, rule: &str) -> bool {
    path == rule
        || path.starts_with(&format!("{rule}/"))
        || path.starts_with(&format!("/{rule}/"))
        || path.contains(&format!("/{rule}/"))
        || path.ends_with(&format!("/{rule}"))
}

/// One-shot form of [`IgnoreMatcher::is_ignored`]. If any rule fails to
/// compile the whole set is discarded and nothing is ignored; use
/// [`IgnoreMatcher::new`] to surface the error instead.
pub fn should_ignore<S: AsRef<str>>(relative_path: &str, rules: &[S]) -> bool {
    match IgnoreMatcher::new(rules) {
        Ok(matcher) => matcher.is_ignored(relative_path),
        Err(e) => {
            log::warn!("Invalid ignore rules, nothing ignored: {}", e);
            false
        }
    }
}

/// Converts separators to `/` and folds `.`, `..` and repeated separators.
/// A leading `/` survives.
pub fn normalize_relative_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
