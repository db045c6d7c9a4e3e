//! TOON (Token-Oriented Object Notation) codec for [`PackageBundle`].
//!
//! A bundle is a two-level object, so the notation reduces to:
//!
//! ```text
//! web_app:
//!   "src/index.ts": "import { a } from './a';\n"
//!   README: plain text
//! ```
//!
//! Keys are bare when they look like identifiers and quoted otherwise. String
//! values are bare unless they would be read back as something else (numbers,
//! booleans, null, nested structure) or contain characters that need escaping.

use crate::bundle::PackageBundle;
use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

const INDENT: &str = "  ";

static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid bare key regex"));
static NUMERIC_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^-?\d+(?:\.\d+)?(?:e[+-]?\d+)?$|^0\d+$").expect("valid numeric regex")
});

pub fn encode_bundle(bundle: &PackageBundle) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (package, files) in bundle.packages() {
        lines.push(format!("{}:", encode_key(package)));
        for (path, content) in files {
            lines.push(format!(
                "{INDENT}{}: {}",
                encode_key(path),
                encode_string_value(content)
            ));
        }
    }
    lines.join("\n")
}

fn encode_key(key: &str) -> String {
    if BARE_KEY.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn encode_string_value(value: &str) -> String {
    if needs_quotes(value) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value != value.trim()
        || matches!(value, "true" | "false" | "null")
        || NUMERIC_LIKE.is_match(value)
        || value.starts_with('-')
        || value.chars().any(|c| {
            matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}' | ',') || c.is_control()
        })
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

pub fn decode_bundle(text: &str) -> Result<PackageBundle> {
    let mut bundle = PackageBundle::new();
    let mut current_package: Option<String> = None;

    for (index, raw_line) in text.split('\n').enumerate() {
        let line_no = index + 1;
        if raw_line.trim().is_empty() {
            continue;
        }
        let err = |message: &str| AppError::ToonDecode {
            line: line_no,
            message: message.to_string(),
        };

        let body = raw_line.trim_start_matches(' ');
        let indent = raw_line.len() - body.len();
        let (key, rest) = parse_key(body).map_err(|m| err(m.as_str()))?;

        match indent {
            0 => {
                if !rest.is_empty() {
                    return Err(err("package entries must be nested objects"));
                }
                bundle.ensure_package(&key);
                current_package = Some(key);
            }
            n if n == INDENT.len() => {
                let package = current_package
                    .as_deref()
                    .ok_or_else(|| err("file entry outside of a package"))?;
                if rest.is_empty() {
                    return Err(err("file entries must have a value"));
                }
                let value = parse_value(rest).map_err(|m| err(m.as_str()))?;
                bundle.insert(package, key, value);
            }
            _ => return Err(err("unexpected indentation")),
        }
    }
    Ok(bundle)
}

/// Splits `key: value` (or `key:`) and returns the key and the raw value text.
fn parse_key(body: &str) -> std::result::Result<(String, &str), String> {
    let (key, after) = if body.starts_with('"') {
        let (key, consumed) = parse_quoted(body)?;
        (key, &body[consumed..])
    } else {
        let colon = body.find(':').ok_or("missing ':' after key")?;
        (body[..colon].to_string(), &body[colon..])
    };

    let after = after.strip_prefix(':').ok_or("missing ':' after key")?;
    if after.is_empty() {
        return Ok((key, after));
    }
    let value = after
        .strip_prefix(' ')
        .ok_or("expected a space after ':'")?;
    Ok((key, value))
}

fn parse_value(raw: &str) -> std::result::Result<String, String> {
    if raw.starts_with('"') {
        let (value, consumed) = parse_quoted(raw)?;
        if consumed != raw.len() {
            return Err("trailing characters after quoted value".to_string());
        }
        Ok(value)
    } else {
        Ok(raw.to_string())
    }
}

/// Parses a quoted string at the start of `s`. Returns the unescaped text and
/// the number of bytes consumed, closing quote included.
fn parse_quoted(s: &str) -> std::result::Result<(String, usize), String> {
    let mut out = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, i + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, 't')) => out.push('\t'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, other)) => return Err(format!("invalid escape '\\{}'", other)),
                None => return Err("unterminated escape".to_string()),
            },
            other => out.push(other),
        }
    }
    Err("unterminated string".to_string())
}
