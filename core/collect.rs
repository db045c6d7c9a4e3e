use crate::bundle::PackageBundle;
use crate::config::SourceConfig;
use crate::error::{AppError, Result};
use crate::ignore_rules::IgnoreMatcher;
use log;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of collecting every configured root of one config.
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    pub bundle: PackageBundle,
    /// Roots that did not exist and were skipped.
    pub missing_roots: Vec<PathBuf>,
}

/// Collects every root into a fresh bundle. A missing root is logged and
/// skipped; any other failure aborts the whole collection.
pub fn collect_sources(config: &SourceConfig, roots: &[PathBuf]) -> Result<CollectOutcome> {
    let matcher = IgnoreMatcher::new(&config.ignore_paths)?;
    let mut outcome = CollectOutcome::default();

    for root in roots {
        log::info!("Processing path: {}", root.display());
        if !root.exists() {
            log::warn!("{}, skipping", AppError::PathMissing(root.clone()));
            outcome.missing_roots.push(root.clone());
            continue;
        }
        collect_root(root, config, &matcher, &mut outcome.bundle)?;
    }

    log::info!(
        "Collected {} file(s) for package '{}'",
        outcome.bundle.file_count(),
        config.package_name
    );
    Ok(outcome)
}

/// Walks one root depth-first. Directories whose relative path is ignored are
/// pruned without visiting their contents. A root that is a file is collected
/// under its own file name.
pub fn collect_root(
    root: &Path,
    config: &SourceConfig,
    matcher: &IgnoreMatcher,
    bundle: &mut PackageBundle,
) -> Result<()> {
    let metadata = fs::metadata(root).map_err(|e| AppError::FileRead {
        path: root.to_path_buf(),
        source: e,
    })?;

    if metadata.is_file() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        add_file(root, &name, config, matcher, bundle)?;
        return Ok(());
    }
    if !metadata.is_dir() {
        log::debug!("Skipping root that is neither file nor directory: {}", root.display());
        return Ok(());
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let relative = relative_key(root, entry.path());
            if matcher.is_ignored(&relative) {
                log::debug!("Pruning ignored directory: {}", relative);
                false
            } else {
                true
            }
        });

    for entry_result in walker {
        let entry = entry_result?;
        if entry.depth() == 0 || !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_key(root, entry.path());
        log::trace!("Walked file: {}", relative);
        add_file(entry.path(), &relative, config, matcher, bundle)?;
    }
    Ok(())
}

/// Applies the ignore rules and the extension allow-list to one file and, if
/// it passes both, reads it into the bundle. Returns whether it was added.
pub fn add_file(
    absolute_path: &Path,
    relative_path: &str,
    config: &SourceConfig,
    matcher: &IgnoreMatcher,
    bundle: &mut PackageBundle,
) -> Result<bool> {
    if matcher.is_ignored(relative_path) {
        log::trace!("Ignored file: {}", relative_path);
        return Ok(false);
    }

    let extension = dotted_extension(absolute_path);
    if !config.file_types.iter().any(|t| *t == extension) {
        log::trace!(
            "Skipping file with unlisted extension '{}': {}",
            extension,
            relative_path
        );
        return Ok(false);
    }

    let bytes = fs::read(absolute_path).map_err(|e| AppError::FileRead {
        path: absolute_path.to_path_buf(),
        source: e,
    })?;
    let content = String::from_utf8_lossy(&bytes).into_owned();

    if bundle
        .insert(&config.package_name, relative_path, content)
        .is_some()
    {
        log::debug!("Replaced earlier content for {}", relative_path);
    }
    Ok(true)
}

/// `.ext` including the dot, or an empty string when the name has no
/// extension (dotfiles such as `.env` have none).
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Bundle key for `path` under `root`, always `/`-separated.
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(file_types: &[&str], ignore: &[&str]) -> SourceConfig {
        let mut config = SourceConfig::new("demo", "demo", &["."]);
        config.file_types = file_types.iter().map(|s| s.to_string()).collect();
        config.ignore_paths = ignore.iter().map(|s| s.to_string()).collect();
        config
    }

    fn paths(bundle: &PackageBundle) -> Vec<String> {
        let mut paths: Vec<_> = bundle.files().map(|(_, p, _)| p.to_string()).collect();
        paths.sort();
        paths
    }

    #[test]
    fn selects_by_extension_and_prunes_ignored_dirs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "export const a = 1;");
        write(tmp.path(), "dist/b.ts", "export const b = 2;");
        write(tmp.path(), "c.js", "module.exports = 3;");

        let outcome =
            collect_sources(&config(&[".ts"], &["dist"]), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths(&outcome.bundle), vec!["a.ts"]);
        assert_eq!(
            outcome.bundle.get("demo", "a.ts"),
            Some("export const a = 1;")
        );
    }

    #[test]
    fn node_modules_is_pruned_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/index.ts", "");
        write(tmp.path(), "node_modules/lib/index.ts", "");
        write(tmp.path(), "packages/ui/node_modules/dep/x.ts", "");
        write(tmp.path(), "packages/ui/button.ts", "");

        let outcome = collect_sources(
            &config(&[".ts"], &["node_modules"]),
            &[tmp.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(
            paths(&outcome.bundle),
            vec!["packages/ui/button.ts", "src/index.ts"]
        );
    }

    #[test]
    fn wildcard_rules_apply_to_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "keep.ts", "");
        write(tmp.path(), "deep/skip.spec.ts", "");
        write(tmp.path(), "deep/keep2.ts", "");

        let outcome =
            collect_sources(&config(&[".ts"], &["*.spec.ts"]), &[tmp.path().to_path_buf()])
                .unwrap();
        assert_eq!(paths(&outcome.bundle), vec!["deep/keep2.ts", "keep.ts"]);
    }

    #[test]
    fn extension_match_is_exact_and_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "upper.TS", "");
        write(tmp.path(), "types.d.ts", "");
        write(tmp.path(), ".ts", "");
        write(tmp.path(), "noext", "");

        let outcome =
            collect_sources(&config(&[".ts"], &[]), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths(&outcome.bundle), vec!["types.d.ts"]);
    }

    #[test]
    fn file_root_is_collected_under_its_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "nested/main.ts", "main");

        let outcome = collect_sources(
            &config(&[".ts"], &[]),
            &[tmp.path().join("nested/main.ts")],
        )
        .unwrap();
        assert_eq!(paths(&outcome.bundle), vec!["main.ts"]);
    }

    #[test]
    fn missing_roots_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "present/a.ts", "");
        let missing = tmp.path().join("absent");

        let outcome = collect_sources(
            &config(&[".ts"], &[]),
            &[missing.clone(), tmp.path().join("present")],
        )
        .unwrap();
        assert_eq!(outcome.missing_roots, vec![missing]);
        assert_eq!(paths(&outcome.bundle), vec!["a.ts"]);
    }

    #[test]
    fn overlapping_roots_overwrite_same_key() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "one/index.ts", "first");
        write(tmp.path(), "two/index.ts", "second");

        let outcome = collect_sources(
            &config(&[".ts"], &[]),
            &[tmp.path().join("one"), tmp.path().join("two")],
        )
        .unwrap();
        assert_eq!(outcome.bundle.file_count(), 1);
        assert_eq!(outcome.bundle.get("demo", "index.ts"), Some("second"));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bin.ts"), [b'o', b'k', 0xFF, b'!']).unwrap();

        let outcome =
            collect_sources(&config(&[".ts"], &[]), &[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(outcome.bundle.get("demo", "bin.ts"), Some("ok\u{FFFD}!"));
    }

    #[test]
    fn file_level_rules_still_apply_when_directory_passes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/.env/config.ts", "");
        write(tmp.path(), "src/app/package-lock.json", "{}");
        write(tmp.path(), "src/app/main.ts", "");

        let outcome = collect_sources(
            &config(&[".ts", ".json"], &["package-lock.json", ".env"]),
            &[tmp.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(paths(&outcome.bundle), vec!["src/app/main.ts"]);
    }

    #[test]
    fn unreadable_matched_file_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        let config = config(&[".ts"], &[]);
        let matcher = IgnoreMatcher::new(&config.ignore_paths).unwrap();
        let mut bundle = PackageBundle::new();

        let err = add_file(
            &tmp.path().join("vanished.ts"),
            "vanished.ts",
            &config,
            &matcher,
            &mut bundle,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::FileRead { ref path, .. } if path.ends_with("vanished.ts")));
        assert!(bundle.is_empty());
        assert_eq!(bundle.package_count(), 0);
    }

    #[test]
    fn unmatched_missing_file_is_skipped_without_reading() {
        let tmp = TempDir::new().unwrap();
        let config = config(&[".ts"], &[]);
        let matcher = IgnoreMatcher::new(&config.ignore_paths).unwrap();
        let mut bundle = PackageBundle::new();

        let added = add_file(
            &tmp.path().join("vanished.js"),
            "vanished.js",
            &config,
            &matcher,
            &mut bundle,
        )
        .unwrap();
        assert!(!added);
        assert!(bundle.is_empty());
    }
}
