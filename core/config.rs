use crate::encode::OutputFormat;
use crate::error::{AppError, Result};
use log;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "codepack.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const DEFAULT_FILE_TYPES: &[&str] = &[".js", ".cjs", ".mjs", ".ts", ".mts", ".cts", ".tsx"];

pub const DEFAULT_IGNORE_PATHS: &[&str] = &[
    "e2e",
    "step_definitions",
    ".features-gen",
    "assets",
    "reports",
    "report",
    "dist/server",
    "support/mcp",
    "package-lock.json",
    ".log",
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    ".cache",
    ".env",
    ".DS_Store",
    "npm-debug.log",
    "yarn-error.log",
    ".idea",
    ".vscode",
    "*.log",
    "*.tmp",
    "*.temp",
    "*.swp",
    "Thumbs.db",
];

/// A validated run configuration. Only [`SourceConfig::from_value`] and the
/// loaders below produce these from untrusted input.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub package_name: String,
    pub paths: Vec<String>,
    pub file_types: Vec<String>,
    pub ignore_paths: Vec<String>,
    pub output_dir: String,
    pub output_format: OutputFormat,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawSourceConfig {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    package_name: String,
    paths: Vec<String>,
    #[serde(default = "default_file_types")]
    file_types: Vec<String>,
    #[serde(default = "default_ignore_paths")]
    ignore_paths: Vec<String>,
    #[serde(default = "default_output_dir")]
    output_dir: String,
    #[serde(default)]
    output_format: OutputFormat,
}

fn default_file_types() -> Vec<String> {
    DEFAULT_FILE_TYPES.iter().map(|s| s.to_string()).collect()
}
fn default_ignore_paths() -> Vec<String> {
    DEFAULT_IGNORE_PATHS.iter().map(|s| s.to_string()).collect()
}
fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl RawSourceConfig {
    fn validate(self) -> Result<SourceConfig> {
        // `id` falls back to the package name.
        let id = self.id.unwrap_or_else(|| self.package_name.clone());
        if id.trim().is_empty() {
            return Err(AppError::ConfigInvalid(
                "field 'id' must not be empty".to_string(),
            ));
        }
        if self.package_name.trim().is_empty() {
            return Err(AppError::ConfigInvalid(format!(
                "config '{}': field 'packageName' must not be empty",
                id
            )));
        }
        if let Some(index) = self.paths.iter().position(|p| p.trim().is_empty()) {
            return Err(AppError::ConfigInvalid(format!(
                "config '{}': paths[{}] must not be empty",
                id, index
            )));
        }
        for file_type in &self.file_types {
            if !file_type.starts_with('.') {
                log::warn!(
                    "config '{}': file type '{}' has no leading '.', it will never match",
                    id,
                    file_type
                );
            }
        }

        Ok(SourceConfig {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            description: self.description,
            package_name: self.package_name,
            paths: self.paths,
            file_types: self.file_types,
            ignore_paths: self.ignore_paths,
            output_dir: self.output_dir,
            output_format: self.output_format,
        })
    }
}

impl SourceConfig {
    /// Builds a config with the default file types, ignore rules and output
    /// settings. Used by callers that assemble configs in code.
    pub fn new(id: &str, package_name: &str, paths: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            package_name: package_name.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            file_types: default_file_types(),
            ignore_paths: default_ignore_paths(),
            output_dir: default_output_dir(),
            output_format: OutputFormat::default(),
        }
    }

    /// Parses and validates a single config record from an untyped value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawSourceConfig = serde_json::from_value(value)
            .map_err(|e| AppError::ConfigInvalid(e.to_string()))?;
        raw.validate()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| AppError::ConfigInvalid(e.to_string()))?;
        Self::from_value(value)
    }

    /// Root paths resolved against `base_dir`, with `~` expanded and `.`/`..`
    /// folded away.
    pub fn resolve_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.paths
            .iter()
            .map(|p| resolve_against(base_dir, p))
            .collect()
    }

    pub fn resolve_output_dir(&self, base_dir: &Path) -> PathBuf {
        resolve_against(base_dir, &self.output_dir)
    }
}

fn resolve_against(base_dir: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&base_dir.join(expanded))
    }
}

/// Lexical normalization: drops `.` components and resolves `..` against the
/// preceding component. Never touches the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

fn parse_config_document(document: serde_json::Value) -> Result<Vec<SourceConfig>> {
    let records = match document {
        serde_json::Value::Object(mut map) if map.contains_key("sources") => {
            match map.remove("sources") {
                Some(serde_json::Value::Array(items)) => items,
                _ => {
                    return Err(AppError::ConfigInvalid(
                        "'sources' must be a list of configurations".to_string(),
                    ));
                }
            }
        }
        serde_json::Value::Array(items) => items,
        single @ serde_json::Value::Object(_) => vec![single],
        _ => {
            return Err(AppError::ConfigInvalid(
                "expected a configuration table or a 'sources' list".to_string(),
            ));
        }
    };

    let mut configs = Vec::new();
    let mut seen = HashSet::new();
    for (index, record) in records.into_iter().enumerate() {
        let config = SourceConfig::from_value(record).map_err(|e| match e {
            AppError::ConfigInvalid(msg) => {
                AppError::ConfigInvalid(format!("sources[{}]: {}", index, msg))
            }
            other => other,
        })?;
        if !seen.insert(config.id.clone()) {
            log::debug!("Skipping duplicate configuration id '{}'", config.id);
            continue;
        }
        configs.push(config);
    }

    if configs.is_empty() {
        return Err(AppError::ConfigInvalid(
            "no configurations found".to_string(),
        ));
    }
    Ok(configs)
}

/// Parses config file text. `extension` selects the syntax (`toml`, `json`,
/// `yaml`/`yml`).
pub fn parse_source_configs(content: &str, extension: &str) -> Result<Vec<SourceConfig>> {
    let document: serde_json::Value = match extension {
        "json" => {
            serde_json::from_str(content).map_err(|e| AppError::ConfigInvalid(e.to_string()))?
        }
        "yaml" | "yml" => {
            serde_yml::from_str(content).map_err(|e| AppError::ConfigInvalid(e.to_string()))?
        }
        _ => toml::from_str(content)?,
    };
    parse_config_document(document)
}

pub fn load_source_configs(config_path: &Path) -> Result<Vec<SourceConfig>> {
    log::info!("Loading configuration from: {}", config_path.display());
    let content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    let extension = config_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml")
        .to_lowercase();
    let configs = parse_source_configs(&content, &extension).map_err(|e| match e {
        AppError::ConfigInvalid(msg) => {
            AppError::ConfigInvalid(format!("{}: {}", config_path.display(), msg))
        }
        AppError::TomlParse(msg) => AppError::TomlParse(format!(
            "Error parsing config file '{}': {}. Check TOML syntax and structure.",
            config_path.display(),
            msg
        )),
        other => other,
    })?;
    log::debug!(
        "Loaded {} configuration(s): {:?}",
        configs.len(),
        configs.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
    );
    Ok(configs)
}
