use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Invalid Configuration: {0}")]
    ConfigInvalid(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("Source Path Missing: {}", .0.display())]
    PathMissing(PathBuf),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("YAML Parsing/Serialization Error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("TOON Decoding Error: line {line}: {message}")]
    ToonDecode { line: usize, message: String },

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: {0}")]
    WalkDir(String),

    #[error("Ignore Pattern Error: {0}")]
    Pattern(String),

    #[error("Visualization Template Error: {0}")]
    Template(String),
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::WalkDir(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Pattern(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlParse(err.to_string())
    }
}

impl AppError {
    /// True for decode/encode failures of any supported output format.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            AppError::JsonSerialize(_)
                | AppError::YamlError(_)
                | AppError::ToonDecode { .. }
        )
    }
}
