pub mod aliases;
pub mod app_config;
pub mod config;
pub mod export;

pub use aliases::{load_aliases, AliasFile};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use export::{
    load_export, parse_export, scalar_text, ExportRecord, LoadedExport, ModelEntry, SkippedRecord,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read alias file {path}: {source}")]
    AliasFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse alias file: {0}")]
    AliasFileParse(#[source] serde_yaml::Error),

    #[error("alias validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read export file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("export is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("unsupported export document: {0}")]
    Shape(String),
}
