use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Config file not found for environment '{environment}'. Looked in:\n{}\n\
        Use --config-dir or the APPGW_CONFIG_DIR environment variable to point elsewhere",
        .searched.iter().map(|p| format!("  - {}", p.display())).collect::<Vec<_>>().join("\n")
    )]
    FileNotFound {
        environment: String,
        searched: Vec<PathBuf>,
    },

    #[error("Config file {path} is not valid JSON: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Config file {path} is missing required section(s): {}", .missing.join(", "))]
    MissingKeys { path: PathBuf, missing: Vec<String> },

    #[error("Config file {path} has an invalid shape: {message}")]
    InvalidShape { path: PathBuf, message: String },

    #[error("Unknown environment '{0}' (expected: nonprod, prod)")]
    UnknownEnvironment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Stable error code reported in logs and on the console
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "CFG-001A",
            ConfigError::Parse { .. } | ConfigError::InvalidShape { .. } => "CFG-002A",
            ConfigError::MissingKeys { .. } => "CFG-003A",
            ConfigError::UnknownEnvironment(_) => "CFG-004A",
            ConfigError::Io(_) => "CFG-001B",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
