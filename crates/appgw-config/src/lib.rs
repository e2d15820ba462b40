//! Per-environment deployment configuration
//!
//! Each environment has one JSON document, `<environment>.json`. This crate
//! finds the document, checks that the required top-level sections are
//! present and deserializes it into a [`DeploymentConfig`].

pub mod error;
pub mod model;

pub use error::*;
pub use model::*;

use std::path::{Path, PathBuf};

/// Top-level sections every document must carry
pub const REQUIRED_KEYS: [&str; 5] = [
    "Environment",
    "ResourceGroup",
    "VirtualNetwork",
    "ApplicationGateway",
    "PublicIP",
];

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "APPGW_CONFIG_DIR";

/// A document together with the file it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: DeploymentConfig,
}

/// File name of an environment's document
pub fn config_file_name(env: Environment) -> String {
    format!("{}.json", env.as_str())
}

/// Find the config file for an environment
///
/// Search order:
/// 1. `explicit_dir` (the `--config-dir` flag), exclusively when given
/// 2. the `APPGW_CONFIG_DIR` environment variable
/// 3. `./config/`
/// 4. `~/.config/appgw/` (platform config dir)
pub fn find_config_file(env: Environment, explicit_dir: Option<&Path>) -> Result<PathBuf> {
    let file_name = config_file_name(env);

    if let Some(dir) = explicit_dir {
        let path = dir.join(&file_name);
        if path.is_file() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound {
            environment: env.to_string(),
            searched: vec![path],
        });
    }

    let mut searched = Vec::new();

    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        let path = PathBuf::from(dir).join(&file_name);
        if path.is_file() {
            return Ok(path);
        }
        searched.push(path);
    }

    let path = std::env::current_dir()?.join("config").join(&file_name);
    if path.is_file() {
        return Ok(path);
    }
    searched.push(path);

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("appgw").join(&file_name);
        if path.is_file() {
            return Ok(path);
        }
        searched.push(path);
    }

    Err(ConfigError::FileNotFound {
        environment: env.to_string(),
        searched,
    })
}

/// Read and validate a config file
pub fn load_config(path: &Path) -> Result<DeploymentConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound {
                environment: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                searched: vec![path.to_path_buf()],
            });
        }
        Err(e) => return Err(e.into()),
    };

    parse_config(&contents, path)
}

/// Parse a document; `path` is used for error messages only
pub fn parse_config(contents: &str, path: &Path) -> Result<DeploymentConfig> {
    let document: serde_json::Value =
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let missing = missing_required_keys(&document);
    if !missing.is_empty() {
        return Err(ConfigError::MissingKeys {
            path: path.to_path_buf(),
            missing,
        });
    }

    serde_json::from_value(document).map_err(|e| ConfigError::InvalidShape {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Required sections absent from (or `null` in) a raw document
pub fn missing_required_keys(document: &serde_json::Value) -> Vec<String> {
    REQUIRED_KEYS
        .iter()
        .filter(|key| document.get(**key).is_none_or(|v| v.is_null()))
        .map(|key| key.to_string())
        .collect()
}

/// Find and load an environment's document
pub fn load_environment(env: Environment, explicit_dir: Option<&Path>) -> Result<LoadedConfig> {
    let path = find_config_file(env, explicit_dir)?;
    tracing::debug!("Loading config for {} from {}", env, path.display());
    let config = load_config(&path)?;
    Ok(LoadedConfig { path, config })
}
