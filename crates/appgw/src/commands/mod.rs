pub mod check;
pub mod deploy;
pub mod status;

use appgw_config::{DeploymentConfig, Environment};
use colored::Colorize;
use std::path::Path;

/// Load an environment's config; a mismatched `Environment` tag is only a warning
pub fn load_config(env: Environment, config_dir: Option<&Path>) -> anyhow::Result<DeploymentConfig> {
    let loaded = appgw_config::load_environment(env, config_dir)?;

    println!(
        "Config: {}",
        loaded.path.display().to_string().cyan()
    );
    tracing::info!("Loaded config {}", loaded.path.display());

    if !loaded.config.environment_matches(env) {
        tracing::warn!(
            "Config {} declares environment '{}' but '{}' was requested",
            loaded.path.display(),
            loaded.config.environment,
            env
        );
    }

    Ok(loaded.config)
}
