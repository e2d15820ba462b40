//! Prerequisite check: local tooling, session, config files

use appgw_cloud::CloudResourceClient;
use appgw_cloud_azure::AzureCliClient;
use appgw_config::{ConfigError, Environment, LoadedConfig};
use chrono::Local;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Outcome {
    Pass,
    Warning,
    Fail,
}

struct CheckResult {
    name: String,
    outcome: Outcome,
    detail: String,
}

#[derive(Default)]
pub struct CheckReport {
    results: Vec<CheckResult>,
}

impl CheckReport {
    fn record(&mut self, name: impl Into<String>, outcome: Outcome, detail: impl Into<String>) {
        let (name, detail) = (name.into(), detail.into());
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let mark = match outcome {
            Outcome::Pass => "✓".green().bold(),
            Outcome::Warning => "!".yellow().bold(),
            Outcome::Fail => "✗".red().bold(),
        };
        println!("[{}] {} {}: {}", timestamp.dimmed(), mark, name, detail);

        match outcome {
            Outcome::Pass => tracing::info!("[CHECK] {}: {}", name, detail),
            Outcome::Warning => tracing::warn!("[CHECK] {}: {}", name, detail),
            Outcome::Fail => tracing::error!("[CHECK] {}: {}", name, detail),
        }

        self.results.push(CheckResult {
            name,
            outcome,
            detail,
        });
    }

    /// Worst outcome of all checks
    pub fn overall(&self) -> Outcome {
        self.results
            .iter()
            .map(|r| r.outcome)
            .max()
            .unwrap_or(Outcome::Pass)
    }

    fn print_summary(&self) {
        let count = |o: Outcome| self.results.iter().filter(|r| r.outcome == o).count();

        println!();
        println!(
            "{} passed, {} warning(s), {} failed",
            count(Outcome::Pass).to_string().green(),
            count(Outcome::Warning).to_string().yellow(),
            count(Outcome::Fail).to_string().red()
        );
        for failed in self.results.iter().filter(|r| r.outcome == Outcome::Fail) {
            println!("  {} {}: {}", "✗".red(), failed.name, failed.detail);
        }

        match self.overall() {
            Outcome::Pass => println!("{}", "✓ All prerequisites met".green().bold()),
            Outcome::Warning => println!("{}", "! Prerequisites met with warnings".yellow().bold()),
            Outcome::Fail => println!("{}", "✗ Prerequisites not met".red().bold()),
        }
    }
}

/// Outcome of loading one environment's config
///
/// A missing file fails only when the environment was named explicitly.
pub fn config_outcome(
    env: Environment,
    result: &appgw_config::Result<LoadedConfig>,
    named: bool,
) -> (Outcome, String) {
    match result {
        Ok(loaded) if loaded.config.environment_matches(env) => (
            Outcome::Pass,
            format!("{} is valid", loaded.path.display()),
        ),
        Ok(loaded) => (
            Outcome::Warning,
            format!(
                "{} declares environment '{}' (expected '{}')",
                loaded.path.display(),
                loaded.config.environment,
                env
            ),
        ),
        Err(e @ ConfigError::FileNotFound { .. }) => {
            let outcome = if named { Outcome::Fail } else { Outcome::Warning };
            (outcome, format!("[{}] no {} found", e.code(), appgw_config::config_file_name(env)))
        }
        Err(e) => (Outcome::Fail, format!("[{}] {}", e.code(), e)),
    }
}

pub async fn handle(
    client: &AzureCliClient,
    environment: Option<Environment>,
    config_dir: Option<&Path>,
) -> Outcome {
    println!("{}", "Checking prerequisites...".blue().bold());
    println!();

    let mut report = CheckReport::default();

    let az_available = match client.cli_version().await {
        Ok(version) => {
            report.record("Azure CLI", Outcome::Pass, format!("az {}", version));
            true
        }
        Err(e) => {
            report.record("Azure CLI", Outcome::Fail, e.to_string());
            false
        }
    };

    if az_available {
        match client.current_session().await {
            Ok(Some(session)) => report.record(
                "Session",
                Outcome::Pass,
                format!(
                    "subscription {}{}",
                    session.subscription_id,
                    session
                        .account
                        .as_deref()
                        .map(|a| format!(" as {}", a))
                        .unwrap_or_default()
                ),
            ),
            Ok(None) => report.record(
                "Session",
                Outcome::Fail,
                "[CONN-001A] not signed in; run `az login`",
            ),
            Err(e) => report.record("Session", Outcome::Fail, format!("[CONN-001B] {}", e)),
        }
    } else {
        report.record("Session", Outcome::Warning, "skipped (Azure CLI unavailable)");
    }

    let environments = match environment {
        Some(env) => vec![env],
        None => Environment::ALL.to_vec(),
    };
    for env in environments {
        let result = appgw_config::load_environment(env, config_dir);
        let (outcome, detail) = config_outcome(env, &result, environment.is_some());
        report.record(format!("Config ({})", env), outcome, detail);
    }

    report.print_summary();
    report.overall()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn loaded(tag: &str) -> appgw_config::Result<LoadedConfig> {
        let doc = serde_json::json!({
            "Environment": tag,
            "ResourceGroup": { "Name": "rg", "Location": "westeurope" },
            "VirtualNetwork": { "Name": "vnet", "SubnetName": "snet" },
            "PublicIP": { "Name": "pip" },
            "ApplicationGateway": { "Name": "agw", "Sku": { "Name": "Standard_v2", "Tier": "Standard_v2" } }
        });
        Ok(LoadedConfig {
            path: PathBuf::from("config/prod.json"),
            config: serde_json::from_value(doc).unwrap(),
        })
    }

    fn not_found() -> appgw_config::Result<LoadedConfig> {
        Err(ConfigError::FileNotFound {
            environment: "prod".to_string(),
            searched: vec![PathBuf::from("config/prod.json")],
        })
    }

    #[test]
    fn test_config_outcomes() {
        assert_eq!(config_outcome(Environment::Prod, &loaded("prod"), true).0, Outcome::Pass);
        assert_eq!(
            config_outcome(Environment::Prod, &loaded("nonprod"), true).0,
            Outcome::Warning
        );
        assert_eq!(config_outcome(Environment::Prod, &not_found(), true).0, Outcome::Fail);
        assert_eq!(config_outcome(Environment::Prod, &not_found(), false).0, Outcome::Warning);

        let parse_error: appgw_config::Result<LoadedConfig> = Err(ConfigError::Parse {
            path: PathBuf::from("config/prod.json"),
            message: "expected value".to_string(),
        });
        let (outcome, detail) = config_outcome(Environment::Prod, &parse_error, false);
        assert_eq!(outcome, Outcome::Fail);
        assert!(detail.starts_with("[CFG-002A]"));
    }

    #[test]
    fn test_overall_is_worst_outcome() {
        let mut report = CheckReport::default();
        assert_eq!(report.overall(), Outcome::Pass);

        report.record("a", Outcome::Pass, "ok");
        report.record("b", Outcome::Warning, "meh");
        assert_eq!(report.overall(), Outcome::Warning);

        report.record("c", Outcome::Fail, "broken");
        assert_eq!(report.overall(), Outcome::Fail);
    }
}
