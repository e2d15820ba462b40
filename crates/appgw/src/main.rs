mod commands;
mod logging;

use appgw_cloud_azure::AzureCliClient;
use appgw_config::{ConfigError, Environment};
use appgw_core::DeployError;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::check::Outcome;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "appgw")]
#[command(
    about = "Provision and inspect Azure Application Gateways from per-environment JSON config",
    long_about = None
)]
struct Cli {
    /// Directory holding <environment>.json [default: $APPGW_CONFIG_DIR, ./config, ~/.config/appgw]
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Azure subscription to run against instead of the az CLI default
    #[arg(long, global = true)]
    subscription: Option<String>,

    /// Directory for run logs
    #[arg(long, global = true, env = "APPGW_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the application gateway of an environment
    Deploy {
        /// Environment (nonprod, prod)
        environment: Environment,
        /// Validate and print the plan without creating anything
        #[arg(long)]
        preview: bool,
        /// Give up waiting for provisioning after this many minutes (1-1440)
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=1440))]
        timeout_minutes: u64,
    },
    /// Show gateway state and backend health
    Status {
        /// Environment (nonprod, prod)
        environment: Environment,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the Azure CLI, the session and the config files
    Check {
        /// Environment (nonprod, prod); all environments when omitted
        environment: Option<Environment>,
    },
    /// Show version information
    Version,
}

impl Commands {
    /// Run-log name component
    fn log_label(&self) -> &'static str {
        match self {
            Commands::Deploy { environment, .. } | Commands::Status { environment, .. } => {
                environment.as_str()
            }
            Commands::Check { environment } => {
                environment.map(|e| e.as_str()).unwrap_or("check")
            }
            Commands::Version => "version",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // No run log for version
    if matches!(cli.command, Commands::Version) {
        println!("appgw {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let log_path = logging::init(&cli.log_dir, cli.command.log_label());

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let message = describe(&e);
            if !logged_at_source(&e) {
                tracing::error!("{}", message);
            }
            eprintln!();
            eprintln!("{} {}", "✗".red().bold(), message);
            ExitCode::FAILURE
        }
    };

    if let Some(path) = log_path {
        eprintln!("Log: {}", path.display().to_string().dimmed());
    }
    code
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_dir = cli.config_dir.as_deref();
    let client = match cli.subscription {
        Some(subscription) => AzureCliClient::with_subscription(subscription),
        None => AzureCliClient::new(),
    };

    match cli.command {
        Commands::Deploy {
            environment,
            preview,
            timeout_minutes,
        } => {
            let config = commands::load_config(environment, config_dir)?;
            commands::deploy::handle(&client, &config, preview, timeout_minutes).await?;
        }
        Commands::Status { environment, json } => {
            let config = commands::load_config(environment, config_dir)?;
            commands::status::handle(&client, &config, json).await?;
        }
        Commands::Check { environment } => {
            if commands::check::handle(&client, environment, config_dir).await == Outcome::Fail {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Version => unreachable!("Version is handled before logging setup"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Error text for the console and run log, prefixed with its code when it has one
fn describe(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return format!("[{}] {}", e.code(), e);
    }
    if let Some(e) = err.downcast_ref::<DeployError>() {
        // Coded variants already carry the code in their message
        return e.to_string();
    }
    format!("{:#}", err)
}

/// Coded deploy errors come from validation checks, which log their own line
fn logged_at_source(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DeployError>()
        .is_some_and(|e| e.code().is_some())
}
