//! az CLI wrapper
//!
//! Wraps the Azure CLI commands appgw needs. Every command runs with
//! `--output json` and its stdout is deserialized into the `Az*` types below.

use crate::error::{AzureError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// Markers az prints on stderr when the target resource does not exist
const NOT_FOUND_MARKERS: [&str; 4] = [
    "ResourceNotFound",
    "ResourceGroupNotFound",
    "was not found",
    "could not be found",
];

/// Markers az prints when there is no signed-in account
const NOT_LOGGED_IN_MARKERS: [&str; 2] = ["az login", "No subscription found"];

/// az CLI wrapper
#[derive(Debug, Clone, Default)]
pub struct AzCli {
    subscription: Option<String>,
}

impl AzCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin every command to a subscription instead of the CLI default
    pub fn with_subscription(subscription: impl Into<String>) -> Self {
        Self {
            subscription: Some(subscription.into()),
        }
    }

    /// Check that az is installed and return its version
    pub async fn version(&self) -> Result<String> {
        let which = Command::new("which").arg("az").output().await?;
        if !which.status.success() {
            return Err(AzureError::AzNotFound);
        }

        let output = self.run_command(&["version"]).await?;
        let version: serde_json::Value = serde_json::from_str(&output)?;
        version
            .get("azure-cli")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| AzureError::UnexpectedOutput("az version without azure-cli".into()))
    }

    /// Full argument list for one invocation
    ///
    /// `version` and `rest` take no `--subscription`; the `rest` URL already
    /// names the subscription resolved by `account show`.
    fn command_args(&self, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        full.extend(["--output".to_string(), "json".to_string()]);
        if let Some(ref subscription) = self.subscription {
            if !matches!(args.first(), Some(&"version" | &"rest")) {
                full.extend(["--subscription".to_string(), subscription.clone()]);
            }
        }
        full
    }

    /// Run an az command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("az");
        cmd.args(self.command_args(args));
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: az {}", args.join(" "));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AzureError::AzNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if is_not_logged_in(&stderr) {
                return Err(AzureError::NotLoggedIn);
            }
            return Err(AzureError::CommandFailed(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a `show`-style command, mapping az's not-found failure to `None`
    async fn show<T: DeserializeOwned>(&self, args: &[&str]) -> Result<Option<T>> {
        match self.run_command(args).await {
            Ok(output) => parse_show_output(&output),
            Err(AzureError::CommandFailed(stderr)) if is_not_found(&stderr) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Current account, `None` when nobody is logged in
    pub async fn account_show(&self) -> Result<Option<AzAccount>> {
        let mut args = vec!["account", "show"];
        if let Some(ref subscription) = self.subscription {
            args.push("--subscription");
            args.push(subscription.as_str());
        }

        match self.run_command(&args).await {
            Ok(output) => Ok(Some(serde_json::from_str(&output)?)),
            Err(AzureError::NotLoggedIn) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn group_show(&self, name: &str) -> Result<Option<AzResourceGroup>> {
        self.show(&["group", "show", "--name", name]).await
    }

    pub async fn vnet_show(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<AzVirtualNetwork>> {
        self.show(&[
            "network",
            "vnet",
            "show",
            "--resource-group",
            resource_group,
            "--name",
            name,
        ])
        .await
    }

    pub async fn public_ip_show(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<AzPublicIp>> {
        self.show(&[
            "network",
            "public-ip",
            "show",
            "--resource-group",
            resource_group,
            "--name",
            name,
        ])
        .await
    }

    pub async fn nsg_show_by_id(&self, id: &str) -> Result<Option<AzNetworkSecurityGroup>> {
        self.show(&["network", "nsg", "show", "--ids", id]).await
    }

    pub async fn gateway_show(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<AzApplicationGateway>> {
        self.show(&[
            "network",
            "application-gateway",
            "show",
            "--resource-group",
            resource_group,
            "--name",
            name,
        ])
        .await
    }

    pub async fn gateway_backend_health(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<AzBackendHealth> {
        let output = self
            .run_command(&[
                "network",
                "application-gateway",
                "show-backend-health",
                "--resource-group",
                resource_group,
                "--name",
                name,
            ])
            .await?;

        if output.trim().is_empty() {
            return Ok(AzBackendHealth::default());
        }

        Ok(serde_json::from_str(&output)?)
    }

    /// PUT a resource body through `az rest`
    pub async fn rest_put(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let body = serde_json::to_string(body)?;
        let output = self
            .run_command(&[
                "rest",
                "--method",
                "put",
                "--url",
                url,
                "--headers",
                "Content-Type=application/json",
                "--body",
                body.as_str(),
            ])
            .await?;

        if output.trim().is_empty() {
            return Err(AzureError::UnexpectedOutput(format!(
                "empty response from PUT {}",
                url
            )));
        }

        Ok(serde_json::from_str(&output)?)
    }

    /// Create a diagnostic setting streaming all logs and metrics to an event hub
    pub async fn diagnostic_settings_create(
        &self,
        setting_name: &str,
        resource_id: &str,
        event_hub: &str,
        event_hub_rule: Option<&str>,
    ) -> Result<()> {
        let mut args = vec![
            "monitor",
            "diagnostic-settings",
            "create",
            "--name",
            setting_name,
            "--resource",
            resource_id,
            "--event-hub",
            event_hub,
            "--logs",
            r#"[{"categoryGroup":"allLogs","enabled":true}]"#,
            "--metrics",
            r#"[{"category":"AllMetrics","enabled":true}]"#,
        ];

        if let Some(rule) = event_hub_rule {
            args.push("--event-hub-rule");
            args.push(rule);
        }

        self.run_command(&args).await?;
        Ok(())
    }
}

fn is_not_found(stderr: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m))
}

fn is_not_logged_in(stderr: &str) -> bool {
    NOT_LOGGED_IN_MARKERS.iter().any(|m| stderr.contains(m))
}

fn parse_show_output<T: DeserializeOwned>(output: &str) -> Result<Option<T>> {
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// Reference to another resource (`{"id": "..."}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzSubResource {
    pub id: String,
}

impl AzSubResource {
    /// Last path segment of the ID, i.e. the child resource name
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Account information from `az account show`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzAccount {
    pub id: String,
    pub name: Option<String>,
    pub user: Option<AzUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzUser {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzVirtualNetwork {
    pub id: String,
    pub name: String,
    pub location: String,
    pub address_space: Option<AzAddressSpace>,
    #[serde(default)]
    pub subnets: Vec<AzSubnet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzAddressSpace {
    #[serde(default)]
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzSubnet {
    pub id: String,
    pub name: String,
    pub address_prefix: Option<String>,
    pub network_security_group: Option<AzSubResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzPublicIp {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub sku: Option<AzSku>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzSku {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzNetworkSecurityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub security_rules: Vec<serde_json::Value>,
}

/// Gateway as printed by `az network application-gateway show`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzApplicationGateway {
    pub id: String,
    pub name: String,
    pub location: String,
    pub resource_group: Option<String>,
    pub provisioning_state: Option<String>,
    pub operational_state: Option<String>,
    #[serde(rename = "frontendIPConfigurations", default)]
    pub frontend_ip_configurations: Vec<AzFrontendIpConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzFrontendIpConfiguration {
    pub name: String,
    #[serde(rename = "privateIPAddress")]
    pub private_ip_address: Option<String>,
    #[serde(rename = "publicIPAddress")]
    pub public_ip_address: Option<AzSubResource>,
}

/// Output of `az network application-gateway show-backend-health`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzBackendHealth {
    #[serde(default)]
    pub backend_address_pools: Vec<AzBackendPoolHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzBackendPoolHealth {
    pub backend_address_pool: AzSubResource,
    #[serde(default)]
    pub backend_http_settings_collection: Vec<AzBackendSettingsHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzBackendSettingsHealth {
    pub backend_http_settings: Option<AzSubResource>,
    #[serde(default)]
    pub servers: Vec<AzServerHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzServerHealth {
    pub address: String,
    pub health: String,
}
