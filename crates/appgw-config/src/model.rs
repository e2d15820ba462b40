//! Configuration document model
//!
//! Field names follow the PascalCase JSON layout of the per-environment
//! config files. Optional sequences accept both a missing key and `null`.

use crate::error::ConfigError;
use appgw_cloud::{CookieBasedAffinity, Protocol, RuleType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deployment environment an invocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Nonprod,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Nonprod, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Nonprod => "nonprod",
            Environment::Prod => "prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nonprod" => Ok(Environment::Nonprod),
            "prod" => Ok(Environment::Prod),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Root document for one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentConfig {
    /// Environment tag; compared with the invocation argument
    pub environment: String,

    pub resource_group: ResourceGroupConfig,

    pub virtual_network: VirtualNetworkConfig,

    #[serde(rename = "PublicIP")]
    pub public_ip: PublicIpConfig,

    pub application_gateway: ApplicationGatewayConfig,

    #[serde(rename = "FrontendIPConfiguration", default)]
    pub frontend_ip_configuration: FrontendIpConfig,

    /// `FrontendPort` is either one object or a list; normalised here
    #[serde(rename = "FrontendPort", default, deserialize_with = "one_or_many")]
    pub frontend_ports: Vec<FrontendPortConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub backend_address_pools: Vec<BackendAddressPoolConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub health_probes: Vec<HealthProbeConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub backend_http_settings: Vec<BackendHttpSettingsConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub http_listeners: Vec<HttpListenerConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub request_routing_rules: Vec<RequestRoutingRuleConfig>,

    #[serde(default)]
    pub diagnostics: Option<DiagnosticsConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeMap<String, String>,
}

impl DeploymentConfig {
    /// Whether the document's `Environment` tag names `env` (case-insensitive)
    pub fn environment_matches(&self, env: Environment) -> bool {
        self.environment.eq_ignore_ascii_case(env.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceGroupConfig {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualNetworkConfig {
    pub name: String,
    #[serde(default)]
    pub address_prefix: Option<String>,
    pub subnet_name: String,
    #[serde(default)]
    pub subnet_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicIpConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationGatewayConfig {
    pub name: String,
    pub sku: SkuConfig,
    #[serde(default)]
    pub autoscale_configuration: Option<AutoscaleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkuConfig {
    pub name: String,
    pub tier: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoscaleConfig {
    pub min_capacity: u32,
    #[serde(default)]
    pub max_capacity: Option<u32>,
}

/// Frontend address binding
///
/// `UsePublicIP` (default `true`) binds the `PublicIP` section; `SubnetName`
/// binds a private address in that subnet. Exactly one must be in effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrontendIpConfig {
    pub name: String,
    #[serde(rename = "UsePublicIP", default)]
    pub use_public_ip: Option<bool>,
    #[serde(default)]
    pub subnet_name: Option<String>,
    #[serde(rename = "PrivateIPAddress", default)]
    pub private_ip_address: Option<String>,
}

impl FrontendIpConfig {
    pub fn wants_public_ip(&self) -> bool {
        self.use_public_ip.unwrap_or(true)
    }
}

impl Default for FrontendIpConfig {
    fn default() -> Self {
        Self {
            name: "appGatewayFrontendIP".to_string(),
            use_public_ip: None,
            subnet_name: None,
            private_ip_address: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrontendPortConfig {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackendAddressPoolConfig {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backend_addresses: Vec<BackendAddressConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackendAddressConfig {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub fqdn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthProbeConfig {
    pub name: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub host: Option<String>,
    pub path: String,
    pub interval: u32,
    pub timeout: u32,
    pub unhealthy_threshold: u32,
    #[serde(default)]
    pub min_servers: u32,
    #[serde(default)]
    pub pick_host_name_from_backend_http_settings: bool,
    #[serde(default)]
    pub r#match: Option<ProbeMatchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProbeMatchConfig {
    #[serde(default)]
    pub status_codes: Option<Vec<String>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackendHttpSettingsConfig {
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    #[serde(default)]
    pub cookie_based_affinity: CookieBasedAffinity,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u32,
    #[serde(default)]
    pub probe_configuration: Option<ProbeReference>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub pick_host_name_from_backend_address: bool,
}

fn default_request_timeout() -> u32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProbeReference {
    pub probe_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpListenerConfig {
    pub name: String,
    pub frontend_port: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestRoutingRuleConfig {
    pub name: String,
    #[serde(default)]
    pub rule_type: RuleType,
    pub http_listener: String,
    pub backend_address_pool: String,
    pub backend_http_settings: String,
    #[serde(default)]
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub event_hub_name: Option<String>,
    #[serde(default)]
    pub event_hub_authorization_rule_id: Option<String>,
}

impl DiagnosticsConfig {
    /// Event hub target, if one is configured with a non-empty name
    pub fn event_hub(&self) -> Option<&str> {
        self.event_hub_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(FrontendPortConfig),
    Many(Vec<FrontendPortConfig>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<FrontendPortConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(port)) => vec![port],
        Some(OneOrMany::Many(ports)) => ports,
        None => Vec::new(),
    })
}
