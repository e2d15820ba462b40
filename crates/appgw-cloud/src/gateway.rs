//! Application gateway descriptors
//!
//! These are the sub-resources assembled from configuration and handed to
//! [`CloudResourceClient::create_application_gateway`](crate::CloudResourceClient::create_application_gateway).
//! Cross-references between sections (a listener's port, a rule's pool) are
//! stored by name; the client turns them into provider IDs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A descriptor that other sections can reference by name
pub trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Named for $ty {
                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_named!(
    FrontendIpConfiguration,
    FrontendPort,
    BackendAddressPool,
    HealthProbe,
    BackendHttpSettings,
    HttpListener,
    RequestRoutingRule,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Http,
    Https,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => write!(f, "Http"),
            Protocol::Https => write!(f, "Https"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookieBasedAffinity {
    Enabled,
    #[default]
    Disabled,
}

impl std::fmt::Display for CookieBasedAffinity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CookieBasedAffinity::Enabled => write!(f, "Enabled"),
            CookieBasedAffinity::Disabled => write!(f, "Disabled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    #[default]
    Basic,
    PathBasedRouting,
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleType::Basic => write!(f, "Basic"),
            RuleType::PathBasedRouting => write!(f, "PathBasedRouting"),
        }
    }
}

/// Where the gateway's frontend address comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FrontendIpSource {
    PublicIp {
        id: String,
    },
    Subnet {
        id: String,
        private_ip_address: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendIpConfiguration {
    pub name: String,
    pub source: FrontendIpSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendPort {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendAddress {
    IpAddress(String),
    Fqdn(String),
}

impl std::fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendAddress::IpAddress(ip) => write!(f, "{}", ip),
            BackendAddress::Fqdn(fqdn) => write!(f, "{}", fqdn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendAddressPool {
    pub name: String,
    pub addresses: Vec<BackendAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeMatch {
    pub status_codes: Vec<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthProbe {
    pub name: String,
    pub protocol: Protocol,
    pub host: Option<String>,
    pub path: String,
    /// Seconds between probes
    pub interval: u32,
    /// Probe timeout in seconds
    pub timeout: u32,
    pub unhealthy_threshold: u32,
    pub min_servers: u32,
    pub pick_host_name_from_backend_http_settings: bool,
    pub match_condition: Option<ProbeMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHttpSettings {
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    pub cookie_based_affinity: CookieBasedAffinity,
    /// Request timeout in seconds
    pub request_timeout: u32,
    /// Name of the linked health probe
    pub probe: Option<String>,
    pub host_name: Option<String>,
    pub pick_host_name_from_backend_address: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpListener {
    pub name: String,
    pub frontend_ip_configuration: String,
    pub frontend_port: String,
    pub protocol: Protocol,
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRoutingRule {
    pub name: String,
    pub rule_type: RuleType,
    pub http_listener: String,
    pub backend_address_pool: String,
    pub backend_http_settings: String,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
    pub tier: String,
    /// Fixed instance count; omitted when autoscale is configured
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscaleConfiguration {
    pub min_capacity: u32,
    pub max_capacity: Option<u32>,
}

/// Subnet the gateway instances are deployed into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayIpConfiguration {
    pub name: String,
    pub subnet_id: String,
}

/// Every sub-resource of one gateway, in build order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltResourceSet {
    pub frontend_ip_configuration: FrontendIpConfiguration,
    pub frontend_ports: Vec<FrontendPort>,
    pub backend_address_pools: Vec<BackendAddressPool>,
    pub health_probes: Vec<HealthProbe>,
    pub backend_http_settings: Vec<BackendHttpSettings>,
    pub http_listeners: Vec<HttpListener>,
    pub request_routing_rules: Vec<RequestRoutingRule>,
    pub sku: Sku,
    pub autoscale: Option<AutoscaleConfiguration>,
}

/// Payload of the single create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCreateRequest {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub gateway_ip_configuration: GatewayIpConfiguration,
    pub resources: BuiltResourceSet,
    pub tags: BTreeMap<String, String>,
}

/// Event hub target for gateway diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSink {
    /// Name of the diagnostic setting
    pub name: String,
    pub event_hub_name: String,
    pub authorization_rule_id: Option<String>,
}
