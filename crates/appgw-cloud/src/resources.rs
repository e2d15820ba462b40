//! Descriptors returned by control-plane lookups

use crate::state::ProvisioningState;
use serde::{Deserialize, Serialize};

/// The authenticated context a client operates in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Subscription the session is bound to
    pub subscription_id: String,

    /// Subscription display name
    pub subscription_name: Option<String>,

    /// Signed-in account (user or service principal)
    pub account: Option<String>,
}

impl SessionInfo {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            subscription_name: None,
            account: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupInfo {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualNetworkInfo {
    pub id: String,
    pub name: String,
    pub location: String,
    pub address_prefixes: Vec<String>,
    pub subnets: Vec<SubnetInfo>,
}

impl VirtualNetworkInfo {
    /// Look up a subnet of this network by name
    pub fn subnet(&self, name: &str) -> Option<&SubnetInfo> {
        self.subnets.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub id: String,
    pub name: String,
    pub address_prefix: Option<String>,

    /// Resource ID of the NSG attached to the subnet, if any
    pub network_security_group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIpInfo {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSecurityGroupInfo {
    pub id: String,
    pub name: String,
    pub rule_count: usize,
}

/// Current state of an application gateway as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    pub id: String,
    pub name: String,
    pub resource_group: String,
    pub location: String,

    /// Raw provisioning state string (e.g. "Succeeded", "Updating")
    pub provisioning_state: String,

    /// Raw operational state string (e.g. "Running", "Stopped")
    pub operational_state: Option<String>,

    pub frontend_ip_configurations: Vec<FrontendIpInfo>,
}

impl GatewayInfo {
    pub fn state(&self) -> ProvisioningState {
        ProvisioningState::from_reported(&self.provisioning_state)
    }

    /// First private frontend address, if the gateway has one
    pub fn private_ip_address(&self) -> Option<&str> {
        self.frontend_ip_configurations
            .iter()
            .find_map(|f| f.private_ip_address.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendIpInfo {
    pub name: String,
    pub private_ip_address: Option<String>,
    pub public_ip_address_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_lookup() {
        let vnet = VirtualNetworkInfo {
            id: "/vnets/core".to_string(),
            name: "core".to_string(),
            location: "westeurope".to_string(),
            address_prefixes: vec!["10.0.0.0/16".to_string()],
            subnets: vec![SubnetInfo {
                id: "/vnets/core/subnets/agw".to_string(),
                name: "agw".to_string(),
                address_prefix: Some("10.0.1.0/24".to_string()),
                network_security_group_id: None,
            }],
        };

        assert!(vnet.subnet("agw").is_some());
        assert!(vnet.subnet("AGW").is_none());
    }
}
