//! Prerequisite checks run before any mutation
//!
//! Every check writes exactly one log line: `info` when it passes, `error`
//! (with the code) when it fails. The first failing check aborts the run.

use crate::error::{DeployError, Result};
use appgw_cloud::{
    CloudResourceClient, GatewayInfo, PublicIpInfo, ResourceGroupInfo, SessionInfo, SubnetInfo,
    VirtualNetworkInfo,
};
use appgw_config::DeploymentConfig;

/// Existing resources the gateway will be attached to
#[derive(Debug, Clone)]
pub struct Prerequisites {
    pub session: SessionInfo,
    pub resource_group: ResourceGroupInfo,
    pub virtual_network: VirtualNetworkInfo,
    /// Subnet hosting the gateway instances
    pub subnet: SubnetInfo,
    /// Present when the frontend binds the public IP
    pub public_ip: Option<PublicIpInfo>,
    /// Present when the frontend binds a private address
    pub frontend_subnet: Option<SubnetInfo>,
}

pub struct Validator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C> Validator<'a, C>
where
    C: CloudResourceClient + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn require_session(&self) -> Result<SessionInfo> {
        match self.client.current_session().await {
            Ok(Some(session)) => {
                tracing::info!(
                    "[CONN] Connected to subscription {}{}",
                    session.subscription_id,
                    session
                        .subscription_name
                        .as_deref()
                        .map(|n| format!(" ({})", n))
                        .unwrap_or_default()
                );
                Ok(session)
            }
            Ok(None) => fail(DeployError::Session {
                code: "CONN-001A",
                message: format!(
                    "No active {} session. Sign in first (e.g. `az login`)",
                    self.client.name()
                ),
            }),
            Err(e) => fail(DeployError::Session {
                code: "CONN-001B",
                message: format!("Failed to query the current session: {}", e),
            }),
        }
    }

    pub async fn require_resource_group(&self, name: &str) -> Result<ResourceGroupInfo> {
        match self.client.get_resource_group(name).await {
            Ok(Some(group)) => {
                tracing::info!("[RG] Resource group '{}' found in {}", name, group.location);
                Ok(group)
            }
            Ok(None) => fail(missing("RG-002A", format!("Resource group '{}' not found", name))),
            Err(e) => fail(lookup("RG-001A", format!("resource group '{}'", name), e)),
        }
    }

    pub async fn require_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<VirtualNetworkInfo> {
        match self.client.get_virtual_network(resource_group, name).await {
            Ok(Some(vnet)) => {
                tracing::info!(
                    "[VNET] Virtual network '{}' found ({} subnet(s))",
                    name,
                    vnet.subnets.len()
                );
                Ok(vnet)
            }
            Ok(None) => fail(missing(
                "VNET-002A",
                format!(
                    "Virtual network '{}' not found in resource group '{}'",
                    name, resource_group
                ),
            )),
            Err(e) => fail(lookup("VNET-001A", format!("virtual network '{}'", name), e)),
        }
    }

    /// Nested lookup in an already fetched network
    pub fn require_subnet<'v>(
        &self,
        vnet: &'v VirtualNetworkInfo,
        name: &str,
    ) -> Result<&'v SubnetInfo> {
        match vnet.subnet(name) {
            Some(subnet) => {
                tracing::info!(
                    "[SNET] Subnet '{}' found in virtual network '{}'{}",
                    name,
                    vnet.name,
                    subnet
                        .address_prefix
                        .as_deref()
                        .map(|p| format!(" ({})", p))
                        .unwrap_or_default()
                );
                Ok(subnet)
            }
            None => fail(missing(
                "SNET-002A",
                format!(
                    "Subnet '{}' not found in virtual network '{}'",
                    name, vnet.name
                ),
            )),
        }
    }

    /// Log the NSG attached to a subnet; never fails
    pub async fn inspect_subnet_nsg(&self, subnet: &SubnetInfo) {
        let Some(nsg_id) = subnet.network_security_group_id.as_deref() else {
            tracing::warn!(
                "[NSG] Subnet '{}' has no network security group attached",
                subnet.name
            );
            return;
        };

        match self.client.get_network_security_group(nsg_id).await {
            Ok(Some(nsg)) => tracing::info!(
                "[NSG] Network security group '{}' attached to subnet '{}' ({} rule(s))",
                nsg.name,
                subnet.name,
                nsg.rule_count
            ),
            Ok(None) => tracing::warn!(
                "[NSG-001A] Network security group {} referenced by subnet '{}' was not found",
                nsg_id,
                subnet.name
            ),
            Err(e) => tracing::warn!(
                "[NSG-001A] Failed to look up network security group of subnet '{}': {}",
                subnet.name,
                e
            ),
        }
    }

    pub async fn require_public_ip(&self, resource_group: &str, name: &str) -> Result<PublicIpInfo> {
        match self.client.get_public_ip(resource_group, name).await {
            Ok(Some(ip)) => {
                tracing::info!(
                    "[PIP] Public IP '{}' found ({})",
                    name,
                    ip.ip_address.as_deref().unwrap_or("address not yet allocated")
                );
                Ok(ip)
            }
            Ok(None) => fail(missing(
                "PIP-002A",
                format!(
                    "Public IP '{}' not found in resource group '{}'",
                    name, resource_group
                ),
            )),
            Err(e) => fail(lookup("PIP-001A", format!("public IP '{}'", name), e)),
        }
    }

    /// Existing gateway, if any; only a failed lookup is an error
    pub async fn find_gateway(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<GatewayInfo>> {
        match self.client.get_application_gateway(resource_group, name).await {
            Ok(Some(gateway)) => {
                tracing::info!(
                    "[AGW] Application gateway '{}' exists (state: {})",
                    name,
                    gateway.provisioning_state
                );
                Ok(Some(gateway))
            }
            Ok(None) => {
                tracing::info!(
                    "[AGW] Application gateway '{}' does not exist in resource group '{}'",
                    name,
                    resource_group
                );
                Ok(None)
            }
            Err(e) => fail(lookup("AGW-001A", format!("application gateway '{}'", name), e)),
        }
    }

    /// Session, resource group, network, subnet(s) and public IP, in that order
    pub async fn validate(&self, config: &DeploymentConfig) -> Result<Prerequisites> {
        let session = self.require_session().await?;

        let rg_name = &config.resource_group.name;
        let resource_group = self.require_resource_group(rg_name).await?;

        let vnet_config = &config.virtual_network;
        let virtual_network = self
            .require_virtual_network(rg_name, &vnet_config.name)
            .await?;
        let subnet = self
            .require_subnet(&virtual_network, &vnet_config.subnet_name)?
            .clone();
        self.inspect_subnet_nsg(&subnet).await;

        let frontend = &config.frontend_ip_configuration;
        let frontend_subnet = match frontend.subnet_name.as_deref() {
            Some(name) => Some(self.require_subnet(&virtual_network, name)?.clone()),
            None => None,
        };

        let public_ip = if frontend.wants_public_ip() {
            Some(self.require_public_ip(rg_name, &config.public_ip.name).await?)
        } else {
            tracing::info!(
                "[PIP] Frontend '{}' does not use a public IP; skipping check",
                frontend.name
            );
            None
        };

        Ok(Prerequisites {
            session,
            resource_group,
            virtual_network,
            subnet,
            public_ip,
            frontend_subnet,
        })
    }
}

fn missing(code: &'static str, message: String) -> DeployError {
    DeployError::PreconditionMissing { code, message }
}

fn lookup(code: &'static str, resource: String, source: appgw_cloud::CloudError) -> DeployError {
    DeployError::Lookup {
        code,
        resource,
        source,
    }
}

/// Log a failed check and return it as an error
fn fail<T>(err: DeployError) -> Result<T> {
    tracing::error!("{}", err);
    Err(err)
}
