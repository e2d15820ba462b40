//! Azure implementation of [`CloudResourceClient`]

use crate::arm;
use crate::az::{
    AzAccount, AzApplicationGateway, AzBackendHealth, AzCli, AzNetworkSecurityGroup, AzPublicIp,
    AzResourceGroup, AzVirtualNetwork,
};
use crate::error::AzureError;
use appgw_cloud::{
    BackendHealthSnapshot, BackendPoolHealth, BackendServerHealth, CloudResourceClient,
    DiagnosticsSink, FrontendIpInfo, GatewayCreateRequest, GatewayInfo, NetworkSecurityGroupInfo,
    PublicIpInfo, ResourceGroupInfo, SessionInfo, SubnetInfo, VirtualNetworkInfo,
};
use async_trait::async_trait;

/// Azure client driving the `az` CLI
pub struct AzureCliClient {
    az: AzCli,
}

impl AzureCliClient {
    pub fn new() -> Self {
        Self { az: AzCli::new() }
    }

    pub fn with_subscription(subscription: impl Into<String>) -> Self {
        Self {
            az: AzCli::with_subscription(subscription),
        }
    }

    /// Installed az version; fails with [`AzureError::AzNotFound`] when missing
    pub async fn cli_version(&self) -> crate::Result<String> {
        self.az.version().await
    }
}

impl Default for AzureCliClient {
    fn default() -> Self {
        Self::new()
    }
}

impl From<AzAccount> for SessionInfo {
    fn from(account: AzAccount) -> Self {
        Self {
            subscription_id: account.id,
            subscription_name: account.name,
            account: account.user.map(|u| u.name),
        }
    }
}

impl From<AzResourceGroup> for ResourceGroupInfo {
    fn from(group: AzResourceGroup) -> Self {
        Self {
            id: group.id,
            name: group.name,
            location: group.location,
        }
    }
}

impl From<AzVirtualNetwork> for VirtualNetworkInfo {
    fn from(vnet: AzVirtualNetwork) -> Self {
        Self {
            id: vnet.id,
            name: vnet.name,
            location: vnet.location,
            address_prefixes: vnet
                .address_space
                .map(|s| s.address_prefixes)
                .unwrap_or_default(),
            subnets: vnet
                .subnets
                .into_iter()
                .map(|s| SubnetInfo {
                    id: s.id,
                    name: s.name,
                    address_prefix: s.address_prefix,
                    network_security_group_id: s.network_security_group.map(|n| n.id),
                })
                .collect(),
        }
    }
}

impl From<AzPublicIp> for PublicIpInfo {
    fn from(ip: AzPublicIp) -> Self {
        Self {
            id: ip.id,
            name: ip.name,
            ip_address: ip.ip_address,
            sku: ip.sku.map(|s| s.name),
        }
    }
}

impl From<AzNetworkSecurityGroup> for NetworkSecurityGroupInfo {
    fn from(nsg: AzNetworkSecurityGroup) -> Self {
        Self {
            id: nsg.id,
            name: nsg.name,
            rule_count: nsg.security_rules.len(),
        }
    }
}

fn gateway_info(gateway: AzApplicationGateway, resource_group: &str) -> GatewayInfo {
    GatewayInfo {
        id: gateway.id,
        name: gateway.name,
        resource_group: gateway
            .resource_group
            .unwrap_or_else(|| resource_group.to_string()),
        location: gateway.location,
        provisioning_state: gateway.provisioning_state.unwrap_or_default(),
        operational_state: gateway.operational_state,
        frontend_ip_configurations: gateway
            .frontend_ip_configurations
            .into_iter()
            .map(|f| FrontendIpInfo {
                name: f.name,
                private_ip_address: f.private_ip_address,
                public_ip_address_id: f.public_ip_address.map(|p| p.id),
            })
            .collect(),
    }
}

impl From<AzBackendHealth> for BackendHealthSnapshot {
    fn from(health: AzBackendHealth) -> Self {
        let pools = health
            .backend_address_pools
            .into_iter()
            .map(|pool| {
                let pool_name = pool.backend_address_pool.name().to_string();
                let servers = pool
                    .backend_http_settings_collection
                    .into_iter()
                    .flat_map(|settings| {
                        let setting_name = settings
                            .backend_http_settings
                            .as_ref()
                            .map(|s| s.name().to_string());
                        settings
                            .servers
                            .into_iter()
                            .map(move |server| BackendServerHealth {
                                address: server.address,
                                health: server.health,
                                http_setting: setting_name.clone(),
                            })
                    })
                    .collect();
                BackendPoolHealth { pool_name, servers }
            })
            .collect();

        Self { pools }
    }
}

/// Gateway descriptor from an ARM `PUT` response
fn gateway_from_arm(
    response: &serde_json::Value,
    request: &GatewayCreateRequest,
    gateway_id: &str,
) -> GatewayInfo {
    let properties = &response["properties"];
    let text = |v: &serde_json::Value| v.as_str().map(str::to_string);

    GatewayInfo {
        id: text(&response["id"]).unwrap_or_else(|| gateway_id.to_string()),
        name: text(&response["name"]).unwrap_or_else(|| request.name.clone()),
        resource_group: request.resource_group.clone(),
        location: text(&response["location"]).unwrap_or_else(|| request.location.clone()),
        provisioning_state: text(&properties["provisioningState"]).unwrap_or_default(),
        operational_state: text(&properties["operationalState"]),
        frontend_ip_configurations: Vec::new(),
    }
}

#[async_trait]
impl CloudResourceClient for AzureCliClient {
    fn name(&self) -> &str {
        "azure"
    }

    async fn current_session(&self) -> appgw_cloud::Result<Option<SessionInfo>> {
        Ok(self.az.account_show().await?.map(SessionInfo::from))
    }

    async fn get_resource_group(
        &self,
        name: &str,
    ) -> appgw_cloud::Result<Option<ResourceGroupInfo>> {
        Ok(self.az.group_show(name).await?.map(ResourceGroupInfo::from))
    }

    async fn get_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
    ) -> appgw_cloud::Result<Option<VirtualNetworkInfo>> {
        Ok(self
            .az
            .vnet_show(resource_group, name)
            .await?
            .map(VirtualNetworkInfo::from))
    }

    async fn get_public_ip(
        &self,
        resource_group: &str,
        name: &str,
    ) -> appgw_cloud::Result<Option<PublicIpInfo>> {
        Ok(self
            .az
            .public_ip_show(resource_group, name)
            .await?
            .map(PublicIpInfo::from))
    }

    async fn get_application_gateway(
        &self,
        resource_group: &str,
        name: &str,
    ) -> appgw_cloud::Result<Option<GatewayInfo>> {
        Ok(self
            .az
            .gateway_show(resource_group, name)
            .await?
            .map(|g| gateway_info(g, resource_group)))
    }

    async fn get_network_security_group(
        &self,
        id: &str,
    ) -> appgw_cloud::Result<Option<NetworkSecurityGroupInfo>> {
        Ok(self
            .az
            .nsg_show_by_id(id)
            .await?
            .map(NetworkSecurityGroupInfo::from))
    }

    async fn create_application_gateway(
        &self,
        request: &GatewayCreateRequest,
    ) -> appgw_cloud::Result<GatewayInfo> {
        let account = self
            .az
            .account_show()
            .await?
            .ok_or(AzureError::NotLoggedIn)?;

        let gateway_id =
            arm::gateway_resource_id(&account.id, &request.resource_group, &request.name);
        let body = arm::gateway_body(request, &gateway_id);

        tracing::info!("Submitting application gateway {}", gateway_id);
        let response = self.az.rest_put(&arm::gateway_url(&gateway_id), &body).await?;

        Ok(gateway_from_arm(&response, request, &gateway_id))
    }

    async fn get_backend_health(
        &self,
        resource_group: &str,
        name: &str,
    ) -> appgw_cloud::Result<BackendHealthSnapshot> {
        Ok(self
            .az
            .gateway_backend_health(resource_group, name)
            .await?
            .into())
    }

    async fn enable_diagnostics(
        &self,
        resource_id: &str,
        sink: &DiagnosticsSink,
    ) -> appgw_cloud::Result<()> {
        self.az
            .diagnostic_settings_create(
                &sink.name,
                resource_id,
                &sink.event_hub_name,
                sink.authorization_rule_id.as_deref(),
            )
            .await?;
        Ok(())
    }
}
