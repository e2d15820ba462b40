//! Cloud control-plane client trait

use crate::error::Result;
use crate::gateway::{DiagnosticsSink, GatewayCreateRequest};
use crate::health::BackendHealthSnapshot;
use crate::resources::{
    GatewayInfo, NetworkSecurityGroupInfo, PublicIpInfo, ResourceGroupInfo, SessionInfo,
    VirtualNetworkInfo,
};
use async_trait::async_trait;

/// Control-plane operations appgw needs from a cloud provider
///
/// Lookups return `Ok(None)` when the resource does not exist and reserve
/// `Err` for transport or authentication failures.
#[async_trait]
pub trait CloudResourceClient: Send + Sync {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &str;

    /// Active authenticated context, or `None` when nobody is signed in
    async fn current_session(&self) -> Result<Option<SessionInfo>>;

    async fn get_resource_group(&self, name: &str) -> Result<Option<ResourceGroupInfo>>;

    /// Virtual network including its subnet collection
    async fn get_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<VirtualNetworkInfo>>;

    async fn get_public_ip(&self, resource_group: &str, name: &str)
    -> Result<Option<PublicIpInfo>>;

    async fn get_application_gateway(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<GatewayInfo>>;

    /// NSG by resource ID, as referenced from a subnet
    async fn get_network_security_group(
        &self,
        id: &str,
    ) -> Result<Option<NetworkSecurityGroupInfo>>;

    /// Submit the gateway; the returned descriptor may still be provisioning
    async fn create_application_gateway(&self, request: &GatewayCreateRequest)
    -> Result<GatewayInfo>;

    async fn get_backend_health(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<BackendHealthSnapshot>;

    async fn enable_diagnostics(&self, resource_id: &str, sink: &DiagnosticsSink) -> Result<()>;
}
