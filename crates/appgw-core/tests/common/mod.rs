use appgw_cloud::{
    BackendHealthSnapshot, BackendPoolHealth, BackendServerHealth, CloudError, CloudResourceClient,
    DiagnosticsSink, FrontendIpInfo, GatewayCreateRequest, GatewayInfo, NetworkSecurityGroupInfo,
    PublicIpInfo, ResourceGroupInfo, SessionInfo, SubnetInfo, VirtualNetworkInfo,
};
use appgw_config::DeploymentConfig;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const RESOURCE_GROUP: &str = "rg-web-nonprod";
pub const GATEWAY: &str = "agw-web";

/// One scripted answer to `get_application_gateway`
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum GatewayLookup {
    Missing,
    State(&'static str),
    Error,
}

/// Scripted in-memory cloud
///
/// Gateway lookups are answered from a queue; the last answer repeats once
/// the queue is down to one entry. Operations listed in `failing` return a
/// transport error instead of an answer.
pub struct FakeClient {
    pub session: Option<SessionInfo>,
    pub resource_groups: Vec<ResourceGroupInfo>,
    pub virtual_networks: Vec<VirtualNetworkInfo>,
    pub public_ips: Vec<PublicIpInfo>,
    pub network_security_groups: Vec<NetworkSecurityGroupInfo>,
    pub failing: Vec<&'static str>,
    pub backend_health: BackendHealthSnapshot,
    gateway_lookups: Mutex<VecDeque<GatewayLookup>>,
    calls: Mutex<Vec<&'static str>>,
    created: Mutex<Option<GatewayCreateRequest>>,
    diagnostics: Mutex<Option<DiagnosticsSink>>,
}

#[allow(dead_code)]
impl FakeClient {
    /// Every prerequisite of [`sample_config`] exists
    pub fn new() -> Self {
        Self {
            session: Some(SessionInfo::new("00000000-0000-0000-0000-000000000001")),
            resource_groups: vec![ResourceGroupInfo {
                id: format!("/subscriptions/s/resourceGroups/{}", RESOURCE_GROUP),
                name: RESOURCE_GROUP.to_string(),
                location: "westeurope".to_string(),
            }],
            virtual_networks: vec![VirtualNetworkInfo {
                id: "/vnets/vnet-web".to_string(),
                name: "vnet-web".to_string(),
                location: "westeurope".to_string(),
                address_prefixes: vec!["10.10.0.0/16".to_string()],
                subnets: vec![SubnetInfo {
                    id: "/vnets/vnet-web/subnets/snet-agw".to_string(),
                    name: "snet-agw".to_string(),
                    address_prefix: Some("10.10.1.0/24".to_string()),
                    network_security_group_id: None,
                }],
            }],
            public_ips: vec![PublicIpInfo {
                id: "/publicIPAddresses/pip-agw".to_string(),
                name: "pip-agw".to_string(),
                ip_address: Some("20.1.2.3".to_string()),
                sku: Some("Standard".to_string()),
            }],
            network_security_groups: Vec::new(),
            failing: Vec::new(),
            backend_health: BackendHealthSnapshot::default(),
            gateway_lookups: Mutex::new(VecDeque::from([GatewayLookup::Missing])),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(None),
            diagnostics: Mutex::new(None),
        }
    }

    pub fn with_gateway_lookups(self, lookups: impl IntoIterator<Item = GatewayLookup>) -> Self {
        *self.gateway_lookups.lock().unwrap() = lookups.into_iter().collect();
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn created_request(&self) -> Option<GatewayCreateRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn diagnostics_sink(&self) -> Option<DiagnosticsSink> {
        self.diagnostics.lock().unwrap().clone()
    }

    /// Attach an NSG to the gateway subnet
    pub fn with_subnet_nsg(mut self, nsg_id: &str) -> Self {
        for vnet in &mut self.virtual_networks {
            for subnet in &mut vnet.subnets {
                subnet.network_security_group_id = Some(nsg_id.to_string());
            }
        }
        self
    }

    /// Every operation recorded so far, in call order
    pub fn call_log(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }

    /// Record the call, failing it when scripted to
    fn answer(&self, operation: &'static str) -> appgw_cloud::Result<()> {
        self.record(operation);
        if self.failing.contains(&operation) {
            return Err(CloudError::ApiError(format!("{}: connection reset", operation)));
        }
        Ok(())
    }

    fn next_gateway_lookup(&self) -> GatewayLookup {
        let mut queue = self.gateway_lookups.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or(GatewayLookup::Missing)
        }
    }
}

pub fn gateway(state: &str) -> GatewayInfo {
    GatewayInfo {
        id: format!("/applicationGateways/{}", GATEWAY),
        name: GATEWAY.to_string(),
        resource_group: RESOURCE_GROUP.to_string(),
        location: "westeurope".to_string(),
        provisioning_state: state.to_string(),
        operational_state: Some("Running".to_string()),
        frontend_ip_configurations: vec![FrontendIpInfo {
            name: "appGatewayFrontendIP".to_string(),
            private_ip_address: None,
            public_ip_address_id: Some("/publicIPAddresses/pip-agw".to_string()),
        }],
    }
}

#[allow(dead_code)]
pub fn pool(name: &str, servers: &[(&str, &str)]) -> BackendPoolHealth {
    BackendPoolHealth {
        pool_name: name.to_string(),
        servers: servers
            .iter()
            .map(|(address, health)| BackendServerHealth {
                address: address.to_string(),
                health: health.to_string(),
                http_setting: Some("web-settings".to_string()),
            })
            .collect(),
    }
}

#[async_trait]
impl CloudResourceClient for FakeClient {
    fn name(&self) -> &str {
        "fake"
    }

    async fn current_session(&self) -> appgw_cloud::Result<Option<SessionInfo>> {
        self.record("current_session");
        Ok(self.session.clone())
    }

    async fn get_resource_group(
        &self,
        name: &str,
    ) -> appgw_cloud::Result<Option<ResourceGroupInfo>> {
        self.answer("get_resource_group")?;
        Ok(self.resource_groups.iter().find(|g| g.name == name).cloned())
    }

    async fn get_virtual_network(
        &self,
        _resource_group: &str,
        name: &str,
    ) -> appgw_cloud::Result<Option<VirtualNetworkInfo>> {
        self.answer("get_virtual_network")?;
        Ok(self.virtual_networks.iter().find(|v| v.name == name).cloned())
    }

    async fn get_public_ip(
        &self,
        _resource_group: &str,
        name: &str,
    ) -> appgw_cloud::Result<Option<PublicIpInfo>> {
        self.answer("get_public_ip")?;
        Ok(self.public_ips.iter().find(|p| p.name == name).cloned())
    }

    async fn get_application_gateway(
        &self,
        _resource_group: &str,
        _name: &str,
    ) -> appgw_cloud::Result<Option<GatewayInfo>> {
        self.record("get_application_gateway");
        match self.next_gateway_lookup() {
            GatewayLookup::Missing => Ok(None),
            GatewayLookup::State(state) => Ok(Some(gateway(state))),
            GatewayLookup::Error => Err(CloudError::ApiError("throttled".to_string())),
        }
    }

    async fn get_network_security_group(
        &self,
        id: &str,
    ) -> appgw_cloud::Result<Option<NetworkSecurityGroupInfo>> {
        self.answer("get_network_security_group")?;
        Ok(self
            .network_security_groups
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn create_application_gateway(
        &self,
        request: &GatewayCreateRequest,
    ) -> appgw_cloud::Result<GatewayInfo> {
        self.record("create_application_gateway");
        *self.created.lock().unwrap() = Some(request.clone());
        Ok(gateway("Updating"))
    }

    async fn get_backend_health(
        &self,
        _resource_group: &str,
        _name: &str,
    ) -> appgw_cloud::Result<BackendHealthSnapshot> {
        self.record("get_backend_health");
        Ok(self.backend_health.clone())
    }

    async fn enable_diagnostics(
        &self,
        _resource_id: &str,
        sink: &DiagnosticsSink,
    ) -> appgw_cloud::Result<()> {
        self.record("enable_diagnostics");
        *self.diagnostics.lock().unwrap() = Some(sink.clone());
        Ok(())
    }
}

/// Document matching the resources of [`FakeClient::new`]
pub fn sample_config() -> DeploymentConfig {
    config_from(serde_json::json!({}))
}

/// [`sample_config`] with top-level sections replaced
pub fn config_from(overrides: serde_json::Value) -> DeploymentConfig {
    let mut doc = serde_json::json!({
        "Environment": "nonprod",
        "ResourceGroup": { "Name": RESOURCE_GROUP, "Location": "westeurope" },
        "VirtualNetwork": {
            "Name": "vnet-web",
            "AddressPrefix": "10.10.0.0/16",
            "SubnetName": "snet-agw",
            "SubnetPrefix": "10.10.1.0/24"
        },
        "PublicIP": { "Name": "pip-agw" },
        "ApplicationGateway": {
            "Name": GATEWAY,
            "Sku": { "Name": "Standard_v2", "Tier": "Standard_v2", "Capacity": 2 }
        },
        "FrontendPort": { "Name": "port-80", "Port": 80 },
        "BackendAddressPools": [{
            "Name": "web-pool",
            "BackendAddresses": [{ "IpAddress": "10.10.2.4" }, { "IpAddress": "10.10.2.5" }]
        }],
        "BackendHttpSettings": [{ "Name": "web-settings", "Port": 80, "Protocol": "Http" }],
        "HttpListeners": [{ "Name": "web-listener", "FrontendPort": "port-80", "Protocol": "Http" }],
        "RequestRoutingRules": [{
            "Name": "web-rule",
            "HttpListener": "web-listener",
            "BackendAddressPool": "web-pool",
            "BackendHttpSettings": "web-settings"
        }],
        "Tags": { "environment": "nonprod" }
    });

    if let (Some(doc), Some(overrides)) = (doc.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides {
            doc.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(doc).unwrap()
}
