//! ARM request bodies for application gateways
//!
//! The gateway is created with a single `PUT` of the full resource. Name
//! references between sub-resources become child resource IDs under the
//! gateway's own ID.

use appgw_cloud::{
    BackendAddress, BuiltResourceSet, FrontendIpSource, GatewayCreateRequest, HealthProbe,
};
use serde_json::{Map, Value, json};

pub const API_VERSION: &str = "2023-09-01";
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

pub fn gateway_resource_id(subscription_id: &str, resource_group: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/applicationGateways/{}",
        subscription_id, resource_group, name
    )
}

pub fn gateway_url(gateway_id: &str) -> String {
    format!(
        "{}{}?api-version={}",
        MANAGEMENT_ENDPOINT, gateway_id, API_VERSION
    )
}

fn child_ref(gateway_id: &str, collection: &str, name: &str) -> Value {
    json!({ "id": format!("{}/{}/{}", gateway_id, collection, name) })
}

fn named(name: &str, properties: Value) -> Value {
    json!({ "name": name, "properties": properties })
}

/// Full ARM body for the create call
pub fn gateway_body(request: &GatewayCreateRequest, gateway_id: &str) -> Value {
    let resources = &request.resources;

    let mut properties = Map::new();
    properties.insert("sku".into(), sku(resources));
    if let Some(ref autoscale) = resources.autoscale {
        let mut config = Map::new();
        config.insert("minCapacity".into(), json!(autoscale.min_capacity));
        if let Some(max) = autoscale.max_capacity {
            config.insert("maxCapacity".into(), json!(max));
        }
        properties.insert("autoscaleConfiguration".into(), Value::Object(config));
    }
    properties.insert(
        "gatewayIPConfigurations".into(),
        json!([named(
            &request.gateway_ip_configuration.name,
            json!({ "subnet": { "id": request.gateway_ip_configuration.subnet_id } }),
        )]),
    );
    properties.insert(
        "frontendIPConfigurations".into(),
        json!([frontend_ip(resources)]),
    );
    properties.insert(
        "frontendPorts".into(),
        resources
            .frontend_ports
            .iter()
            .map(|p| named(&p.name, json!({ "port": p.port })))
            .collect(),
    );
    properties.insert(
        "backendAddressPools".into(),
        resources
            .backend_address_pools
            .iter()
            .map(|pool| {
                let addresses: Vec<Value> = pool
                    .addresses
                    .iter()
                    .map(|a| match a {
                        BackendAddress::IpAddress(ip) => json!({ "ipAddress": ip }),
                        BackendAddress::Fqdn(fqdn) => json!({ "fqdn": fqdn }),
                    })
                    .collect();
                named(&pool.name, json!({ "backendAddresses": addresses }))
            })
            .collect(),
    );
    properties.insert(
        "probes".into(),
        resources.health_probes.iter().map(probe).collect(),
    );
    properties.insert(
        "backendHttpSettingsCollection".into(),
        resources
            .backend_http_settings
            .iter()
            .map(|s| {
                let mut props = Map::new();
                props.insert("port".into(), json!(s.port));
                props.insert("protocol".into(), json!(s.protocol.to_string()));
                props.insert(
                    "cookieBasedAffinity".into(),
                    json!(s.cookie_based_affinity.to_string()),
                );
                props.insert("requestTimeout".into(), json!(s.request_timeout));
                props.insert(
                    "pickHostNameFromBackendAddress".into(),
                    json!(s.pick_host_name_from_backend_address),
                );
                if let Some(ref probe) = s.probe {
                    props.insert("probe".into(), child_ref(gateway_id, "probes", probe));
                }
                if let Some(ref host) = s.host_name {
                    props.insert("hostName".into(), json!(host));
                }
                named(&s.name, Value::Object(props))
            })
            .collect(),
    );
    properties.insert(
        "httpListeners".into(),
        resources
            .http_listeners
            .iter()
            .map(|l| {
                let mut props = Map::new();
                props.insert(
                    "frontendIPConfiguration".into(),
                    child_ref(
                        gateway_id,
                        "frontendIPConfigurations",
                        &l.frontend_ip_configuration,
                    ),
                );
                props.insert(
                    "frontendPort".into(),
                    child_ref(gateway_id, "frontendPorts", &l.frontend_port),
                );
                props.insert("protocol".into(), json!(l.protocol.to_string()));
                if let Some(ref host) = l.host_name {
                    props.insert("hostName".into(), json!(host));
                }
                named(&l.name, Value::Object(props))
            })
            .collect(),
    );
    properties.insert(
        "requestRoutingRules".into(),
        resources
            .request_routing_rules
            .iter()
            .map(|r| {
                named(
                    &r.name,
                    json!({
                        "ruleType": r.rule_type.to_string(),
                        "priority": r.priority,
                        "httpListener": child_ref(gateway_id, "httpListeners", &r.http_listener),
                        "backendAddressPool": child_ref(gateway_id, "backendAddressPools", &r.backend_address_pool),
                        "backendHttpSettings": child_ref(gateway_id, "backendHttpSettingsCollection", &r.backend_http_settings),
                    }),
                )
            })
            .collect(),
    );

    json!({
        "location": request.location,
        "tags": request.tags,
        "properties": Value::Object(properties),
    })
}

fn sku(resources: &BuiltResourceSet) -> Value {
    let mut sku = Map::new();
    sku.insert("name".into(), json!(resources.sku.name));
    sku.insert("tier".into(), json!(resources.sku.tier));
    if let Some(capacity) = resources.sku.capacity {
        sku.insert("capacity".into(), json!(capacity));
    }
    Value::Object(sku)
}

fn frontend_ip(resources: &BuiltResourceSet) -> Value {
    let frontend = &resources.frontend_ip_configuration;
    let properties = match &frontend.source {
        FrontendIpSource::PublicIp { id } => json!({ "publicIPAddress": { "id": id } }),
        FrontendIpSource::Subnet {
            id,
            private_ip_address,
        } => match private_ip_address {
            Some(address) => json!({
                "subnet": { "id": id },
                "privateIPAddress": address,
                "privateIPAllocationMethod": "Static",
            }),
            None => json!({
                "subnet": { "id": id },
                "privateIPAllocationMethod": "Dynamic",
            }),
        },
    };
    named(&frontend.name, properties)
}

fn probe(probe: &HealthProbe) -> Value {
    let mut props = Map::new();
    props.insert("protocol".into(), json!(probe.protocol.to_string()));
    props.insert("path".into(), json!(probe.path));
    props.insert("interval".into(), json!(probe.interval));
    props.insert("timeout".into(), json!(probe.timeout));
    props.insert("unhealthyThreshold".into(), json!(probe.unhealthy_threshold));
    props.insert("minServers".into(), json!(probe.min_servers));
    props.insert(
        "pickHostNameFromBackendHttpSettings".into(),
        json!(probe.pick_host_name_from_backend_http_settings),
    );
    if let Some(ref host) = probe.host {
        props.insert("host".into(), json!(host));
    }
    if let Some(ref condition) = probe.match_condition {
        let mut m = Map::new();
        m.insert("statusCodes".into(), json!(condition.status_codes));
        if let Some(ref body) = condition.body {
            m.insert("body".into(), json!(body));
        }
        props.insert("match".into(), Value::Object(m));
    }
    named(&probe.name, Value::Object(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appgw_cloud::{
        BackendAddressPool, BackendHttpSettings, CookieBasedAffinity, FrontendIpConfiguration,
        FrontendPort, GatewayIpConfiguration, HttpListener, ProbeMatch, Protocol,
        RequestRoutingRule, RuleType, Sku,
    };
    use std::collections::BTreeMap;

    fn request() -> GatewayCreateRequest {
        GatewayCreateRequest {
            name: "agw-web".to_string(),
            resource_group: "rg-web".to_string(),
            location: "westeurope".to_string(),
            gateway_ip_configuration: GatewayIpConfiguration {
                name: "agw-web-ipconfig".to_string(),
                subnet_id: "/subnets/snet-agw".to_string(),
            },
            resources: BuiltResourceSet {
                frontend_ip_configuration: FrontendIpConfiguration {
                    name: "fe".to_string(),
                    source: FrontendIpSource::PublicIp {
                        id: "/publicIPAddresses/pip-agw".to_string(),
                    },
                },
                frontend_ports: vec![FrontendPort {
                    name: "port-80".to_string(),
                    port: 80,
                }],
                backend_address_pools: vec![BackendAddressPool {
                    name: "web-pool".to_string(),
                    addresses: vec![
                        BackendAddress::IpAddress("10.10.2.4".to_string()),
                        BackendAddress::Fqdn("web.internal".to_string()),
                    ],
                }],
                health_probes: vec![HealthProbe {
                    name: "web-probe".to_string(),
                    protocol: Protocol::Http,
                    host: Some("127.0.0.1".to_string()),
                    path: "/healthz".to_string(),
                    interval: 30,
                    timeout: 30,
                    unhealthy_threshold: 3,
                    min_servers: 0,
                    pick_host_name_from_backend_http_settings: false,
                    match_condition: Some(ProbeMatch {
                        status_codes: vec!["200-399".to_string()],
                        body: None,
                    }),
                }],
                backend_http_settings: vec![BackendHttpSettings {
                    name: "web-settings".to_string(),
                    port: 8080,
                    protocol: Protocol::Http,
                    cookie_based_affinity: CookieBasedAffinity::Disabled,
                    request_timeout: 30,
                    probe: Some("web-probe".to_string()),
                    host_name: None,
                    pick_host_name_from_backend_address: false,
                }],
                http_listeners: vec![HttpListener {
                    name: "web-listener".to_string(),
                    frontend_ip_configuration: "fe".to_string(),
                    frontend_port: "port-80".to_string(),
                    protocol: Protocol::Http,
                    host_name: None,
                }],
                request_routing_rules: vec![RequestRoutingRule {
                    name: "web-rule".to_string(),
                    rule_type: RuleType::Basic,
                    http_listener: "web-listener".to_string(),
                    backend_address_pool: "web-pool".to_string(),
                    backend_http_settings: "web-settings".to_string(),
                    priority: 100,
                }],
                sku: Sku {
                    name: "Standard_v2".to_string(),
                    tier: "Standard_v2".to_string(),
                    capacity: None,
                },
                autoscale: Some(appgw_cloud::AutoscaleConfiguration {
                    min_capacity: 2,
                    max_capacity: Some(10),
                }),
            },
            tags: BTreeMap::from([("env".to_string(), "nonprod".to_string())]),
        }
    }

    #[test]
    fn test_gateway_url() {
        let id = gateway_resource_id("sub-1", "rg-web", "agw-web");
        assert_eq!(
            gateway_url(&id),
            "https://management.azure.com/subscriptions/sub-1/resourceGroups/rg-web/providers/Microsoft.Network/applicationGateways/agw-web?api-version=2023-09-01"
        );
    }

    #[test]
    fn test_references_become_child_ids() {
        let id = gateway_resource_id("sub-1", "rg-web", "agw-web");
        let body = gateway_body(&request(), &id);
        let props = &body["properties"];

        assert_eq!(
            props["requestRoutingRules"][0]["properties"]["httpListener"]["id"],
            format!("{}/httpListeners/web-listener", id)
        );
        assert_eq!(
            props["httpListeners"][0]["properties"]["frontendPort"]["id"],
            format!("{}/frontendPorts/port-80", id)
        );
        assert_eq!(
            props["backendHttpSettingsCollection"][0]["properties"]["probe"]["id"],
            format!("{}/probes/web-probe", id)
        );
    }

    #[test]
    fn test_sku_and_autoscale() {
        let id = gateway_resource_id("sub-1", "rg-web", "agw-web");
        let body = gateway_body(&request(), &id);
        let props = &body["properties"];

        assert!(props["sku"].get("capacity").is_none());
        assert_eq!(props["autoscaleConfiguration"]["minCapacity"], 2);
        assert_eq!(props["autoscaleConfiguration"]["maxCapacity"], 10);
        assert_eq!(body["tags"]["env"], "nonprod");
    }

    #[test]
    fn test_backend_addresses() {
        let id = gateway_resource_id("sub-1", "rg-web", "agw-web");
        let body = gateway_body(&request(), &id);
        let addresses = &body["properties"]["backendAddressPools"][0]["properties"]["backendAddresses"];

        assert_eq!(addresses[0]["ipAddress"], "10.10.2.4");
        assert_eq!(addresses[1]["fqdn"], "web.internal");
    }

    #[test]
    fn test_private_frontend() {
        let mut req = request();
        req.resources.frontend_ip_configuration.source = FrontendIpSource::Subnet {
            id: "/subnets/snet-agw".to_string(),
            private_ip_address: Some("10.10.1.10".to_string()),
        };
        let body = gateway_body(&req, "/gw");
        let fe = &body["properties"]["frontendIPConfigurations"][0]["properties"];

        assert_eq!(fe["privateIPAllocationMethod"], "Static");
        assert_eq!(fe["privateIPAddress"], "10.10.1.10");
        assert!(fe.get("publicIPAddress").is_none());
    }
}
