//! Assembly of gateway sub-resources from configuration
//!
//! Build order is fixed: frontend IP, ports, backend pools, probes, HTTP
//! settings, listeners, routing rules, then SKU and autoscale. Later stages
//! refer to earlier ones by name through a [`NameIndex`].

use crate::error::{DeployError, Result};
use appgw_cloud::{
    AutoscaleConfiguration, BackendAddress, BackendAddressPool, BackendHttpSettings,
    BuiltResourceSet, FrontendIpConfiguration, FrontendIpSource, FrontendPort, HealthProbe,
    HttpListener, Named, ProbeMatch, RequestRoutingRule, Sku,
};
use appgw_config::{
    ApplicationGatewayConfig, BackendAddressPoolConfig, BackendHttpSettingsConfig,
    DeploymentConfig, FrontendIpConfig, FrontendPortConfig, HealthProbeConfig,
    HttpListenerConfig, RequestRoutingRuleConfig,
};
use std::collections::HashMap;

/// Name lookup over one built section; the first entry with a name wins
pub struct NameIndex<'a, T> {
    entries: HashMap<&'a str, &'a T>,
}

impl<'a, T: Named> NameIndex<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        let mut entries = HashMap::with_capacity(items.len());
        for item in items {
            entries.entry(item.name()).or_insert(item);
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&'a T> {
        self.entries.get(name).copied()
    }
}

/// Resolved provider IDs the frontend may bind to
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontendTargets<'a> {
    pub public_ip_id: Option<&'a str>,
    pub subnet_id: Option<&'a str>,
}

/// Frontend IP configuration; exactly one of public IP or subnet
pub fn build_frontend_ip_configuration(
    config: &FrontendIpConfig,
    targets: FrontendTargets<'_>,
) -> Result<FrontendIpConfiguration> {
    let source = match (targets.public_ip_id, targets.subnet_id) {
        (Some(id), None) => {
            if config.private_ip_address.is_some() {
                tracing::warn!(
                    "Frontend '{}' uses a public IP; PrivateIPAddress is ignored",
                    config.name
                );
            }
            FrontendIpSource::PublicIp { id: id.to_string() }
        }
        (None, Some(id)) => FrontendIpSource::Subnet {
            id: id.to_string(),
            private_ip_address: config.private_ip_address.clone(),
        },
        (Some(_), Some(_)) => {
            return Err(DeployError::Shape(format!(
                "Frontend IP configuration '{}' specifies both a public IP and a subnet; \
                 set UsePublicIP to false or remove SubnetName",
                config.name
            )));
        }
        (None, None) => {
            return Err(DeployError::Shape(format!(
                "Frontend IP configuration '{}' specifies neither a public IP nor a subnet",
                config.name
            )));
        }
    };

    Ok(FrontendIpConfiguration {
        name: config.name.clone(),
        source,
    })
}

pub fn build_frontend_ports(ports: &[FrontendPortConfig]) -> Vec<FrontendPort> {
    ports
        .iter()
        .map(|p| FrontendPort {
            name: p.name.clone(),
            port: p.port,
        })
        .collect()
}

/// Entries carrying neither an IP address nor an FQDN are dropped with a warning
pub fn build_backend_address_pools(pools: &[BackendAddressPoolConfig]) -> Vec<BackendAddressPool> {
    pools
        .iter()
        .map(|pool| {
            let addresses = pool
                .backend_addresses
                .iter()
                .filter_map(|entry| {
                    let address = match (&entry.ip_address, &entry.fqdn) {
                        (Some(ip), _) => Some(BackendAddress::IpAddress(ip.clone())),
                        (None, Some(fqdn)) => Some(BackendAddress::Fqdn(fqdn.clone())),
                        (None, None) => None,
                    };
                    if address.is_none() {
                        tracing::warn!(
                            "Backend pool '{}': skipping address entry without IpAddress or Fqdn",
                            pool.name
                        );
                    }
                    address
                })
                .collect();

            BackendAddressPool {
                name: pool.name.clone(),
                addresses,
            }
        })
        .collect()
}

pub fn build_health_probes(probes: &[HealthProbeConfig]) -> Vec<HealthProbe> {
    probes
        .iter()
        .map(|p| HealthProbe {
            name: p.name.clone(),
            protocol: p.protocol,
            host: p.host.clone(),
            path: p.path.clone(),
            interval: p.interval,
            timeout: p.timeout,
            unhealthy_threshold: p.unhealthy_threshold,
            min_servers: p.min_servers,
            pick_host_name_from_backend_http_settings: p.pick_host_name_from_backend_http_settings,
            match_condition: p.r#match.as_ref().and_then(|m| {
                m.status_codes.as_ref().map(|codes| ProbeMatch {
                    status_codes: codes.clone(),
                    body: m.body.clone(),
                })
            }),
        })
        .collect()
}

/// An unknown probe name is a warning; the setting is built without a probe
pub fn build_backend_http_settings(
    settings: &[BackendHttpSettingsConfig],
    probes: &NameIndex<'_, HealthProbe>,
) -> Vec<BackendHttpSettings> {
    settings
        .iter()
        .map(|s| {
            let probe = s.probe_configuration.as_ref().and_then(|reference| {
                let found = probes.get(&reference.probe_name);
                if found.is_none() {
                    tracing::warn!(
                        "HTTP settings '{}' references probe '{}', which is not defined; continuing without a probe",
                        s.name,
                        reference.probe_name
                    );
                }
                found.map(|p| p.name.clone())
            });

            BackendHttpSettings {
                name: s.name.clone(),
                port: s.port,
                protocol: s.protocol,
                cookie_based_affinity: s.cookie_based_affinity,
                request_timeout: s.request_timeout,
                probe,
                host_name: s.host_name.clone(),
                pick_host_name_from_backend_address: s.pick_host_name_from_backend_address,
            }
        })
        .collect()
}

pub fn build_http_listeners(
    listeners: &[HttpListenerConfig],
    frontend_ip: &FrontendIpConfiguration,
    ports: &NameIndex<'_, FrontendPort>,
) -> Result<Vec<HttpListener>> {
    listeners
        .iter()
        .map(|l| {
            let port = resolve(ports, &l.frontend_port, "HTTP listener", &l.name, "frontend port")?;
            Ok(HttpListener {
                name: l.name.clone(),
                frontend_ip_configuration: frontend_ip.name.clone(),
                frontend_port: port.name.clone(),
                protocol: l.protocol,
                host_name: l.host_name.clone(),
            })
        })
        .collect()
}

/// Section indexes routing rules resolve against
pub struct RuleTargets<'a> {
    pub listeners: NameIndex<'a, HttpListener>,
    pub pools: NameIndex<'a, BackendAddressPool>,
    pub settings: NameIndex<'a, BackendHttpSettings>,
}

/// Rules without an explicit priority get `100 + 10 * index`
pub fn build_request_routing_rules(
    rules: &[RequestRoutingRuleConfig],
    targets: &RuleTargets<'_>,
) -> Result<Vec<RequestRoutingRule>> {
    rules
        .iter()
        .enumerate()
        .map(|(index, r)| {
            let listener = resolve(
                &targets.listeners,
                &r.http_listener,
                "Routing rule",
                &r.name,
                "HTTP listener",
            )?;
            let pool = resolve(
                &targets.pools,
                &r.backend_address_pool,
                "Routing rule",
                &r.name,
                "backend address pool",
            )?;
            let settings = resolve(
                &targets.settings,
                &r.backend_http_settings,
                "Routing rule",
                &r.name,
                "backend HTTP settings",
            )?;

            Ok(RequestRoutingRule {
                name: r.name.clone(),
                rule_type: r.rule_type,
                http_listener: listener.name.clone(),
                backend_address_pool: pool.name.clone(),
                backend_http_settings: settings.name.clone(),
                priority: r.priority.unwrap_or(100 + 10 * index as u32),
            })
        })
        .collect()
}

/// Capacity is left out when autoscale is configured
pub fn build_sku(gateway: &ApplicationGatewayConfig) -> Sku {
    Sku {
        name: gateway.sku.name.clone(),
        tier: gateway.sku.tier.clone(),
        capacity: if gateway.autoscale_configuration.is_some() {
            None
        } else {
            gateway.sku.capacity
        },
    }
}

pub fn build_autoscale(gateway: &ApplicationGatewayConfig) -> Option<AutoscaleConfiguration> {
    gateway
        .autoscale_configuration
        .as_ref()
        .map(|a| AutoscaleConfiguration {
            min_capacity: a.min_capacity,
            max_capacity: a.max_capacity,
        })
}

/// Run every stage in order
pub fn build_resource_set(
    config: &DeploymentConfig,
    targets: FrontendTargets<'_>,
) -> Result<BuiltResourceSet> {
    let frontend_ip_configuration =
        build_frontend_ip_configuration(&config.frontend_ip_configuration, targets)?;

    let frontend_ports = build_frontend_ports(&config.frontend_ports);
    let backend_address_pools = build_backend_address_pools(&config.backend_address_pools);
    let health_probes = build_health_probes(&config.health_probes);
    let backend_http_settings = build_backend_http_settings(
        &config.backend_http_settings,
        &NameIndex::new(&health_probes),
    );
    let http_listeners = build_http_listeners(
        &config.http_listeners,
        &frontend_ip_configuration,
        &NameIndex::new(&frontend_ports),
    )?;
    let request_routing_rules = build_request_routing_rules(
        &config.request_routing_rules,
        &RuleTargets {
            listeners: NameIndex::new(&http_listeners),
            pools: NameIndex::new(&backend_address_pools),
            settings: NameIndex::new(&backend_http_settings),
        },
    )?;

    let gateway = &config.application_gateway;
    let set = BuiltResourceSet {
        frontend_ip_configuration,
        frontend_ports,
        backend_address_pools,
        health_probes,
        backend_http_settings,
        http_listeners,
        request_routing_rules,
        sku: build_sku(gateway),
        autoscale: build_autoscale(gateway),
    };

    tracing::debug!(
        "Built {} port(s), {} pool(s), {} probe(s), {} setting(s), {} listener(s), {} rule(s)",
        set.frontend_ports.len(),
        set.backend_address_pools.len(),
        set.health_probes.len(),
        set.backend_http_settings.len(),
        set.http_listeners.len(),
        set.request_routing_rules.len()
    );

    Ok(set)
}

fn resolve<'a, T: Named>(
    index: &NameIndex<'a, T>,
    target: &str,
    owner_kind: &'static str,
    owner: &str,
    target_kind: &'static str,
) -> Result<&'a T> {
    index
        .get(target)
        .ok_or_else(|| DeployError::ReferenceResolution {
            owner_kind,
            owner: owner.to_string(),
            target_kind,
            target: target.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use appgw_cloud::Protocol;
    use serde_json::json;

    fn config(overrides: serde_json::Value) -> DeploymentConfig {
        let mut doc = json!({
            "Environment": "nonprod",
            "ResourceGroup": { "Name": "rg-web", "Location": "westeurope" },
            "VirtualNetwork": { "Name": "vnet-web", "SubnetName": "snet-agw" },
            "PublicIP": { "Name": "pip-agw" },
            "ApplicationGateway": {
                "Name": "agw-web",
                "Sku": { "Name": "Standard_v2", "Tier": "Standard_v2", "Capacity": 2 }
            },
            "FrontendPort": [{ "Name": "port-80", "Port": 80 }],
            "BackendAddressPools": [{
                "Name": "web-pool",
                "BackendAddresses": [{ "IpAddress": "10.10.2.4" }, { "Fqdn": "web.internal" }]
            }],
            "HealthProbes": [{
                "Name": "web-probe", "Protocol": "Http", "Host": "127.0.0.1", "Path": "/health",
                "Interval": 30, "Timeout": 30, "UnhealthyThreshold": 3
            }],
            "BackendHttpSettings": [{
                "Name": "web-settings", "Port": 80, "Protocol": "Http",
                "ProbeConfiguration": { "ProbeName": "web-probe" }
            }],
            "HttpListeners": [{ "Name": "web-listener", "FrontendPort": "port-80", "Protocol": "Http" }],
            "RequestRoutingRules": [{
                "Name": "web-rule",
                "HttpListener": "web-listener",
                "BackendAddressPool": "web-pool",
                "BackendHttpSettings": "web-settings"
            }]
        });
        if let (Some(doc), Some(overrides)) = (doc.as_object_mut(), overrides.as_object()) {
            for (key, value) in overrides {
                doc.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(doc).unwrap()
    }

    const PUBLIC: FrontendTargets<'static> = FrontendTargets {
        public_ip_id: Some("/publicIPAddresses/pip-agw"),
        subnet_id: None,
    };

    #[test]
    fn test_build_resource_set() {
        let set = build_resource_set(&config(json!({})), PUBLIC).unwrap();

        assert_eq!(set.frontend_ports[0].port, 80);
        assert_eq!(set.backend_address_pools[0].addresses.len(), 2);
        assert_eq!(set.backend_http_settings[0].probe.as_deref(), Some("web-probe"));
        assert_eq!(set.http_listeners[0].frontend_ip_configuration, "appGatewayFrontendIP");
        assert_eq!(set.request_routing_rules[0].priority, 100);
        assert_eq!(set.sku.capacity, Some(2));
        assert!(set.autoscale.is_none());
    }

    #[test]
    fn test_frontend_requires_exactly_one_target() {
        let frontend = FrontendIpConfig::default();

        let both = FrontendTargets {
            public_ip_id: Some("/pip"),
            subnet_id: Some("/subnet"),
        };
        assert!(matches!(
            build_frontend_ip_configuration(&frontend, both),
            Err(DeployError::Shape(_))
        ));
        assert!(matches!(
            build_frontend_ip_configuration(&frontend, FrontendTargets::default()),
            Err(DeployError::Shape(_))
        ));

        let private = build_frontend_ip_configuration(
            &frontend,
            FrontendTargets {
                public_ip_id: None,
                subnet_id: Some("/subnet"),
            },
        )
        .unwrap();
        assert!(matches!(private.source, FrontendIpSource::Subnet { .. }));
        assert!(build_frontend_ip_configuration(&frontend, PUBLIC).is_ok());
    }

    #[test]
    fn test_frontend_port_shapes_build_identically() {
        let single = config(json!({ "FrontendPort": { "Name": "port-80", "Port": 80 } }));
        let list = config(json!({ "FrontendPort": [{ "Name": "port-80", "Port": 80 }] }));

        assert_eq!(
            build_frontend_ports(&single.frontend_ports),
            build_frontend_ports(&list.frontend_ports)
        );
    }

    #[test]
    fn test_address_entry_without_ip_or_fqdn_is_dropped() {
        let cfg = config(json!({
            "BackendAddressPools": [{
                "Name": "web-pool",
                "BackendAddresses": [{ "IpAddress": "10.10.2.4" }, {}, { "Fqdn": "web.internal" }]
            }]
        }));

        let pools = build_backend_address_pools(&cfg.backend_address_pools);
        assert_eq!(
            pools[0].addresses,
            vec![
                BackendAddress::IpAddress("10.10.2.4".to_string()),
                BackendAddress::Fqdn("web.internal".to_string()),
            ]
        );
    }

    #[test]
    fn test_probe_match_requires_status_codes() {
        let cfg = config(json!({
            "HealthProbes": [
                {
                    "Name": "with-match", "Protocol": "Https", "Path": "/", "Interval": 30,
                    "Timeout": 30, "UnhealthyThreshold": 3,
                    "Match": { "StatusCodes": ["200-399"] }
                },
                {
                    "Name": "body-only", "Protocol": "Http", "Path": "/", "Interval": 30,
                    "Timeout": 30, "UnhealthyThreshold": 3,
                    "Match": { "Body": "ok" }
                }
            ]
        }));

        let probes = build_health_probes(&cfg.health_probes);
        assert_eq!(probes[0].protocol, Protocol::Https);
        assert_eq!(
            probes[0].match_condition.as_ref().map(|m| m.status_codes.clone()),
            Some(vec!["200-399".to_string()])
        );
        assert!(probes[1].match_condition.is_none());
    }

    #[test]
    fn test_unknown_probe_is_soft_failure() {
        let cfg = config(json!({
            "BackendHttpSettings": [{
                "Name": "web-settings", "Port": 80, "Protocol": "Http",
                "ProbeConfiguration": { "ProbeName": "nope" }
            }]
        }));

        let set = build_resource_set(&cfg, PUBLIC).unwrap();
        assert_eq!(set.backend_http_settings[0].probe, None);
    }

    #[test]
    fn test_listener_with_unknown_port() {
        let cfg = config(json!({
            "HttpListeners": [{ "Name": "web-listener", "FrontendPort": "port-443", "Protocol": "Https" }]
        }));

        match build_resource_set(&cfg, PUBLIC) {
            Err(DeployError::ReferenceResolution { owner, target, .. }) => {
                assert_eq!(owner, "web-listener");
                assert_eq!(target, "port-443");
            }
            other => panic!("Expected ReferenceResolution, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_with_unknown_references() {
        for (field, target) in [
            ("HttpListener", "ghost-listener"),
            ("BackendAddressPool", "ghost-pool"),
            ("BackendHttpSettings", "ghost-settings"),
        ] {
            let mut rule = json!({
                "Name": "web-rule",
                "HttpListener": "web-listener",
                "BackendAddressPool": "web-pool",
                "BackendHttpSettings": "web-settings"
            });
            rule[field] = json!(target);
            let cfg = config(json!({ "RequestRoutingRules": [rule] }));

            let err = build_resource_set(&cfg, PUBLIC).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("web-rule"), "{}", message);
            assert!(message.contains(target), "{}", message);
        }
    }

    #[test]
    fn test_rule_priorities() {
        let cfg = config(json!({
            "RequestRoutingRules": [
                { "Name": "a", "HttpListener": "web-listener", "BackendAddressPool": "web-pool", "BackendHttpSettings": "web-settings" },
                { "Name": "b", "HttpListener": "web-listener", "BackendAddressPool": "web-pool", "BackendHttpSettings": "web-settings", "Priority": 5 },
                { "Name": "c", "HttpListener": "web-listener", "BackendAddressPool": "web-pool", "BackendHttpSettings": "web-settings" }
            ]
        }));

        let set = build_resource_set(&cfg, PUBLIC).unwrap();
        let priorities: Vec<_> = set.request_routing_rules.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![100, 5, 120]);
    }

    #[test]
    fn test_name_index_first_match_wins() {
        let ports = vec![
            FrontendPort { name: "web".to_string(), port: 80 },
            FrontendPort { name: "web".to_string(), port: 8080 },
        ];
        let index = NameIndex::new(&ports);
        assert_eq!(index.get("web").map(|p| p.port), Some(80));
        assert!(index.get("other").is_none());
    }

    #[test]
    fn test_autoscale_replaces_fixed_capacity() {
        let cfg = config(json!({
            "ApplicationGateway": {
                "Name": "agw-web",
                "Sku": { "Name": "WAF_v2", "Tier": "WAF_v2", "Capacity": 2 },
                "AutoscaleConfiguration": { "MinCapacity": 1, "MaxCapacity": 4 }
            }
        }));

        let set = build_resource_set(&cfg, PUBLIC).unwrap();
        assert_eq!(set.sku.capacity, None);
        assert_eq!(
            set.autoscale,
            Some(AutoscaleConfiguration { min_capacity: 1, max_capacity: Some(4) })
        );
    }
}
