//! Read-only gateway status

use crate::error::Result;
use crate::validation::Validator;
use appgw_cloud::{BackendServerHealth, CloudResourceClient, GatewayInfo};
use appgw_config::DeploymentConfig;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub provisioning_state: String,
    pub operational_state: Option<String>,
    pub frontend_ip_address: Option<String>,
    pub backend_health: Vec<PoolHealthSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolHealthSummary {
    pub pool_name: String,
    pub healthy_servers: usize,
    pub unhealthy_servers: usize,
    pub servers: Vec<BackendServerHealth>,
}

impl StatusReport {
    pub fn total_unhealthy(&self) -> usize {
        self.backend_health.iter().map(|p| p.unhealthy_servers).sum()
    }
}

pub struct StatusReporter<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C> StatusReporter<'a, C>
where
    C: CloudResourceClient + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// `None` when the gateway does not exist
    pub async fn get_status(&self, config: &DeploymentConfig) -> Result<Option<StatusReport>> {
        let validator = Validator::new(self.client);
        validator.require_session().await?;

        let resource_group = &config.resource_group.name;
        let Some(gateway) = validator
            .find_gateway(resource_group, &config.application_gateway.name)
            .await?
        else {
            return Ok(None);
        };

        let frontend_ip_address = self.frontend_address(config, &gateway).await;

        let snapshot = self
            .client
            .get_backend_health(resource_group, &gateway.name)
            .await?;
        let backend_health = snapshot
            .pools
            .into_iter()
            .map(|pool| PoolHealthSummary {
                healthy_servers: pool.healthy_count(),
                unhealthy_servers: pool.unhealthy_count(),
                pool_name: pool.pool_name,
                servers: pool.servers,
            })
            .collect();

        Ok(Some(StatusReport {
            name: gateway.name,
            resource_group: gateway.resource_group,
            location: gateway.location,
            provisioning_state: gateway.provisioning_state,
            operational_state: gateway.operational_state,
            frontend_ip_address,
            backend_health,
        }))
    }

    /// Public address when the frontend binds the public IP, else the private one
    async fn frontend_address(
        &self,
        config: &DeploymentConfig,
        gateway: &GatewayInfo,
    ) -> Option<String> {
        let uses_public_ip = gateway
            .frontend_ip_configurations
            .iter()
            .any(|f| f.public_ip_address_id.is_some());
        if !uses_public_ip {
            return gateway.private_ip_address().map(str::to_string);
        }

        match self
            .client
            .get_public_ip(&config.resource_group.name, &config.public_ip.name)
            .await
        {
            Ok(ip) => ip.and_then(|ip| ip.ip_address),
            Err(e) => {
                tracing::warn!(
                    "Failed to look up public IP '{}': {}",
                    config.public_ip.name,
                    e
                );
                None
            }
        }
    }
}
