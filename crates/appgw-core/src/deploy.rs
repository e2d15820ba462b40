//! Deployment orchestration
//!
//! session → prerequisites → existing gateway? → build → create →
//! diagnostics → wait for provisioning.

use crate::builder::{self, FrontendTargets};
use crate::error::Result;
use crate::poll::{self, PollPolicy};
use crate::validation::{Prerequisites, Validator};
use appgw_cloud::{
    CloudResourceClient, DiagnosticsSink, GatewayCreateRequest, GatewayInfo,
    GatewayIpConfiguration,
};
use appgw_config::DeploymentConfig;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentResult {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub provisioning_state: String,
    /// `false` when the gateway already existed and nothing was submitted
    pub created: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl DeploymentResult {
    fn from_gateway(gateway: GatewayInfo, created: bool, elapsed: Duration) -> Self {
        Self {
            name: gateway.name,
            resource_group: gateway.resource_group,
            location: gateway.location,
            provisioning_state: gateway.provisioning_state,
            created,
            elapsed,
        }
    }
}

/// What a deployment would do
#[derive(Debug, Clone)]
pub enum DeploymentPlan {
    /// The gateway exists; a deployment returns it unchanged
    AlreadyExists(GatewayInfo),
    Create {
        request: Box<GatewayCreateRequest>,
        diagnostics: Option<DiagnosticsSink>,
    },
}

pub struct Deployer<'a, C: ?Sized> {
    client: &'a C,
    policy: PollPolicy,
}

impl<'a, C> Deployer<'a, C>
where
    C: CloudResourceClient + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate and build without submitting anything
    pub async fn plan(&self, config: &DeploymentConfig) -> Result<DeploymentPlan> {
        let validator = Validator::new(self.client);
        let prerequisites = validator.validate(config).await?;

        let gateway = &config.application_gateway;
        if let Some(existing) = validator
            .find_gateway(&config.resource_group.name, &gateway.name)
            .await?
        {
            return Ok(DeploymentPlan::AlreadyExists(existing));
        }

        let request = create_request(config, &prerequisites)?;
        let diagnostics = diagnostics_sink(config);

        Ok(DeploymentPlan::Create {
            request: Box::new(request),
            diagnostics,
        })
    }

    pub async fn deploy(&self, config: &DeploymentConfig) -> Result<DeploymentResult> {
        let start = Instant::now();
        let gateway_name = &config.application_gateway.name;
        let resource_group = &config.resource_group.name;

        let (request, diagnostics) = match self.plan(config).await? {
            DeploymentPlan::AlreadyExists(existing) => {
                tracing::info!(
                    "Application gateway '{}' already exists; nothing to deploy",
                    gateway_name
                );
                return Ok(DeploymentResult::from_gateway(
                    existing,
                    false,
                    start.elapsed(),
                ));
            }
            DeploymentPlan::Create {
                request,
                diagnostics,
            } => (request, diagnostics),
        };

        tracing::info!(
            "Creating application gateway '{}' in {} ({} listener(s), {} rule(s))",
            gateway_name,
            request.location,
            request.resources.http_listeners.len(),
            request.resources.request_routing_rules.len()
        );
        let submitted = self.client.create_application_gateway(&request).await?;
        tracing::info!(
            "Create request accepted (state: {})",
            submitted.provisioning_state
        );

        if let Some(sink) = diagnostics {
            tracing::info!(
                "Enabling diagnostics '{}' to event hub '{}'",
                sink.name,
                sink.event_hub_name
            );
            self.client.enable_diagnostics(&submitted.id, &sink).await?;
        } else {
            tracing::debug!("Diagnostics not configured");
        }

        let gateway =
            poll::wait_for_provisioning(self.client, resource_group, gateway_name, &self.policy)
                .await?;

        let elapsed = start.elapsed();
        tracing::info!(
            "Deployment of '{}' finished in {}m {}s",
            gateway_name,
            elapsed.as_secs() / 60,
            elapsed.as_secs() % 60
        );

        Ok(DeploymentResult::from_gateway(gateway, true, elapsed))
    }
}

fn create_request(
    config: &DeploymentConfig,
    prerequisites: &Prerequisites,
) -> Result<GatewayCreateRequest> {
    let targets = FrontendTargets {
        public_ip_id: prerequisites.public_ip.as_ref().map(|ip| ip.id.as_str()),
        subnet_id: prerequisites
            .frontend_subnet
            .as_ref()
            .map(|subnet| subnet.id.as_str()),
    };
    let resources = builder::build_resource_set(config, targets)?;

    let name = config.application_gateway.name.clone();
    Ok(GatewayCreateRequest {
        gateway_ip_configuration: GatewayIpConfiguration {
            name: format!("{}-ipconfig", name),
            subnet_id: prerequisites.subnet.id.clone(),
        },
        name,
        resource_group: config.resource_group.name.clone(),
        location: config.resource_group.location.clone(),
        resources,
        tags: config.tags.clone(),
    })
}

/// Event hub sink, when diagnostics name a non-empty hub
fn diagnostics_sink(config: &DeploymentConfig) -> Option<DiagnosticsSink> {
    let diagnostics = config.diagnostics.as_ref()?;
    let event_hub = diagnostics.event_hub()?;

    Some(DiagnosticsSink {
        name: diagnostics
            .name
            .clone()
            .unwrap_or_else(|| format!("{}-diagnostics", config.application_gateway.name)),
        event_hub_name: event_hub.to_string(),
        authorization_rule_id: diagnostics.event_hub_authorization_rule_id.clone(),
    })
}
