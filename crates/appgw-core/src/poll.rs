//! Provisioning wait loop
//!
//! The only retrying component: queries the gateway at a fixed interval until
//! it reaches a terminal state or the deadline passes.

use crate::error::{DeployError, Result};
use appgw_cloud::{CloudResourceClient, GatewayInfo, ProvisioningState};
use std::time::Duration;
use tokio::time::{Instant, sleep};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Wait until the gateway reports `Succeeded`
///
/// A failed status query or a gateway that is not visible yet counts as
/// pending. `Failed`/`Canceled` ends the wait immediately.
pub async fn wait_for_provisioning<C>(
    client: &C,
    resource_group: &str,
    name: &str,
    policy: &PollPolicy,
) -> Result<GatewayInfo>
where
    C: CloudResourceClient + ?Sized,
{
    let start = Instant::now();
    let mut last_state = String::from("unknown");

    loop {
        match client.get_application_gateway(resource_group, name).await {
            Ok(Some(gateway)) => match gateway.state() {
                ProvisioningState::Succeeded => {
                    tracing::info!(
                        "Application gateway '{}' provisioned in {}s",
                        name,
                        start.elapsed().as_secs()
                    );
                    return Ok(gateway);
                }
                ProvisioningState::Failed => {
                    tracing::error!(
                        "Application gateway '{}' provisioning ended in state {}",
                        name,
                        gateway.provisioning_state
                    );
                    return Err(DeployError::ProvisioningFailed {
                        name: name.to_string(),
                        state: gateway.provisioning_state,
                    });
                }
                ProvisioningState::Pending => {
                    tracing::info!(
                        "Waiting for application gateway '{}' (state: {}, {}s elapsed)",
                        name,
                        gateway.provisioning_state,
                        start.elapsed().as_secs()
                    );
                    last_state = gateway.provisioning_state;
                }
            },
            Ok(None) => {
                tracing::warn!("Application gateway '{}' is not visible yet", name);
            }
            Err(e) => {
                tracing::warn!("Status query for application gateway '{}' failed: {}", name, e);
            }
        }

        if start.elapsed() >= policy.timeout {
            return Err(DeployError::ProvisioningTimeout {
                name: name.to_string(),
                waited: policy.timeout,
                last_state,
            });
        }

        sleep(policy.interval).await;
    }
}
