//! Provisioning state of a cloud resource

use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the control plane, collapsed to what the
/// provisioning poller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    /// Anything still in flight ("Updating", "Creating", "Deleting", ...)
    Pending,
    Succeeded,
    /// "Failed" or "Canceled"
    Failed,
}

impl ProvisioningState {
    /// Map a reported state string. Comparison is case-insensitive.
    pub fn from_reported(state: &str) -> Self {
        if state.eq_ignore_ascii_case("succeeded") {
            Self::Succeeded
        } else if state.eq_ignore_ascii_case("failed") || state.eq_ignore_ascii_case("canceled") {
            Self::Failed
        } else {
            Self::Pending
        }
    }
}

impl std::fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisioningState::Pending => write!(f, "pending"),
            ProvisioningState::Succeeded => write!(f, "succeeded"),
            ProvisioningState::Failed => write!(f, "failed"),
        }
    }
}
