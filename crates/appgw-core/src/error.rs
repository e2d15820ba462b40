use appgw_cloud::CloudError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("[{code}] {message}")]
    Session { code: &'static str, message: String },

    #[error("[{code}] {message}")]
    PreconditionMissing { code: &'static str, message: String },

    #[error("[{code}] Failed to look up {resource}: {source}")]
    Lookup {
        code: &'static str,
        resource: String,
        #[source]
        source: CloudError,
    },

    #[error("{owner_kind} '{owner}' references {target_kind} '{target}', which is not defined")]
    ReferenceResolution {
        owner_kind: &'static str,
        owner: String,
        target_kind: &'static str,
        target: String,
    },

    #[error("Invalid configuration: {0}")]
    Shape(String),

    #[error("Application gateway '{name}' provisioning failed (state: {state})")]
    ProvisioningFailed { name: String, state: String },

    #[error(
        "Timed out after {}s waiting for application gateway '{name}' (last state: {last_state})",
        .waited.as_secs()
    )]
    ProvisioningTimeout {
        name: String,
        waited: Duration,
        last_state: String,
    },

    #[error("Cloud API error: {0}")]
    Cloud(#[from] CloudError),
}

impl DeployError {
    /// Stable `<STEP>-<NNN><SUFFIX>` code, for errors that carry one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DeployError::Session { code, .. }
            | DeployError::PreconditionMissing { code, .. }
            | DeployError::Lookup { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
