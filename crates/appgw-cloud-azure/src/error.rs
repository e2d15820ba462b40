//! Azure CLI client error types

use appgw_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found. Please install the Azure CLI: https://aka.ms/InstallAzureCli")]
    AzNotFound,

    #[error("Not logged in to Azure. Run 'az login' first")]
    NotLoggedIn,

    #[error("az command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected az output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::AzNotFound => CloudError::ToolNotFound("az".to_string()),
            AzureError::NotLoggedIn => {
                CloudError::AuthenticationFailed("not logged in to Azure".to_string())
            }
            AzureError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            AzureError::UnexpectedOutput(msg) => CloudError::InvalidResponse(msg),
            AzureError::JsonError(e) => CloudError::Json(e),
            AzureError::IoError(e) => CloudError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
