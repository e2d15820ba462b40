//! Cloud client error types

use thiserror::Error;

/// Errors raised by a [`CloudResourceClient`](crate::CloudResourceClient).
///
/// "Not found" is never an error at this layer; lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Tool not installed: {0}")]
    ToolNotFound(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
