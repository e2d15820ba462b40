//! Azure client for appgw
//!
//! This crate implements the `CloudResourceClient` trait on top of the Azure
//! CLI, so appgw reuses whatever login `az` already holds.
//!
//! # Requirements
//!
//! - `az` CLI must be installed
//! - An active session (`az login`); appgw never performs authentication itself
//!
//! # Example
//!
//! ```ignore
//! use appgw_cloud::CloudResourceClient;
//! use appgw_cloud_azure::AzureCliClient;
//!
//! let client = AzureCliClient::new();
//!
//! let session = client.current_session().await?;
//! if session.is_none() {
//!     panic!("Run `az login` first");
//! }
//!
//! let gateway = client.get_application_gateway("rg-web", "agw-web").await?;
//! ```

pub mod arm;
pub mod az;
pub mod client;
pub mod error;

pub use az::AzCli;
pub use client::AzureCliClient;
pub use error::{AzureError, Result};
