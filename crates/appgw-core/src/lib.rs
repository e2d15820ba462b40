//! Application gateway provisioning core
//!
//! ```text
//! DeploymentConfig
//!       │
//!       ▼
//! Validator ──► builder::build_resource_set ──► create ──► poll
//!                                                           │
//!                                                           ▼
//!                                                   DeploymentResult
//!
//! DeploymentConfig ──► StatusReporter ──► Option<StatusReport>
//! ```
//!
//! Every component receives the [`CloudResourceClient`](appgw_cloud::CloudResourceClient)
//! it talks to; nothing here exits the process.

pub mod builder;
pub mod deploy;
pub mod error;
pub mod poll;
pub mod status;
pub mod validation;

pub use builder::{FrontendTargets, NameIndex, build_resource_set};
pub use deploy::{Deployer, DeploymentPlan, DeploymentResult};
pub use error::{DeployError, Result};
pub use poll::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollPolicy, wait_for_provisioning};
pub use status::{PoolHealthSummary, StatusReport, StatusReporter};
pub use validation::{Prerequisites, Validator};
