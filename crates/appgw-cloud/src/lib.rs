//! appgw Cloud Abstraction
//!
//! This crate defines the boundary between appgw and the cloud control plane.
//! Everything appgw needs from the provider goes through the
//! [`CloudResourceClient`] trait, which keeps the deployment pipeline testable
//! against a fake client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    appgw CLI                     │
//! │            (deploy / status / check)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                  appgw-core                      │
//! │   validation → builder → deploy → poll          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                  appgw-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait CloudResourceClient          │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Descriptors │  │ Provisioning │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │   azure (az)  │
//!           │    client     │
//!           └───────────────┘
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod health;
pub mod resources;
pub mod state;

// Re-exports
pub use client::CloudResourceClient;
pub use error::{CloudError, Result};
pub use gateway::{
    AutoscaleConfiguration, BackendAddress, BackendAddressPool, BackendHttpSettings,
    BuiltResourceSet, CookieBasedAffinity, DiagnosticsSink, FrontendIpConfiguration,
    FrontendIpSource, FrontendPort, GatewayCreateRequest, GatewayIpConfiguration, HealthProbe,
    HttpListener, Named, ProbeMatch, Protocol, RequestRoutingRule, RuleType, Sku,
};
pub use health::{BackendHealthSnapshot, BackendPoolHealth, BackendServerHealth};
pub use resources::{
    FrontendIpInfo, GatewayInfo, NetworkSecurityGroupInfo, PublicIpInfo, ResourceGroupInfo,
    SessionInfo, SubnetInfo, VirtualNetworkInfo,
};
pub use state::ProvisioningState;
