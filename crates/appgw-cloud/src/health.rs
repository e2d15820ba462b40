//! Backend health snapshot

use serde::{Deserialize, Serialize};

/// Backend health of every pool of a gateway at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealthSnapshot {
    pub pools: Vec<BackendPoolHealth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendPoolHealth {
    pub pool_name: String,
    pub servers: Vec<BackendServerHealth>,
}

impl BackendPoolHealth {
    pub fn healthy_count(&self) -> usize {
        self.servers.iter().filter(|s| s.is_healthy()).count()
    }

    /// Everything that is not `Healthy`, including `Degraded` and `Unknown`
    pub fn unhealthy_count(&self) -> usize {
        self.servers.len() - self.healthy_count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendServerHealth {
    pub address: String,

    /// Raw health string ("Healthy", "Unhealthy", "Degraded", "Unknown", ...)
    pub health: String,

    /// Name of the backend HTTP setting the server was probed through
    pub http_setting: Option<String>,
}

impl BackendServerHealth {
    pub fn is_healthy(&self) -> bool {
        self.health.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(address: &str, health: &str) -> BackendServerHealth {
        BackendServerHealth {
            address: address.to_string(),
            health: health.to_string(),
            http_setting: Some("web-settings".to_string()),
        }
    }

    #[test]
    fn test_binary_classification() {
        let pool = BackendPoolHealth {
            pool_name: "web".to_string(),
            servers: vec![
                server("10.0.2.4", "Healthy"),
                server("10.0.2.5", "Healthy"),
                server("10.0.2.6", "Degraded"),
                server("10.0.2.7", "Unknown"),
            ],
        };

        assert_eq!(pool.healthy_count(), 2);
        assert_eq!(pool.unhealthy_count(), 2);
    }
}
