//! Service endpoint configuration

use serde::{Deserialize, Serialize};

/// Base URL of a sending service running on the local machine
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

pub const DEFAULT_PROTOCOL: &str = "ethereum";

pub const DEFAULT_NETWORK: &str = "mainnet";

/// Where the sending service lives and which chain to use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `http://127.0.0.1:8080/api`
    pub base_url: String,
    /// Protocol for name resolution and key lookup
    pub protocol: String,
    /// Default network
    pub network: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            network: DEFAULT_NETWORK.to_string(),
        }
    }
}

impl ApiConfig {
    /// Service on localhost at `port`
    pub fn local(port: u16) -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{}/api", port),
            ..Default::default()
        }
    }
}
