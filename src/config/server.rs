//! Server behavior configuration types.

use super::defaults::{
    default_cors_origins, default_max_message_size, default_ping_timeout, default_sweep_interval,
};
use serde::{Deserialize, Serialize};

/// Server configuration for connection and session management.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Timeout for client ping responses (seconds). Connections silent for
    /// longer than this are pruned by the maintenance sweep.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
    /// Interval for the stale-connection sweep task (seconds)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
    /// Maximum inbound WebSocket frame size (bytes)
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Comma-separated list of allowed CORS origins, or "*"
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ping_timeout: default_ping_timeout(),
            sweep_interval: default_sweep_interval(),
            max_message_size: default_max_message_size(),
            cors_origins: default_cors_origins(),
        }
    }
}
