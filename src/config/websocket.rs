//! WebSocket configuration types.

use super::defaults::{default_connect_timeout_secs, default_queue_capacity};
use serde::{Deserialize, Serialize};

/// WebSocket configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebSocketConfig {
    /// Outbound message queue depth per connection. Delivery to a full
    /// queue counts as a delivery failure, so this bounds how far a slow
    /// client can fall behind before it is pruned.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Time allowed for a client to send its connect handshake (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl WebSocketConfig {
    /// Validate WebSocket configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.queue_capacity == 0 {
            anyhow::bail!("websocket.queue_capacity must be at least 1");
        }
        if self.connect_timeout_secs < 1 {
            anyhow::bail!(
                "websocket.connect_timeout_secs must be at least 1 second (configured: {})",
                self.connect_timeout_secs
            );
        }
        if self.connect_timeout_secs > 300 {
            anyhow::bail!(
                "websocket.connect_timeout_secs must not exceed 300 seconds (configured: {})",
                self.connect_timeout_secs
            );
        }
        Ok(())
    }
}
