//! Root configuration types.

use super::defaults::default_port;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::websocket::WebSocketConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for Broadside.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            server: ServerConfig::default(),
            websocket: WebSocketConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validate cross-cutting constraints before startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.websocket.validate()?;
        if self.server.ping_timeout == 0 {
            anyhow::bail!("server.ping_timeout must be at least 1 second");
        }
        if self.server.sweep_interval == 0 {
            anyhow::bail!("server.sweep_interval must be at least 1 second");
        }
        if self.server.max_message_size < 256 {
            anyhow::bail!(
                "server.max_message_size must be at least 256 bytes (configured: {})",
                self.server.max_message_size
            );
        }
        Ok(())
    }
}
