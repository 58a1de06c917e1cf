use crate::locking::GameLocks;
use crate::metrics::ServerMetrics;
use crate::protocol::{ConnectionId, ErrorCode, PlayerId, ServerMessage, ShipId};
use crate::store::{create_store, GameStore, StoreConfig};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Duration;
use uuid::Uuid;

mod connection_registry;
mod game_service;
mod heartbeat;
mod message_router;
mod messaging;

use connection_registry::ConnectionRegistry;

/// A recovered, caller-facing contract violation.
///
/// Every variant maps to a stable [`ErrorCode`] and is reported back to the
/// originating connection as a structured failure event; none of them tear
/// down the connection or leave partial state behind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameActionError {
    #[error("cell ({x}, {y}) is outside of board")]
    OutOfBounds { x: i32, y: i32 },
    #[error("placement overlaps ship {ship_id} at ({x}, {y})")]
    Overlap { ship_id: ShipId, x: i32, y: i32 },
    #[error("game is over")]
    GameOver,
    #[error("not player's turn")]
    NotYourTurn,
    #[error("{what} not found")]
    NotFound { what: &'static str },
}

impl GameActionError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::OutOfBounds { .. } => ErrorCode::OutOfBounds,
            Self::Overlap { .. } => ErrorCode::Overlap,
            Self::GameOver => ErrorCode::GameOver,
            Self::NotYourTurn => ErrorCode::NotYourTurn,
            Self::NotFound { .. } => ErrorCode::NotFound,
        }
    }
}

/// Failure of a game service call: either a recovered contract violation or
/// an unanticipated internal failure (store unavailable, malformed state).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Action(#[from] GameActionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Runtime server configuration, mapped from the loaded [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ping_timeout: Duration,
    pub sweep_interval: Duration,
    pub max_message_size: usize,
    pub queue_capacity: usize,
    pub connect_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ping_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(60),
            max_message_size: 16384,
            queue_capacity: 64,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self {
            ping_timeout: Duration::from_secs(cfg.server.ping_timeout),
            sweep_interval: Duration::from_secs(cfg.server.sweep_interval),
            max_message_size: cfg.server.max_message_size,
            queue_capacity: cfg.websocket.queue_capacity,
            connect_timeout: Duration::from_secs(cfg.websocket.connect_timeout_secs),
        }
    }
}

/// Central game server: owns the store, the connection registry, the
/// per-game locks, and the metrics. Transport layers (WebSocket, HTTP)
/// hold an `Arc<GameServer>` and call into the service methods.
pub struct GameServer {
    /// Game/ship/guess storage; authoritative at the moment of each
    /// serialized operation, never cached by the engine
    store: Arc<dyn GameStore>,
    /// Player identity to live connection handles
    registry: ConnectionRegistry,
    /// Per-game mutual exclusion for mutating operations
    game_locks: GameLocks,
    /// Server configuration
    config: ServerConfig,
    /// Server metrics
    pub(crate) metrics: Arc<ServerMetrics>,
    /// Instance identifier
    instance_id: Uuid,
}

impl GameServer {
    pub async fn new(config: ServerConfig, store_config: StoreConfig) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn GameStore> = Arc::from(create_store(&store_config));
        store.initialize().await?;

        let metrics = Arc::new(ServerMetrics::new());
        let registry = ConnectionRegistry::new(metrics.clone());

        Ok(Arc::new(Self {
            store,
            registry,
            game_locks: GameLocks::new(),
            config,
            metrics,
            instance_id: Uuid::new_v4(),
        }))
    }

    /// Bind a live connection handle to a player identity. Idempotent.
    pub fn register_connection(
        &self,
        player_id: PlayerId,
        connection_id: ConnectionId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) {
        self.registry.register(player_id, connection_id, sender);
        tracing::info!(
            %player_id,
            %connection_id,
            instance_id = %self.instance_id,
            "Connection registered"
        );
    }

    /// Drop one connection handle. The player's other connections are
    /// unaffected; no-op if the handle is already gone.
    pub fn unregister_connection(&self, player_id: &PlayerId, connection_id: &ConnectionId) {
        if self.registry.unregister(player_id, connection_id) {
            tracing::info!(%player_id, %connection_id, "Connection unregistered");
        }
    }

    /// Deliver one event to every live connection of the target player.
    /// Returns how many connections accepted it.
    pub fn notify_player(&self, player_id: &PlayerId, message: Arc<ServerMessage>) -> usize {
        self.registry.notify(player_id, message)
    }

    /// Number of live connections currently bound to the player.
    pub fn connection_count(&self, player_id: &PlayerId) -> usize {
        self.registry.connection_count(player_id)
    }

    /// Periodic maintenance: prune connections whose last ping is older
    /// than the configured timeout. Runs until the process exits.
    pub async fn cleanup_task(&self) {
        let mut interval = tokio::time::interval(self.config.sweep_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.prune_stale_connections();
        }
    }

    pub(crate) fn prune_stale_connections(&self) {
        let expired = self.registry.collect_expired(self.config.ping_timeout);
        for (player_id, connection_id) in expired {
            tracing::info!(%player_id, %connection_id, "Pruning stale connection");
            self.metrics.increment_stale_connections_pruned();
            self.registry.unregister(&player_id, &connection_id);
        }
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn store(&self) -> &dyn GameStore {
        self.store.as_ref()
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}
