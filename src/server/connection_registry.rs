use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;

use crate::metrics::ServerMetrics;
use crate::protocol::{ConnectionId, PlayerId, ServerMessage};

/// One live connection handle for a player.
#[derive(Debug, Clone)]
pub(crate) struct PlayerConnection {
    pub sender: mpsc::Sender<Arc<ServerMessage>>,
    pub last_ping: Instant,
}

/// Maps a player identity to the set of currently-live connections.
///
/// A player may hold several simultaneous connections (several devices
/// following the same game). Entries are created lazily on first register
/// and pruned per-handle when delivery fails or the handle closes. The map
/// holds no game state; it only routes events.
pub(crate) struct ConnectionRegistry {
    connections: DashMap<PlayerId, HashMap<ConnectionId, PlayerConnection>>,
    metrics: Arc<ServerMetrics>,
}

impl ConnectionRegistry {
    pub fn new(metrics: Arc<ServerMetrics>) -> Self {
        Self {
            connections: DashMap::new(),
            metrics,
        }
    }

    /// Add a handle to the player's set. Registering the same connection id
    /// twice replaces the handle without growing the set.
    pub fn register(
        &self,
        player_id: PlayerId,
        connection_id: ConnectionId,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) {
        let mut entry = self.connections.entry(player_id).or_default();
        let previous = entry.insert(
            connection_id,
            PlayerConnection {
                sender,
                last_ping: Instant::now(),
            },
        );
        if previous.is_none() {
            self.metrics.increment_connections();
        }
    }

    /// Remove a handle. Returns false if it was already gone. The player
    /// entry itself is dropped with its last handle.
    pub fn unregister(&self, player_id: &PlayerId, connection_id: &ConnectionId) -> bool {
        let removed = match self.connections.get_mut(player_id) {
            Some(mut entry) => entry.remove(connection_id).is_some(),
            None => false,
        };

        if removed {
            self.metrics.decrement_active_connections();
            self.connections
                .remove_if(player_id, |_, handles| handles.is_empty());
        }
        removed
    }

    /// Deliver an event to every live connection of the target player.
    ///
    /// The handle set is snapshotted first; a failure on one connection
    /// unregisters that handle and never blocks delivery to the others (or
    /// to other players). Returns the number of successful deliveries.
    pub fn notify(&self, player_id: &PlayerId, message: Arc<ServerMessage>) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<Arc<ServerMessage>>)> =
            match self.connections.get(player_id) {
                Some(entry) => entry
                    .iter()
                    .map(|(id, connection)| (*id, connection.sender.clone()))
                    .collect(),
                None => return 0,
            };

        let mut delivered = 0;
        for (connection_id, sender) in targets {
            match sender.try_send(Arc::clone(&message)) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(
                        %player_id,
                        %connection_id,
                        error = %err,
                        "Delivery failed, dropping connection handle"
                    );
                    self.metrics.increment_delivery_failures();
                    self.unregister(player_id, &connection_id);
                }
            }
        }
        delivered
    }

    /// Deliver an event to one specific connection of a player (used for
    /// the pong reply, which would be noise on the player's other devices).
    pub fn notify_connection(
        &self,
        player_id: &PlayerId,
        connection_id: &ConnectionId,
        message: Arc<ServerMessage>,
    ) -> bool {
        let sender = match self.connections.get(player_id) {
            Some(entry) => match entry.get(connection_id) {
                Some(connection) => connection.sender.clone(),
                None => return false,
            },
            None => return false,
        };

        match sender.try_send(message) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    %player_id,
                    %connection_id,
                    error = %err,
                    "Delivery failed, dropping connection handle"
                );
                self.metrics.increment_delivery_failures();
                self.unregister(player_id, connection_id);
                false
            }
        }
    }

    pub fn record_ping(&self, player_id: &PlayerId, connection_id: &ConnectionId) {
        if let Some(mut entry) = self.connections.get_mut(player_id) {
            if let Some(connection) = entry.get_mut(connection_id) {
                connection.last_ping = Instant::now();
            }
        }
    }

    /// Handles whose last ping is older than `ping_timeout`.
    pub fn collect_expired(&self, ping_timeout: Duration) -> Vec<(PlayerId, ConnectionId)> {
        let now = Instant::now();
        self.connections
            .iter()
            .flat_map(|entry| {
                let player_id = *entry.key();
                entry
                    .value()
                    .iter()
                    .filter(|(_, connection)| {
                        now.duration_since(connection.last_ping) > ping_timeout
                    })
                    .map(|(connection_id, _)| (player_id, *connection_id))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn connection_count(&self, player_id: &PlayerId) -> usize {
        self.connections
            .get(player_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}
