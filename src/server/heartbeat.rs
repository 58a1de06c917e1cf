use crate::protocol::{ConnectionId, PlayerId, ServerMessage};
use std::sync::Arc;

use super::GameServer;

impl GameServer {
    /// Handle a heartbeat ping from one connection.
    ///
    /// Refreshes that handle's liveness timestamp and answers with a pong
    /// on the same connection only; the player's other devices are not
    /// interested in it.
    pub fn handle_ping(&self, player_id: &PlayerId, connection_id: &ConnectionId) {
        self.registry.record_ping(player_id, connection_id);
        self.registry
            .notify_connection(player_id, connection_id, Arc::new(ServerMessage::Pong));
    }
}
