use super::{GameActionError, GameServer, ServiceError};
use crate::protocol::{PlayerId, ServerMessage};
use std::sync::Arc;

impl GameServer {
    /// Report a recovered contract violation back to the acting player's
    /// connections as a structured `server_error` event.
    pub fn send_server_error(&self, player_id: &PlayerId, error: &GameActionError) {
        self.notify_player(
            player_id,
            Arc::new(ServerMessage::ServerError {
                message: error.to_string(),
                error_code: error.error_code(),
            }),
        );
    }

    /// Report an unanticipated failure. The underlying error is logged in
    /// full; the client only sees an opaque message.
    pub fn send_unknown_error(&self, player_id: &PlayerId, error: &anyhow::Error) {
        tracing::error!(%player_id, error = %error, "Unanticipated failure while handling action");
        self.metrics.increment_internal_errors();
        self.notify_player(
            player_id,
            Arc::new(ServerMessage::UnknownError {
                message: error.to_string(),
            }),
        );
    }

    /// Route a service failure to the right outbound event.
    pub(super) fn report_failure(&self, player_id: &PlayerId, error: &ServiceError) {
        match error {
            ServiceError::Action(action) => self.send_server_error(player_id, action),
            ServiceError::Internal(internal) => self.send_unknown_error(player_id, internal),
        }
    }
}
