use crate::protocol::{ClientMessage, ConnectionId, NewShipPayload, PlayerId, ServerMessage};
use std::sync::Arc;

use super::{GameServer, ServiceError};

impl GameServer {
    /// Handle an inbound action from a connection already bound to
    /// `player_id`. Each arm runs the matching service call and fans the
    /// outcome out to the affected players' live connections.
    pub async fn handle_client_message(
        &self,
        player_id: &PlayerId,
        connection_id: &ConnectionId,
        message: ClientMessage,
    ) {
        match message {
            ClientMessage::Connect { player_id: requested } => {
                tracing::warn!(
                    %player_id,
                    %requested,
                    "Received connect on an already-bound connection; ignoring"
                );
            }
            ClientMessage::PlaceShip {
                player_id: placing_player,
                game_id,
                ship,
            } => {
                self.handle_place_ship(placing_player, game_id, ship).await;
            }
            ClientMessage::TakeTurn {
                game_id,
                offense_player_id,
                defense_player_id,
                x,
                y,
            } => {
                self.handle_take_turn(game_id, offense_player_id, defense_player_id, x, y)
                    .await;
            }
            ClientMessage::FetchDetails {
                game_id,
                player_id: requesting_player,
            } => {
                self.handle_fetch_details(game_id, requesting_player).await;
            }
            ClientMessage::FetchGames {
                player_id: requesting_player,
            } => {
                self.handle_fetch_games(requesting_player).await;
            }
            ClientMessage::Ping => {
                self.handle_ping(player_id, connection_id);
            }
        }
    }

    /// Placement outcome goes to the placing player only, success or
    /// failure, as a `new_ship` event.
    pub async fn handle_place_ship(
        &self,
        player_id: PlayerId,
        game_id: crate::protocol::GameId,
        ship: crate::protocol::ShipSpec,
    ) {
        let payload = match self.place_ship(game_id, player_id, ship).await {
            Ok(placed) => NewShipPayload::placed(placed),
            Err(ServiceError::Action(action)) => {
                self.metrics.increment_placement_rejections();
                tracing::info!(%game_id, %player_id, error = %action, "Placement rejected");
                NewShipPayload::rejected(action.to_string(), action.error_code())
            }
            Err(ServiceError::Internal(internal)) => {
                self.send_unknown_error(&player_id, &internal);
                return;
            }
        };
        self.notify_player(&player_id, Arc::new(ServerMessage::NewShip(payload)));
    }

    /// A resolved turn notifies both sides: `guess_result` to the offense
    /// player, the mirror `enemy_guess` to the defender. Failures go to the
    /// offense player only and mutate nothing.
    pub async fn handle_take_turn(
        &self,
        game_id: crate::protocol::GameId,
        offense_player_id: PlayerId,
        defense_player_id: PlayerId,
        x: i32,
        y: i32,
    ) {
        match self
            .take_turn(game_id, offense_player_id, defense_player_id, x, y)
            .await
        {
            Ok(report) => {
                self.notify_player(
                    &offense_player_id,
                    Arc::new(ServerMessage::GuessResult(report)),
                );
                self.notify_player(
                    &defense_player_id,
                    Arc::new(ServerMessage::EnemyGuess(report)),
                );
            }
            Err(err) => {
                if matches!(err, ServiceError::Action(_)) {
                    self.metrics.increment_turn_rejections();
                    tracing::info!(
                        %game_id,
                        %offense_player_id,
                        error = %err,
                        "Turn rejected"
                    );
                }
                self.report_failure(&offense_player_id, &err);
            }
        }
    }

    pub async fn handle_fetch_details(
        &self,
        game_id: crate::protocol::GameId,
        player_id: PlayerId,
    ) {
        match self.fetch_details(game_id, player_id).await {
            Ok(details) => {
                self.notify_player(
                    &player_id,
                    Arc::new(ServerMessage::GameDetails(Box::new(details))),
                );
            }
            Err(err) => self.report_failure(&player_id, &err),
        }
    }

    pub async fn handle_fetch_games(&self, player_id: PlayerId) {
        match self.list_games(player_id).await {
            Ok(games) => {
                self.notify_player(&player_id, Arc::new(ServerMessage::GameList { games }));
            }
            Err(err) => self.report_failure(&player_id, &err),
        }
    }
}
