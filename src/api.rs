//! Synchronous request/response surface.
//!
//! Thin axum adapters over the same service methods the WebSocket router
//! uses; no game logic lives here. Turns taken over HTTP still fan out to
//! both players' live WebSocket views.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::metrics::MetricsSnapshot;
use crate::protocol::{
    Game, GameDetailsPayload, GameId, GuessOutcome, PlayerId, ServerMessage, Ship, ShipSpec,
};
use crate::server::{GameServer, ServiceError};

pub fn router() -> axum::Router<Arc<GameServer>> {
    axum::Router::new()
        .route("/v1/games", post(create_game))
        .route("/v1/ships", post(create_ship))
        .route("/v1/turns", post(take_turn))
        .route("/v1/players/{player_id}/games", get(list_player_games))
        .route("/v1/games/{game_id}/players/{player_id}", get(game_details))
        .route("/v1/metrics", get(metrics))
}

/// Service failures rendered as HTTP: recoverable contract violations map
/// to 4xx with a structured body, anything else is an opaque 500.
struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ServiceError::Action(action) => {
                let status = match action {
                    crate::server::GameActionError::NotFound { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_REQUEST,
                };
                let body = serde_json::json!({
                    "error": action.to_string(),
                    "error_code": action.error_code(),
                });
                (status, Json(body)).into_response()
            }
            ServiceError::Internal(err) => {
                tracing::error!(error = %err, "Unanticipated failure on HTTP surface");
                let body = serde_json::json!({
                    "error": "internal server error",
                    "error_code": crate::protocol::ErrorCode::InternalError,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateGameRequest {
    player_a_id: PlayerId,
    player_b_id: PlayerId,
    initial_player: PlayerId,
}

#[derive(Debug, Serialize)]
struct CreateGameResponse {
    game_id: GameId,
}

async fn create_game(
    State(server): State<Arc<GameServer>>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, ApiError> {
    let game = server
        .create_game(req.player_a_id, req.player_b_id, req.initial_player)
        .await?;
    Ok(Json(CreateGameResponse { game_id: game.id }))
}

#[derive(Debug, Deserialize)]
struct CreateShipRequest {
    game_id: GameId,
    player_id: PlayerId,
    ship: ShipSpec,
}

async fn create_ship(
    State(server): State<Arc<GameServer>>,
    Json(req): Json<CreateShipRequest>,
) -> Result<Json<Ship>, ApiError> {
    let ship = server
        .place_ship(req.game_id, req.player_id, req.ship)
        .await
        .inspect_err(|err| {
            if matches!(err, ServiceError::Action(_)) {
                server.metrics().increment_placement_rejections();
            }
        })?;
    Ok(Json(ship))
}

#[derive(Debug, Deserialize)]
struct TakeTurnRequest {
    game_id: GameId,
    offense_player_id: PlayerId,
    defense_player_id: PlayerId,
    x: i32,
    y: i32,
}

#[derive(Debug, Serialize)]
struct TakeTurnResponse {
    result: GuessOutcome,
    current_player_id: PlayerId,
}

async fn take_turn(
    State(server): State<Arc<GameServer>>,
    Json(req): Json<TakeTurnRequest>,
) -> Result<Json<TakeTurnResponse>, ApiError> {
    let report = server
        .take_turn(
            req.game_id,
            req.offense_player_id,
            req.defense_player_id,
            req.x,
            req.y,
        )
        .await
        .inspect_err(|err| {
            if matches!(err, ServiceError::Action(_)) {
                server.metrics().increment_turn_rejections();
            }
        })?;

    // Live views follow HTTP-initiated turns too.
    server.notify_player(
        &req.offense_player_id,
        Arc::new(ServerMessage::GuessResult(report)),
    );
    server.notify_player(
        &req.defense_player_id,
        Arc::new(ServerMessage::EnemyGuess(report)),
    );

    Ok(Json(TakeTurnResponse {
        result: report.result,
        current_player_id: report.current_player_id,
    }))
}

#[derive(Debug, Serialize)]
struct GameListResponse {
    games: Vec<Game>,
}

async fn list_player_games(
    State(server): State<Arc<GameServer>>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<GameListResponse>, ApiError> {
    let games = server.list_games(player_id).await?;
    Ok(Json(GameListResponse { games }))
}

async fn game_details(
    State(server): State<Arc<GameServer>>,
    Path((game_id, player_id)): Path<(GameId, PlayerId)>,
) -> Result<Json<GameDetailsPayload>, ApiError> {
    let details = server.fetch_details(game_id, player_id).await?;
    Ok(Json(details))
}

async fn metrics(State(server): State<Arc<GameServer>>) -> Json<MetricsSnapshot> {
    Json(server.metrics().snapshot())
}
