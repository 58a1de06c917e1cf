use serde::{Deserialize, Serialize};

use super::error_codes::ErrorCode;
use super::types::{Game, GameId, Guess, GuessOutcome, PlayerId, Ship, ShipSpec};

/// Message types sent from client to server.
///
/// A closed tagged union matched exhaustively by the router; unknown tags
/// fail deserialization instead of being silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to a player identity (MUST be first message).
    /// All outbound events for that player reach every connection bound
    /// to it, so a player can follow one game from several devices.
    Connect { player_id: PlayerId },
    /// Place a ship on the player's own board
    PlaceShip {
        player_id: PlayerId,
        game_id: GameId,
        ship: ShipSpec,
    },
    /// Fire a guess at the defending player's fleet
    TakeTurn {
        game_id: GameId,
        offense_player_id: PlayerId,
        defense_player_id: PlayerId,
        x: i32,
        y: i32,
    },
    /// Fetch the player's full view of one game
    FetchDetails {
        game_id: GameId,
        player_id: PlayerId,
    },
    /// Fetch every game the player participates in
    FetchGames { player_id: PlayerId },
    /// Heartbeat to maintain connection
    Ping,
}

/// Whether the acknowledged action succeeded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionResult {
    Success,
    Failure,
}

/// Payload shared by the `guess_result` and `enemy_guess` events; the
/// offense and defense players see the same shot from opposite sides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessReport {
    pub result: GuessOutcome,
    pub x: i32,
    pub y: i32,
    /// Whose turn it is after this shot. Unchanged on victory.
    pub current_player_id: PlayerId,
}

/// Placement outcome delivered to the placing player only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewShipPayload {
    pub result: ActionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship: Option<Ship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl NewShipPayload {
    pub fn placed(ship: Ship) -> Self {
        Self {
            result: ActionResult::Success,
            ship: Some(ship),
            message: None,
            error_code: None,
        }
    }

    pub fn rejected(message: String, error_code: ErrorCode) -> Self {
        Self {
            result: ActionResult::Failure,
            ship: None,
            message: Some(message),
            error_code: Some(error_code),
        }
    }
}

/// One cell of a ship together with whether an enemy shot has landed on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShipCellReport {
    pub x: i32,
    pub y: i32,
    pub hit: bool,
}

/// A player's own ship enriched with per-cell hit flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipDetail {
    #[serde(flatten)]
    pub ship: Ship,
    pub cells: Vec<ShipCellReport>,
    pub sunk: bool,
}

/// Full board view for one player of one game.
/// Boxed in ServerMessage to reduce enum size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameDetailsPayload {
    pub game: Game,
    /// The requesting player's own fleet with hit flags
    pub ships: Vec<ShipDetail>,
    /// Shots this player has fired
    pub own_guesses: Vec<Guess>,
    /// Shots the opponent has fired at this player
    pub enemy_guesses: Vec<Guess>,
}

/// Message types sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connect handshake accepted
    Ack { result: ActionResult },
    /// Outcome of the receiving player's own shot
    GuessResult(GuessReport),
    /// Mirror event: the opponent fired this shot at the receiving player
    EnemyGuess(GuessReport),
    /// Placement outcome, success or failure
    NewShip(NewShipPayload),
    /// Response to `fetch_details`
    GameDetails(Box<GameDetailsPayload>),
    /// Response to `fetch_games`
    GameList { games: Vec<Game> },
    /// Heartbeat response
    Pong,
    /// A recovered, caller-facing contract violation (e.g. NotYourTurn)
    ServerError {
        message: String,
        error_code: ErrorCode,
    },
    /// An unanticipated failure; the message is opaque
    UnknownError { message: String },
}
