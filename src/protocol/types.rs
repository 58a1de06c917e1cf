use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;
/// Unique identifier for games
pub type GameId = Uuid;
/// Unique identifier for ships
pub type ShipId = Uuid;
/// Unique identifier for guess records
pub type GuessId = Uuid;
/// Unique identifier for a single live connection (a player may hold several)
pub type ConnectionId = Uuid;

/// Which way a ship extends from its origin cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Extends toward +x
    Horizontal,
    /// Extends toward +y
    Vertical,
}

/// Lifecycle of a game session. There is no other state: a game is live
/// until the winning shot lands, then frozen forever.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Completed,
}

/// Outcome of a single guess.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuessOutcome {
    Hit,
    Miss,
    /// The hit that destroyed the defender's last afloat ship.
    Victory,
}

/// One two-player session from creation to victory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub current_player_id: PlayerId,
    pub status: GameStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Game {
    /// True iff `player_id` is one of the two participants.
    pub fn has_participant(&self, player_id: &PlayerId) -> bool {
        self.player_a_id == *player_id || self.player_b_id == *player_id
    }

    /// The participant facing `player_id`, if `player_id` participates.
    pub fn opponent_of(&self, player_id: &PlayerId) -> Option<PlayerId> {
        if self.player_a_id == *player_id {
            Some(self.player_b_id)
        } else if self.player_b_id == *player_id {
            Some(self.player_a_id)
        } else {
            None
        }
    }
}

/// A placed ship. The occupied cells are derived from the descriptor
/// (see `Ship::cells`), never stored; a ship cannot move once placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ship {
    pub id: ShipId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub orientation: Orientation,
    pub origin_x: i32,
    pub origin_y: i32,
    pub size: u32,
    /// Running hit counter, `0 <= hits <= size`.
    pub hits: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One entry in the append-only guess log. `ship_id` names the ship (if
/// any) occupying the target cell at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guess {
    pub id: GuessId,
    pub game_id: GameId,
    pub offense_player_id: PlayerId,
    pub x: i32,
    pub y: i32,
    pub result: GuessOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_id: Option<ShipId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Client-supplied ship descriptor for a placement request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShipSpec {
    pub orientation: Orientation,
    pub origin_x: i32,
    pub origin_y: i32,
    pub size: u32,
}
