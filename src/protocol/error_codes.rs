use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Placement errors
    OutOfBounds,
    Overlap,

    // Turn errors
    GameOver,
    NotYourTurn,

    // Lookup errors
    NotFound,

    // Transport / envelope errors
    InvalidInput,
    MessageTooLarge,
    NotConnected,

    // Server errors
    InternalError,
}

impl ErrorCode {
    /// Returns a human-readable description of this error code, suitable
    /// for display to end users or client-side debugging.
    pub fn description(&self) -> &'static str {
        match self {
            Self::OutOfBounds => "The requested placement does not fit on the 10x10 board.",
            Self::Overlap => "The requested placement collides with one of your existing ships.",
            Self::GameOver => "This game has already been decided. No further turns are accepted.",
            Self::NotYourTurn => "It is the other player's turn to fire.",
            Self::NotFound => "The referenced game, player, or ship does not exist.",
            Self::InvalidInput => "The request was structurally invalid.",
            Self::MessageTooLarge => "The message exceeds the configured size limit.",
            Self::NotConnected => {
                "A connect handshake is required before this action can be processed."
            }
            Self::InternalError => "An internal server error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Mirror the wire representation for log readability.
        let s = match self {
            Self::OutOfBounds => "OUT_OF_BOUNDS",
            Self::Overlap => "OVERLAP",
            Self::GameOver => "GAME_OVER",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::MessageTooLarge => "MESSAGE_TOO_LARGE",
            Self::NotConnected => "NOT_CONNECTED",
            Self::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}
