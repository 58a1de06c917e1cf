// Protocol module: message types, error codes, and domain records

pub mod error_codes;
pub mod messages;
pub mod types;

pub use error_codes::ErrorCode;

pub use types::{
    ConnectionId, Game, GameId, GameStatus, Guess, GuessId, GuessOutcome, Orientation, PlayerId,
    Ship, ShipId, ShipSpec,
};

pub use messages::{
    ActionResult, ClientMessage, GameDetailsPayload, GuessReport, NewShipPayload, ServerMessage,
    ShipCellReport, ShipDetail,
};
