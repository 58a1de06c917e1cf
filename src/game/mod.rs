// Game rules module: pure computation over already-loaded state.
//
// Nothing in here suspends, locks, or touches the store. The server layer
// loads ships, calls into these functions, and persists the outcome.

pub mod board;
pub mod rules;

pub use board::{in_bounds, occupied_cells, Cell, GRID_SIZE};
pub use rules::{evaluate_guess, fleet_destroyed, validate_placement, PlacementError};
