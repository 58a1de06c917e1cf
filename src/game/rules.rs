use thiserror::Error;

use super::board::{in_bounds, occupied_cells, Cell};
use crate::protocol::{Ship, ShipId, ShipSpec};

/// Why a proposed placement was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("cell {cell} is outside the board")]
    OutOfBounds { cell: Cell },
    #[error("cell {cell} overlaps ship {ship_id}")]
    Overlap { ship_id: ShipId, cell: Cell },
}

/// Validate a candidate placement against the board bounds and the player's
/// already-placed ships.
///
/// Bounds are checked first, so a candidate that both leaves the board and
/// crosses an existing ship reports `OutOfBounds`. Existing ships are
/// checked in the order given; the first conflicting ship is named in the
/// error.
pub fn validate_placement(existing: &[Ship], candidate: &ShipSpec) -> Result<(), PlacementError> {
    let cells = occupied_cells(
        candidate.size,
        candidate.orientation,
        candidate.origin_x,
        candidate.origin_y,
    );
    for cell in &cells {
        if !in_bounds(cell.x, cell.y) {
            return Err(PlacementError::OutOfBounds { cell: *cell });
        }
    }

    for ship in existing {
        for cell in ship.cells() {
            if cells.contains(&cell) {
                return Err(PlacementError::Overlap {
                    ship_id: ship.id,
                    cell,
                });
            }
        }
    }

    Ok(())
}

/// Scan the defender's ships for one occupying the guessed cell.
///
/// Placement validation guarantees ships never overlap, so at most one ship
/// can match; the scan returns the first. `None` is a miss. O(ships x size),
/// which is fine at this scale (at most 100 cells on the board).
pub fn evaluate_guess(defender_ships: &[Ship], guess: Cell) -> Option<ShipId> {
    defender_ships
        .iter()
        .find(|ship| ship.cells().contains(&guess))
        .map(|ship| ship.id)
}

/// True iff every ship in the fleet has taken hits equal to its size.
///
/// Vacuously true for an empty fleet; the turn coordinator only consults
/// this after landing a hit, so an empty fleet can never be "destroyed" in
/// practice.
pub fn fleet_destroyed(ships: &[Ship]) -> bool {
    ships.iter().all(|ship| ship.hits >= ship.size)
}

impl Ship {
    /// The cells this ship occupies, derived from its descriptor.
    pub fn cells(&self) -> Vec<Cell> {
        occupied_cells(self.size, self.orientation, self.origin_x, self.origin_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Orientation;
    use uuid::Uuid;

    fn spec(orientation: Orientation, x: i32, y: i32, size: u32) -> ShipSpec {
        ShipSpec {
            orientation,
            origin_x: x,
            origin_y: y,
            size,
        }
    }

    fn ship(orientation: Orientation, x: i32, y: i32, size: u32) -> Ship {
        Ship {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            orientation,
            origin_x: x,
            origin_y: y,
            size,
            hits: 0,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn placement_inside_empty_board_is_accepted() {
        let candidate = spec(Orientation::Horizontal, 0, 0, 5);
        assert_eq!(validate_placement(&[], &candidate), Ok(()));
    }

    #[test]
    fn placement_reaching_past_the_edge_is_out_of_bounds() {
        // Size 5 horizontal at (9, 6) runs through (13, 6); the first
        // offending cell is (10, 6).
        let candidate = spec(Orientation::Horizontal, 9, 6, 5);
        let err = validate_placement(&[], &candidate).unwrap_err();
        match err {
            PlacementError::OutOfBounds { cell } => assert_eq!(cell, Cell::new(10, 6)),
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn placement_with_negative_origin_is_out_of_bounds() {
        let candidate = spec(Orientation::Vertical, -1, 0, 2);
        assert!(matches!(
            validate_placement(&[], &candidate),
            Err(PlacementError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn crossing_placements_conflict_on_the_shared_cell() {
        // First ship at (0,2)-(1,2); the vertical candidate shares (0,2).
        let placed = ship(Orientation::Horizontal, 0, 2, 2);
        let candidate = spec(Orientation::Vertical, 0, 2, 2);

        let err = validate_placement(&[placed.clone()], &candidate).unwrap_err();
        assert_eq!(
            err,
            PlacementError::Overlap {
                ship_id: placed.id,
                cell: Cell::new(0, 2),
            }
        );
    }

    #[test]
    fn overlap_is_detected_regardless_of_existing_ship_order() {
        let clear = ship(Orientation::Horizontal, 0, 9, 3);
        let blocking = ship(Orientation::Horizontal, 4, 4, 3);
        let candidate = spec(Orientation::Vertical, 5, 3, 4);

        for existing in [
            vec![clear.clone(), blocking.clone()],
            vec![blocking.clone(), clear.clone()],
        ] {
            let err = validate_placement(&existing, &candidate).unwrap_err();
            assert!(
                matches!(err, PlacementError::Overlap { ship_id, .. } if ship_id == blocking.id)
            );
        }
    }

    #[test]
    fn touching_ships_do_not_conflict() {
        let placed = ship(Orientation::Horizontal, 0, 0, 3);
        let candidate = spec(Orientation::Horizontal, 0, 1, 3);
        assert_eq!(validate_placement(&[placed], &candidate), Ok(()));
    }

    #[test]
    fn bounds_are_checked_before_overlap() {
        // Candidate both leaves the board and crosses an existing ship.
        let placed = ship(Orientation::Vertical, 9, 8, 2);
        let candidate = spec(Orientation::Horizontal, 8, 8, 3);
        assert!(matches!(
            validate_placement(&[placed], &candidate),
            Err(PlacementError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn guesses_hit_the_occupying_ship_and_miss_open_water() {
        let fleet = vec![
            ship(Orientation::Horizontal, 0, 0, 3),
            ship(Orientation::Vertical, 5, 5, 2),
        ];

        assert_eq!(evaluate_guess(&fleet, Cell::new(1, 0)), Some(fleet[0].id));
        assert_eq!(evaluate_guess(&fleet, Cell::new(5, 6)), Some(fleet[1].id));
        assert_eq!(evaluate_guess(&fleet, Cell::new(9, 9)), None);
        // Adjacent to a ship but not on it.
        assert_eq!(evaluate_guess(&fleet, Cell::new(3, 0)), None);
    }

    #[test]
    fn fleet_survives_until_every_cell_of_every_ship_is_hit() {
        let mut a = ship(Orientation::Horizontal, 0, 0, 2);
        let mut b = ship(Orientation::Vertical, 9, 0, 1);

        assert!(!fleet_destroyed(&[a.clone(), b.clone()]));

        a.hits = 2;
        assert!(!fleet_destroyed(&[a.clone(), b.clone()]));

        b.hits = 1;
        assert!(fleet_destroyed(&[a, b]));
    }

    #[test]
    fn empty_fleet_is_vacuously_destroyed() {
        assert!(fleet_destroyed(&[]));
    }
}
