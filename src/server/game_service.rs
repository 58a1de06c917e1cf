use crate::game::board::{in_bounds, Cell};
use crate::game::rules::{self, PlacementError};
use crate::protocol::{
    Game, GameDetailsPayload, GameId, GameStatus, GuessOutcome, GuessReport, PlayerId, Ship,
    ShipCellReport, ShipDetail, ShipSpec,
};

use super::{GameActionError, GameServer, ServiceError};

impl GameServer {
    /// Start a session between two players. The initial player must be one
    /// of the two participants.
    pub async fn create_game(
        &self,
        player_a: PlayerId,
        player_b: PlayerId,
        initial_player: PlayerId,
    ) -> Result<Game, ServiceError> {
        if initial_player != player_a && initial_player != player_b {
            return Err(GameActionError::NotFound {
                what: "initial player",
            }
            .into());
        }

        let game = self.store.create_game(player_a, player_b, initial_player).await?;
        self.metrics.increment_games_created();
        tracing::info!(
            game_id = %game.id,
            %player_a,
            %player_b,
            %initial_player,
            "Game created"
        );
        Ok(game)
    }

    /// Validate and persist one ship placement for a player.
    ///
    /// Runs under the per-game lock so two racing placements cannot both
    /// pass the overlap check. A rejected placement persists nothing.
    pub async fn place_ship(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        spec: ShipSpec,
    ) -> Result<Ship, ServiceError> {
        let _guard = self.game_locks.acquire(&game_id).await;

        let game = self
            .store
            .load_game(&game_id)
            .await?
            .ok_or(GameActionError::NotFound { what: "game" })?;
        if !game.has_participant(&player_id) {
            return Err(GameActionError::NotFound { what: "player" }.into());
        }

        let existing = self.store.list_ships(&game_id, &player_id).await?;
        rules::validate_placement(&existing, &spec).map_err(|err| match err {
            PlacementError::OutOfBounds { cell } => GameActionError::OutOfBounds {
                x: cell.x,
                y: cell.y,
            },
            PlacementError::Overlap { ship_id, cell } => GameActionError::Overlap {
                ship_id,
                x: cell.x,
                y: cell.y,
            },
        })?;

        let ship = self
            .store
            .create_ship(
                game_id,
                player_id,
                spec.orientation,
                spec.origin_x,
                spec.origin_y,
                spec.size,
            )
            .await?;
        self.metrics.increment_ships_placed();
        tracing::info!(
            %game_id,
            %player_id,
            ship_id = %ship.id,
            orientation = ?ship.orientation,
            origin_x = ship.origin_x,
            origin_y = ship.origin_y,
            size = ship.size,
            "Ship placed"
        );
        Ok(ship)
    }

    /// Resolve one turn: evaluate the offense player's guess against the
    /// defender's fleet, persist the outcome, and rotate or end the game.
    ///
    /// The whole load/evaluate/persist sequence runs under the per-game
    /// lock; two concurrent turns against the same game cannot interleave.
    /// The guess log gains exactly one entry per accepted call, appended
    /// after the outcome is final. Rejected calls mutate nothing.
    pub async fn take_turn(
        &self,
        game_id: GameId,
        offense_player_id: PlayerId,
        defense_player_id: PlayerId,
        x: i32,
        y: i32,
    ) -> Result<GuessReport, ServiceError> {
        let _guard = self.game_locks.acquire(&game_id).await;

        let game = self
            .store
            .load_game(&game_id)
            .await?
            .ok_or(GameActionError::NotFound { what: "game" })?;
        if game.status == GameStatus::Completed {
            return Err(GameActionError::GameOver.into());
        }
        if game.opponent_of(&offense_player_id) != Some(defense_player_id) {
            // Rotating the turn to an arbitrary id would hand the game to a
            // non-participant, so both seats are checked up front.
            return Err(GameActionError::NotFound { what: "player" }.into());
        }
        if game.current_player_id != offense_player_id {
            return Err(GameActionError::NotYourTurn.into());
        }
        if !in_bounds(x, y) {
            // The guess log only ever contains on-board cells.
            return Err(GameActionError::OutOfBounds { x, y }.into());
        }

        let defender_ships = self.store.list_ships(&game_id, &defense_player_id).await?;
        let ship_id = rules::evaluate_guess(&defender_ships, Cell::new(x, y));

        let (result, current_player_id) = match ship_id {
            Some(hit_ship) => {
                self.store
                    .increment_hits(&hit_ship)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("hit ship {hit_ship} vanished mid-turn"))?;

                let fleet = self.store.list_ships(&game_id, &defense_player_id).await?;
                if rules::fleet_destroyed(&fleet) {
                    // Winning shot: freeze the game, the turn never rotates.
                    self.store.set_status(&game_id, GameStatus::Completed).await?;
                    self.metrics.increment_games_completed();
                    (GuessOutcome::Victory, offense_player_id)
                } else {
                    self.store
                        .set_current_player(&game_id, defense_player_id)
                        .await?;
                    (GuessOutcome::Hit, defense_player_id)
                }
            }
            None => {
                self.store
                    .set_current_player(&game_id, defense_player_id)
                    .await?;
                (GuessOutcome::Miss, defense_player_id)
            }
        };

        self.store
            .append_guess(game_id, offense_player_id, x, y, result, ship_id)
            .await?;
        self.metrics.increment_turns_taken();

        tracing::info!(
            %game_id,
            %offense_player_id,
            %defense_player_id,
            x,
            y,
            result = ?result,
            "Turn resolved"
        );

        Ok(GuessReport {
            result,
            x,
            y,
            current_player_id,
        })
    }

    /// One player's full view of a game: own fleet with per-cell hit flags,
    /// own guess history, and the opponent's guesses against them.
    ///
    /// Read-only, so it runs outside the per-game lock.
    pub async fn fetch_details(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<GameDetailsPayload, ServiceError> {
        let game = self
            .store
            .load_game(&game_id)
            .await?
            .ok_or(GameActionError::NotFound { what: "game" })?;
        let opponent_id = game
            .opponent_of(&player_id)
            .ok_or(GameActionError::NotFound { what: "player" })?;

        let ships = self.store.list_ships(&game_id, &player_id).await?;
        let own_guesses = self.store.list_guesses(&game_id, &player_id).await?;
        let enemy_guesses = self.store.list_guesses(&game_id, &opponent_id).await?;

        let ships = ships
            .into_iter()
            .map(|ship| {
                let cells = ship
                    .cells()
                    .into_iter()
                    .map(|cell| ShipCellReport {
                        x: cell.x,
                        y: cell.y,
                        hit: enemy_guesses.iter().any(|guess| {
                            guess.ship_id == Some(ship.id)
                                && guess.x == cell.x
                                && guess.y == cell.y
                        }),
                    })
                    .collect();
                ShipDetail {
                    cells,
                    sunk: ship.hits >= ship.size,
                    ship,
                }
            })
            .collect();

        Ok(GameDetailsPayload {
            game,
            ships,
            own_guesses,
            enemy_guesses,
        })
    }

    /// Every game the player participates in.
    pub async fn list_games(&self, player_id: PlayerId) -> Result<Vec<Game>, ServiceError> {
        Ok(self.store.list_games_for_player(&player_id).await?)
    }
}
