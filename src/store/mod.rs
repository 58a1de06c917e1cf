use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::protocol::{
    Game, GameId, GameStatus, Guess, GuessOutcome, Orientation, PlayerId, Ship, ShipId,
};

/// Storage abstraction for game session state.
///
/// The store owns every Game/Ship/Guess record; the engine never caches them
/// across operations. All methods return `anyhow::Result` so a backend is
/// free to fail with I/O errors; lookups of absent rows are `Ok(None)`, not
/// errors.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Initialize the backend (run migrations, open connections).
    async fn initialize(&self) -> Result<()>;

    /// Persist a new game with `current_player_id = initial_player`.
    /// Participant validation happens in the game service, not here.
    async fn create_game(
        &self,
        player_a: PlayerId,
        player_b: PlayerId,
        initial_player: PlayerId,
    ) -> Result<Game>;

    /// Get game by ID
    async fn load_game(&self, game_id: &GameId) -> Result<Option<Game>>;

    /// Rotate the turn. Returns false if the game does not exist.
    async fn set_current_player(&self, game_id: &GameId, player_id: PlayerId) -> Result<bool>;

    /// Transition the game lifecycle. Returns false if the game does not exist.
    async fn set_status(&self, game_id: &GameId, status: GameStatus) -> Result<bool>;

    /// Persist a validated placement with `hits = 0`.
    async fn create_ship(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        orientation: Orientation,
        origin_x: i32,
        origin_y: i32,
        size: u32,
    ) -> Result<Ship>;

    /// All ships one player has placed in one game, in placement order.
    async fn list_ships(&self, game_id: &GameId, player_id: &PlayerId) -> Result<Vec<Ship>>;

    /// Atomically increment a ship's hit counter, returning the new count.
    /// `Ok(None)` if the ship does not exist.
    async fn increment_hits(&self, ship_id: &ShipId) -> Result<Option<u32>>;

    /// Append one entry to the guess log.
    async fn append_guess(
        &self,
        game_id: GameId,
        offense_player_id: PlayerId,
        x: i32,
        y: i32,
        result: GuessOutcome,
        ship_id: Option<ShipId>,
    ) -> Result<Guess>;

    /// All guesses one player has fired in one game, oldest first.
    async fn list_guesses(&self, game_id: &GameId, player_id: &PlayerId) -> Result<Vec<Guess>>;

    /// Every game the player participates in, oldest first.
    async fn list_games_for_player(&self, player_id: &PlayerId) -> Result<Vec<Game>>;

    /// Health check
    async fn health_check(&self) -> bool;
}

/// Store configuration: in-memory only for broadside-server.
#[derive(Debug, Clone, Default)]
pub enum StoreConfig {
    #[default]
    InMemory,
}

/// Create a store instance based on configuration
pub fn create_store(config: &StoreConfig) -> Box<dyn GameStore> {
    match config {
        StoreConfig::InMemory => Box::new(InMemoryStore::new()),
    }
}

/// Simple in-memory store for testing and single-instance deployments.
///
/// Ships and guesses live in Vecs so listing preserves insertion order
/// (placement order for ships, firing order for the guess log).
pub struct InMemoryStore {
    games: Arc<RwLock<HashMap<GameId, Game>>>,
    ships: Arc<RwLock<Vec<Ship>>>,
    guesses: Arc<RwLock<Vec<Guess>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            ships: Arc::new(RwLock::new(Vec::new())),
            guesses: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn create_game(
        &self,
        player_a: PlayerId,
        player_b: PlayerId,
        initial_player: PlayerId,
    ) -> Result<Game> {
        let mut games = self.games.write().await;

        // Uuid::new_v4 collisions are not a practical concern, but the map
        // insert must never clobber an existing session.
        let game_id = {
            let mut id = Uuid::new_v4();
            let mut attempts = 0u8;
            while games.contains_key(&id) {
                attempts += 1;
                if attempts >= 16 {
                    anyhow::bail!("Failed to generate unique game ID after {attempts} attempts");
                }
                id = Uuid::new_v4();
            }
            id
        };

        let game = Game {
            id: game_id,
            player_a_id: player_a,
            player_b_id: player_b,
            current_player_id: initial_player,
            status: GameStatus::InProgress,
            created_at: chrono::Utc::now(),
        };

        games.insert(game_id, game.clone());
        Ok(game)
    }

    async fn load_game(&self, game_id: &GameId) -> Result<Option<Game>> {
        let games = self.games.read().await;
        Ok(games.get(game_id).cloned())
    }

    async fn set_current_player(&self, game_id: &GameId, player_id: PlayerId) -> Result<bool> {
        let mut games = self.games.write().await;
        if let Some(game) = games.get_mut(game_id) {
            game.current_player_id = player_id;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn set_status(&self, game_id: &GameId, status: GameStatus) -> Result<bool> {
        let mut games = self.games.write().await;
        if let Some(game) = games.get_mut(game_id) {
            game.status = status;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn create_ship(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        orientation: Orientation,
        origin_x: i32,
        origin_y: i32,
        size: u32,
    ) -> Result<Ship> {
        let ship = Ship {
            id: Uuid::new_v4(),
            game_id,
            player_id,
            orientation,
            origin_x,
            origin_y,
            size,
            hits: 0,
            created_at: chrono::Utc::now(),
        };

        let mut ships = self.ships.write().await;
        ships.push(ship.clone());
        Ok(ship)
    }

    async fn list_ships(&self, game_id: &GameId, player_id: &PlayerId) -> Result<Vec<Ship>> {
        let ships = self.ships.read().await;
        Ok(ships
            .iter()
            .filter(|ship| ship.game_id == *game_id && ship.player_id == *player_id)
            .cloned()
            .collect())
    }

    async fn increment_hits(&self, ship_id: &ShipId) -> Result<Option<u32>> {
        let mut ships = self.ships.write().await;
        if let Some(ship) = ships.iter_mut().find(|ship| ship.id == *ship_id) {
            ship.hits += 1;
            Ok(Some(ship.hits))
        } else {
            Ok(None)
        }
    }

    async fn append_guess(
        &self,
        game_id: GameId,
        offense_player_id: PlayerId,
        x: i32,
        y: i32,
        result: GuessOutcome,
        ship_id: Option<ShipId>,
    ) -> Result<Guess> {
        let guess = Guess {
            id: Uuid::new_v4(),
            game_id,
            offense_player_id,
            x,
            y,
            result,
            ship_id,
            created_at: chrono::Utc::now(),
        };

        let mut guesses = self.guesses.write().await;
        guesses.push(guess.clone());
        Ok(guess)
    }

    async fn list_guesses(&self, game_id: &GameId, player_id: &PlayerId) -> Result<Vec<Guess>> {
        let guesses = self.guesses.read().await;
        Ok(guesses
            .iter()
            .filter(|guess| guess.game_id == *game_id && guess.offense_player_id == *player_id)
            .cloned()
            .collect())
    }

    async fn list_games_for_player(&self, player_id: &PlayerId) -> Result<Vec<Game>> {
        let games = self.games.read().await;
        let mut found: Vec<Game> = games
            .values()
            .filter(|game| game.has_participant(player_id))
            .cloned()
            .collect();
        found.sort_by_key(|game| game.created_at);
        Ok(found)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn created_game_is_retrievable_by_id() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let game = store
            .create_game(a, b, a)
            .await
            .expect("game creation should succeed");

        let fetched = store
            .load_game(&game.id)
            .await
            .expect("load_game should not error")
            .expect("game should exist");

        assert_eq!(fetched, game);
        assert_eq!(fetched.status, GameStatus::InProgress);
        assert_eq!(fetched.current_player_id, a);
    }

    #[tokio::test]
    async fn load_of_unknown_game_is_none_not_error() {
        let store = InMemoryStore::new();
        let missing = store.load_game(&Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());

        assert!(!store
            .set_current_player(&Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap());
        assert!(!store
            .set_status(&Uuid::new_v4(), GameStatus::Completed)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn ship_listing_filters_by_game_and_player() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let game1 = store.create_game(a, b, a).await.unwrap();
        let game2 = store.create_game(a, b, b).await.unwrap();

        store
            .create_ship(game1.id, a, Orientation::Horizontal, 0, 0, 3)
            .await
            .unwrap();
        store
            .create_ship(game1.id, b, Orientation::Vertical, 5, 5, 2)
            .await
            .unwrap();
        store
            .create_ship(game2.id, a, Orientation::Vertical, 1, 1, 4)
            .await
            .unwrap();

        let ships = store.list_ships(&game1.id, &a).await.unwrap();
        assert_eq!(ships.len(), 1);
        assert_eq!(ships[0].size, 3);
        assert_eq!(ships[0].hits, 0);
    }

    #[tokio::test]
    async fn ships_are_listed_in_placement_order() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let game = store.create_game(a, b, a).await.unwrap();

        for (i, size) in [5u32, 4, 3].iter().enumerate() {
            store
                .create_ship(game.id, a, Orientation::Horizontal, 0, i as i32, *size)
                .await
                .unwrap();
        }

        let sizes: Vec<u32> = store
            .list_ships(&game.id, &a)
            .await
            .unwrap()
            .iter()
            .map(|ship| ship.size)
            .collect();
        assert_eq!(sizes, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn increment_hits_returns_the_new_count() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let game = store.create_game(a, b, a).await.unwrap();
        let ship = store
            .create_ship(game.id, a, Orientation::Horizontal, 0, 0, 3)
            .await
            .unwrap();

        assert_eq!(store.increment_hits(&ship.id).await.unwrap(), Some(1));
        assert_eq!(store.increment_hits(&ship.id).await.unwrap(), Some(2));
        assert_eq!(store.increment_hits(&Uuid::new_v4()).await.unwrap(), None);

        let reloaded = store.list_ships(&game.id, &a).await.unwrap();
        assert_eq!(reloaded[0].hits, 2);
    }

    #[tokio::test]
    async fn guess_log_preserves_firing_order() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let game = store.create_game(a, b, a).await.unwrap();

        for x in 0..4 {
            store
                .append_guess(game.id, a, x, 0, GuessOutcome::Miss, None)
                .await
                .unwrap();
        }

        let log = store.list_guesses(&game.id, &a).await.unwrap();
        let xs: Vec<i32> = log.iter().map(|guess| guess.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3]);

        // The defender has fired nothing.
        assert!(store.list_guesses(&game.id, &b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn games_for_player_spans_both_seats() {
        let store = InMemoryStore::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        store.create_game(a, b, a).await.unwrap();
        store.create_game(c, a, c).await.unwrap();
        store.create_game(b, c, b).await.unwrap();

        assert_eq!(store.list_games_for_player(&a).await.unwrap().len(), 2);
        assert_eq!(store.list_games_for_player(&b).await.unwrap().len(), 2);
        assert_eq!(
            store
                .list_games_for_player(&Uuid::new_v4())
                .await
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn concurrent_game_creation_yields_distinct_ids() {
        let store = Arc::new(InMemoryStore::new());
        let task_count = 50;
        let barrier = Arc::new(tokio::sync::Barrier::new(task_count));

        let mut handles = Vec::with_capacity(task_count);
        for _ in 0..task_count {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                let a = Uuid::new_v4();
                store.create_game(a, Uuid::new_v4(), a).await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let game = handle
                .await
                .expect("task should not panic")
                .expect("game creation should succeed");
            ids.insert(game.id);
        }

        assert_eq!(ids.len(), task_count);
    }
}
