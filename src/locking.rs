use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::protocol::GameId;

/// Per-game mutual exclusion.
///
/// Every mutating operation against a game (taking a turn, placing a ship)
/// runs under that game's mutex so the load/evaluate/persist sequence can
/// never interleave with another writer of the same game. Locks for
/// different games are independent; a guard is released when dropped, which
/// covers every exit path including errors.
#[derive(Default)]
pub struct GameLocks {
    locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl GameLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the mutex for one game, creating it on first use.
    ///
    /// The entry reference is dropped before awaiting so the map shard is
    /// never held across the suspension point.
    pub async fn acquire(&self, game_id: &GameId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(*game_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Number of games that have ever been locked (games are never deleted,
    /// so entries are kept for the process lifetime).
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[tokio::test]
    async fn same_game_operations_are_mutually_exclusive() {
        let locks = Arc::new(GameLocks::new());
        let game_id = Uuid::new_v4();
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = Arc::clone(&locks);
            let in_section = Arc::clone(&in_section);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&game_id).await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.expect("task should not panic");
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn different_games_do_not_block_each_other() {
        let locks = GameLocks::new();
        let game_a = Uuid::new_v4();
        let game_b = Uuid::new_v4();

        let _guard_a = locks.acquire(&game_a).await;
        // Must not deadlock even while game A's guard is held.
        let _guard_b = locks.acquire(&game_b).await;

        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn guard_release_unblocks_the_next_waiter() {
        let locks = Arc::new(GameLocks::new());
        let game_id = Uuid::new_v4();

        let guard = locks.acquire(&game_id).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(&game_id).await;
            })
        };

        drop(guard);
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .expect("waiter should not panic");
    }
}
