use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collection for the in-memory game server
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Connection metrics
    pub total_connections: AtomicU64,
    pub active_connections: AtomicU64,
    pub disconnections: AtomicU64,
    pub messages_dropped: AtomicU64,
    pub delivery_failures: AtomicU64,
    pub stale_connections_pruned: AtomicU64,

    // Game lifecycle metrics
    pub games_created: AtomicU64,
    pub games_completed: AtomicU64,

    // Action metrics
    pub ships_placed: AtomicU64,
    pub placement_rejections: AtomicU64,
    pub turns_taken: AtomicU64,
    pub turn_rejections: AtomicU64,

    // Error tracking
    pub internal_errors: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_connections(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_active_connections(&self) {
        self.disconnections.fetch_add(1, Ordering::Relaxed);
        // Guard against double-unregister racing past zero.
        let _ = self.active_connections.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |current| current.checked_sub(1),
        );
    }

    pub fn increment_messages_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_delivery_failures(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_stale_connections_pruned(&self) {
        self.stale_connections_pruned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_games_created(&self) {
        self.games_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_games_completed(&self) {
        self.games_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ships_placed(&self) {
        self.ships_placed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_placement_rejections(&self) {
        self.placement_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_turns_taken(&self) {
        self.turns_taken.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_turn_rejections(&self) {
        self.turn_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_internal_errors(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter for the metrics endpoint.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            disconnections: self.disconnections.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            stale_connections_pruned: self.stale_connections_pruned.load(Ordering::Relaxed),
            games_created: self.games_created.load(Ordering::Relaxed),
            games_completed: self.games_completed.load(Ordering::Relaxed),
            ships_placed: self.ships_placed.load(Ordering::Relaxed),
            placement_rejections: self.placement_rejections.load(Ordering::Relaxed),
            turns_taken: self.turns_taken.load(Ordering::Relaxed),
            turn_rejections: self.turn_rejections.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`ServerMetrics`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_connections: u64,
    pub active_connections: u64,
    pub disconnections: u64,
    pub messages_dropped: u64,
    pub delivery_failures: u64,
    pub stale_connections_pruned: u64,
    pub games_created: u64,
    pub games_completed: u64,
    pub ships_placed: u64,
    pub placement_rejections: u64,
    pub turns_taken: u64,
    pub turn_rejections: u64,
    pub internal_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_counters_track_register_and_unregister() {
        let metrics = ServerMetrics::new();
        metrics.increment_connections();
        metrics.increment_connections();
        metrics.decrement_active_connections();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_connections, 2);
        assert_eq!(snapshot.active_connections, 1);
        assert_eq!(snapshot.disconnections, 1);
    }

    #[test]
    fn active_connections_never_underflow() {
        let metrics = ServerMetrics::new();
        metrics.decrement_active_connections();
        metrics.decrement_active_connections();
        assert_eq!(metrics.snapshot().active_connections, 0);
    }

    #[test]
    fn snapshot_serializes_to_flat_json() {
        let metrics = ServerMetrics::new();
        metrics.increment_games_created();
        metrics.increment_turns_taken();

        let value = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(value["games_created"], 1);
        assert_eq!(value["turns_taken"], 1);
        assert_eq!(value["turn_rejections"], 0);
    }
}
