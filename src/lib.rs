#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::too_many_arguments,
    clippy::too_many_lines
)]

//! # Broadside Server
//!
//! A lightweight, in-memory WebSocket server for turn-based naval combat
//! sessions: place ships on a 10x10 grid, trade guesses, sink the enemy fleet.
//!
//! All game state lives in memory: no database process, no cloud services.
//! Just run the binary and connect via WebSocket.

/// Synchronous HTTP API (thin adapters over the game service)
pub mod api;

/// Server configuration and environment variables
pub mod config;

/// Pure game rules: board geometry, placement and guess evaluation
pub mod game;

/// Per-game mutual exclusion
pub mod locking;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// Wire protocol and domain record definitions
pub mod protocol;

/// Main server orchestration
pub mod server;

/// Game state storage abstraction (in-memory implementation)
pub mod store;

/// WebSocket connection handling
pub mod websocket;
