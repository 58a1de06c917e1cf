#![cfg_attr(not(test), deny(clippy::panic))]

use broadside_server::config;
use broadside_server::logging;
use broadside_server::server::{GameServer, ServerConfig};
use broadside_server::store::StoreConfig;
use broadside_server::websocket;
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};

/// Broadside -- lightweight WebSocket server for turn-based naval combat
#[derive(Parser, Debug)]
#[command(name = "broadside-server")]
#[command(about = "A lightweight, in-memory WebSocket server for turn-based naval combat sessions")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = Arc::new(config::load());

    // Handle --print-config: output the loaded configuration as JSON
    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = cfg.validate();

    // Handle --validate-config: exit after validation
    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Storage backend: InMemory");
                println!("  Ping timeout (s): {}", cfg.server.ping_timeout);
                println!("  Sweep interval (s): {}", cfg.server.sweep_interval);
                println!("  Max message size: {}", cfg.server.max_message_size);
                println!("  Outbound queue capacity: {}", cfg.websocket.queue_capacity);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    // In normal operation, propagate validation errors
    validation_result?;

    // Initialize logging from config.
    logging::init_with_config(&cfg.logging);

    let port: u16 = cfg.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "Starting Broadside server");

    let server_config = ServerConfig::from_config(&cfg);

    // All game state lives in memory.
    let game_server = GameServer::new(server_config, StoreConfig::InMemory).await?;

    // Start the stale-connection sweep task
    let cleanup_server = game_server.clone();
    tokio::spawn(async move {
        cleanup_server.cleanup_task().await;
    });

    let app = websocket::create_router(&cfg.server.cors_origins).with_state(game_server);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();

    // Serve over plain TCP (typically behind a reverse proxy).
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.server.cors_origins,
        "Server started - WebSocket: /ws, REST: /v1, Metrics: /v1/metrics"
    );

    axum::serve(listener, make_service).await?;

    Ok(())
}
