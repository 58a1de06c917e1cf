//! In-process integration tests: the full engine behind the routers,
//! exercised through the same entry points the transports use.

use broadside_server::protocol::{
    GameStatus, GuessOutcome, Orientation, ServerMessage, ShipSpec,
};
use broadside_server::server::{GameServer, ServerConfig};
use broadside_server::store::StoreConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

async fn test_server() -> Arc<GameServer> {
    GameServer::new(ServerConfig::default(), StoreConfig::InMemory)
        .await
        .expect("server construction")
}

fn spec(orientation: Orientation, x: i32, y: i32, size: u32) -> ShipSpec {
    ShipSpec {
        orientation,
        origin_x: x,
        origin_y: y,
        size,
    }
}

fn drain(rx: &mut mpsc::Receiver<Arc<ServerMessage>>) -> Vec<Arc<ServerMessage>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn a_full_duel_plays_out_with_live_views_on_both_sides() {
    let server = test_server().await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let game = server.create_game(alice, bob, alice).await.unwrap();

    // Each side fields a small fleet.
    server
        .place_ship(game.id, alice, spec(Orientation::Horizontal, 0, 0, 2))
        .await
        .unwrap();
    server
        .place_ship(game.id, bob, spec(Orientation::Vertical, 4, 4, 2))
        .await
        .unwrap();

    // Bob follows the game from two devices.
    let (alice_tx, mut alice_rx) = mpsc::channel(32);
    let (bob_phone_tx, mut bob_phone_rx) = mpsc::channel(32);
    let (bob_laptop_tx, mut bob_laptop_rx) = mpsc::channel(32);
    server.register_connection(alice, Uuid::new_v4(), alice_tx);
    server.register_connection(bob, Uuid::new_v4(), bob_phone_tx);
    server.register_connection(bob, Uuid::new_v4(), bob_laptop_tx);

    // Alice sinks Bob's ship over two turns while Bob misses in between.
    server.handle_take_turn(game.id, alice, bob, 4, 4).await;
    server.handle_take_turn(game.id, bob, alice, 9, 9).await;
    server.handle_take_turn(game.id, alice, bob, 4, 5).await;

    let final_game = server.store().load_game(&game.id).await.unwrap().unwrap();
    assert_eq!(final_game.status, GameStatus::Completed);
    assert_eq!(final_game.current_player_id, alice);

    // Alice saw her two results plus Bob's shot at her.
    let alice_events = drain(&mut alice_rx);
    let alice_results: Vec<GuessOutcome> = alice_events
        .iter()
        .filter_map(|event| match &**event {
            ServerMessage::GuessResult(report) => Some(report.result),
            _ => None,
        })
        .collect();
    assert_eq!(alice_results, vec![GuessOutcome::Hit, GuessOutcome::Victory]);
    assert!(alice_events
        .iter()
        .any(|event| matches!(&**event, ServerMessage::EnemyGuess(r) if r.result == GuessOutcome::Miss)));

    // Both of Bob's devices observed the same mirror events.
    for rx in [&mut bob_phone_rx, &mut bob_laptop_rx] {
        let events = drain(rx);
        let mirrored: Vec<GuessOutcome> = events
            .iter()
            .filter_map(|event| match &**event {
                ServerMessage::EnemyGuess(report) => Some(report.result),
                _ => None,
            })
            .collect();
        assert_eq!(mirrored, vec![GuessOutcome::Hit, GuessOutcome::Victory]);
    }

    // The loser's own view shows the sunk ship cell by cell.
    let details = server.fetch_details(game.id, bob).await.unwrap();
    assert!(details.ships[0].sunk);
    assert!(details.ships[0].cells.iter().all(|cell| cell.hit));
}

#[tokio::test]
async fn one_dead_device_never_costs_the_others_their_events() {
    let server = test_server().await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game = server.create_game(alice, bob, alice).await.unwrap();
    server
        .place_ship(game.id, bob, spec(Orientation::Horizontal, 0, 0, 3))
        .await
        .unwrap();

    // Three devices for Bob; the middle one dies silently.
    let (tx_a, mut rx_a) = mpsc::channel(32);
    let (tx_dead, rx_dead) = mpsc::channel(32);
    let (tx_b, mut rx_b) = mpsc::channel(32);
    server.register_connection(bob, Uuid::new_v4(), tx_a);
    server.register_connection(bob, Uuid::new_v4(), tx_dead);
    server.register_connection(bob, Uuid::new_v4(), tx_b);
    drop(rx_dead);
    assert_eq!(server.connection_count(&bob), 3);

    server.handle_take_turn(game.id, alice, bob, 0, 0).await;

    // The two live devices got the event; the dead handle was pruned.
    for rx in [&mut rx_a, &mut rx_b] {
        let events = drain(rx);
        assert!(events
            .iter()
            .any(|event| matches!(&**event, ServerMessage::EnemyGuess(_))));
    }
    assert_eq!(server.connection_count(&bob), 2);

    // Delivery keeps working on the survivors.
    server.handle_take_turn(game.id, bob, alice, 9, 9).await;
    assert!(drain(&mut rx_a)
        .iter()
        .any(|event| matches!(&**event, ServerMessage::GuessResult(_))));
}

#[tokio::test]
async fn racing_overlapping_placements_admit_exactly_one_ship() {
    let server = test_server().await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game = server.create_game(alice, bob, alice).await.unwrap();

    let task_count = 8;
    let barrier = Arc::new(tokio::sync::Barrier::new(task_count));
    let mut handles = Vec::new();
    for i in 0..task_count {
        let server = Arc::clone(&server);
        let barrier = Arc::clone(&barrier);
        let game_id = game.id;
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            // All candidates cross (2, 2).
            let candidate = if i % 2 == 0 {
                spec(Orientation::Horizontal, 0, 2, 5)
            } else {
                spec(Orientation::Vertical, 2, 0, 5)
            };
            server.place_ship(game_id, alice, candidate).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("task should not panic").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1, "the per-game lock admits exactly one placement");
    assert_eq!(
        server.store().list_ships(&game.id, &alice).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn frozen_games_keep_rejecting_turns_through_the_router() {
    let server = test_server().await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game = server.create_game(alice, bob, alice).await.unwrap();
    server
        .place_ship(game.id, bob, spec(Orientation::Horizontal, 7, 7, 1))
        .await
        .unwrap();

    let (alice_tx, mut alice_rx) = mpsc::channel(32);
    server.register_connection(alice, Uuid::new_v4(), alice_tx);

    // One shot wins.
    server.handle_take_turn(game.id, alice, bob, 7, 7).await;
    assert!(drain(&mut alice_rx)
        .iter()
        .any(|event| matches!(&**event, ServerMessage::GuessResult(r) if r.result == GuessOutcome::Victory)));

    let log_len = server
        .store()
        .list_guesses(&game.id, &alice)
        .await
        .unwrap()
        .len();

    // Every later attempt, from either seat, is turned away.
    server.handle_take_turn(game.id, alice, bob, 0, 0).await;
    server.handle_take_turn(game.id, bob, alice, 0, 0).await;

    let events = drain(&mut alice_rx);
    assert!(events.iter().any(|event| matches!(
        &**event,
        ServerMessage::ServerError { error_code, .. }
            if *error_code == broadside_server::protocol::ErrorCode::GameOver
    )));

    // And the log did not grow.
    assert_eq!(
        server
            .store()
            .list_guesses(&game.id, &alice)
            .await
            .unwrap()
            .len(),
        log_len
    );
}

#[tokio::test]
async fn fetch_handlers_answer_on_the_requesting_players_connections() {
    let server = test_server().await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game = server.create_game(alice, bob, alice).await.unwrap();
    server
        .place_ship(game.id, alice, spec(Orientation::Vertical, 3, 3, 2))
        .await
        .unwrap();

    let (alice_tx, mut alice_rx) = mpsc::channel(32);
    let (bob_tx, mut bob_rx) = mpsc::channel(32);
    server.register_connection(alice, Uuid::new_v4(), alice_tx);
    server.register_connection(bob, Uuid::new_v4(), bob_tx);

    server.handle_fetch_details(game.id, alice).await;
    server.handle_fetch_games(alice).await;

    let events = drain(&mut alice_rx);
    assert!(events
        .iter()
        .any(|event| matches!(&**event, ServerMessage::GameDetails(details) if details.ships.len() == 1)));
    assert!(events
        .iter()
        .any(|event| matches!(&**event, ServerMessage::GameList { games } if games.len() == 1)));

    // Nothing leaked to the opponent.
    assert!(drain(&mut bob_rx).is_empty());
}
