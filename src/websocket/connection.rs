use crate::protocol::{
    ActionResult, ClientMessage, ConnectionId, ErrorCode, PlayerId, ServerMessage,
};
use crate::server::GameServer;
use axum::extract::ws::{Message, WebSocket};
use futures_util::StreamExt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::sending::send_server_message;

pub(super) async fn handle_socket(socket: WebSocket, server: Arc<GameServer>, addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();
    let queue_capacity = server.config().queue_capacity.max(1);
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(queue_capacity);

    let connection_id: ConnectionId = Uuid::new_v4();
    tracing::info!(
        %connection_id,
        client_addr = %addr,
        instance_id = %server.instance_id(),
        "WebSocket connection established"
    );

    // The player this connection gets bound to by its connect handshake.
    // Written by the receive task, read by the final cleanup.
    let bound_player: Arc<Mutex<Option<PlayerId>>> = Arc::new(Mutex::new(None));

    // Outbound pump: everything the registry enqueues goes out as one JSON
    // text frame. A socket-level send failure ends the connection.
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if send_server_message(&mut sender, &message).await.is_err() {
                break;
            }
        }
    });

    // Inbound pump: parse, bind on connect, then route through the server.
    let server_clone = server.clone();
    let bound_for_receive = bound_player.clone();
    let connect_timeout = server.config().connect_timeout;
    let max_message_size = server.config().max_message_size;
    let receive_task = tokio::spawn(async move {
        let connect_deadline = tokio::time::sleep(connect_timeout);
        tokio::pin!(connect_deadline);
        let mut player: Option<PlayerId> = None;

        loop {
            let msg = if player.is_some() {
                // Bound connections have no deadline; liveness is the ping
                // sweep's job.
                match receiver.next().await {
                    Some(msg) => msg,
                    None => break,
                }
            } else {
                tokio::select! {
                    msg_opt = receiver.next() => {
                        match msg_opt {
                            Some(msg) => msg,
                            None => break,
                        }
                    }
                    () = &mut connect_deadline => {
                        tracing::info!(
                            %connection_id,
                            timeout_secs = connect_timeout.as_secs(),
                            "Connect handshake timeout, closing connection"
                        );
                        break;
                    }
                }
            };

            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(%connection_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if text.len() > max_message_size {
                        tracing::warn!(
                            %connection_id,
                            size = text.len(),
                            max = max_message_size,
                            "Message exceeds size limit"
                        );
                        enqueue_error(
                            &tx,
                            &server_clone,
                            format!(
                                "Message too large ({} bytes, max {} bytes)",
                                text.len(),
                                max_message_size
                            ),
                            ErrorCode::MessageTooLarge,
                        );
                        continue;
                    }

                    let client_message: ClientMessage = match serde_json::from_str(&text) {
                        Ok(message) => message,
                        Err(err) => {
                            tracing::warn!(
                                %connection_id,
                                error = %err,
                                "Rejected malformed client frame"
                            );
                            enqueue_error(
                                &tx,
                                &server_clone,
                                format!("Unrecognized message: {err}"),
                                ErrorCode::InvalidInput,
                            );
                            continue;
                        }
                    };

                    match (client_message, player) {
                        (ClientMessage::Connect { player_id }, None) => {
                            server_clone.register_connection(
                                player_id,
                                connection_id,
                                tx.clone(),
                            );
                            player = Some(player_id);
                            if let Ok(mut bound) = bound_for_receive.lock() {
                                *bound = Some(player_id);
                            }
                            // Handshake ack goes to this socket only.
                            if tx
                                .try_send(Arc::new(ServerMessage::Ack {
                                    result: ActionResult::Success,
                                }))
                                .is_err()
                            {
                                server_clone.metrics().increment_messages_dropped();
                            }
                        }
                        (_, None) => {
                            tracing::warn!(
                                %connection_id,
                                "Received action before connect handshake"
                            );
                            enqueue_error(
                                &tx,
                                &server_clone,
                                "Connect handshake required before actions".to_string(),
                                ErrorCode::NotConnected,
                            );
                        }
                        (message, Some(player_id)) => {
                            server_clone
                                .handle_client_message(&player_id, &connection_id, message)
                                .await;
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!(%connection_id, "WebSocket connection closed");
                    break;
                }
                Message::Pong(_) => {
                    // Transport-level pong counts as a heartbeat too.
                    if let Some(player_id) = player {
                        server_clone.handle_ping(&player_id, &connection_id);
                    }
                }
                _ => {
                    // Ignore other message types
                }
            }
        }
    });

    // Whichever task finishes first ends the connection; the other is
    // detached and drains on its own. An in-flight game mutation triggered
    // by an already-received message is never cancelled.
    tokio::select! {
        _ = send_task => {
            tracing::debug!(%connection_id, "Send task completed");
        }
        _ = receive_task => {
            tracing::debug!(%connection_id, "Receive task completed");
        }
    }

    // Ensure cleanup: drop this handle from the registry immediately; the
    // player's other connections stay live.
    let bound = bound_player.lock().map(|bound| *bound).unwrap_or(None);
    if let Some(player_id) = bound {
        server.unregister_connection(&player_id, &connection_id);
    }
}

fn enqueue_error(
    tx: &mpsc::Sender<Arc<ServerMessage>>,
    server: &Arc<GameServer>,
    message: String,
    error_code: ErrorCode,
) {
    if tx
        .try_send(Arc::new(ServerMessage::ServerError {
            message,
            error_code,
        }))
        .is_err()
    {
        server.metrics().increment_messages_dropped();
    }
}
