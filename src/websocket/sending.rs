use crate::protocol::ServerMessage;
use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;

/// Render one outbound event as a JSON text frame.
///
/// Serialization of our own enum cannot realistically fail, but a panic in
/// the send task would tear down the connection, so a canned error frame is
/// used as the fallback.
pub(super) fn encode_server_message(message: &ServerMessage) -> String {
    match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize server message");
            "{\"type\":\"unknown_error\",\"data\":{\"message\":\"Internal error\"}}".to_string()
        }
    }
}

pub(super) async fn send_server_message(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let payload = encode_server_message(message);
    sender.send(Message::Text(payload.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ActionResult;

    #[test]
    fn encoded_frames_carry_the_event_tag() {
        let frame = encode_server_message(&ServerMessage::Ack {
            result: ActionResult::Success,
        });
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "ack");
    }
}
