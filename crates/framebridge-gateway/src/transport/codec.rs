//! Decode-once codec for the WebSocket relay.
//!
//! - Text frames => JSON value (shape is classified later by the host)
//! - Binary frames are not part of the bridge protocol
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use serde_json::Value;

use framebridge_core::error::{BridgeError, Result};

#[derive(Debug)]
pub enum Inbound {
    Data { value: Value, bytes_len: usize },
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Size of a socket message before any parsing.
pub fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) => v.len(),
        Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            let bytes_len = s.len();
            let value: Value = serde_json::from_str(&s)
                .map_err(|e| BridgeError::BadRequest(format!("invalid message json: {e}")))?;
            Ok(Inbound::Data { value, bytes_len })
        }
        Message::Binary(_) => Err(BridgeError::BadRequest("binary frames are not supported".into())),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

/// Serialize an outbound payload into a text frame.
pub fn encode(data: &Value) -> Message {
    Message::Text(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_decodes_to_value() {
        let msg = Message::Text(r#"{"jsonrpc":"2.0","id":1,"method":"eth_chainId"}"#.into());
        assert_eq!(frame_len(&msg), 47);
        match decode(msg).unwrap() {
            Inbound::Data { value, bytes_len } => {
                assert_eq!(value["method"], json!("eth_chainId"));
                assert_eq!(bytes_len, 47);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_and_binary_are_bad_requests() {
        assert!(matches!(
            decode(Message::Text("{not json".into())),
            Err(BridgeError::BadRequest(_))
        ));
        assert!(matches!(
            decode(Message::Binary(vec![1, 2, 3])),
            Err(BridgeError::BadRequest(_))
        ));
    }

    #[test]
    fn encode_is_compact_json_text() {
        match encode(&json!({"id": 1})) {
            Message::Text(s) => assert_eq!(s, r#"{"id":1}"#),
            other => panic!("unexpected {other:?}"),
        }
    }
}
