//! WebSocket relay for out-of-process frames.
//!
//! A webview (or any other embedder that cannot share memory with the host)
//! relays its frame's postMessage traffic over one socket:
//! - Upgrade HTTP -> WS on `/v1/bridge` after an `Origin` allowlist check
//! - Each socket becomes a `RemoteFrame` attached to its own `BridgeHost`
//! - On attach the host sends `INJECT_PROVIDER` (remote frames are never
//!   same-origin with the relay)
//! - Lifecycle: ping/pong + idle timeout
//! - Cheap length check before decoding, then decode-once into the host

use std::sync::Arc;

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use framebridge_core::error::{BridgeError, Result};

use crate::app_state::AppState;
use crate::host::{EmbeddedFrame, InjectError};
use crate::policy::PolicyDecision;
use crate::transport::codec::{decode, encode, frame_len, Inbound};
use crate::transport::{MessageEvent, MessagePort, Origin, TargetOrigin, WindowId};

const OUTBOUND_CAPACITY: usize = 1024;

/// Frame living on the far side of a socket.
///
/// Its content window is addressed through the socket's outbound queue and
/// its origin is the one presented at handshake.
#[derive(Debug, Clone)]
pub struct RemoteFrame {
    window: WindowId,
    origin: Origin,
    out_tx: mpsc::Sender<Message>,
}

impl RemoteFrame {
    pub fn new(origin: Origin, out_tx: mpsc::Sender<Message>) -> Self {
        Self {
            window: WindowId::next(),
            origin,
            out_tx,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

impl MessagePort for RemoteFrame {
    fn window_id(&self) -> WindowId {
        self.window
    }

    fn post_message(&self, data: Value, target: TargetOrigin) -> Result<()> {
        if !target.admits(&self.origin) {
            tracing::trace!(to = %self.window, target = ?target, "target origin mismatch; message dropped");
            return Ok(());
        }
        self.out_tx
            .try_send(encode(&data))
            .map_err(|e| BridgeError::Transport(format!("frame {} outbound: {e}", self.window)))
    }
}

impl EmbeddedFrame for RemoteFrame {
    fn content_window(&self) -> Arc<dyn MessagePort> {
        Arc::new(self.clone())
    }

    fn inject_same_origin(&self, _script: &str) -> std::result::Result<(), InjectError> {
        Err(InjectError::CrossOrigin {
            frame: self.origin.to_string(),
            host: "relay".to_string(),
        })
    }
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(
    State(app): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if app.is_draining() {
        return reject(&app, "draining", StatusCode::SERVICE_UNAVAILABLE);
    }

    let Some(origin) = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(Origin::new)
    else {
        return reject(&app, "missing_origin", StatusCode::FORBIDDEN);
    };

    if let PolicyDecision::Close { reason } = app.policy().check_origin(&origin) {
        tracing::debug!(%origin, reason, "bridge handshake refused");
        return reject(&app, "origin_not_allowed", StatusCode::FORBIDDEN);
    }

    ws.on_upgrade(move |socket| {
        let span = tracing::info_span!("bridge_session", origin = %origin);
        async move {
            if let Err(e) = run_session(app, origin, socket).await {
                tracing::debug!(error = %e, "bridge session ended with error");
            }
        }
        .instrument(span)
    })
}

fn reject(app: &AppState, reason: &'static str, status: StatusCode) -> Response {
    app.metrics().socket_rejections.inc(&[("reason", reason)]);
    (status, reason).into_response()
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, origin: Origin, socket: WebSocket) -> Result<()> {
    let metrics = app.metrics();

    // ---- outbound channel
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(OUTBOUND_CAPACITY);

    // ---- split socket
    let (mut ws_tx, mut ws_rx) = socket.split();

    // ---- attach + load-time injection
    let frame = Arc::new(RemoteFrame::new(origin.clone(), out_tx.clone()));
    let window = frame.window_id();
    let host = app.new_host();
    host.attach(frame);
    if let Err(e) = host.on_frame_load() {
        tracing::warn!(frame = %window, error = %e, "provider injection failed");
    }

    // ---- timers
    let gw = &app.cfg().gateway;
    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                last_activity = Instant::now();

                if let PolicyDecision::Close { reason } = app.policy().check_len(frame_len(&msg)) {
                    tracing::warn!(frame = %window, reason, "closing bridge session");
                    break;
                }

                match decode(msg) {
                    Ok(Inbound::Data { value, .. }) => {
                        host.handle_message(MessageEvent {
                            source: window,
                            origin: origin.clone(),
                            data: value,
                        });
                    }
                    Ok(Inbound::Ping(payload)) => {
                        let _ = out_tx.try_send(Message::Pong(payload));
                    }
                    Ok(Inbound::Pong(_)) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        // Malformed traffic is ignored, never answered.
                        tracing::debug!(frame = %window, error = %e, "undecodable frame ignored");
                        metrics.ignored_messages.inc(&[("reason", "malformed")]);
                    }
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::debug!(frame = %window, "idle timeout");
                    break;
                }
            }
        }
    }

    host.detach();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn remote_frame_scopes_delivery_to_its_origin() {
        let (tx, mut rx) = mpsc::channel(8);
        let frame = RemoteFrame::new(Origin::new("https://miniapp.test"), tx);
        let port = frame.content_window();

        port.post_message(json!({"id": 1}), TargetOrigin::Exact(Origin::new("https://evil.test")))
            .unwrap();
        port.post_message(json!({"id": 2}), TargetOrigin::Exact(Origin::new("https://miniapp.test")))
            .unwrap();
        port.post_message(json!({"id": 3}), TargetOrigin::Any).unwrap();

        let mut seen = Vec::new();
        while let Ok(Message::Text(s)) = rx.try_recv() {
            seen.push(s);
        }
        assert_eq!(seen, vec![r#"{"id":2}"#.to_string(), r#"{"id":3}"#.to_string()]);
    }

    #[test]
    fn remote_frame_never_injects_directly() {
        let (tx, _rx) = mpsc::channel(1);
        let frame = RemoteFrame::new(Origin::new("https://miniapp.test"), tx);
        assert!(matches!(
            frame.inject_same_origin("void 0"),
            Err(InjectError::CrossOrigin { .. })
        ));
    }

    #[test]
    fn full_outbound_queue_is_a_transport_error() {
        let (tx, _rx) = mpsc::channel(1);
        let frame = RemoteFrame::new(Origin::new("https://miniapp.test"), tx);
        frame.post_message(json!(1), TargetOrigin::Any).unwrap();
        let err = frame.post_message(json!(2), TargetOrigin::Any).unwrap_err();
        assert!(matches!(err, BridgeError::Transport(_)));
    }
}
