#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tokio::sync::mpsc;

use framebridge_core::protocol::{classify, CallEnvelope, Inbound};
use framebridge_gateway::app_state::AppState;
use framebridge_gateway::config;
use framebridge_gateway::host::{Disposition, InjectionPath};
use framebridge_gateway::ops::{self, EmbedCheckRequest, MiniAppQuery};
use framebridge_gateway::policy::PolicyDecision;
use framebridge_gateway::transport::ws::RemoteFrame;
use framebridge_gateway::transport::{MessageEvent, MessagePort, Origin};

fn state(yaml: &str) -> AppState {
    AppState::new(config::load_from_str(yaml).unwrap()).unwrap()
}

#[test]
fn bad_origin_rule_fails_startup() {
    let cfg = config::load_from_str("version: 1\nbridge: { allowed_origins: [\"example.com\"] }\n").unwrap();
    assert!(AppState::new(cfg).is_err());
}

#[test]
fn handshake_policy_follows_allowed_origins() {
    let app = state("version: 1\nbridge: { allowed_origins: [\"https://*.miniapp.test\"] }\n");
    assert_eq!(
        app.policy().check_origin(&Origin::new("https://a.miniapp.test")),
        PolicyDecision::Pass
    );
    assert!(matches!(
        app.policy().check_origin(&Origin::new("https://elsewhere.test")),
        PolicyDecision::Close { .. }
    ));
    assert!(matches!(
        app.policy().check_origin(&Origin::opaque()),
        PolicyDecision::Close { .. }
    ));
}

#[tokio::test]
async fn remote_frame_session_round_trip() {
    let app = state("version: 1\n");
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let frame = Arc::new(RemoteFrame::new(Origin::new("https://miniapp.test"), out_tx));
    let window = frame.window_id();

    let host = app.new_host();
    host.attach(frame);
    assert_eq!(host.on_frame_load().unwrap(), InjectionPath::Message);

    // First outbound frame is the rendered stub.
    let first = match out_rx.recv().await.unwrap() {
        axum::extract::ws::Message::Text(s) => serde_json::from_str(&s).unwrap(),
        other => panic!("unexpected {other:?}"),
    };
    match classify(&first) {
        Inbound::Inject(req) => {
            assert!(req.script.contains("\"rdns\":\"app.framebridge\""));
        }
        other => panic!("unexpected {}", other.kind()),
    }

    let call = serde_json::to_value(CallEnvelope::new(1, "eth_chainId", vec![])).unwrap();
    let d = host.handle_message(MessageEvent {
        source: window,
        origin: Origin::new("https://miniapp.test"),
        data: call,
    });
    assert_eq!(d, Disposition::Dispatched { id: 1 });

    let reply = match out_rx.recv().await.unwrap() {
        axum::extract::ws::Message::Text(s) => serde_json::from_str::<serde_json::Value>(&s).unwrap(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(reply, json!({"jsonrpc": "2.0", "id": 1, "result": "0x2105"}));

    let metrics = app.metrics();
    assert_eq!(metrics.frames_active.get(&[]), 1);
    host.detach();
    assert_eq!(metrics.frames_active.get(&[]), 0);
    assert_eq!(metrics.calls.get(&[("method", "eth_chainId"), ("outcome", "ok")]), 1);
}

#[tokio::test]
async fn simulated_wallet_switch_is_visible_to_calls_and_metrics() {
    let app = state("version: 1\n");
    let wallet = app.simulated_wallet().expect("simulated by default");
    let text = ops::metrics(State(app.clone())).await;
    assert_eq!(text.status(), StatusCode::OK);
    assert!(app.metrics().render(&app.metrics_extra()).contains("framebridge_wallet_connected 1"));

    wallet.disconnect();
    assert!(app.metrics().render(&app.metrics_extra()).contains("framebridge_wallet_connected 0"));

    let disabled = state("version: 1\nwallet: { mode: disabled }\n");
    assert!(disabled.simulated_wallet().is_none());
}

#[tokio::test]
async fn readiness_flips_when_draining() {
    let app = state("version: 1\n");
    let ready = ops::readyz(State(app.clone())).await.into_response();
    assert_eq!(ready.status(), StatusCode::OK);

    app.set_draining();
    let draining = ops::readyz(State(app.clone())).await.into_response();
    assert_eq!(draining.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ops::healthz().await.into_response().status(), StatusCode::OK);
}

#[tokio::test]
async fn miniapp_endpoint_normalizes_or_rejects() {
    let ok = ops::miniapp(Query(MiniAppQuery {
        url: "uniswap.org".into(),
    }))
    .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let bad = ops::miniapp(Query(MiniAppQuery { url: "  ".into() })).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn embed_check_endpoint_reports_reason() {
    let mut headers = BTreeMap::new();
    headers.insert("X-Frame-Options".to_string(), "DENY".to_string());
    let Json(res) = ops::embed_check(Json(EmbedCheckRequest {
        headers,
        host_scheme: "vscode-webview".into(),
    }))
    .await;
    assert!(res.blocked);
    assert_eq!(res.reason.as_deref(), Some("x-frame-options: deny"));

    let Json(res) = ops::embed_check(Json(EmbedCheckRequest {
        headers: BTreeMap::new(),
        host_scheme: "https".into(),
    }))
    .await;
    assert!(!res.blocked);
    assert!(res.reason.is_none());
}
