//! Axum router wiring (HTTP -> WS upgrade, ops endpoints).

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/bridge", get(transport::ws::ws_upgrade))
        .route("/v1/miniapp", get(ops::miniapp))
        .route("/v1/embed-check", post(ops::embed_check))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
