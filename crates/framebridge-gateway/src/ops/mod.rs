//! Operational and helper HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - `/metrics` : Prometheus text format
//! - `/v1/miniapp?url=` : normalized mini-app target
//! - `/v1/embed-check`  : embeddability verdict for probed response headers

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::miniapp::MiniApp;
use crate::policy::{check_embeddable, BlockReason, EmbedVerdict};

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let extra = state.metrics_extra();
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct MiniAppQuery {
    pub url: String,
}

pub async fn miniapp(Query(q): Query<MiniAppQuery>) -> Response {
    match MiniApp::from_input(&q.url) {
        Ok(app) => Json(app).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedCheckRequest {
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_host_scheme")]
    pub host_scheme: String,
}

fn default_host_scheme() -> String {
    "https".to_string()
}

#[derive(Debug, Serialize)]
pub struct EmbedCheckResponse {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<EmbedVerdict> for EmbedCheckResponse {
    fn from(v: EmbedVerdict) -> Self {
        let reason = match &v {
            EmbedVerdict::Embeddable => None,
            EmbedVerdict::Blocked(BlockReason::FrameOptions(x)) => Some(format!("x-frame-options: {x}")),
            EmbedVerdict::Blocked(BlockReason::FrameAncestors(d)) => Some(d.clone()),
        };
        Self {
            blocked: v.is_blocked(),
            reason,
        }
    }
}

pub async fn embed_check(Json(req): Json<EmbedCheckRequest>) -> Json<EmbedCheckResponse> {
    let verdict = check_embeddable(
        req.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        &req.host_scheme,
    );
    Json(verdict.into())
}
