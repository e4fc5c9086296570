//! Minimal ambient observability surface: a health and status endpoint.
//! The control core itself has no external API — schedules and prices
//! arrive over the driver traits in `hardware`/`predictor`, not HTTP.
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct ApiState {
    pub cfg: Arc<Config>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    tick_period_secs: u64,
    bess_is_emulated: bool,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        tick_period_secs: state.cfg.controller.tick_period_secs,
        bess_is_emulated: state.cfg.controller.bess_is_emulated,
    })
}

pub fn router(cfg: Arc<Config>) -> Router {
    let state = ApiState { cfg };
    Router::new()
        .route("/healthz", get(health))
        .route("/status", get(status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
