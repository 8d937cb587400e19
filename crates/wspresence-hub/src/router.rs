//! Axum router wiring.
//!
//! `/v1/ws` upgrades to the presence session; the rest are plain HTTP
//! lookups served from the same registry.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/ws", get(transport::ws::ws_upgrade))
        .route("/v1/presence/online", get(ops::online))
        .route("/v1/presence/:identity", get(ops::connections))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
