//! Operational HTTP endpoints.
//!
//! - `/healthz`                  : liveness
//! - `/v1/presence/online`       : sorted online identities
//! - `/v1/presence/{identity}`   : live connection ids, 404 when offline

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn online(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "users": state.hub().online_identities() }))
}

pub async fn connections(State(state): State<AppState>, Path(identity): Path<String>) -> Response {
    match state.hub().connections_for(&identity) {
        Some(conns) => Json(json!({ "identity": identity, "connections": conns })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "identity": identity, "online": false }))).into_response(),
    }
}
