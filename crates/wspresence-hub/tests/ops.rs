//! HTTP lookups served from the presence registry.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use wspresence_core::PresenceRegistry;
use wspresence_hub::app_state::AppState;
use wspresence_hub::{config, ops};

fn app_state() -> AppState {
    let cfg = config::load_from_str(
        r#"
version: 1
auth:
  tickets:
    - { ticket: "t-alice", identity: "alice" }
"#,
    )
    .unwrap();
    AppState::new(cfg, Arc::new(PresenceRegistry::new())).unwrap()
}

async fn body_json(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let res = ops::healthz().await.into_response();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn online_lists_identities_sorted() {
    let app = app_state();
    let hub = app.hub();
    let (tx1, _rx1) = mpsc::channel(8);
    let (tx2, _rx2) = mpsc::channel(8);
    let (tx3, _rx3) = mpsc::channel(8);
    hub.attach("carol", tx1).unwrap();
    hub.attach("alice", tx2).unwrap();
    hub.attach("carol", tx3).unwrap();

    let res = ops::online(State(app)).await.into_response();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({ "users": ["alice", "carol"] }));
}

#[tokio::test]
async fn connections_of_online_identity() {
    let app = app_state();
    let hub = app.hub();
    let (tx1, _rx1) = mpsc::channel(8);
    let (tx2, _rx2) = mpsc::channel(8);
    let c1 = hub.attach("alice", tx1).unwrap();
    let c2 = hub.attach("alice", tx2).unwrap();

    let res = ops::connections(State(app), Path("alice".to_string())).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["identity"], "alice");
    let mut conns: Vec<String> = body["connections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    conns.sort();
    let mut expected = vec![c1, c2];
    expected.sort();
    assert_eq!(conns, expected);
}

#[tokio::test]
async fn offline_identity_is_not_found() {
    let app = app_state();
    let hub = app.hub();
    let (tx, _rx) = mpsc::channel(8);
    let conn = hub.attach("alice", tx).unwrap();
    hub.detach(&conn).unwrap();

    let res = ops::connections(State(app.clone()), Path("alice".to_string())).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await, json!({ "identity": "alice", "online": false }));

    let res = ops::online(State(app)).await.into_response();
    assert_eq!(body_json(res).await, json!({ "users": [] }));
}
