//! WebSocket handler.
//!
//! Responsibilities:
//! - Resolve the ticket to an identity before upgrading (401 otherwise)
//! - Attach the session to the presence hub, detach it however the loop ends
//! - Lifecycle: ping + idle timeout, frame size cap
//! - Decode-once then hand envelopes to the dispatcher

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use wspresence_core::error::{Result, WsPresenceError};

use crate::app_state::AppState;
use crate::realtime::{Outgoing, PreparedMsg, RealtimeCtx};
use crate::transport::codec::{decode, frame_len, Inbound};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub ticket: String,
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
) -> Response {
    let identity = match app.resolve_ticket(&q.ticket) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("ws handshake rejected: {e}");
            return (StatusCode::UNAUTHORIZED, e.client_code().as_str()).into_response();
        }
    };

    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, identity, socket).await {
            tracing::warn!("ws session ended with error: {e}");
        }
    })
}

async fn run_session(app: AppState, identity: String, socket: WebSocket) -> Result<()> {
    let hub = app.hub();
    let (out_tx, out_rx) = mpsc::channel::<Message>(app.cfg().hub.outbound_queue);

    let connection_id = hub.attach(&identity, out_tx.clone())?;
    let span = tracing::info_span!("session", identity = %identity, conn = %connection_id);

    let ctx = RealtimeCtx::new(identity, connection_id.clone(), hub.clone());
    let res = session_loop(&app, ctx, socket, out_tx, out_rx)
        .instrument(span)
        .await;

    // Runs on every exit path: close, transport error, idle timeout.
    hub.detach(&connection_id)?;
    res
}

// try_send only: this loop is the queue's sole reader, awaiting capacity here
// would never finish.
fn send_event(out_tx: &mpsc::Sender<Message>, out: &Outgoing) {
    if let Ok(prepared) = PreparedMsg::prepare(out) {
        let _ = out_tx.try_send(prepared.to_ws_message());
    }
}

async fn session_loop(
    app: &AppState,
    ctx: RealtimeCtx,
    socket: WebSocket,
    out_tx: mpsc::Sender<Message>,
    mut out_rx: mpsc::Receiver<Message>,
) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let dispatcher = app.dispatcher();

    let cfg = &app.cfg().hub;
    let max_frame = cfg.max_frame_bytes;
    let idle_timeout = Duration::from_millis(cfg.idle_timeout_ms);
    let mut ping_tick = tokio::time::interval(Duration::from_millis(cfg.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                ws_tx
                    .send(m)
                    .await
                    .map_err(|e| WsPresenceError::Internal(format!("ws send failed: {e}")))?;
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };
                last_activity = Instant::now();

                if frame_len(&msg) > max_frame {
                    send_event(&out_tx, &Outgoing::frame_too_large(max_frame));
                    continue;
                }

                let decoded = match decode(msg) {
                    Ok(d) => d,
                    Err(e) => {
                        send_event(&out_tx, &Outgoing::from_error(&e));
                        continue;
                    }
                };

                match decoded {
                    Inbound::Text { env, bytes_len } => {
                        let route = env.route();
                        tracing::trace!(%route, bytes_len, "inbound");
                        if let Err(e) = dispatcher.dispatch_text(ctx.clone(), env).await {
                            tracing::debug!(%route, "dispatch failed: {e}");
                            send_event(&out_tx, &Outgoing::from_error(&e));
                        }
                    }
                    Inbound::Binary { bytes_len } => {
                        tracing::debug!(bytes_len, "binary frame rejected");
                        send_event(&out_tx, &Outgoing::error("BAD_REQUEST", "binary frames are not supported"));
                    }
                    Inbound::Ping(payload) => {
                        let _ = out_tx.try_send(Message::Pong(payload));
                    }
                    Inbound::Pong(_) => {}
                    Inbound::Close => break,
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::info!("idle timeout");
                    if let Ok(p) = PreparedMsg::prepare(&Outgoing::timeout()) {
                        let _ = ws_tx.send(p.to_ws_message()).await;
                    }
                    break;
                }
            }
        }
    }

    Ok(())
}
