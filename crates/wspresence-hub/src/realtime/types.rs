use axum::extract::ws::Message;
use serde_json::{json, Value};

use wspresence_core::error::{ClientCode, Result, WsPresenceError};
use wspresence_core::protocol::PROTOCOL_VERSION;

/// Application-level outgoing event, shaped like the inbound envelope.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub svc: &'static str,
    pub msg_type: &'static str,
    pub data: Value,
}

impl Outgoing {
    pub fn new(svc: &'static str, msg_type: &'static str, data: Value) -> Self {
        Self { svc, msg_type, data }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "v": PROTOCOL_VERSION,
            "svc": self.svc,
            "type": self.msg_type,
            "flags": 0,
            "data": self.data,
        })
    }

    // ---- sys

    pub fn authed(identity: &str, connection_id: &str) -> Self {
        Self::new("sys", "authed", json!({ "identity": identity, "connection_id": connection_id }))
    }

    pub fn error(code: &str, msg: &str) -> Self {
        Self::new("sys", "error", json!({ "code": code, "msg": msg }))
    }

    pub fn from_error(e: &WsPresenceError) -> Self {
        Self::error(e.client_code().as_str(), &e.to_string())
    }

    pub fn timeout() -> Self {
        Self::error("TIMEOUT", "idle timeout")
    }

    pub fn frame_too_large(max: usize) -> Self {
        Self::error(
            ClientCode::BadRequest.as_str(),
            &format!("frame exceeds {max} bytes"),
        )
    }

    // ---- presence

    pub fn user_online(identity: &str) -> Self {
        Self::new("presence", "user_online", json!({ "identity": identity }))
    }

    pub fn user_offline(identity: &str) -> Self {
        Self::new("presence", "user_offline", json!({ "identity": identity }))
    }

    pub fn online_users(users: Vec<String>) -> Self {
        Self::new("presence", "online_users", json!({ "users": users }))
    }

    // ---- direct messages

    pub fn msg_received(from: &str, body: &str) -> Self {
        Self::new("msg", "received", json!({ "from": from, "body": body }))
    }

    pub fn msg_sent(to: &str, delivered: usize) -> Self {
        Self::new("msg", "sent", json!({ "to": to, "delivered": delivered }))
    }

    pub fn msg_undelivered(to: &str) -> Self {
        Self::new("msg", "undelivered", json!({ "to": to, "reason": "offline" }))
    }
}

/// Serialized once, sent to N connections.
#[derive(Debug, Clone)]
pub struct PreparedMsg(String);

impl PreparedMsg {
    pub fn prepare(out: &Outgoing) -> Result<Self> {
        serde_json::to_string(&out.to_json())
            .map(PreparedMsg)
            .map_err(|e| WsPresenceError::Internal(format!("json encode failed: {e}")))
    }

    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.clone())
    }
}
