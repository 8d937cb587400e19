//! Text envelope (JSON).
//!
//! The core stores `data` as `RawValue` so services parse only what they route.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{Result, WsPresenceError};

/// The only envelope version the hub speaks.
pub const PROTOCOL_VERSION: u8 = 1;

/// Inbound envelope (Text frame).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Protocol version.
    pub v: u8,
    /// Service name (e.g., "msg").
    pub svc: String,
    /// Message type (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Feature flags bitmask.
    #[serde(default)]
    pub flags: u32,
    /// Optional payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl Envelope {
    /// Parse and version-check a text frame.
    pub fn parse(s: &str) -> Result<Self> {
        let env: Envelope = serde_json::from_str(s)
            .map_err(|e| WsPresenceError::BadRequest(format!("invalid envelope json: {e}")))?;
        if env.v != PROTOCOL_VERSION {
            return Err(WsPresenceError::UnsupportedVersion);
        }
        Ok(env)
    }

    /// `svc:type`, used in logs and dispatch errors.
    pub fn route(&self) -> String {
        format!("{}:{}", self.svc, self.msg_type)
    }

    /// Deserialize `data` into a service-specific request.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .data
            .as_ref()
            .ok_or_else(|| WsPresenceError::BadRequest(format!("{} requires data", self.route())))?;
        serde_json::from_str(raw.get())
            .map_err(|e| WsPresenceError::BadRequest(format!("{} invalid data: {e}", self.route())))
    }
}
