use std::collections::HashSet;
use std::net::SocketAddr;

use serde::Deserialize;
use wspresence_core::error::{Result, WsPresenceError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    pub version: u32,

    #[serde(default)]
    pub hub: HubSection,

    pub auth: AuthSection,
}

impl HubConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WsPresenceError::UnsupportedVersion);
        }

        self.hub.validate()?;
        self.auth.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Per-connection outbound queue depth; broadcasts drop when it is full.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

impl HubSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(WsPresenceError::BadRequest(
                "hub.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(WsPresenceError::BadRequest(
                "hub.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(WsPresenceError::BadRequest(
                "hub.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(64..=1_048_576).contains(&self.max_frame_bytes) {
            return Err(WsPresenceError::BadRequest(
                "hub.max_frame_bytes must be between 64 and 1048576".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(WsPresenceError::BadRequest(
                "hub.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| WsPresenceError::BadRequest(format!("hub.listen is not a socket address: {e}")))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_max_frame_bytes() -> usize {
    4096
}
fn default_outbound_queue() -> usize {
    1024
}

/// Static ticket -> identity table. Tickets are issued by the account layer.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    pub tickets: Vec<TicketEntry>,
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if self.tickets.is_empty() {
            return Err(WsPresenceError::BadRequest("auth.tickets must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for t in &self.tickets {
            if t.ticket.is_empty() || t.identity.is_empty() {
                return Err(WsPresenceError::BadRequest(
                    "auth.tickets entries need a non-empty ticket and identity".into(),
                ));
            }
            if !seen.insert(t.ticket.as_str()) {
                return Err(WsPresenceError::BadRequest(format!(
                    "auth.tickets has duplicate ticket for identity {}",
                    t.identity
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketEntry {
    pub ticket: String,
    pub identity: String,
}
