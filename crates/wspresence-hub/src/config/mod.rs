//! Hub config loader (strict parsing).

pub mod schema;

use std::fs;

use wspresence_core::error::{Result, WsPresenceError};

pub use schema::{AuthSection, HubConfig, HubSection, TicketEntry};

/// Env var consulted when no path is passed on the command line.
pub const CONFIG_ENV: &str = "WSPRESENCE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "wspresence.yaml";

pub fn load_from_file(path: &str) -> Result<HubConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WsPresenceError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<HubConfig> {
    let cfg: HubConfig = serde_yaml::from_str(s)
        .map_err(|e| WsPresenceError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// First CLI argument, then `WSPRESENCE_CONFIG`, then `wspresence.yaml`.
pub fn resolve_path(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}
