//! Realtime core components for the hub runtime.
//!
//! Connection table, presence hub (lifecycle -> presence events, routing),
//! and the per-message context shared across services.

mod connections;
mod hub;

pub use connections::{Connection, ConnectionTable};
pub use hub::{Delivery, PresenceHub, RealtimeCtx};
