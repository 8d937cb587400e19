//! Realtime runtime (egress engine) for the wsPresence hub.

pub mod core;
pub mod types;

pub use core::{Connection, ConnectionTable, Delivery, PresenceHub, RealtimeCtx};
pub use types::{Outgoing, PreparedMsg};
