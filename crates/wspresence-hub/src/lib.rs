//! wsPresence hub library entry.
//!
//! This crate wires the transport, dispatcher, presence hub, and built-in
//! services around a shared `PresenceRegistry`. It is intended to be consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod services;
pub mod transport;
