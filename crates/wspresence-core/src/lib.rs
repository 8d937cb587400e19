//! wsPresence core: the presence registry, error types, and wire envelope.
//!
//! This crate owns the identity -> connections bookkeeping that the hub turns
//! into online/offline events. It carries no transport or runtime
//! dependencies so it can be tested and embedded in isolation.
//!
//! # Guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Caller contract violations surface as `WsPresenceError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod registry;

/// Shared result type.
pub use error::{Result, WsPresenceError};
pub use registry::{PresenceRegistry, PresenceState, Transition};
