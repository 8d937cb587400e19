//! Wire format shared by the hub and its clients.
//!
//! Text frames carry a JSON envelope whose `data` stays raw until a service
//! asks for it. Parsing never panics: malformed input is reported as
//! `WsPresenceError`.

pub mod text;

pub use text::{Envelope, PROTOCOL_VERSION};
