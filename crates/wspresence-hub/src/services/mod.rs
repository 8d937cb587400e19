//! Built-in text services.

mod message;
mod presence;

pub use message::MessageService;
pub use presence::PresenceService;
