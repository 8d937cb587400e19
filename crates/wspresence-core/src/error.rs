//! Shared error type across wsPresence crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message.
    BadRequest,
    /// Ticket did not resolve to an identity.
    AuthFailed,
    /// Empty identity or connection id handed to the registry.
    InvalidArgument,
    /// Connection id already registered.
    DuplicateConnection,
    /// Unsupported protocol or config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::InvalidArgument => "INVALID_ARGUMENT",
            ClientCode::DuplicateConnection => "DUPLICATE_CONNECTION",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WsPresenceError>;

/// Unified error type used by core and hub.
#[derive(Debug, Error)]
pub enum WsPresenceError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed")]
    AuthFailed,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("connection {0} is already registered")]
    DuplicateConnection(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl WsPresenceError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            WsPresenceError::BadRequest(_) => ClientCode::BadRequest,
            WsPresenceError::AuthFailed => ClientCode::AuthFailed,
            WsPresenceError::InvalidArgument(_) => ClientCode::InvalidArgument,
            WsPresenceError::DuplicateConnection(_) => ClientCode::DuplicateConnection,
            WsPresenceError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            WsPresenceError::Internal(_) => ClientCode::Internal,
        }
    }
}
