//! Error types for ticket store operations.

use std::time::Duration;

use cas_ticket::{CodecError, TicketError};

/// Error type for ticket store operations.
///
/// A missing or expired entry is not an error; lookups return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key argument was empty. Caller bug; never retried.
    #[error("Invalid key: key must not be empty")]
    InvalidKey,

    /// Stored payload is corrupt or schema-incompatible.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Ticket could not be encoded for the backend.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O failure talking to the cache backend.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend call did not complete in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Session principal was not produced by a CAS validation and
    /// assertion synthesis is disabled.
    #[error("Session for '{0}' is not CAS-backed")]
    NotCasBacked(String),

    /// The session could not be turned into a valid service ticket.
    #[error("Invalid ticket: {0}")]
    Ticket(#[from] TicketError),
}

impl From<CodecError> for StoreError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Serialization(msg) => StoreError::Serialization(msg),
            CodecError::Deserialization(msg) => StoreError::Deserialization(msg),
            CodecError::Invalid(inner) => StoreError::Deserialization(inner.to_string()),
        }
    }
}

/// Result type for ticket store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Reject empty keys before touching a backend.
pub(crate) fn validate_key(key: &str) -> Result<&str> {
    if key.is_empty() {
        Err(StoreError::InvalidKey)
    } else {
        Ok(key)
    }
}
