//! Error types for the ticket model and its codec.

/// Result type alias for ticket model operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Invariant violations raised while constructing model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    /// A service ticket must carry a ticket id.
    #[error("service ticket id must not be empty")]
    EmptyTicketId,

    /// A service ticket must name the authentication scheme that issued it.
    #[error("authentication type must not be empty")]
    EmptyAuthenticationType,

    /// An assertion must name a principal.
    #[error("assertion principal name must not be empty")]
    EmptyPrincipalName,

    /// `valid_from` is later than `valid_until`.
    #[error("invalid validity window: valid_from {valid_from} is after valid_until {valid_until}")]
    InvalidValidityWindow {
        valid_from: String,
        valid_until: String,
    },
}

/// Errors raised when encoding or decoding a portable payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The payload is corrupt or does not match the expected schema.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The payload decoded but describes an invalid entity.
    #[error("decoded payload is invalid: {0}")]
    Invalid(#[from] TicketError),
}
