//! CAS assertion and service ticket model.
//!
//! This crate holds the neutral representation that the session store
//! persists, plus the host-framework session shapes it is translated from:
//! - [`Assertion`] — what the CAS server vouched for
//! - [`ClaimEntry`] — a framework-neutral claim
//! - [`ServiceTicket`] — the unit a ticket store keeps
//! - [`SchemeTicket`] / [`IdentityTicket`] — the two host session shapes
//! - [`holder`] and [`codec`] — portable forms and their byte encoding
//!
//! # Example
//!
//! ```rust,ignore
//! use cas_ticket::{codec, Assertion, ClaimEntry, ServiceTicket};
//!
//! let assertion = Assertion::new("alice")?;
//! let ticket = ServiceTicket::new("ST-1", "CAS", assertion, vec![ClaimEntry::new("role", "admin")])?;
//! let bytes = codec::encode(&ticket)?;
//! let back: ServiceTicket = codec::decode(&bytes)?;
//! ```

mod assertion;
mod claims;
mod clock;
pub mod codec;
mod error;
pub mod holder;
mod host;
mod ticket;

pub use assertion::{Assertion, Attributes};
pub use claims::{
    CLAIM_VALUE_TYPE_STRING, Claim, ClaimEntry, DEFAULT_ISSUER, NAME_CLAIM_TYPE, ROLE_CLAIM_TYPE,
    from_entries, to_entries,
};
#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use error::{CodecError, Result, TicketError};
pub use holder::Portable;
pub use host::{
    AuthProperties, Identity, IdentityTicket, Principal, SERVICE_TICKET_PROPERTY, SchemeTicket,
};
pub use ticket::ServiceTicket;
