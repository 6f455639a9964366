//! The unit persisted by a ticket store.

use chrono::{DateTime, Utc};

use crate::assertion::Assertion;
use crate::claims::ClaimEntry;
use crate::error::{Result, TicketError};

/// A CAS-authenticated session in neutral form.
///
/// `ticket_id` is the store key and never changes; updates replace the whole
/// ticket under the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTicket {
    ticket_id: String,
    authentication_type: String,
    assertion: Assertion,
    claims: Vec<ClaimEntry>,
    issued_utc: Option<DateTime<Utc>>,
    expires_utc: Option<DateTime<Utc>>,
}

impl ServiceTicket {
    /// Create a ticket, rejecting an empty id or authentication type.
    pub fn new(
        ticket_id: impl Into<String>,
        authentication_type: impl Into<String>,
        assertion: Assertion,
        claims: Vec<ClaimEntry>,
    ) -> Result<Self> {
        let ticket_id = ticket_id.into();
        if ticket_id.is_empty() {
            return Err(TicketError::EmptyTicketId);
        }
        let authentication_type = authentication_type.into();
        if authentication_type.is_empty() {
            return Err(TicketError::EmptyAuthenticationType);
        }
        Ok(Self {
            ticket_id,
            authentication_type,
            assertion,
            claims,
            issued_utc: None,
            expires_utc: None,
        })
    }

    pub fn with_issued_utc(mut self, issued_utc: Option<DateTime<Utc>>) -> Self {
        self.issued_utc = issued_utc;
        self
    }

    pub fn with_expires_utc(mut self, expires_utc: Option<DateTime<Utc>>) -> Self {
        self.expires_utc = expires_utc;
        self
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn authentication_type(&self) -> &str {
        &self.authentication_type
    }

    pub fn assertion(&self) -> &Assertion {
        &self.assertion
    }

    pub fn claims(&self) -> &[ClaimEntry] {
        &self.claims
    }

    pub fn issued_utc(&self) -> Option<DateTime<Utc>> {
        self.issued_utc
    }

    pub fn expires_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_utc
    }

    /// Instant after which a cache must stop serving this ticket.
    ///
    /// Tied to the assertion, not to the session cookie: `None` means the
    /// entry lives until it is removed or evicted for capacity.
    pub fn absolute_expiration(&self) -> Option<DateTime<Utc>> {
        self.assertion.valid_until()
    }

    /// Time-of-check expiry for backends that cannot expire entries themselves.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.absolute_expiration()
            .is_some_and(|deadline| now >= deadline)
    }
}
