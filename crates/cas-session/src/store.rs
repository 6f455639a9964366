//! The ticket store contract shared by every backend.
//!
//! All four operations address a single key. The store makes no cross-key
//! or read-modify-write guarantee: a `retrieve` followed by a `renew` can
//! race a concurrent `remove`, and the backend's own single-key atomicity is
//! all that is relied upon. Dropping an operation's future cancels it and
//! leaves the entry in whatever state the backend reached.

use std::sync::Arc;

use async_trait::async_trait;
use cas_ticket::ServiceTicket;

use crate::error::Result;

/// Persistence for service tickets keyed by ticket id.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persist `ticket` under its own ticket id and return that key.
    ///
    /// The entry expires at the assertion's `valid_until`, if any.
    async fn store(&self, ticket: ServiceTicket) -> Result<String>;

    /// Look up a ticket.
    ///
    /// Returns `Ok(None)` when the key is absent or has expired.
    ///
    /// # Errors
    ///
    /// `InvalidKey` for an empty key; `Deserialization` for an unusable
    /// stored payload; `Backend` on I/O failure.
    async fn retrieve(&self, key: &str) -> Result<Option<ServiceTicket>>;

    /// Replace the ticket stored under `key`, resetting its expiration.
    async fn renew(&self, key: &str, ticket: ServiceTicket) -> Result<()>;

    /// Remove the entry for `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: TicketStore + ?Sized> TicketStore for Arc<T> {
    async fn store(&self, ticket: ServiceTicket) -> Result<String> {
        (**self).store(ticket).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<ServiceTicket>> {
        (**self).retrieve(key).await
    }

    async fn renew(&self, key: &str, ticket: ServiceTicket) -> Result<()> {
        (**self).renew(key, ticket).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}
