//! Ticket store over an opaque, byte-oriented cache.
//!
//! The cache may live out of process, so tickets cross it in their holder
//! form encoded by [`cas_ticket::codec`]. The encoded payload always embeds
//! `valid_until`, which lets this store discard stale entries at read time
//! even when the backend cannot expire them itself.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cas_ticket::{Clock, ServiceTicket, SystemClock, codec};
use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError, validate_key};
use crate::store::TicketStore;

/// Per-entry write options passed to a [`ByteCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Instant after which the backend should drop the entry.
    pub absolute_expiration: Option<DateTime<Utc>>,
}

/// Opaque key/value cache of byte payloads.
///
/// Implementations report I/O failures as [`StoreError::Backend`]. Each call
/// is expected to be atomic for its single key.
#[async_trait]
pub trait ByteCache: Send + Sync {
    /// Fetch a payload. `Ok(None)` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a payload, replacing any previous one.
    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<()>;

    /// Delete a payload. Absent keys are not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Whether `EntryOptions::absolute_expiration` is honoured.
    fn supports_expiration(&self) -> bool {
        true
    }
}

#[async_trait]
impl<C: ByteCache + ?Sized> ByteCache for Arc<C> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<()> {
        (**self).set(key, value, options).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }

    fn supports_expiration(&self) -> bool {
        (**self).supports_expiration()
    }
}

/// Ticket store backed by a [`ByteCache`].
///
/// Keys are the service ticket strings themselves.
pub struct DistributedTicketStore<C: ByteCache> {
    cache: C,
    clock: Arc<dyn Clock>,
    operation_timeout: Option<Duration>,
}

impl<C: ByteCache> DistributedTicketStore<C> {
    pub fn new(cache: C, config: &StoreConfig) -> Self {
        Self::with_clock(cache, config, Arc::new(SystemClock))
    }

    pub fn with_clock(cache: C, config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            operation_timeout: config.operation_timeout,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    async fn bounded<T>(&self, op: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(operation = op, timeout = ?limit, "Ticket cache call timed out");
                    Err(StoreError::Timeout(limit))
                }
            },
            None => fut.await,
        }
    }

    async fn write(&self, key: &str, ticket: &ServiceTicket) -> Result<()> {
        // Encode first; a codec failure leaves the previous value untouched.
        let payload = codec::encode(ticket)?;
        let options = EntryOptions {
            absolute_expiration: ticket.absolute_expiration(),
        };
        if options.absolute_expiration.is_some() && !self.cache.supports_expiration() {
            trace!(key = %key, "Backend cannot expire entries; relying on read-time check");
        }
        self.bounded("set", self.cache.set(key, payload, options))
            .await
    }
}

#[async_trait]
impl<C: ByteCache> TicketStore for DistributedTicketStore<C> {
    async fn store(&self, ticket: ServiceTicket) -> Result<String> {
        let key = ticket.ticket_id().to_string();
        self.write(&key, &ticket).await?;
        debug!(key = %key, "Service ticket stored");
        Ok(key)
    }

    async fn retrieve(&self, key: &str) -> Result<Option<ServiceTicket>> {
        let key = validate_key(key)?;
        let Some(payload) = self.bounded("get", self.cache.get(key)).await? else {
            trace!(key = %key, "Service ticket not found");
            return Ok(None);
        };

        // Corrupt entries are reported and left in place.
        let ticket: ServiceTicket = codec::decode(&payload).inspect_err(|e| {
            warn!(key = %key, error = %e, "Stored service ticket is unreadable");
        })?;

        if ticket.is_expired_at(self.clock.now()) {
            debug!(key = %key, "Service ticket past its absolute expiration");
            return Ok(None);
        }

        Ok(Some(ticket))
    }

    async fn renew(&self, key: &str, ticket: ServiceTicket) -> Result<()> {
        let key = validate_key(key)?;
        if ticket.ticket_id() != key {
            warn!(key = %key, ticket_id = %ticket.ticket_id(), "Renewing key with a different ticket id");
        }
        self.write(key, &ticket).await?;
        debug!(key = %key, "Service ticket renewed");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        self.bounded("remove", self.cache.remove(key)).await?;
        debug!(key = %key, "Service ticket removed");
        Ok(())
    }
}
