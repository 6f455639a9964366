//! In-process cache backend.
//!
//! [`MemoryCache`] is a process-wide, bounded cache of shared values with
//! per-entry absolute expiration. It is type-erased so unrelated components
//! can share one instance; [`MemoryTicketStore`] keeps its entries apart by
//! prefixing every key.

use std::any::Any;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use cas_ticket::{Clock, ServiceTicket, SystemClock};
use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError, validate_key};
use crate::expiry::ExpiryTracker;
use crate::store::TicketStore;

/// Value held by a [`MemoryCache`].
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Entry stored in the cache.
#[derive(Clone)]
pub struct CacheEntry {
    /// Cached value, shared by reference.
    pub value: CachedValue,

    /// When this entry was inserted.
    pub cached_at: DateTime<Utc>,

    /// Instant after which the entry is no longer served.
    pub absolute_expiration: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("cached_at", &self.cached_at)
            .field("absolute_expiration", &self.absolute_expiration)
            .finish_non_exhaustive()
    }
}

/// Inner state protected by RwLock.
struct CacheInner {
    lru: LruCache<String, CacheEntry>,
    expiry: ExpiryTracker,
}

/// Bounded in-process cache with absolute expiration.
///
/// Cloning yields another handle onto the same cache. Expiry is evaluated
/// lazily on access against the injected [`Clock`]; [`cleanup_expired`]
/// sweeps the rest.
///
/// [`cleanup_expired`]: MemoryCache::cleanup_expired
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<RwLock<CacheInner>>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        let inner = CacheInner {
            lru: LruCache::new(cap),
            expiry: ExpiryTracker::new(),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
            capacity: cap.get(),
            clock,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Fetch a live entry, marking it recently used.
    ///
    /// An expired entry is dropped and reported as absent.
    pub async fn get(&self, key: &str) -> Option<CachedValue> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        if inner.expiry.is_expired(key, now) {
            debug!(key = %key, "Cache entry expired, removing");
            inner.lru.pop(key);
            inner.expiry.remove(key);
            return None;
        }

        let value = inner.lru.get(key).map(|entry| Arc::clone(&entry.value));
        trace!(key = %key, hit = value.is_some(), "Cache lookup");
        value
    }

    /// Insert or replace an entry.
    ///
    /// At capacity, expired entries are swept first; only if none were
    /// expired is the least recently used entry evicted.
    pub async fn set(
        &self,
        key: &str,
        value: CachedValue,
        absolute_expiration: Option<DateTime<Utc>>,
    ) {
        let now = self.clock.now();
        let entry = CacheEntry {
            value,
            cached_at: now,
            absolute_expiration,
        };

        let mut inner = self.inner.write().await;
        if inner.lru.len() >= self.capacity && !inner.lru.contains(key) {
            for expired in inner.expiry.drain_expired(now) {
                if inner.lru.pop(&expired).is_some() {
                    debug!(key = %expired, "Dropping expired entry to make room");
                }
            }
        }
        if let Some((evicted, _)) = inner.lru.push(key.to_string(), entry) {
            if evicted != key {
                debug!(key = %evicted, "Evicting LRU entry to make room");
                inner.expiry.remove(&evicted);
            }
        }
        inner.expiry.set(key, absolute_expiration);

        trace!(
            key = %key,
            expires = ?absolute_expiration,
            cache_size = inner.lru.len(),
            "Entry inserted into cache"
        );
    }

    /// Remove an entry. Returns whether one was present.
    pub async fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        inner.expiry.remove(key);
        inner.lru.pop(key).is_some()
    }

    /// Check for a live entry without updating LRU order.
    pub async fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        let inner = self.inner.read().await;
        inner.lru.contains(key) && !inner.expiry.is_expired(key, now)
    }

    /// Peek at an entry without updating LRU order.
    pub async fn peek_entry(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        let inner = self.inner.read().await;
        if inner.expiry.is_expired(key, now) {
            None
        } else {
            inner.lru.peek(key).cloned()
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        let expired = inner.expiry.drain_expired(now);
        let mut count = 0;

        for key in expired {
            if inner.lru.pop(&key).is_some() {
                debug!(key = %key, "Cleaning up expired entry");
                count += 1;
            }
        }

        if count > 0 {
            debug!(count = count, "Cleaned up expired entries");
        }

        count
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: self.capacity,
            with_expiration: inner.expiry.len(),
        }
    }

    /// Spawn a task that calls [`cleanup_expired`](Self::cleanup_expired)
    /// every `interval`.
    ///
    /// Store operations never start this themselves; the host decides.
    /// Abort the returned handle to stop it.
    pub fn spawn_cleanup_task(&self, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = cache.cleanup_expired().await;
                if removed > 0 {
                    info!(evicted = removed, "Ticket cache cleanup completed");
                } else {
                    trace!("Ticket cache cleanup: nothing expired");
                }
            }
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Entries carrying an absolute expiration.
    pub with_expiration: usize,
}

/// Ticket store over a shared [`MemoryCache`].
///
/// Tickets are held by reference; nothing is serialized.
#[derive(Clone)]
pub struct MemoryTicketStore {
    cache: MemoryCache,
    key_prefix: String,
    cleanup_interval: std::time::Duration,
}

impl MemoryTicketStore {
    /// Create a store with its own cache sized from `config`.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_cache(MemoryCache::new(config.max_entries), config)
    }

    /// Create a store over an existing (possibly shared) cache.
    pub fn with_cache(cache: MemoryCache, config: &StoreConfig) -> Self {
        Self {
            cache,
            key_prefix: config.key_prefix.clone(),
            cleanup_interval: config.cleanup_interval,
        }
    }

    /// The underlying cache handle.
    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    /// Start sweeping the cache at the configured cleanup interval.
    pub fn spawn_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        debug!(interval = ?self.cleanup_interval, "Starting ticket cache cleanup");
        self.cache.spawn_cleanup_task(self.cleanup_interval)
    }

    fn cache_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn put(&self, key: &str, ticket: ServiceTicket) {
        let expires = ticket.absolute_expiration();
        let value: CachedValue = Arc::new(ticket);
        self.cache.set(&self.cache_key(key), value, expires).await;
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn store(&self, ticket: ServiceTicket) -> Result<String> {
        let key = ticket.ticket_id().to_string();
        self.put(&key, ticket).await;
        debug!(key = %key, "Service ticket stored");
        Ok(key)
    }

    async fn retrieve(&self, key: &str) -> Result<Option<ServiceTicket>> {
        let key = validate_key(key)?;
        let Some(value) = self.cache.get(&self.cache_key(key)).await else {
            trace!(key = %key, "Service ticket not found");
            return Ok(None);
        };

        match value.downcast::<ServiceTicket>() {
            Ok(ticket) => Ok(Some(ServiceTicket::clone(&ticket))),
            Err(_) => {
                warn!(key = %key, "Cache entry under ticket key is not a service ticket");
                Err(StoreError::Deserialization(format!(
                    "entry for '{key}' is not a service ticket"
                )))
            }
        }
    }

    async fn renew(&self, key: &str, ticket: ServiceTicket) -> Result<()> {
        let key = validate_key(key)?;
        if ticket.ticket_id() != key {
            warn!(key = %key, ticket_id = %ticket.ticket_id(), "Renewing key with a different ticket id");
        }
        self.put(key, ticket).await;
        debug!(key = %key, "Service ticket renewed");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        let existed = self.cache.remove(&self.cache_key(key)).await;
        debug!(key = %key, existed = existed, "Service ticket removed");
        Ok(())
    }
}
