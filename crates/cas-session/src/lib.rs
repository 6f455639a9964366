//! CAS single-sign-out session store.
//!
//! Correlates a CAS service ticket with the locally issued authentication
//! session so that, when the CAS server reports the ticket invalid, the
//! session can be found and revoked. This crate provides:
//! - [`TicketStore`] — create/renew/retrieve/remove keyed by ticket id
//! - [`MemoryTicketStore`] — in-process backend over a shared [`MemoryCache`]
//! - [`DistributedTicketStore`] — backend over any byte-oriented [`ByteCache`]
//! - [`SessionStoreAdapter`] — translation to and from host session shapes
//!
//! Entries expire at the CAS assertion's `valid_until`; assertions without
//! one live until removed or evicted for capacity.
//!
//! # Example
//!
//! ```rust,ignore
//! use cas_session::{MemoryTicketStore, SessionStoreAdapter, StoreConfig};
//! use cas_ticket::SchemeTicket;
//!
//! let store = MemoryTicketStore::new(&StoreConfig::default());
//! let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
//!
//! let key = adapter.store(&session).await?;
//! // ... later, on a logout notification from the CAS server:
//! adapter.sign_out(&key).await?;
//! ```

mod adapter;
mod config;
mod distributed;
mod error;
mod expiry;
mod memory;
mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapter::{HostSession, SessionStoreAdapter};
pub use config::{
    AdapterConfig, DEFAULT_CLEANUP_INTERVAL, DEFAULT_KEY_PREFIX, DEFAULT_MAX_ENTRIES, StoreConfig,
};
pub use distributed::{ByteCache, DistributedTicketStore, EntryOptions};
pub use error::{Result, StoreError};
pub use expiry::ExpiryTracker;
pub use memory::{CacheEntry, CacheStats, CachedValue, MemoryCache, MemoryTicketStore};
pub use store::TicketStore;
