//! Configuration for ticket stores and the session adapter.

use std::time::Duration;

/// Prefix applied to every key the in-process store writes into a shared cache.
pub const DEFAULT_KEY_PREFIX: &str = "cas-st:";

/// Default capacity of the in-process cache before LRU eviction.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default interval for the opt-in cleanup task.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the ticket store backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Namespace for in-process cache keys.
    pub key_prefix: String,

    /// Maximum number of entries held by the in-process cache.
    pub max_entries: usize,

    /// Interval for [`MemoryCache::spawn_cleanup_task`](crate::MemoryCache::spawn_cleanup_task).
    pub cleanup_interval: Duration,

    /// Upper bound on a single distributed backend call. `None` waits forever.
    pub operation_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            operation_timeout: None,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    pub fn without_operation_timeout(mut self) -> Self {
        self.operation_timeout = None;
        self
    }
}

/// Configuration for [`SessionStoreAdapter`](crate::SessionStoreAdapter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Build a minimal assertion for sessions whose principal did not come
    /// from a CAS validation. When off, such sessions are rejected.
    pub synthesize_assertion: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            synthesize_assertion: true,
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synthesize_assertion(mut self, enabled: bool) -> Self {
        self.synthesize_assertion = enabled;
        self
    }
}
