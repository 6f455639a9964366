//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [store]
//! backend = "distributed"
//! key_prefix = "cas-st:"
//! max_entries = 10000
//! cleanup_interval_secs = 60
//! operation_timeout_ms = 2000
//!
//! [adapter]
//! synthesize_assertion = true
//! ```

use std::time::Duration;

use cas_session::{AdapterConfig, DEFAULT_KEY_PREFIX, DEFAULT_MAX_ENTRIES, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Root configuration structure.
///
/// Both sections are optional so partial files (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasConfig {
    /// Ticket store settings.
    pub store: Option<StoreSection>,

    /// Session adapter settings.
    pub adapter: Option<AdapterSection>,
}

impl CasConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: CasConfig) {
        if other.store.is_some() {
            self.store = other.store;
        }

        if other.adapter.is_some() {
            self.adapter = other.adapter;
        }
    }

    /// Reject values the store cannot run with.
    pub fn validate(&self) -> Result<()> {
        if let Some(store) = &self.store {
            if store.max_entries == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "store.max_entries".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if store.key_prefix.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "store.key_prefix".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            if store.cleanup_interval_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "store.cleanup_interval_secs".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if store.operation_timeout_ms == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "store.operation_timeout_ms".to_string(),
                    reason: "must be greater than zero; omit it to disable the timeout"
                        .to_string(),
                });
            }
        }
        Ok(())
    }

    /// Which backend the host should build.
    pub fn backend(&self) -> StoreBackend {
        self.store.as_ref().map(|s| s.backend).unwrap_or_default()
    }

    /// Store settings, defaults filled in.
    pub fn store_config(&self) -> StoreConfig {
        self.store.clone().unwrap_or_default().into()
    }

    /// Adapter settings, defaults filled in.
    pub fn adapter_config(&self) -> AdapterConfig {
        self.adapter.clone().unwrap_or_default().into()
    }
}

/// Ticket store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local cache; tickets held by reference.
    #[default]
    Memory,
    /// Shared byte cache; tickets serialized.
    Distributed,
}

/// The `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackend,
    /// Namespace for in-process cache keys.
    pub key_prefix: String,
    /// In-process cache capacity before LRU eviction.
    pub max_entries: usize,
    /// Interval in seconds between cleanup sweeps.
    pub cleanup_interval_secs: u64,
    /// Per-call timeout for the distributed backend, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_timeout_ms: Option<u64>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
            cleanup_interval_secs: 60,
            operation_timeout_ms: None,
        }
    }
}

impl From<StoreSection> for StoreConfig {
    fn from(section: StoreSection) -> Self {
        let config = StoreConfig::new()
            .with_key_prefix(section.key_prefix)
            .with_max_entries(section.max_entries)
            .with_cleanup_interval(Duration::from_secs(section.cleanup_interval_secs));
        match section.operation_timeout_ms {
            Some(ms) => config.with_operation_timeout(Duration::from_millis(ms)),
            None => config.without_operation_timeout(),
        }
    }
}

/// The `[adapter]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterSection {
    /// Accept sessions whose principal did not come from CAS by building a
    /// minimal assertion for them.
    pub synthesize_assertion: bool,
}

impl Default for AdapterSection {
    fn default() -> Self {
        Self {
            synthesize_assertion: true,
        }
    }
}

impl From<AdapterSection> for AdapterConfig {
    fn from(section: AdapterSection) -> Self {
        AdapterConfig::new().with_synthesize_assertion(section.synthesize_assertion)
    }
}
