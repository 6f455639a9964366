//! In-memory [`ByteCache`] for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cas_ticket::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::distributed::{ByteCache, EntryOptions};
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
struct Stored {
    payload: Vec<u8>,
    expires: Option<DateTime<Utc>>,
}

/// Byte cache backed by a `HashMap`, with failure and latency injection.
#[derive(Debug)]
pub struct MemoryByteCache {
    entries: Mutex<HashMap<String, Stored>>,
    clock: Arc<dyn Clock>,
    honor_expiration: bool,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl Default for MemoryByteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryByteCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            honor_expiration: true,
            failing: AtomicBool::new(false),
            latency: None,
        }
    }

    /// Whether entries are dropped once their absolute expiration passes.
    pub fn with_expiration(mut self, honor: bool) -> Self {
        self.honor_expiration = honor;
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail with a backend error until reset.
    pub fn fail_next_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Plant a payload directly, bypassing the codec.
    pub fn insert_raw(&self, key: &str, payload: Vec<u8>) {
        self.entries.lock().insert(
            key.to_string(),
            Stored {
                payload,
                expires: None,
            },
        );
    }

    /// Raw payload regardless of expiration.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).map(|s| s.payload.clone())
    }

    /// Expiration recorded for a key.
    pub fn expiration(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().get(key).and_then(|s| s.expires)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    async fn io(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected cache failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ByteCache for MemoryByteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.io().await?;
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let expired = self.honor_expiration
            && entries
                .get(key)
                .and_then(|s| s.expires)
                .is_some_and(|at| now >= at);
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|s| s.payload.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: EntryOptions) -> Result<()> {
        self.io().await?;
        self.entries.lock().insert(
            key.to_string(),
            Stored {
                payload: value,
                expires: options.absolute_expiration,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.io().await?;
        self.entries.lock().remove(key);
        Ok(())
    }

    fn supports_expiration(&self) -> bool {
        self.honor_expiration
    }
}
