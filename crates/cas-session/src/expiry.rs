//! Absolute-deadline tracking for cache entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Tracks the instant after which each key stops being served.
///
/// Keys without a deadline are not tracked and never expire.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    deadlines: HashMap<String, DateTime<Utc>>,
}

impl ExpiryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the deadline for a key.
    pub fn set(&mut self, key: &str, deadline: Option<DateTime<Utc>>) {
        match deadline {
            Some(at) => {
                self.deadlines.insert(key.to_string(), at);
            }
            None => {
                self.deadlines.remove(key);
            }
        }
    }

    pub fn deadline(&self, key: &str) -> Option<DateTime<Utc>> {
        self.deadlines.get(key).copied()
    }

    /// Whether the key's deadline has been reached at `now`.
    pub fn is_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.deadlines.get(key).is_some_and(|at| now >= *at)
    }

    pub fn remove(&mut self, key: &str) {
        self.deadlines.remove(key);
    }

    /// All keys whose deadline has been reached.
    pub fn get_expired(&self, now: DateTime<Utc>) -> Vec<String> {
        self.deadlines
            .iter()
            .filter(|(_, at)| now >= **at)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Stop tracking expired keys and return them.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let expired = self.get_expired(now);
        for key in &expired {
            self.deadlines.remove(key);
        }
        expired
    }

    /// Number of keys with a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
