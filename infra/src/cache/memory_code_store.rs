//! Process-local code store
//!
//! Entries expire on the tokio clock, which lets tests drive expiry with
//! `tokio::time::advance`. Expired entries are dropped lazily when touched;
//! [`MemoryCodeStore::purge_expired`] sweeps the rest.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use vc_core::errors::CollaboratorError;
use vc_core::services::verification::CodeStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory [`CodeStore`] for development and tests
///
/// Codes live in this process only; do not use it behind a load balancer.
#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    entries: Mutex<HashMap<String, Entry>>,
    key_prefix: Option<String>,
}

impl MemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(key_prefix: Option<String>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            key_prefix,
        }
    }

    fn key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Remove every expired entry, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "Purged expired code store entries");
        }
        purged
    }

    /// Number of entries held, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CollaboratorError> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().await.insert(self.key(key), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CollaboratorError> {
        let key = self.key(key);
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, CollaboratorError> {
        let key = self.key(key);
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let matches = entries
            .get(&key)
            .map_or(false, |entry| entry.is_live(now) && entry.value == expected);
        if matches {
            entries.remove(&key);
        }
        Ok(matches)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CollaboratorError> {
        let key = self.key(key);
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let current = match entries.get(&key) {
            Some(entry) if entry.is_live(now) => Some(entry),
            _ => None,
        };
        let (count, expires_at) = match current {
            Some(entry) => {
                let count = entry.value.parse::<u64>().map_err(|_| {
                    CollaboratorError::Rejected(format!("value at {} is not a counter", key))
                })?;
                (count + 1, entry.expires_at)
            }
            None => (1, now + ttl),
        };

        entries.insert(
            key,
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    async fn delete(&self, key: &str) -> Result<bool, CollaboratorError> {
        let key = self.key(key);
        let now = Instant::now();
        let removed = self.entries.lock().await.remove(&key);
        Ok(removed.map_or(false, |entry| entry.is_live(now)))
    }
}
