//! In-memory `KvStore` implementation
//!
//! A mutex-guarded ordered map with per-entry deadlines. Expired entries are
//! dropped lazily on read and scan. Suitable for tests and single-instance
//! deployments only; nothing here survives a restart.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Stored {
    value: Value,
    expires_at: Instant,
}

/// Process-local key-value store with per-entry expiry
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Stored>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(
            key.to_string(),
            Stored {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        let now = Instant::now();
        if let Some(stored) = entries.get(key) {
            if now < stored.expires_at {
                return Ok(Some(stored.value.clone()));
            }
            entries.remove(key);
        }
        Ok(None)
    }

    async fn scan_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<(Vec<(String, Value)>, bool), StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        let now = Instant::now();
        let mut collected = Vec::new();
        let mut truncated = false;

        for (key, stored) in entries.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if now >= stored.expires_at {
                continue;
            }
            if collected.len() == limit {
                truncated = true;
                break;
            }
            collected.push((key.clone(), stored.value.clone()));
        }

        Ok((collected, truncated))
    }
}
