//! Key-value store port
//!
//! Analytics events live in an external store reached through the `KvStore`
//! trait: set-with-expiry, get, and a bounded prefix scan. The in-memory
//! implementation backs tests and single-instance deployments; fleets plug a
//! shared store behind the same trait.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

mod memory;

pub use memory::MemoryStore;

/// Failure talking to the backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store operation failed: {0}")]
    Backend(String),
}

/// Minimal contract the gateway needs from its persistent store
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`, expiring after `ttl`
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Read the live value under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Collect up to `limit` live entries whose keys start with `prefix`, in
    /// key order. The boolean reports whether more entries remained, making
    /// the scan an explicitly best-effort, iteration-bounded operation.
    async fn scan_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<(Vec<(String, Value)>, bool), StoreError>;
}
