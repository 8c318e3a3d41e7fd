//! Counter store abstraction and its backends.
//!
//! Every method maps to one atomic primitive of the backing store. Callers
//! never compose a read with a later write for the same logical update.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use configs::{StoreBackend, StoreConfig};
use thiserror::Error;
use tracing::info;

pub mod json_file_store;
pub mod memory;
pub mod redis_store;

pub use json_file_store::JsonFileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Shared tally hash plus a newest-first message list.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Atomically adds `by` to `field` of the tally, creating it at zero.
    /// Returns the new value.
    async fn increment(&self, field: &str, by: i64) -> Result<i64, StoreError>;

    /// Reads the whole tally in one operation. Empty when never written.
    async fn counts(&self) -> Result<HashMap<String, i64>, StoreError>;

    /// Atomically prepends an entry to the message list.
    async fn push_front(&self, entry: &str) -> Result<(), StoreError>;

    /// Reads up to `count` entries from the front of the message list.
    async fn range_front(&self, count: usize) -> Result<Vec<String>, StoreError>;
}

/// Builds the configured backend. Redis is reached (and pinged) here, so an
/// unreachable server fails startup instead of the first request.
pub async fn connect(cfg: &StoreConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
    let store: Arc<dyn CounterStore> = match cfg.backend {
        StoreBackend::Redis => {
            let timeout = Duration::from_millis(cfg.connect_timeout_ms);
            Arc::new(RedisStore::connect(&cfg.redis_url(), &cfg.key_prefix, timeout).await?)
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => JsonFileStore::new(&cfg.file_path).await?,
    };
    info!(backend = store.backend(), event = "store_ready", "counter store connected");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_builds_memory_backend() -> Result<(), anyhow::Error> {
        let cfg = StoreConfig { backend: StoreBackend::Memory, ..StoreConfig::default() };
        let store = connect(&cfg).await?;
        assert_eq!(store.backend(), "memory");
        store.ping().await?;
        Ok(())
    }

    #[tokio::test]
    async fn connect_fails_fast_on_unreachable_redis() {
        let cfg = StoreConfig {
            backend: StoreBackend::Redis,
            redis_url: Some("redis://127.0.0.1:1".into()),
            connect_timeout_ms: 300,
            ..StoreConfig::default()
        };
        let err = connect(&cfg).await.err().expect("port 1 has no redis");
        assert!(matches!(err, StoreError::Connection(_)), "{err:?}");
    }
}
