use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CounterStore, StoreError};

/// Process-local store. Each operation runs under a single lock acquisition,
/// which gives the same atomicity as the redis commands it stands in for.
#[derive(Default)]
pub struct MemoryStore {
    counts: RwLock<HashMap<String, i64>>,
    messages: RwLock<VecDeque<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn increment(&self, field: &str, by: i64) -> Result<i64, StoreError> {
        let mut counts = self.counts.write().await;
        let value = counts.entry(field.to_string()).or_insert(0);
        *value = value
            .checked_add(by)
            .ok_or_else(|| StoreError::InvalidData(format!("increment overflows field {field}")))?;
        Ok(*value)
    }

    async fn counts(&self) -> Result<HashMap<String, i64>, StoreError> {
        Ok(self.counts.read().await.clone())
    }

    async fn push_front(&self, entry: &str) -> Result<(), StoreError> {
        self.messages.write().await.push_front(entry.to_string());
        Ok(())
    }

    async fn range_front(&self, count: usize) -> Result<Vec<String>, StoreError> {
        let messages = self.messages.read().await;
        Ok(messages.iter().take(count).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn increments_create_and_accumulate() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        assert!(store.counts().await?.is_empty());

        assert_eq!(store.increment("go", 1).await?, 1);
        assert_eq!(store.increment("go", 1).await?, 2);
        assert_eq!(store.increment("rust", 5).await?, 5);

        let counts = store.counts().await?;
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["go"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn overflow_leaves_value_untouched() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        store.increment("big", i64::MAX).await?;
        assert!(store.increment("big", 1).await.is_err());
        assert_eq!(store.counts().await?["big"], i64::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn list_is_newest_first_and_bounded_on_read() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        for m in ["one", "two", "three"] {
            store.push_front(m).await?;
        }
        assert_eq!(store.range_front(2).await?, ["three", "two"]);
        assert_eq!(store.range_front(10).await?, ["three", "two", "one"]);
        assert!(store.range_front(0).await?.is_empty());
        Ok(())
    }
}
