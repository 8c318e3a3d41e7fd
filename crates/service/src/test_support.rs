#![cfg(test)]
use std::collections::HashMap;

use async_trait::async_trait;

use crate::storage::{CounterStore, StoreError};

/// Store whose every operation fails as if the server went away.
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::Connection("connection refused".into())
}

#[async_trait]
impl CounterStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }

    async fn increment(&self, _field: &str, _by: i64) -> Result<i64, StoreError> {
        Err(down())
    }

    async fn counts(&self) -> Result<HashMap<String, i64>, StoreError> {
        Err(down())
    }

    async fn push_front(&self, _entry: &str) -> Result<(), StoreError> {
        Err(down())
    }

    async fn range_front(&self, _count: usize) -> Result<Vec<String>, StoreError> {
        Err(down())
    }
}
