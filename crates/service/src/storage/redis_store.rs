//! # Redis
//!
//! Production backend. The tally is one hash and the feed one list:
//!
//! - `HINCRBY <prefix>word_count <word> 1` per posted word
//! - `HGETALL <prefix>word_count` per snapshot
//! - `LPUSH <prefix>messages <text>` per posted message
//! - `LRANGE <prefix>messages 0 <n-1>` per feed read
//!
//! Redis executes each command atomically, so concurrent posts never lose an
//! update and no application-side locking is needed.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, ErrorKind, RedisError};

use super::{CounterStore, StoreError};

pub const TALLY_KEY: &str = "word_count";
pub const FEED_KEY: &str = "messages";

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        match e.kind() {
            ErrorKind::TypeError => StoreError::InvalidData(e.to_string()),
            _ => StoreError::Connection(e.to_string()),
        }
    }
}

/// Shares one multiplexed connection; clones are cheap handles onto it.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    tally_key: String,
    feed_key: String,
}

impl RedisStore {
    /// Opens the connection and pings once; gives up after `timeout`.
    pub async fn connect(url: &str, key_prefix: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let conn = tokio::time::timeout(timeout, client.get_connection_manager())
            .await
            .map_err(|_| StoreError::Connection(format!("no redis connection within {timeout:?}")))??;

        let store = Self {
            conn,
            tally_key: format!("{key_prefix}{TALLY_KEY}"),
            feed_key: format!("{key_prefix}{FEED_KEY}"),
        };
        tokio::time::timeout(timeout, store.ping())
            .await
            .map_err(|_| StoreError::Connection(format!("redis PING timed out after {timeout:?}")))??;
        Ok(store)
    }

    pub fn tally_key(&self) -> &str {
        &self.tally_key
    }

    pub fn feed_key(&self) -> &str {
        &self.feed_key
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn increment(&self, field: &str, by: i64) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.hincr(&self.tally_key, field, by).await?;
        Ok(value)
    }

    async fn counts(&self) -> Result<HashMap<String, i64>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(&self.tally_key).await?;
        raw.into_iter()
            .map(|(field, value)| match value.parse::<i64>() {
                Ok(n) => Ok((field, n)),
                Err(e) => Err(StoreError::InvalidData(format!("field {field} holds {value:?}: {e}"))),
            })
            .collect()
    }

    async fn push_front(&self, entry: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _len: i64 = conn.lpush(&self.feed_key, entry).await?;
        Ok(())
    }

    async fn range_front(&self, count: usize) -> Result<Vec<String>, StoreError> {
        // LRANGE 0 -1 would return the whole list
        if count == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(count - 1).unwrap_or(isize::MAX);
        let mut conn = self.conn.clone();
        let entries: Vec<String> = conn.lrange(&self.feed_key, 0, stop).await?;
        Ok(entries)
    }
}
