use std::sync::Arc;

use configs::WordPolicy;
use tracing::{debug, error};

use crate::errors::{RecordError, Rejection};
use crate::normalizer::{normalize, TallyKey};
use crate::storage::CounterStore;
use crate::tally::{TallyTable, WallStats};

/// Most recent messages returned by [`WallService::recent_messages`].
pub const RECENT_MESSAGES_LIMIT: usize = 50;

/// Entries in [`WallStats::top`] when the caller does not ask for a limit.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Word tally and message feed on top of a [`CounterStore`].
///
/// Holds no state of its own besides the store handle: every call is one
/// round trip, and concurrent callers are serialized by the store, not here.
#[derive(Clone)]
pub struct WallService {
    store: Arc<dyn CounterStore>,
    policy: WordPolicy,
}

impl WallService {
    pub fn new(store: Arc<dyn CounterStore>, policy: WordPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> WordPolicy {
        self.policy
    }

    /// Normalizes `raw` and adds one to its count. Returns the key counted.
    pub async fn record_word(&self, raw: &str) -> Result<TallyKey, RecordError> {
        let key = normalize(raw, self.policy).map_err(|r| {
            debug!(operation = "record_word", reason = r.reason(), "word rejected");
            r
        })?;

        self.store.increment(key.as_str(), 1).await.map_err(|e| {
            error!(operation = "record_word", key = %key, backend = self.store.backend(), error = %e, "increment failed");
            RecordError::from(e)
        })?;
        Ok(key)
    }

    /// Current counts, read straight from the store.
    pub async fn snapshot(&self) -> Result<TallyTable, RecordError> {
        let counts = self.store.counts().await.map_err(|e| {
            error!(operation = "snapshot", backend = self.store.backend(), error = %e, "tally read failed");
            RecordError::from(e)
        })?;

        counts
            .into_iter()
            .map(|(word, count)| match u64::try_from(count) {
                Ok(count) => Ok((word, count)),
                Err(_) => {
                    error!(operation = "snapshot", key = %word, count, "negative count in store");
                    Err(RecordError::StoreUnavailable(format!("negative count for {word}")))
                }
            })
            .collect()
    }

    pub async fn stats(&self, limit: usize) -> Result<WallStats, RecordError> {
        Ok(self.snapshot().await?.stats(limit))
    }

    /// Prepends a message to the feed as-is. Only blank input is refused.
    pub async fn record_message(&self, raw: &str) -> Result<(), RecordError> {
        if raw.trim().is_empty() {
            debug!(operation = "record_message", reason = Rejection::EmptyInput.reason(), "message rejected");
            return Err(Rejection::EmptyInput.into());
        }

        self.store.push_front(raw).await.map_err(|e| {
            // message text stays out of the logs
            error!(operation = "record_message", len = raw.len(), backend = self.store.backend(), error = %e, "push failed");
            RecordError::from(e)
        })
    }

    /// Up to [`RECENT_MESSAGES_LIMIT`] messages, newest first.
    pub async fn recent_messages(&self) -> Result<Vec<String>, RecordError> {
        self.store.range_front(RECENT_MESSAGES_LIMIT).await.map_err(|e| {
            error!(operation = "recent_messages", backend = self.store.backend(), error = %e, "feed read failed");
            RecordError::from(e)
        })
    }

    pub async fn ping(&self) -> Result<(), RecordError> {
        self.store.ping().await.map_err(RecordError::from)
    }
}
