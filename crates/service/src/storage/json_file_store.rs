use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use super::{CounterStore, StoreError};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct WallData {
    #[serde(default)]
    counts: HashMap<String, i64>,
    /// Newest first.
    #[serde(default)]
    messages: VecDeque<String>,
}

/// JSON file-backed store for single-process deployments.
///
/// State lives in memory behind one lock and is written out after every
/// mutation while the lock is still held, so the file never reflects a
/// half-applied update. A failed write rolls the in-memory change back.
pub struct JsonFileStore {
    inner: RwLock<WallData>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Loads the file if present, otherwise creates it with an empty wall.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let data = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::InvalidData(format!("{}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = WallData::default();
                write_file(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        Ok(Arc::new(Self { inner: RwLock::new(data), file_path }))
    }
}

async fn write_file(path: &Path, data: &WallData) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(data).map_err(|e| StoreError::InvalidData(e.to_string()))?;
    // write-then-rename keeps the previous file intact if we die mid-write
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await.map_err(|e| StoreError::Io(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| StoreError::Io(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl CounterStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        fs::metadata(&self.file_path)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn increment(&self, field: &str, by: i64) -> Result<i64, StoreError> {
        let mut data = self.inner.write().await;
        let previous = data.counts.get(field).copied();
        let next = previous
            .unwrap_or(0)
            .checked_add(by)
            .ok_or_else(|| StoreError::InvalidData(format!("increment overflows field {field}")))?;
        data.counts.insert(field.to_string(), next);

        if let Err(e) = write_file(&self.file_path, &data).await {
            warn!(operation = "increment", key = field, error = %e, "persist failed; rolling back");
            match previous {
                Some(v) => data.counts.insert(field.to_string(), v),
                None => data.counts.remove(field),
            };
            return Err(e);
        }
        Ok(next)
    }

    async fn counts(&self) -> Result<HashMap<String, i64>, StoreError> {
        Ok(self.inner.read().await.counts.clone())
    }

    async fn push_front(&self, entry: &str) -> Result<(), StoreError> {
        let mut data = self.inner.write().await;
        data.messages.push_front(entry.to_string());

        if let Err(e) = write_file(&self.file_path, &data).await {
            warn!(operation = "push_front", error = %e, "persist failed; rolling back");
            data.messages.pop_front();
            return Err(e);
        }
        Ok(())
    }

    async fn range_front(&self, count: usize) -> Result<Vec<String>, StoreError> {
        let data = self.inner.read().await;
        Ok(data.messages.iter().take(count).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn json_file_store_persists_across_reloads() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("wall_store_{}.json", Uuid::new_v4()));
        let store = JsonFileStore::new(&tmp).await?;

        // initially empty
        assert!(store.counts().await?.is_empty());
        assert!(store.range_front(50).await?.is_empty());

        store.increment("go", 1).await?;
        store.increment("go", 1).await?;
        store.increment("rust", 1).await?;
        store.push_front("first").await?;
        store.push_front("second").await?;

        let reloaded = JsonFileStore::new(&tmp).await?;
        let counts = reloaded.counts().await?;
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["go"], 2);
        assert_eq!(reloaded.range_front(50).await?, ["second", "first"]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_in_memory_state() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("wall_store_{}.json", Uuid::new_v4()));
        let store = JsonFileStore::new(&tmp).await?;
        store.increment("go", 1).await?;
        store.push_front("kept").await?;

        // a directory in the temp file's place makes every write fail
        let blocker = tmp.with_extension("json.tmp");
        tokio::fs::create_dir(&blocker).await?;

        assert!(store.increment("go", 1).await.is_err());
        assert!(store.increment("rust", 1).await.is_err());
        assert!(store.push_front("lost").await.is_err());

        let counts = store.counts().await?;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["go"], 1);
        assert_eq!(store.range_front(50).await?, ["kept"]);

        let _ = tokio::fs::remove_dir(&blocker).await;
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn refuses_to_overwrite_corrupt_file() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("wall_store_{}.json", Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await?;

        let err = JsonFileStore::new(&tmp).await.err().expect("corrupt file must not load");
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert_eq!(tokio::fs::read(&tmp).await?, b"{not json");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
