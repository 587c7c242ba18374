use super::KeyValueStore;
use crate::error::CacheError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

/// Key-value store kept as a single JSON object on disk.
///
/// A file that no longer parses reads as [`CacheError::Corrupt`]; the next
/// write replaces it.
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, CacheError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "unreadable key-value file");
            CacheError::Corrupt {
                key: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Like `load`, but an unreadable file counts as empty so a write can
    /// replace it.
    async fn load_for_write(&self) -> Result<BTreeMap<String, String>, CacheError> {
        match self.load().await {
            Err(CacheError::Corrupt { .. }) => Ok(BTreeMap::new()),
            other => other,
        }
    }

    async fn save(&self, items: &BTreeMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(items)?).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let _guard = self.lock.lock().await;
        let mut items = self.load_for_write().await?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items).await
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<(), CacheError> {
        let _guard = self.lock.lock().await;
        let (mut items, corrupt) = match self.load().await {
            Ok(items) => (items, false),
            Err(CacheError::Corrupt { .. }) => (BTreeMap::new(), true),
            Err(e) => return Err(e),
        };
        let before = items.len();
        items.retain(|k, _| !keys.contains(&k.as_str()));
        if items.len() == before && !corrupt {
            return Ok(());
        }
        self.save(&items).await
    }
}
