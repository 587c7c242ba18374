//! Local persistent key-value storage, the capability under the session cache.
//!
//! Keys and values are plain strings. Each single-key read or write is atomic;
//! nothing spans keys except [`KeyValueStore::remove_items`], which drops a set
//! of keys in one operation.

use crate::error::CacheError;
use async_trait::async_trait;

pub mod fs;
pub mod memory;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Removes every listed key in a single write. Missing keys are ignored.
    async fn remove_items(&self, keys: &[&str]) -> Result<(), CacheError>;
}
