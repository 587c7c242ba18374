use super::KeyValueStore;
use crate::error::CacheError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory key-value store for tests.
///
/// `fail_writes_after(n)` lets `n` more writes through and fails the rest,
/// which simulates the process dying between two independent writes.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
    writes_left: Mutex<Option<usize>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_after(&self, writes: Option<usize>) {
        *self.writes_left.lock() = writes;
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_write(&self) -> Result<(), CacheError> {
        let mut writes_left = self.writes_left.lock();
        match writes_left.as_mut() {
            Some(0) => Err(CacheError::Unavailable("Simulated write error".to_string())),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check_write()?;
        self.items
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<(), CacheError> {
        self.check_write()?;
        let mut items = self.items.lock();
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}
