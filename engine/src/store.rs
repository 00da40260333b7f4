use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed persistence collaborator. One `put` is one atomic commit;
/// the engine never issues paired writes that could be torn by a crash
/// between them.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// All stored keys. The leaderboard projection scans these.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store for tests and the simulation binary.
#[derive(Clone, Default)]
pub struct MemStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let store = MemStore::new();
        assert!(store.get("missing").unwrap().is_none());

        store.put("a", "1").unwrap();
        store.put("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_keys_lists_everything() {
        let store = MemStore::new();
        store.put("x", "1").unwrap();
        store.put("y", "2").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    }
}
