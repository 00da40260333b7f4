use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use engine::store::{Store, StoreError};

// Write-through key-value storage: every put lands in memory and in a JSON
// snapshot on disk before the caller proceeds, so a restart resumes from
// the last committed write.
#[derive(Clone)]
pub struct FileStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    snapshot_path: Arc<PathBuf>,
}

impl FileStore {
    // Opens the store, loading an existing snapshot when one is readable.
    // An unreadable snapshot is logged and abandoned rather than treated as
    // fatal; the game resumes from an empty ledger.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let snapshot_path = data_dir.join("players.json");

        let entries = match fs::read_to_string(&snapshot_path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Discarding unreadable snapshot {}: {}",
                        snapshot_path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            entries: Arc::new(Mutex::new(entries)),
            snapshot_path: Arc::new(snapshot_path),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(self.snapshot_path.as_ref(), raw)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.keys().cloned().collect())
    }
}
