//! Storage backends for roster cache entries

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cache::{RosterCacheEntry, RosterKey};
use crate::error::{CacheError, Result};

/// Whole-map persistence for the roster cache
pub trait RosterStorage: Send + Sync {
    /// Load every stored entry. A missing store is an empty map.
    fn load(&self) -> Result<HashMap<RosterKey, RosterCacheEntry>>;

    /// Replace the stored entries with `entries`
    fn save(&self, entries: &HashMap<RosterKey, RosterCacheEntry>) -> Result<()>;
}

/// JSON file keyed by `"{SPORT}:{YYYY-MM-DD}"`
pub struct JsonFileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStorage for JsonFileStorage {
    fn load(&self) -> Result<HashMap<RosterKey, RosterCacheEntry>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        let raw: HashMap<String, RosterCacheEntry> = serde_json::from_str(&contents)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let key = key.parse::<RosterKey>().map_err(|_| CacheError::InvalidKey(key))?;
            entries.insert(key, entry);
        }

        debug!("Loaded {} roster entries from {}", entries.len(), self.path.display());
        Ok(entries)
    }

    fn save(&self, entries: &HashMap<RosterKey, RosterCacheEntry>) -> Result<()> {
        let raw: HashMap<String, &RosterCacheEntry> =
            entries.iter().map(|(key, entry)| (key.to_string(), entry)).collect();
        let json = serde_json::to_string_pretty(&raw)?;

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Readers never see a half-written file
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Process-local storage, mainly for tests
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<RosterKey, RosterCacheEntry>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// Number of persisted entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl RosterStorage for MemoryStorage {
    fn load(&self) -> Result<HashMap<RosterKey, RosterCacheEntry>> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entries: &HashMap<RosterKey, RosterCacheEntry>) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(CacheError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory storage write disabled",
            )));
        }
        *self.entries.lock() = entries.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use projection_model::Sport;
    use tempfile::TempDir;

    fn sample() -> HashMap<RosterKey, RosterCacheEntry> {
        let key = RosterKey::new(Sport::Mlb, NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
        let entry = RosterCacheEntry {
            players: vec!["Aaron Judge".to_string(), "Mookie Betts".to_string()],
            created_at: Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap(),
        };
        HashMap::from([(key, entry)])
    }

    #[test]
    fn test_json_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("roster_cache.json");
        let storage = JsonFileStorage::new(&path);

        assert!(storage.load().unwrap().is_empty());

        storage.save(&sample()).unwrap();
        let loaded = JsonFileStorage::new(&path).load().unwrap();
        assert_eq!(loaded, sample());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("MLB:2024-04-10").is_some());
    }

    #[test]
    fn test_json_file_rejects_corrupt_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster_cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = JsonFileStorage::new(&path);
        assert!(matches!(storage.load(), Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_json_file_rejects_bad_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster_cache.json");
        std::fs::write(&path, r#"{"NHL:2024-01-01": {"players": [], "created_at": "2024-01-01T00:00:00Z"}}"#)
            .unwrap();

        assert!(matches!(JsonFileStorage::new(&path).load(), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_memory_storage_write_failure() {
        let storage = MemoryStorage::new();
        storage.save(&sample()).unwrap();
        assert_eq!(storage.len(), 1);

        storage.set_fail_writes(true);
        assert!(storage.save(&HashMap::new()).is_err());
        assert_eq!(storage.len(), 1);
    }
}
