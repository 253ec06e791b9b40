//! Key-value persistence seam
//!
//! Every persisted shape is an independently namespaced JSON record. Reads
//! never fail: a missing or malformed record comes back as its `Default`.
//! Writes are fire-and-forget; a failing store is logged and otherwise
//! ignored, so the engine keeps running in defaults-only mode.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write failed: {0}")]
    Write(String),
}

/// String-keyed blob store (browser LocalStorage, an in-memory map, ...)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store that holds nothing and refuses writes
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&mut self, _key: &str) {}
}

/// A persisted record with a fixed storage key
pub trait Record: Serialize + DeserializeOwned + Default {
    const KEY: &'static str;

    fn load_from(store: &dyn KeyValueStore) -> Self {
        load(store)
    }

    fn save_to(&self, store: &mut dyn KeyValueStore) -> bool {
        save(store, self)
    }
}

/// Load a record, falling back to its default
pub fn load<T: Record>(store: &dyn KeyValueStore) -> T {
    load_json(store, T::KEY).unwrap_or_default()
}

/// Persist a record. Returns false if it could not be written.
pub fn save<T: Record>(store: &mut dyn KeyValueStore, record: &T) -> bool {
    save_json(store, T::KEY, record)
}

/// Read a JSON value under an arbitrary key. Missing and malformed values are `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => {
            log::info!("Loaded {}", key);
            Some(value)
        }
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", key, e);
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not serialize {}: {}", key, e);
            return false;
        }
    };
    match store.set(key, &json) {
        Ok(()) => {
            log::debug!("Saved {}", key);
            true
        }
        Err(e) => {
            log::warn!("Could not save {}: {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Counter {
        count: u32,
        label: String,
    }

    impl Record for Counter {
        const KEY: &'static str = "test-counter";
    }

    #[test]
    fn test_missing_record_is_default() {
        let store = MemoryStore::new();
        assert_eq!(load::<Counter>(&store), Counter::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let record = Counter {
            count: 3,
            label: "x".into(),
        };
        assert!(save(&mut store, &record));
        assert_eq!(load::<Counter>(&store), record);
    }

    #[test]
    fn test_malformed_record_is_default() {
        let mut store = MemoryStore::new();
        store.set(Counter::KEY, "{ nope").unwrap();
        assert_eq!(load::<Counter>(&store), Counter::default());
        store.set(Counter::KEY, "[1, 2]").unwrap();
        assert_eq!(load::<Counter>(&store), Counter::default());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let mut store = MemoryStore::new();
        store.set(Counter::KEY, r#"{ "count": 9 }"#).unwrap();
        let record = load::<Counter>(&store);
        assert_eq!(record.count, 9);
        assert_eq!(record.label, "");
    }

    #[test]
    fn test_null_store_degrades() {
        let mut store = NullStore;
        assert!(!save(&mut store, &Counter::default()));
        assert_eq!(load::<Counter>(&store), Counter::default());
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryStore::new();
        save(&mut store, &Counter::default());
        assert_eq!(store.len(), 1);
        store.remove(Counter::KEY);
        assert!(store.is_empty());
    }
}
