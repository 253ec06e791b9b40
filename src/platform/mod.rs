//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Wall-clock date for the daily challenge

use crate::meta::daily::CivilDate;
use crate::persistence::{KeyValueStore, MemoryStore};

/// Browser LocalStorage behind the store seam
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// `None` when storage is unavailable (private mode, sandboxed iframe)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), crate::persistence::StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| crate::persistence::StoreError::Write(format!("{:?}", e)))
    }

    fn remove(&mut self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// The best store this platform offers
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Some(storage) => Box::new(storage),
        None => {
            log::warn!("LocalStorage unavailable, progress will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::new())
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Today's UTC date
pub fn today() -> CivilDate {
    let days = (now_ms() / 86_400_000.0).floor() as i64;
    CivilDate::from_days_since_epoch(days)
}
