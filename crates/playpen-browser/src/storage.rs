//! localStorage-backed key-value store.

use gloo_storage::{LocalStorage, Storage};
use playpen_core::{KeyValueStore, StoreError};

/// The origin's `localStorage`.
///
/// Values are stored as raw strings, so keys written by other code on the
/// page (for example a plain `"dark"` theme value) stay readable.
#[derive(Clone)]
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStore {
    /// Open local storage, failing if the browser has it disabled.
    pub fn open() -> Result<Self, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        match window.local_storage() {
            Ok(Some(_)) => Ok(Self {
                storage: Some(LocalStorage::raw()),
            }),
            Ok(None) => Err(StoreError::Unavailable("localStorage missing".to_string())),
            Err(e) => Err(StoreError::Unavailable(format!("{e:?}"))),
        }
    }

    /// A store whose every operation fails with `Unavailable`. Sessions keep
    /// running on it and report each failed save.
    pub fn unavailable() -> Self {
        Self { storage: None }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        if self.storage.is_some() {
            LocalStorage::length() as usize
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn storage(&self) -> Result<&web_sys::Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage()?;
        LocalStorage::delete(key);
        Ok(())
    }
}
