//! Saving and restoring the project in an origin-scoped key-value store.
//!
//! The project is one JSON record (`{html, css, js, theme}`) under a single
//! key; the theme preference is also kept under its own key so the host page
//! can read it before the playground mounts.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PersistError, StoreError};
use crate::types::{Sources, Theme};

/// Default key of the project record.
pub const DEFAULT_PROJECT_KEY: &str = "liveCodeEditor";

/// Default key of the theme preference.
pub const DEFAULT_THEME_KEY: &str = "editorTheme";

/// A string key-value store, such as the browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store. Can be switched into a failing mode to simulate a full
/// or disabled backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
    reject_reads: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail with [`StoreError::WriteRejected`].
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Make every subsequent `get` fail with [`StoreError::Unavailable`].
    pub fn reject_reads(&self, reject: bool) {
        self.reject_reads.set(reject);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.reject_reads.get() {
            return Err(StoreError::Unavailable(format!("{key}: storage disabled")));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.reject_writes.get() {
            return Err(StoreError::WriteRejected(format!("{key}: quota exceeded")));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// The persisted project record.
///
/// Missing fields read back as their defaults, so records written by older
/// versions (or by hand) still load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedProjectState {
    pub html: String,
    pub css: String,
    pub js: String,
    pub theme: Theme,
}

impl PersistedProjectState {
    pub fn new(sources: Sources, theme: Theme) -> Self {
        Self {
            html: sources.markup,
            css: sources.style,
            js: sources.script,
            theme,
        }
    }

    pub fn sources(&self) -> Sources {
        Sources::new(self.html.as_str(), self.css.as_str(), self.js.as_str())
    }
}

/// Reads and writes [`PersistedProjectState`] through a [`KeyValueStore`].
pub struct PersistenceAdapter<K> {
    store: K,
    project_key: String,
    theme_key: String,
}

impl<K: KeyValueStore> PersistenceAdapter<K> {
    pub fn new(store: K) -> Self {
        Self::with_keys(store, DEFAULT_PROJECT_KEY, DEFAULT_THEME_KEY)
    }

    pub fn with_keys(
        store: K,
        project_key: impl Into<String>,
        theme_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            project_key: project_key.into(),
            theme_key: theme_key.into(),
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Write the project record.
    pub fn save(&self, state: &PersistedProjectState) -> Result<(), PersistError> {
        let json = serde_json::to_string(state)?;
        self.store.set(&self.project_key, &json)?;
        tracing::debug!(key = %self.project_key, bytes = json.len(), "project saved");
        Ok(())
    }

    /// Read the project record. Absent data is `Ok(None)`.
    pub fn try_load(&self) -> Result<Option<PersistedProjectState>, PersistError> {
        let Some(raw) = self.store.get(&self.project_key)? else {
            return Ok(None);
        };
        let state = serde_json::from_str(&raw)?;
        Ok(Some(state))
    }

    /// Read the project record, falling back to the empty project on any
    /// failure.
    pub fn load(&self) -> PersistedProjectState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => PersistedProjectState::default(),
            Err(e) => {
                tracing::warn!(key = %self.project_key, error = %e, "discarding stored project");
                PersistedProjectState::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), PersistError> {
        self.store.set(&self.theme_key, theme.as_str())?;
        Ok(())
    }

    /// Read the theme preference. Absent data is `Ok(None)`.
    pub fn try_load_theme(&self) -> Result<Option<Theme>, PersistError> {
        let name = self.store.get(&self.theme_key)?;
        Ok(name.map(|name| Theme::from_name(&name)))
    }

    /// Stored theme preference, or `None` if nothing usable is stored.
    pub fn load_theme(&self) -> Option<Theme> {
        match self.try_load_theme() {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!(key = %self.theme_key, error = %e, "theme preference unreadable");
                None
            }
        }
    }

    /// Forget the stored project and theme.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.store.remove(&self.project_key)?;
        self.store.remove(&self.theme_key)?;
        Ok(())
    }
}
