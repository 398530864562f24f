//! Playground configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::completion::DEFAULT_MAX_SUGGESTIONS;
use crate::console::{DEFAULT_TOAST_CHARS, ConsolePanel};
use crate::persistence::{DEFAULT_PROJECT_KEY, DEFAULT_THEME_KEY};

/// Tunables for a playground session.
///
/// Deserializes from a partial object: every missing field takes its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaygroundConfig {
    /// Quiet period after the last edit before the preview re-renders.
    pub debounce_ms: u64,
    /// Storage key of the project record.
    pub storage_key: String,
    /// Storage key of the theme preference.
    pub theme_key: String,
    pub toast_duration_ms: u64,
    /// Toast messages longer than this many chars are cut.
    pub toast_chars: usize,
    pub max_suggestions: usize,
    /// Inserted by the indent shortcut.
    pub indent: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            storage_key: DEFAULT_PROJECT_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            toast_duration_ms: 5000,
            toast_chars: DEFAULT_TOAST_CHARS,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            indent: "    ".to_string(),
        }
    }
}

impl PlaygroundConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// A console panel using this config's toast settings.
    pub fn console_panel(&self) -> ConsolePanel {
        ConsolePanel::new(self.toast_duration(), self.toast_chars)
    }
}
