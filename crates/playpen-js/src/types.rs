//! Types exposed to JavaScript via wasm-bindgen.

use playpen_browser::{DomIds, PersistedProjectState, PlaygroundConfig, Sources, Theme};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Options accepted by `Playground.mount`. Both parts may be partial.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct JsPlaygroundConfig {
    #[tsify(
        optional,
        type = "{ debounceMs?: number; storageKey?: string; themeKey?: string; toastDurationMs?: number; toastChars?: number; maxSuggestions?: number; indent?: string }"
    )]
    pub options: PlaygroundConfig,
    /// Element ids, keyed by role (`htmlEditor`, `output`, `console`, ...).
    #[tsify(optional, type = "Record<string, string>")]
    pub ids: DomIds,
}

/// Project contents as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsProjectSnapshot {
    pub html: String,
    pub css: String,
    pub js: String,
    /// `"dark"` or `"light"`.
    pub theme: String,
}

impl From<PersistedProjectState> for JsProjectSnapshot {
    fn from(state: PersistedProjectState) -> Self {
        Self {
            html: state.html,
            css: state.css,
            js: state.js,
            theme: state.theme.as_str().to_string(),
        }
    }
}

impl From<JsProjectSnapshot> for PersistedProjectState {
    fn from(snapshot: JsProjectSnapshot) -> Self {
        PersistedProjectState::new(
            Sources::new(snapshot.html, snapshot.css, snapshot.js),
            Theme::from_name(&snapshot.theme),
        )
    }
}

/// Console counters for toolbars that render their own badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsConsoleCounts {
    pub error_count: usize,
    pub warning_count: usize,
    pub expanded: bool,
}
