//! Element ids of the host page.

use playpen_core::SourceKind;
use serde::{Deserialize, Serialize};

/// Ids of the page elements the playground binds to. Missing optional
/// elements are skipped at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomIds {
    pub html_editor: String,
    pub css_editor: String,
    pub js_editor: String,
    pub html_gutter: String,
    pub css_gutter: String,
    pub js_gutter: String,
    /// The preview iframe.
    pub output: String,
    pub console: String,
    pub console_content: String,
    pub console_status: String,
    pub console_toggle: String,
    pub console_minimize: String,
    pub toast_container: String,
    pub loading: String,
    pub completion: String,
    pub run_button: String,
    pub refresh_button: String,
    pub reset_button: String,
    pub theme_button: String,
    pub clear_console_button: String,
    pub download_menu: String,
    pub download_html: String,
    pub download_css: String,
    pub download_js: String,
    pub download_all: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            html_editor: "html-code".into(),
            css_editor: "css-code".into(),
            js_editor: "js-code".into(),
            html_gutter: "html-lines".into(),
            css_gutter: "css-lines".into(),
            js_gutter: "js-lines".into(),
            output: "output".into(),
            console: "console".into(),
            console_content: "console-content".into(),
            console_status: "console-status".into(),
            console_toggle: "console-toggle".into(),
            console_minimize: "minimize-console".into(),
            toast_container: "toast-container".into(),
            loading: "loading".into(),
            completion: "autocomplete-dropdown".into(),
            run_button: "run-btn".into(),
            refresh_button: "refresh-output".into(),
            reset_button: "reset-btn".into(),
            theme_button: "theme-toggle".into(),
            clear_console_button: "clear-console".into(),
            download_menu: "download-menu".into(),
            download_html: "download-html".into(),
            download_css: "download-css".into(),
            download_js: "download-js".into(),
            download_all: "download-all".into(),
        }
    }
}

impl DomIds {
    pub fn editor(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.html_editor,
            SourceKind::Style => &self.css_editor,
            SourceKind::Script => &self.js_editor,
        }
    }

    pub fn gutter(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.html_gutter,
            SourceKind::Style => &self.css_gutter,
            SourceKind::Script => &self.js_gutter,
        }
    }

    pub fn download(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.download_html,
            SourceKind::Style => &self.download_css,
            SourceKind::Script => &self.download_js,
        }
    }
}
