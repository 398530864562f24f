//! DOM rendering of the playground's host view.
//!
//! Console messages are inserted as text nodes, never as HTML, so preview
//! output cannot inject markup into the host page.

use std::time::Duration;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use playpen_core::{
    CompletionState, ConsoleStatus, ConsoleUpdate, FeedbackKind, HostView, PlatformError,
    SourceKind, Theme, Toast,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlTextAreaElement};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::events::{char_to_utf16_offset, utf16_to_char_offset};
use crate::ids::DomIds;

/// How long the loading indicator lingers after a render.
const BUSY_LINGER_MS: u32 = 300;

/// Delay between a toast leaving and its removal from the DOM.
const TOAST_FADE_MS: u32 = 300;

/// Revoke download object URLs after this long.
const REVOKE_DELAY_MS: u32 = 1000;

const ITEM_CLASS: &str = "autocomplete-item";

/// Set on the dropdown: the editor its suggestions complete.
const KIND_ATTR: &str = "data-kind";
const INDEX_ATTR: &str = "data-index";

/// Host view bound to the page's elements by id.
pub struct DomView {
    document: Document,
    ids: DomIds,
}

impl DomView {
    pub fn new(ids: DomIds) -> Result<Self, PlatformError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        Ok(Self { document, ids })
    }

    pub fn ids(&self) -> &DomIds {
        &self.ids
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    pub fn editor(&self, kind: SourceKind) -> Option<HtmlTextAreaElement> {
        self.element(self.ids.editor(kind))?.dyn_into().ok()
    }

    /// Current text of an editor and its caret as a char offset.
    pub fn read_source(&self, kind: SourceKind) -> Option<(String, usize)> {
        let editor = self.editor(kind)?;
        let text = editor.value();
        let utf16 = editor.selection_start().ok().flatten().unwrap_or(0) as usize;
        let cursor = utf16_to_char_offset(&text, utf16);
        Some((text, cursor))
    }

    /// The editor `target` is, if any.
    pub fn editor_kind(&self, target: &EventTarget) -> Option<SourceKind> {
        let id = target.dyn_ref::<Element>()?.id();
        SourceKind::ALL
            .into_iter()
            .find(|&kind| self.ids.editor(kind) == id)
    }

    /// The dropdown suggestion at or around `target`, with the editor it
    /// completes.
    pub fn completion_item(&self, target: &EventTarget) -> Option<(SourceKind, usize)> {
        let item = target
            .dyn_ref::<Element>()?
            .closest(&format!(".{ITEM_CLASS}"))
            .ok()??;
        let index = item.get_attribute(INDEX_ATTR)?.parse().ok()?;
        let dropdown = self.element(&self.ids.completion)?;
        let kind = SourceKind::parse(&dropdown.get_attribute(KIND_ATTR)?)?;
        Some((kind, index))
    }

    fn create(&self, tag: &str, class: &str, text: Option<&str>) -> Option<Element> {
        let element = self.document.create_element(tag).ok()?;
        element.set_class_name(class);
        if text.is_some() {
            element.set_text_content(text);
        }
        Some(element)
    }

    fn append_message(&self, class: &str, timestamp: &str, message: &str) {
        let Some(content) = self.element(&self.ids.console_content) else {
            return;
        };
        let Some(line) = self.create("div", &format!("console-message {class}"), None) else {
            return;
        };
        if let Some(stamp) = self.create("span", "timestamp", Some(&format!("[{timestamp}]"))) {
            let _ = line.append_child(&stamp);
        }
        if let Some(text) = self.create("span", "message", Some(message)) {
            let _ = line.append_child(&text);
        }
        let _ = content.append_child(&line);
        content.set_scroll_top(content.scroll_height());
    }

    fn render_status(&self, status: ConsoleStatus) {
        if let Some(el) = self.element(&self.ids.console_status) {
            el.set_class_name(&format!("console-status {}", status.class_name()));
            el.set_text_content(Some(&status.label()));
        }
    }

    fn show_toast(&self, toast: &Toast) {
        let Some(container) = self.element(&self.ids.toast_container) else {
            return;
        };
        let Some(el) = self.create("div", &format!("toast {}", kind_class(toast.kind)), None)
        else {
            return;
        };
        if let Some(text) = self.create("span", "", Some(&toast.text)) {
            let _ = el.append_child(&text);
        }
        if let Some(close) = self.create("button", "close-btn", Some("\u{00d7}")) {
            let target = el.clone();
            EventListener::once(&close, "click", move |_| dismiss(&target)).forget();
            let _ = el.append_child(&close);
        }
        let _ = container.append_child(&el);

        let shown = el.clone();
        Timeout::new(10, move || {
            let _ = shown.class_list().add_1("show");
        })
        .forget();

        let millis = u32::try_from(toast.duration.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || dismiss(&el)).forget();
    }
}

fn dismiss(toast: &Element) {
    if toast.parent_node().is_none() {
        return;
    }
    let _ = toast.class_list().remove_1("show");
    let toast = toast.clone();
    Timeout::new(TOAST_FADE_MS, move || toast.remove()).forget();
}

fn kind_class(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::Log => "info",
        FeedbackKind::Warning => "warning",
        FeedbackKind::Error => "error",
    }
}

fn set_display(element: &Element, value: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property("display", value);
    }
}

/// `HH:MM:SS` in local time.
fn format_time(time: SystemTime) -> String {
    let millis = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as f64;
    let date = js_sys::Date::new(&millis.into());
    format!(
        "{:02}:{:02}:{:02}",
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds()
    )
}

impl HostView for DomView {
    fn write_source(&self, kind: SourceKind, text: &str, cursor: usize) {
        let Some(editor) = self.editor(kind) else {
            return;
        };
        if editor.value() != text {
            editor.set_value(text);
        }
        let caret = char_to_utf16_offset(text, cursor) as u32;
        let _ = editor.set_selection_range(caret, caret);
    }

    fn write_gutter(&self, kind: SourceKind, gutter: &str) {
        if let Some(el) = self.element(self.ids.gutter(kind)) {
            el.set_text_content(Some(gutter));
        }
    }

    fn apply_theme(&self, theme: Theme) {
        if let Some(root) = self.document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
    }

    fn console_updated(&self, update: &ConsoleUpdate) {
        self.append_message(
            kind_class(update.entry.kind()),
            &format_time(update.entry.received_at),
            update.entry.message(),
        );
        self.render_status(update.status);
        if let Some(toast) = &update.toast {
            self.show_toast(toast);
        }
    }

    fn console_cleared(&self, status: ConsoleStatus) {
        if let Some(content) = self.element(&self.ids.console_content) {
            content.set_inner_html("");
        }
        self.append_message("info", &format_time(SystemTime::now()), "Console cleared");
        self.render_status(status);
    }

    fn set_console_expanded(&self, expanded: bool) {
        if let Some(console) = self.element(&self.ids.console) {
            let _ = console.class_list().toggle_with_force("expanded", expanded);
        }
        if let Some(toggle) = self.element(&self.ids.console_toggle) {
            toggle.set_text_content(Some(if expanded { "Collapse" } else { "Details" }));
        }
        if let Some(minimize) = self.element(&self.ids.console_minimize) {
            set_display(&minimize, if expanded { "flex" } else { "none" });
        }
    }

    fn set_busy(&self, busy: bool) {
        let Some(loading) = self.element(&self.ids.loading) else {
            return;
        };
        if busy {
            let _ = loading.class_list().add_1("show");
        } else {
            Timeout::new(BUSY_LINGER_MS, move || {
                let _ = loading.class_list().remove_1("show");
            })
            .forget();
        }
    }

    fn show_completions(&self, kind: SourceKind, state: &CompletionState) {
        let Some(dropdown) = self.element(&self.ids.completion) else {
            return;
        };
        dropdown.set_inner_html("");
        if !state.is_visible() {
            set_display(&dropdown, "none");
            return;
        }
        let _ = dropdown.set_attribute(KIND_ATTR, kind.as_str());
        for (i, suggestion) in state.suggestions().iter().enumerate() {
            let class = if state.selected_index() == Some(i) {
                format!("{ITEM_CLASS} selected")
            } else {
                ITEM_CLASS.to_string()
            };
            if let Some(item) = self.create("div", &class, Some(suggestion)) {
                let _ = item.set_attribute(INDEX_ATTR, &i.to_string());
                let _ = dropdown.append_child(&item);
            }
        }
        set_display(&dropdown, "block");
    }

    fn offer_download(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<(), PlatformError> {
        let js_err = |e: wasm_bindgen::JsValue| PlatformError(format!("{e:?}"));

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let bag = web_sys::BlobPropertyBag::new();
        bag.set_type(mime);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &bag)
            .map_err(js_err)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

        let link = self
            .document
            .create_element("a")
            .map_err(js_err)?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| PlatformError::from("anchor element has unexpected type"))?;
        link.set_href(&url);
        link.set_download(name);
        let _ = link.style().set_property("display", "none");

        let body = self.document.body().ok_or("no body")?;
        body.append_child(&link).map_err(js_err)?;
        link.click();
        link.remove();

        Timeout::new(REVOKE_DELAY_MS, move || {
            let _ = web_sys::Url::revoke_object_url(&url);
        })
        .forget();

        if let Some(menu) = self.element(&self.ids.download_menu) {
            let _ = menu.class_list().remove_1("show");
        }
        tracing::debug!(name, bytes = bytes.len(), "download offered");
        Ok(())
    }
}
