//! Platform abstraction traits for the playground.
//!
//! These traits define the interface between the preview pipeline and the
//! environment hosting it (browser DOM, test fakes). The session only talks
//! to its collaborators through them.

use crate::completion::CompletionState;
use crate::composer::ComposedDocument;
use crate::console::{ConsoleStatus, ConsoleUpdate};
use crate::error::PlatformError;
use crate::persistence::KeyValueStore;
use crate::scheduler::TaskScheduler;
use crate::types::{SourceKind, Theme};

/// An isolated surface that renders composed documents.
///
/// Loading replaces whatever the surface showed before in full. Execution of
/// the document's scripts may happen after `load` returns.
pub trait PreviewSurface {
    fn load(&self, document: &ComposedDocument) -> Result<(), PlatformError>;
}

/// The host page around the preview: editors, console panel, indicators.
///
/// Every method has a no-op default so partial hosts only implement what
/// they show.
pub trait HostView {
    /// Put `text` into the editor for `kind` with the caret at `cursor` (chars).
    fn write_source(&self, _kind: SourceKind, _text: &str, _cursor: usize) {}

    /// Refresh the line-number gutter for `kind`.
    fn write_gutter(&self, _kind: SourceKind, _gutter: &str) {}

    fn apply_theme(&self, _theme: Theme) {}

    /// A console entry was recorded.
    fn console_updated(&self, _update: &ConsoleUpdate) {}

    /// The console was cleared; `status` is the fresh summary.
    fn console_cleared(&self, _status: ConsoleStatus) {}

    fn set_console_expanded(&self, _expanded: bool) {}

    /// Render cycle in progress.
    fn set_busy(&self, _busy: bool) {}

    /// Show (or hide, when empty) the completion dropdown for `kind`.
    fn show_completions(&self, _kind: SourceKind, _state: &CompletionState) {}

    /// Hand a file to the user.
    fn offer_download(&self, name: &str, _mime: &str, _bytes: &[u8]) -> Result<(), PlatformError> {
        Err(PlatformError(format!("downloads unsupported: {name}")))
    }
}

/// Headless host: shows nothing.
impl HostView for () {}

impl<V: HostView + ?Sized> HostView for std::rc::Rc<V> {
    fn write_source(&self, kind: SourceKind, text: &str, cursor: usize) {
        (**self).write_source(kind, text, cursor)
    }

    fn write_gutter(&self, kind: SourceKind, gutter: &str) {
        (**self).write_gutter(kind, gutter)
    }

    fn apply_theme(&self, theme: Theme) {
        (**self).apply_theme(theme)
    }

    fn console_updated(&self, update: &ConsoleUpdate) {
        (**self).console_updated(update)
    }

    fn console_cleared(&self, status: ConsoleStatus) {
        (**self).console_cleared(status)
    }

    fn set_console_expanded(&self, expanded: bool) {
        (**self).set_console_expanded(expanded)
    }

    fn set_busy(&self, busy: bool) {
        (**self).set_busy(busy)
    }

    fn show_completions(&self, kind: SourceKind, state: &CompletionState) {
        (**self).show_completions(kind, state)
    }

    fn offer_download(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<(), PlatformError> {
        (**self).offer_download(name, mime, bytes)
    }
}

/// The set of capabilities a session runs on.
pub trait Platform: 'static {
    type Surface: PreviewSurface + 'static;
    type Scheduler: TaskScheduler + 'static;
    type Store: KeyValueStore + 'static;
    type View: HostView + 'static;

    /// Whether Cmd rather than Ctrl is the primary shortcut modifier.
    fn is_mac() -> bool {
        false
    }
}
