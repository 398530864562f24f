//! playpen-core: the live HTML/CSS/JS playground pipeline, without browser
//! dependencies.
//!
//! This crate provides:
//! - `SourceBuffers` - the three source panes, ropey-backed
//! - `compose` - source fragments to one instrumented preview document
//! - `FeedbackChannel` - typed logs and errors coming back from the preview
//! - `ConsolePanel` - scrollback, counters, status and toasts
//! - `Debouncer` over a `TaskScheduler` capability
//! - `PersistenceAdapter` over a `KeyValueStore` capability
//! - `PlaygroundSession<P: Platform>` - everything above wired together

pub mod actions;
pub mod buffer;
pub mod completion;
pub mod composer;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod feedback;
pub mod persistence;
pub mod platform;
pub mod scheduler;
pub mod session;
pub mod text;
pub mod types;

pub use actions::{
    Key, KeyBindings, KeyCombo, KeydownResult, Modifiers, PlaygroundAction, action_for_key,
};
pub use buffer::{SourceBuffer, SourceBuffers, line_gutter};
pub use completion::{CompletionState, current_word, suggest};
pub use composer::{ComposedDocument, compose};
pub use config::PlaygroundConfig;
pub use console::{ConsoleEntry, ConsolePanel, ConsoleState, ConsoleStatus, ConsoleUpdate, Toast};
pub use error::{ExportError, PersistError, PlatformError, StoreError};
pub use export::{ARCHIVE_NAME, ExportFile, export_file, package_archive, standalone_html};
pub use feedback::{FeedbackChannel, FeedbackEvent, FeedbackKind, FeedbackMessage, FeedbackSender};
pub use persistence::{KeyValueStore, MemoryStore, PersistedProjectState, PersistenceAdapter};
pub use platform::{HostView, Platform, PreviewSurface};
pub use scheduler::{Debouncer, ManualScheduler, TaskScheduler, TaskToken};
pub use session::PlaygroundSession;
pub use smol_str::SmolStr;
pub use text::{SourceRope, TextBuffer};
pub use types::{Selection, SourceKind, Sources, Theme};
