//! The playground session: buffers, console, debouncer and persistence wired
//! to an injected platform.
//!
//! A session is constructed explicitly by the host and usually shared as
//! `Rc<RefCell<PlaygroundSession<P>>>` so that timer callbacks can reach it.
//! Those callbacks hold only a `Weak` reference and do nothing once the
//! session is gone.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use web_time::Instant;

use crate::actions::{KeyBindings, KeyCombo, KeydownResult, PlaygroundAction};
use crate::buffer::{SourceBuffer, SourceBuffers};
use crate::completion::CompletionState;
use crate::composer::compose;
use crate::config::PlaygroundConfig;
use crate::console::ConsolePanel;
use crate::error::{ExportError, PersistError};
use crate::export::{self, ARCHIVE_NAME, ExportFile};
use crate::feedback::{FeedbackChannel, FeedbackEvent, FeedbackSender};
use crate::persistence::{PersistedProjectState, PersistenceAdapter};
use crate::platform::{HostView, Platform, PreviewSurface};
use crate::scheduler::Debouncer;
use crate::types::{Selection, SourceKind, Sources, Theme};

/// Prefix of the console error reported when a render cycle fails.
pub const EXECUTION_ERROR_PREFIX: &str = "Execution error:";

/// A live playground bound to one platform.
pub struct PlaygroundSession<P: Platform> {
    config: PlaygroundConfig,
    buffers: SourceBuffers,
    theme: Theme,
    console: Rc<RefCell<ConsolePanel>>,
    feedback: FeedbackChannel,
    debouncer: Rc<Debouncer<P::Scheduler>>,
    persistence: PersistenceAdapter<P::Store>,
    surface: P::Surface,
    view: Rc<P::View>,
    keybindings: KeyBindings,
    completion: CompletionState,
    cycles: u64,
}

impl<P: Platform> PlaygroundSession<P> {
    pub fn new(
        config: PlaygroundConfig,
        surface: P::Surface,
        scheduler: P::Scheduler,
        store: P::Store,
        view: Rc<P::View>,
    ) -> Self {
        let console = Rc::new(RefCell::new(config.console_panel()));
        let feedback = FeedbackChannel::new();
        {
            let console = console.clone();
            let view = view.clone();
            feedback.on_event(move |event| {
                // The view is notified after the panel borrow ends so it may
                // read the panel back.
                let update = console.borrow_mut().receive(event);
                view.console_updated(&update);
            });
        }

        Self {
            debouncer: Rc::new(Debouncer::new(scheduler, config.debounce())),
            persistence: PersistenceAdapter::with_keys(
                store,
                config.storage_key.clone(),
                config.theme_key.clone(),
            ),
            completion: CompletionState::new(config.max_suggestions),
            keybindings: KeyBindings::default_for_platform(P::is_mac()),
            buffers: SourceBuffers::new(),
            theme: Theme::default(),
            console,
            feedback,
            surface,
            view,
            config,
            cycles: 0,
        }
    }

    pub fn into_shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Restore the persisted project, show it, and render once.
    pub fn start(&mut self) {
        let stored = match self.persistence.try_load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "stored project unreadable, starting empty");
                self.report(FeedbackEvent::warning(format!(
                    "Saved project unreadable: {e}"
                )));
                None
            }
        };
        let (state, theme) = match stored {
            Some(state) => {
                let theme = state.theme;
                (state, theme)
            }
            None => (PersistedProjectState::default(), self.stored_theme()),
        };

        self.buffers = SourceBuffers::from_sources(&state.sources());
        self.theme = theme;
        self.sync_view();
        self.view.apply_theme(self.theme);
        tracing::debug!(theme = %self.theme, "session started");
        self.run();
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn sources(&self) -> Sources {
        self.buffers.sources()
    }

    pub fn buffer(&self, kind: SourceKind) -> &SourceBuffer {
        self.buffers.get(kind)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn console(&self) -> Ref<'_, ConsolePanel> {
        self.console.borrow()
    }

    pub fn completion(&self) -> &CompletionState {
        &self.completion
    }

    /// Completed render cycles since the session was created.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_run_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Producer handle for the preview's feedback transport.
    pub fn feedback_sender(&self) -> FeedbackSender {
        self.feedback.sender()
    }

    /// Take an edit reported by the host's editor widget.
    pub fn apply_edit(&mut self, kind: SourceKind, text: &str, cursor: usize) {
        let buffer = self.buffers.get_mut(kind);
        buffer.sync(text, cursor);
        self.view.write_gutter(kind, &buffer.line_gutter());
        self.completion.refresh(buffer);
        self.view.show_completions(kind, &self.completion);
    }

    /// Move the caret or selection without an edit, e.g. after a click.
    pub fn select(&mut self, kind: SourceKind, anchor: usize, head: usize) {
        let buffer = self.buffers.get_mut(kind);
        if anchor == head {
            buffer.set_selection(None);
            buffer.set_cursor(head);
        } else {
            buffer.set_selection(Some(Selection::new(anchor, head)));
        }
    }

    /// Highlight a dropdown suggestion, e.g. under the pointer.
    pub fn highlight_completion(&mut self, kind: SourceKind, index: usize) {
        if self.completion.selected_index() == Some(index) {
            return;
        }
        self.completion.select(index);
        self.view.show_completions(kind, &self.completion);
    }

    pub fn hide_completions(&mut self, kind: SourceKind) {
        if self.completion.is_visible() {
            self.completion.hide();
            self.view.show_completions(kind, &self.completion);
        }
    }

    /// Insert the suggestion at `index` into the editor for `kind` and
    /// schedule a render. Returns false if there is no such suggestion.
    pub fn accept_completion(this: &Rc<RefCell<Self>>, kind: SourceKind, index: usize) -> bool {
        let accepted = {
            let mut session = this.borrow_mut();
            let session = &mut *session;
            let accepted = session
                .completion
                .accept(session.buffers.get_mut(kind), index);
            if accepted {
                session.write_buffer(kind);
            }
            session.view.show_completions(kind, &session.completion);
            accepted
        };
        if accepted {
            Self::schedule_run(this);
        }
        accepted
    }

    /// Debounce a render cycle. Only the last call within the delay runs.
    pub fn schedule_run(this: &Rc<RefCell<Self>>) {
        let debouncer = this.borrow().debouncer.clone();
        Self::debounce_run(Rc::downgrade(this), &debouncer);
    }

    fn debounce_run(session: Weak<RefCell<Self>>, debouncer: &Rc<Debouncer<P::Scheduler>>) {
        let retry = Rc::downgrade(debouncer);
        debouncer.trigger(move || {
            let Some(this) = session.upgrade() else {
                tracing::debug!("session dropped before debounced run");
                return;
            };
            let Ok(mut this) = this.try_borrow_mut() else {
                // Still owed a render: wait out another delay.
                tracing::debug!("session busy, debounced run deferred");
                if let Some(debouncer) = retry.upgrade() {
                    Self::debounce_run(session, &debouncer);
                }
                return;
            };
            this.run();
        });
    }

    /// An edit followed by a debounced run.
    pub fn input(this: &Rc<RefCell<Self>>, kind: SourceKind, text: &str, cursor: usize) {
        this.borrow_mut().apply_edit(kind, text, cursor);
        Self::schedule_run(this);
    }

    /// Compose the current sources, load them into the surface and persist.
    ///
    /// A failure is reported on the console; the next cycle starts fresh.
    pub fn run(&mut self) {
        self.debouncer.cancel();
        let started = Instant::now();
        self.view.set_busy(true);

        let sources = self.buffers.sources();
        let document = compose(&sources.markup, &sources.style, &sources.script);
        match self.surface.load(&document) {
            Ok(()) => {
                self.cycles += 1;
                tracing::debug!(
                    cycle = self.cycles,
                    bytes = document.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "preview rendered"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "render cycle failed");
                self.report(FeedbackEvent::error(format!("{EXECUTION_ERROR_PREFIX} {e}")));
            }
        }

        self.view.set_busy(false);
        if let Err(e) = self.persist() {
            self.report_persist_error(&e);
        }
    }

    /// Persist now and confirm on the console.
    pub fn save(&mut self) -> Result<(), PersistError> {
        match self.persist() {
            Ok(()) => {
                self.report(FeedbackEvent::log("Code saved"));
                Ok(())
            }
            Err(e) => {
                self.report_persist_error(&e);
                Err(e)
            }
        }
    }

    /// Persist without any console output, as on page unload.
    pub fn persist(&self) -> Result<(), PersistError> {
        self.persistence.save(&self.snapshot())
    }

    /// Empty every pane, render the empty document and clear the console.
    pub fn reset(&mut self) {
        self.buffers.clear();
        self.completion.hide();
        self.sync_view();
        self.run();
        self.clear_console();
        self.report(FeedbackEvent::log("Editors reset"));
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.view.apply_theme(self.theme);
        if let Err(e) = self.persistence.save_theme(self.theme) {
            self.report_persist_error(&e);
        }
        self.theme
    }

    pub fn clear_console(&mut self) {
        let status = {
            let mut console = self.console.borrow_mut();
            console.clear();
            console.status()
        };
        self.view.console_cleared(status);
    }

    /// Collapse the console panel, whatever its state.
    pub fn collapse_console(&mut self) {
        self.console.borrow_mut().collapse();
        self.view.set_console_expanded(false);
    }

    pub fn toggle_console(&mut self) -> bool {
        let expanded = self.console.borrow_mut().toggle_expanded();
        self.view.set_console_expanded(expanded);
        expanded
    }

    /// Current project as it would be persisted.
    pub fn snapshot(&self) -> PersistedProjectState {
        PersistedProjectState::new(self.buffers.sources(), self.theme)
    }

    /// Handle a keydown in the editor for `kind`.
    ///
    /// The completion dropdown sees the key first; then the shortcut table.
    pub fn handle_key(this: &Rc<RefCell<Self>>, kind: SourceKind, combo: &KeyCombo) -> KeydownResult {
        let (result, edited) = this.borrow_mut().dispatch_key(kind, combo);
        if edited {
            Self::schedule_run(this);
        }
        result
    }

    fn dispatch_key(&mut self, kind: SourceKind, combo: &KeyCombo) -> (KeydownResult, bool) {
        if !combo.modifiers.any() {
            let buffer = self.buffers.get_mut(kind);
            let before = buffer.len_chars();
            let cursor = buffer.cursor();
            let was_visible = self.completion.is_visible();
            match self.completion.handle_key(&combo.key, buffer) {
                KeydownResult::Handled => {
                    let edited = buffer.cursor() != cursor || buffer.len_chars() != before;
                    if edited {
                        self.write_buffer(kind);
                    }
                    self.view.show_completions(kind, &self.completion);
                    return (KeydownResult::Handled, edited);
                }
                KeydownResult::PassThrough | KeydownResult::NotHandled => {
                    if was_visible && !self.completion.is_visible() {
                        self.view.show_completions(kind, &self.completion);
                    }
                }
            }
        }

        let Some(action) = self.keybindings.lookup(combo) else {
            return (KeydownResult::NotHandled, false);
        };
        tracing::trace!(?action, "shortcut");
        let edited = self.perform(kind, action);
        (KeydownResult::Handled, edited)
    }

    /// Run an action. Returns true if the buffer for `kind` changed.
    pub fn perform(&mut self, kind: SourceKind, action: PlaygroundAction) -> bool {
        match action {
            PlaygroundAction::Run => self.run(),
            PlaygroundAction::Save => {
                let _ = self.save();
            }
            PlaygroundAction::Indent => {
                let indent = self.config.indent.clone();
                self.buffers.get_mut(kind).replace_selection(&indent);
                self.completion.hide();
                self.write_buffer(kind);
                return true;
            }
            PlaygroundAction::ToggleConsole => {
                self.toggle_console();
            }
            PlaygroundAction::ClearConsole => self.clear_console(),
            PlaygroundAction::Reset => self.reset(),
            PlaygroundAction::ToggleTheme => {
                self.toggle_theme();
            }
        }
        false
    }

    /// Build the single-file export for `kind`. An empty pane is reported as
    /// a console warning.
    pub fn export_file(&self, kind: SourceKind) -> Result<ExportFile, ExportError> {
        export::export_file(kind, &self.buffers.sources()).inspect_err(|e| {
            if matches!(e, ExportError::Empty(_)) {
                self.report(FeedbackEvent::warning(capitalize(&e.to_string())));
            }
        })
    }

    /// Export one pane and hand it to the host for download.
    pub fn download(&self, kind: SourceKind) -> Result<(), ExportError> {
        let file = self.export_file(kind)?;
        match self.view.offer_download(&file.name, file.mime, file.contents.as_bytes()) {
            Ok(()) => {
                self.report(FeedbackEvent::log(format!(
                    "{} file downloaded",
                    kind.as_str().to_uppercase()
                )));
            }
            Err(e) => self.report(FeedbackEvent::error(format!("Download failed: {e}"))),
        }
        Ok(())
    }

    /// Package every pane as a zip and hand it to the host for download.
    pub fn download_all(&self) -> Result<(), ExportError> {
        let bytes = export::package_archive(&self.buffers.sources()).inspect_err(|e| {
            self.report(FeedbackEvent::error(format!("Export failed: {e}")));
        })?;
        match self.view.offer_download(ARCHIVE_NAME, "application/zip", &bytes) {
            Ok(()) => self.report(FeedbackEvent::log("Project exported as .zip")),
            Err(e) => self.report(FeedbackEvent::error(format!("Download failed: {e}"))),
        }
        Ok(())
    }

    /// Host-originated console message, delivered like preview feedback.
    fn report(&self, event: FeedbackEvent) {
        self.feedback.sender().send(event);
    }

    /// Theme preference for a session without a stored project.
    fn stored_theme(&self) -> Theme {
        match self.persistence.try_load_theme() {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "theme preference unreadable");
                self.report(FeedbackEvent::warning(format!(
                    "Theme preference unreadable: {e}"
                )));
                Theme::default()
            }
        }
    }

    fn report_persist_error(&self, error: &PersistError) {
        tracing::warn!(error = %error, "project not saved");
        self.report(FeedbackEvent::warning(format!("Project not saved: {error}")));
    }

    fn write_buffer(&self, kind: SourceKind) {
        let buffer = self.buffers.get(kind);
        self.view.write_source(kind, &buffer.text(), buffer.cursor());
        self.view.write_gutter(kind, &buffer.line_gutter());
    }

    fn sync_view(&self) {
        for kind in SourceKind::ALL {
            self.write_buffer(kind);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
