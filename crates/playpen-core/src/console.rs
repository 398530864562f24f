//! In-page console panel state.
//!
//! `ConsolePanel` consumes feedback events as they arrive, keeps the
//! scrollback and error/warning counters, derives a status summary, and
//! produces transient toasts for warnings and errors. It holds no view
//! state beyond the expanded flag; rendering is the host view's job.

use std::time::Duration;

use web_time::SystemTime;

use crate::feedback::{FeedbackEvent, FeedbackKind};

/// How long a toast stays visible.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

/// Maximum number of message characters shown in a toast.
pub const DEFAULT_TOAST_CHARS: usize = 50;

/// A feedback event as recorded in the scrollback.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleEntry {
    pub event: FeedbackEvent,
    /// Receipt time. Events carry no timestamp of their own.
    pub received_at: SystemTime,
}

impl ConsoleEntry {
    pub fn kind(&self) -> FeedbackKind {
        self.event.kind
    }

    pub fn message(&self) -> &str {
        &self.event.message
    }
}

/// Worst severity seen since the last clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleStatus {
    Clean,
    Warnings(usize),
    Errors(usize),
}

impl ConsoleStatus {
    /// CSS-friendly name of the state.
    pub fn class_name(&self) -> &'static str {
        match self {
            ConsoleStatus::Clean => "success",
            ConsoleStatus::Warnings(_) => "warning",
            ConsoleStatus::Errors(_) => "error",
        }
    }

    pub fn label(&self) -> String {
        match self {
            ConsoleStatus::Clean => "No errors".to_string(),
            ConsoleStatus::Warnings(n) => format!("{n} warning(s)"),
            ConsoleStatus::Errors(n) => format!("{n} error(s)"),
        }
    }
}

/// A transient notification for a warning or error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: FeedbackKind,
    /// Message truncated to the toast character budget.
    pub text: String,
    pub duration: Duration,
}

/// Everything a view needs to reflect one received event.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleUpdate {
    pub entry: ConsoleEntry,
    pub status: ConsoleStatus,
    pub toast: Option<Toast>,
}

/// Console counters, scrollback and panel expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsoleState {
    pub error_count: usize,
    pub warning_count: usize,
    pub scrollback: Vec<ConsoleEntry>,
    pub expanded: bool,
}

impl ConsoleState {
    pub fn status(&self) -> ConsoleStatus {
        if self.error_count > 0 {
            ConsoleStatus::Errors(self.error_count)
        } else if self.warning_count > 0 {
            ConsoleStatus::Warnings(self.warning_count)
        } else {
            ConsoleStatus::Clean
        }
    }
}

/// The console panel model.
#[derive(Clone, Debug)]
pub struct ConsolePanel {
    state: ConsoleState,
    toast_duration: Duration,
    toast_chars: usize,
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION, DEFAULT_TOAST_CHARS)
    }
}

impl ConsolePanel {
    pub fn new(toast_duration: Duration, toast_chars: usize) -> Self {
        Self {
            state: ConsoleState::default(),
            toast_duration,
            toast_chars,
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn error_count(&self) -> usize {
        self.state.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.state.warning_count
    }

    pub fn scrollback(&self) -> &[ConsoleEntry] {
        &self.state.scrollback
    }

    pub fn latest(&self) -> Option<&ConsoleEntry> {
        self.state.scrollback.last()
    }

    pub fn status(&self) -> ConsoleStatus {
        self.state.status()
    }

    pub fn is_expanded(&self) -> bool {
        self.state.expanded
    }

    /// Record an event, stamping it with the current time.
    pub fn receive(&mut self, event: FeedbackEvent) -> ConsoleUpdate {
        self.receive_at(event, SystemTime::now())
    }

    /// Record an event with an explicit receipt time.
    pub fn receive_at(&mut self, event: FeedbackEvent, received_at: SystemTime) -> ConsoleUpdate {
        match event.kind {
            FeedbackKind::Error => self.state.error_count += 1,
            FeedbackKind::Warning => self.state.warning_count += 1,
            FeedbackKind::Log => {}
        }

        let toast = match event.kind {
            FeedbackKind::Log => None,
            kind => Some(Toast {
                kind,
                text: truncate_message(&event.message, self.toast_chars),
                duration: self.toast_duration,
            }),
        };

        let entry = ConsoleEntry { event, received_at };
        self.state.scrollback.push(entry.clone());

        ConsoleUpdate {
            entry,
            status: self.state.status(),
            toast,
        }
    }

    /// Host-originated informational message.
    pub fn log(&mut self, message: impl Into<String>) -> ConsoleUpdate {
        self.receive(FeedbackEvent::log(message))
    }

    /// Host-originated warning.
    pub fn warn(&mut self, message: impl Into<String>) -> ConsoleUpdate {
        self.receive(FeedbackEvent::warning(message))
    }

    /// Host-originated error.
    pub fn error(&mut self, message: impl Into<String>) -> ConsoleUpdate {
        self.receive(FeedbackEvent::error(message))
    }

    /// Reset scrollback and both counters together.
    pub fn clear(&mut self) {
        self.state.scrollback.clear();
        self.state.error_count = 0;
        self.state.warning_count = 0;
    }

    pub fn toggle_expanded(&mut self) -> bool {
        self.state.expanded = !self.state.expanded;
        self.state.expanded
    }

    pub fn collapse(&mut self) {
        self.state.expanded = false;
    }
}

/// Truncate to `max_chars` characters, appending "..." when anything was cut.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &message[..byte_idx]),
        None => message.to_string(),
    }
}
