//! Feedback from the preview surface back to the host.
//!
//! The preview runs in an isolated context and reports logs and errors as
//! plain messages (`{type, message, line?, column?}`). This module defines
//! the typed event, the wire form, and a one-directional channel that is
//! independent of whatever transport carries the messages.
//!
//! The channel is best-effort and unacknowledged. Sending never fails and
//! never panics, events are delivered in send order, and there is no
//! backpressure: a burst of sends is a burst of deliveries.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Severity of a feedback event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Log,
    Warning,
    Error,
}

impl FeedbackKind {
    /// Parse the wire `type` field. Unknown values are `None`.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "log" => Some(FeedbackKind::Log),
            "warning" => Some(FeedbackKind::Warning),
            "error" => Some(FeedbackKind::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Log => "log",
            FeedbackKind::Warning => "warning",
            FeedbackKind::Error => "error",
        }
    }
}

/// A log, warning or error raised inside the preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub kind: FeedbackKind,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl FeedbackEvent {
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Log, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Error, message)
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Wire form of a feedback event, as posted by the instrumented preview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl FeedbackMessage {
    /// Interpret an arbitrary posted value.
    ///
    /// Returns `None` for anything that is not a feedback record, including
    /// records with an unknown `type`. Non-string messages are rendered with
    /// their JSON text; non-numeric positions are dropped.
    pub fn parse_value(value: &serde_json::Value) -> Option<FeedbackEvent> {
        let obj = value.as_object()?;
        let kind = FeedbackKind::from_wire(obj.get("type")?.as_str()?)?;
        let message = match obj.get("message") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let position = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
        };
        Some(FeedbackEvent {
            kind,
            message,
            line: position("line"),
            column: position("column"),
        })
    }

    /// Convert to a typed event. Unknown kinds are `None`.
    pub fn into_event(self) -> Option<FeedbackEvent> {
        let kind = FeedbackKind::from_wire(&self.kind)?;
        Some(FeedbackEvent {
            kind,
            message: self.message,
            line: self.line,
            column: self.column,
        })
    }
}

impl From<&FeedbackEvent> for FeedbackMessage {
    fn from(event: &FeedbackEvent) -> Self {
        Self {
            kind: event.kind.as_str().to_string(),
            message: event.message.clone(),
            line: event.line,
            column: event.column,
        }
    }
}

type Handler = Box<dyn FnMut(FeedbackEvent)>;

struct ChannelInner {
    handlers: RefCell<Vec<Handler>>,
    queue: RefCell<VecDeque<FeedbackEvent>>,
    dispatching: Cell<bool>,
}

/// Consumer side of the feedback channel.
///
/// Handlers registered with [`on_event`](Self::on_event) are called for every
/// event, synchronously from `send`. A send issued from inside a handler is
/// queued and delivered once the current event has been handled, so
/// delivery order always matches send order.
#[derive(Clone)]
pub struct FeedbackChannel {
    inner: Rc<ChannelInner>,
}

impl Default for FeedbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackChannel {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                handlers: RefCell::new(Vec::new()),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Register a handler for every subsequent event.
    pub fn on_event(&self, handler: impl FnMut(FeedbackEvent) + 'static) {
        // Registration from inside a handler would conflict with the
        // dispatch borrow; such handlers are dropped.
        match self.inner.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.push(Box::new(handler)),
            Err(_) => tracing::warn!("feedback handler registered during dispatch; ignored"),
        }
    }

    /// Producer handle for this channel.
    pub fn sender(&self) -> FeedbackSender {
        FeedbackSender {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn dispatch(inner: &ChannelInner, event: FeedbackEvent) {
        inner.queue.borrow_mut().push_back(event);
        if inner.dispatching.get() {
            return;
        }
        inner.dispatching.set(true);
        loop {
            let next = inner.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            let mut handlers = inner.handlers.borrow_mut();
            if let Some((last, rest)) = handlers.split_last_mut() {
                for handler in rest {
                    handler(event.clone());
                }
                last(event);
            }
        }
        inner.dispatching.set(false);
    }
}

/// Producer side of the feedback channel.
///
/// Holds only a weak reference: sending after the channel is gone is a no-op.
#[derive(Clone)]
pub struct FeedbackSender {
    inner: std::rc::Weak<ChannelInner>,
}

impl FeedbackSender {
    /// Deliver an event. Never fails.
    pub fn send(&self, event: FeedbackEvent) {
        match self.inner.upgrade() {
            Some(inner) => FeedbackChannel::dispatch(&inner, event),
            None => tracing::debug!(kind = event.kind.as_str(), "feedback channel closed; event dropped"),
        }
    }

    /// Parse and deliver a posted wire value, ignoring anything unrecognised.
    pub fn send_value(&self, value: &serde_json::Value) -> bool {
        match FeedbackMessage::parse_value(value) {
            Some(event) => {
                self.send(event);
                true
            }
            None => false,
        }
    }
}
