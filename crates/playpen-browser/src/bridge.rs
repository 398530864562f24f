//! Window `message` events into the feedback channel.

use gloo_events::EventListener;
use gloo_utils::format::JsValueSerdeExt;
use playpen_core::FeedbackSender;
use wasm_bindgen::JsCast;
use web_sys::{HtmlIFrameElement, MessageEvent};

/// Listens for messages posted by the preview and forwards recognised
/// feedback records to a [`FeedbackSender`].
///
/// The listener is removed when the bridge is dropped.
pub struct MessageBridge {
    _listener: EventListener,
}

impl MessageBridge {
    /// Forward only messages whose source is `frame`'s window.
    pub fn attach_to_frame(
        window: &web_sys::Window,
        sender: FeedbackSender,
        frame: HtmlIFrameElement,
    ) -> Self {
        let listener = EventListener::new(window, "message", move |event| {
            let Some(event) = event.dyn_ref::<MessageEvent>() else {
                return;
            };
            if !from_frame(event, &frame) {
                return;
            }
            match event.data().into_serde::<serde_json::Value>() {
                Ok(value) => {
                    if !sender.send_value(&value) {
                        tracing::trace!("ignoring non-feedback message");
                    }
                }
                Err(e) => tracing::trace!(error = %e, "unreadable message payload"),
            }
        });
        Self {
            _listener: listener,
        }
    }
}

fn from_frame(event: &MessageEvent, frame: &HtmlIFrameElement) -> bool {
    match (event.source(), frame.content_window()) {
        (Some(source), Some(window)) => js_sys::Object::is(&source, &window),
        _ => false,
    }
}
