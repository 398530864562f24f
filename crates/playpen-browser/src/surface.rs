//! Iframe preview surface.

use playpen_core::{ComposedDocument, PlatformError, PreviewSurface};
use wasm_bindgen::JsCast;
use web_sys::HtmlIFrameElement;

/// Renders composed documents into an iframe by navigating it to a `data:` URI.
///
/// Every load is a full navigation, so the previous render's globals,
/// listeners and timers are discarded with it.
#[derive(Clone)]
pub struct IframeSurface {
    frame: HtmlIFrameElement,
}

impl IframeSurface {
    pub fn new(frame: HtmlIFrameElement) -> Self {
        Self { frame }
    }

    /// Look the iframe up by element id.
    pub fn by_id(id: &str) -> Result<Self, PlatformError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let frame = document
            .get_element_by_id(id)
            .ok_or_else(|| PlatformError(format!("no element #{id}")))?
            .dyn_into::<HtmlIFrameElement>()
            .map_err(|_| PlatformError(format!("#{id} is not an iframe")))?;
        Ok(Self::new(frame))
    }

    pub fn element(&self) -> &HtmlIFrameElement {
        &self.frame
    }

    /// The iframe's window, used to recognise its messages.
    pub fn content_window(&self) -> Option<web_sys::Window> {
        self.frame.content_window()
    }
}

impl PreviewSurface for IframeSurface {
    fn load(&self, document: &ComposedDocument) -> Result<(), PlatformError> {
        if !self.frame.is_connected() {
            return Err(PlatformError::from("preview frame is not attached"));
        }
        self.frame.set_src(&document.to_data_uri());
        Ok(())
    }
}
