//! Preview document composition.
//!
//! `compose` turns the three source fragments into one self-contained HTML
//! document. The document carries a fixed instrumentation preamble that
//! forwards `console.log`/`warn`/`error` calls and uncaught errors to the
//! parent window as feedback messages (see [`crate::feedback::FeedbackMessage`]),
//! and runs the user script inside a `try`/`catch` so a synchronous throw is
//! reported instead of leaving the preview half-initialised.
//!
//! Composition is pure and deterministic: the same inputs always produce the
//! same bytes. Markup and style are embedded verbatim; this is a single-user
//! tool and does no sanitization.

use std::fmt;

/// Style rules applied before the user's stylesheet.
pub const BASELINE_STYLE: &str = "body{margin:0;padding:20px;font-family:sans-serif;}";

/// Prefix of the console error reported when the user script throws.
pub const SCRIPT_ERROR_PREFIX: &str = "JavaScript error:";

/// Installed in the preview's `<head>` before any user code runs.
///
/// Every `postMessage` is guarded so that a missing or hostile parent can
/// never break the instrumented script.
const INSTRUMENTATION: &str = r#"window.onerror = function(msg, url, line, col, error) {
  try { window.parent.postMessage({type: 'error', message: String(msg), line: line, column: col}, '*'); } catch (e) {}
  return false;
};
(function() {
  var original = { log: console.log, error: console.error, warn: console.warn };
  function forward(type, args) {
    try { window.parent.postMessage({type: type, message: Array.prototype.join.call(args, ' ')}, '*'); } catch (e) {}
  }
  console.log = function() { forward('log', arguments); original.log.apply(console, arguments); };
  console.error = function() { forward('error', arguments); original.error.apply(console, arguments); };
  console.warn = function() { forward('warning', arguments); original.warn.apply(console, arguments); };
})();"#;

/// A fully composed preview document.
///
/// Built fresh for every render cycle and never modified afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ComposedDocument(String);

impl ComposedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode the document as a `data:` URI suitable for an iframe `src`.
    ///
    /// Loading a data URI is a full navigation, so nothing from a previous
    /// render (globals, listeners, timers) survives into the next one.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:text/html;charset=utf-8,{}",
            urlencoding::encode(&self.0)
        )
    }
}

impl fmt::Debug for ComposedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedDocument")
            .field("len", &self.0.len())
            .finish()
    }
}

impl AsRef<str> for ComposedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compose markup, style and script into one executable document.
pub fn compose(markup: &str, style: &str, script: &str) -> ComposedDocument {
    let mut doc = String::with_capacity(
        INSTRUMENTATION.len() + BASELINE_STYLE.len() + markup.len() + style.len() + script.len() + 512,
    );

    doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    doc.push_str("<meta charset=\"UTF-8\">\n");
    doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    doc.push_str("<title>Live preview</title>\n");

    doc.push_str("<style>");
    doc.push_str(BASELINE_STYLE);
    doc.push_str(style);
    doc.push_str("</style>\n");

    doc.push_str("<script>\n");
    doc.push_str(INSTRUMENTATION);
    doc.push_str("\n</script>\n</head>\n<body>\n");

    doc.push_str(markup);

    // Newlines around the script keep a trailing `//` comment from
    // swallowing the catch clause.
    doc.push_str("\n<script>try {\n");
    doc.push_str(script);
    doc.push_str("\n} catch (e) { console.error('");
    doc.push_str(SCRIPT_ERROR_PREFIX);
    doc.push_str("', e && e.message !== undefined ? e.message : String(e)); }</script>\n");

    doc.push_str("</body>\n</html>\n");

    ComposedDocument(doc)
}
