//! Downloadable exports of the current project.
//!
//! Exports are plain documents with no instrumentation: the markup pane
//! becomes a standalone page, and the packaged archive links the stylesheet
//! and script as separate files.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::ExportError;
use crate::types::{SourceKind, Sources};

/// Suggested file name of the packaged archive.
pub const ARCHIVE_NAME: &str = "project.zip";

/// A single file ready to hand to the browser's download machinery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub contents: String,
}

fn push_head(out: &mut String) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("    <meta charset=\"UTF-8\">\n");
    out.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str("    <title>Document</title>\n");
}

/// The markup pane as a complete page with no external references.
pub fn standalone_html(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len() + 256);
    push_head(&mut out);
    out.push_str("</head>\n<body>\n");
    out.push_str(markup);
    out.push_str("\n</body>\n</html>");
    out
}

/// The page used inside the packaged archive, linking `style.css` and
/// `script.js`.
pub fn package_html(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len() + 320);
    push_head(&mut out);
    out.push_str("    <link rel=\"stylesheet\" href=\"style.css\" />\n");
    out.push_str("</head>\n<body>\n");
    out.push_str(markup);
    out.push_str("\n    <script src=\"script.js\"></script>\n</body>\n</html>");
    out
}

pub fn mime_type(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Markup => "text/html",
        SourceKind::Style => "text/css",
        SourceKind::Script => "application/javascript",
    }
}

/// One pane as a single download (`index.html`, `index.css` or `index.js`).
///
/// A pane holding only whitespace is [`ExportError::Empty`].
pub fn export_file(kind: SourceKind, sources: &Sources) -> Result<ExportFile, ExportError> {
    let source = sources.get(kind);
    if source.trim().is_empty() {
        return Err(ExportError::Empty(kind));
    }

    let contents = match kind {
        SourceKind::Markup => standalone_html(source),
        SourceKind::Style | SourceKind::Script => source.to_string(),
    };

    Ok(ExportFile {
        name: format!("index.{}", kind.as_str()),
        mime: mime_type(kind),
        contents,
    })
}

/// All three panes as a zip archive: `index.html`, `style.css`, `script.js`.
pub fn package_archive(sources: &Sources) -> Result<Vec<u8>, ExportError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

    let entries = [
        ("index.html", package_html(&sources.markup)),
        ("style.css", sources.style.clone()),
        ("script.js", sources.script.clone()),
    ];
    for (name, contents) in entries {
        zip.start_file(name, options)?;
        zip.write_all(contents.as_bytes())?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(bytes = bytes.len(), "packaged project archive");
    Ok(bytes)
}
