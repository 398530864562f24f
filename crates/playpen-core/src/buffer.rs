//! Source buffers: one text buffer per pane, each with its own cursor.
//!
//! The cursor is a char offset and never exceeds the buffer length; every
//! mutation clamps it.

use crate::text::{SourceRope, TextBuffer};
use crate::types::{Selection, SourceKind, Sources};

/// A single editable source pane.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    kind: SourceKind,
    text: SourceRope,
    cursor: usize,
    selection: Option<Selection>,
}

impl SourceBuffer {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            text: SourceRope::new(),
            cursor: 0,
            selection: None,
        }
    }

    pub fn with_text(kind: SourceKind, text: &str) -> Self {
        let mut buffer = Self::new(kind);
        buffer.set_text(text);
        buffer
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Replace the whole text. The cursor moves to the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = SourceRope::from_str(text);
        self.cursor = self.text.len_chars();
        self.selection = None;
    }

    /// Replace the whole text and place the cursor, as reported by a host widget.
    pub fn sync(&mut self, text: &str, cursor: usize) {
        self.text = SourceRope::from_str(text);
        self.selection = None;
        self.set_cursor(cursor);
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.text.len_chars());
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        let len = self.text.len_chars();
        self.selection = selection
            .map(|sel| Selection::new(sel.anchor.min(len), sel.head.min(len)))
            .filter(|sel| !sel.is_collapsed());
        if let Some(sel) = self.selection {
            self.cursor = sel.head;
        }
    }

    /// Replace the selection (or insert at the cursor) and put the cursor
    /// after the inserted text.
    pub fn replace_selection(&mut self, text: &str) {
        let range = match self.selection.take() {
            Some(sel) => sel.to_range(),
            None => self.cursor..self.cursor,
        };
        self.text.replace(range.clone(), text);
        self.set_cursor(range.start + text.chars().count());
    }

    /// Replace an explicit char range and put the cursor after the new text.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        self.selection = None;
        self.text.replace(start..end, text);
        let start = start.min(self.text.len_chars());
        self.set_cursor(start + text.chars().count());
    }

    /// Text between the start of the buffer and the cursor.
    pub fn text_before_cursor(&self) -> String {
        self.text
            .slice(0..self.cursor)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    /// Line-number gutter text for this buffer.
    pub fn line_gutter(&self) -> String {
        line_gutter_for(self.text.len_lines())
    }
}

/// Line-number gutter text: `"1\n2\n...\nN"` for a text with N lines.
pub fn line_gutter(text: &str) -> String {
    line_gutter_for(text.split('\n').count())
}

fn line_gutter_for(lines: usize) -> String {
    let lines = lines.max(1);
    let mut out = String::with_capacity(lines * 3);
    for n in 1..=lines {
        if n > 1 {
            out.push('\n');
        }
        out.push_str(&n.to_string());
    }
    out
}

/// The three source panes of a playground.
#[derive(Clone, Debug)]
pub struct SourceBuffers {
    markup: SourceBuffer,
    style: SourceBuffer,
    script: SourceBuffer,
}

impl Default for SourceBuffers {
    fn default() -> Self {
        Self {
            markup: SourceBuffer::new(SourceKind::Markup),
            style: SourceBuffer::new(SourceKind::Style),
            script: SourceBuffer::new(SourceKind::Script),
        }
    }
}

impl SourceBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(sources: &Sources) -> Self {
        Self {
            markup: SourceBuffer::with_text(SourceKind::Markup, &sources.markup),
            style: SourceBuffer::with_text(SourceKind::Style, &sources.style),
            script: SourceBuffer::with_text(SourceKind::Script, &sources.script),
        }
    }

    pub fn get(&self, kind: SourceKind) -> &SourceBuffer {
        match kind {
            SourceKind::Markup => &self.markup,
            SourceKind::Style => &self.style,
            SourceKind::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, kind: SourceKind) -> &mut SourceBuffer {
        match kind {
            SourceKind::Markup => &mut self.markup,
            SourceKind::Style => &mut self.style,
            SourceKind::Script => &mut self.script,
        }
    }

    /// Snapshot the current text of every pane.
    pub fn sources(&self) -> Sources {
        Sources {
            markup: self.markup.text(),
            style: self.style.text(),
            script: self.script.text(),
        }
    }

    pub fn clear(&mut self) {
        for kind in SourceKind::ALL {
            self.get_mut(kind).set_text("");
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceBuffer> {
        [&self.markup, &self.style, &self.script].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_is_clamped() {
        let mut buf = SourceBuffer::with_text(SourceKind::Script, "abc");
        assert_eq!(buf.cursor(), 3);
        buf.set_cursor(10);
        assert_eq!(buf.cursor(), 3);

        buf.sync("a", 3);
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn test_replace_selection_moves_cursor() {
        let mut buf = SourceBuffer::with_text(SourceKind::Markup, "<p>old</p>");
        buf.set_selection(Some(Selection::new(3, 6)));
        buf.replace_selection("new text");
        assert_eq!(buf.text(), "<p>new text</p>");
        assert_eq!(buf.cursor(), 11);
        assert!(buf.selection().is_none());
    }

    #[test]
    fn test_insert_at_cursor() {
        let mut buf = SourceBuffer::with_text(SourceKind::Style, "a{}");
        buf.set_cursor(2);
        buf.replace_selection("color:red");
        assert_eq!(buf.text(), "a{color:red}");
        assert_eq!(buf.cursor(), 11);
    }

    #[test]
    fn test_text_before_cursor() {
        let mut buf = SourceBuffer::with_text(SourceKind::Script, "console.log");
        buf.set_cursor(7);
        assert_eq!(buf.text_before_cursor(), "console");
    }

    #[test]
    fn test_line_gutter() {
        assert_eq!(line_gutter(""), "1");
        assert_eq!(line_gutter("a\nb\nc"), "1\n2\n3");
        assert_eq!(line_gutter("a\n"), "1\n2");
        let buf = SourceBuffer::with_text(SourceKind::Markup, "x\ny");
        assert_eq!(buf.line_gutter(), "1\n2");
    }

    #[test]
    fn test_buffers_snapshot_and_clear() {
        let mut bufs = SourceBuffers::from_sources(&Sources::new("<b>", "b{}", "1;"));
        assert_eq!(bufs.sources(), Sources::new("<b>", "b{}", "1;"));
        bufs.clear();
        assert_eq!(bufs.sources(), Sources::default());
        assert!(bufs.iter().all(|b| b.cursor() == 0));
    }
}
