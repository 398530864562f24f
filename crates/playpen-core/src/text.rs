//! Text storage for source buffers.
//!
//! The `TextBuffer` trait keeps buffer logic independent of the storage type.
//! `SourceRope` is the ropey-backed implementation used by every buffer.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// A text buffer that supports editing and offset conversion.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Insert text at char offset. Offsets past the end are clamped.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range. The range is clamped to the buffer.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let start = char_range.start.min(self.len_chars());
        self.delete(char_range);
        self.insert(start, text);
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Number of lines. An empty buffer has one line.
    fn len_lines(&self) -> usize;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;
}

/// Ropey-backed text buffer.
#[derive(Clone, Default)]
pub struct SourceRope {
    rope: ropey::Rope,
}

impl SourceRope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }
}

impl TextBuffer for SourceRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        let offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let len = self.rope.len_chars();
        let start = char_range.start.min(len);
        let end = char_range.end.clamp(start, len);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

impl From<&str> for SourceRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for SourceRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

impl std::fmt::Debug for SourceRope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SourceRope").field(&self.rope.to_string()).finish()
    }
}
