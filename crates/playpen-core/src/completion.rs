//! Word completion for the source panes.
//!
//! Suggestions come from a small built-in dictionary per source kind and are
//! matched by case-insensitive substring against the word under the cursor.

use crate::actions::{Key, KeydownResult};
use crate::buffer::SourceBuffer;
use crate::types::SourceKind;

/// Default cap on visible suggestions.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 8;

const MARKUP_WORDS: &[&str] = &[
    "div", "span", "section", "article", "aside", "header", "footer", "main", "nav", "p", "a",
    "img", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "button", "form", "input",
    "label", "select", "option", "textarea", "table", "thead", "tbody", "tr", "th", "td",
    "canvas", "video", "audio", "strong", "em", "code", "pre", "blockquote", "class", "id",
    "href", "src", "alt", "type", "placeholder", "value", "onclick", "style",
];

const STYLE_WORDS: &[&str] = &[
    "display", "flex", "grid", "block", "inline-block", "none", "position", "relative",
    "absolute", "fixed", "sticky", "top", "left", "right", "bottom", "width", "height",
    "max-width", "min-height", "margin", "padding", "border", "border-radius", "color",
    "background", "background-color", "font-size", "font-family", "font-weight",
    "line-height", "text-align", "justify-content", "align-items", "flex-direction", "gap",
    "grid-template-columns", "box-shadow", "opacity", "transition", "transform", "z-index",
    "overflow", "cursor", "@media", "@keyframes", "@import", ":hover", ":focus", ":root",
    "::before", "::after", "var(--)", "calc()", "rgba()",
];

const SCRIPT_WORDS: &[&str] = &[
    "console.log()", "console.error()", "console.warn()", "document.querySelector()",
    "document.querySelectorAll()", "document.getElementById()", "document.createElement()",
    "addEventListener()", "removeEventListener()", "function", "const", "let", "return",
    "if", "else", "for", "while", "switch", "case", "break", "async", "await", "try",
    "catch", "throw", "new", "class", "this", "fetch()", "setTimeout()", "setInterval()",
    "JSON.stringify()", "JSON.parse()", "Math.random()", "Math.floor()", "Array.from()",
    "Object.keys()", ".map()", ".filter()", ".forEach()", ".reduce()", ".find()",
    ".textContent", ".innerHTML", ".classList", "Promise", "undefined", "null",
];

/// Built-in suggestion words for a pane.
pub fn dictionary(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::Markup => MARKUP_WORDS,
        SourceKind::Style => STYLE_WORDS,
        SourceKind::Script => SCRIPT_WORDS,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '#' | '@' | '(' | ')')
}

/// The trailing word of `text_before_cursor`.
pub fn current_word(text_before_cursor: &str) -> &str {
    let start = text_before_cursor
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(text_before_cursor.len());
    &text_before_cursor[start..]
}

/// Dictionary entries containing `word`, ignoring case, in dictionary order.
pub fn suggest(kind: SourceKind, word: &str, limit: usize) -> Vec<&'static str> {
    if word.is_empty() {
        return Vec::new();
    }
    let needle = word.to_lowercase();
    dictionary(kind)
        .iter()
        .copied()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

/// Dropdown state: the visible suggestions and the highlighted one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionState {
    suggestions: Vec<&'static str>,
    selected: Option<usize>,
    limit: usize,
}

impl CompletionState {
    pub fn new(limit: usize) -> Self {
        Self {
            suggestions: Vec::new(),
            selected: None,
            limit,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn suggestions(&self) -> &[&'static str] {
        &self.suggestions
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&'static str> {
        self.selected.and_then(|i| self.suggestions.get(i).copied())
    }

    /// Recompute suggestions after an edit in `buffer`.
    pub fn refresh(&mut self, buffer: &SourceBuffer) {
        let before = buffer.text_before_cursor();
        let word = current_word(&before);
        self.suggestions = suggest(buffer.kind(), word, self.limit);
        self.selected = None;
    }

    pub fn select_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
    }

    /// Moving up from the first suggestion clears the highlight.
    pub fn select_previous(&mut self) {
        self.selected = match self.selected {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Highlight the suggestion at `index`, e.g. under the pointer.
    pub fn select(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.selected = Some(index);
        }
    }

    /// Apply the suggestion at `index`. Returns false if there is none.
    pub fn accept(&mut self, buffer: &mut SourceBuffer, index: usize) -> bool {
        match self.suggestions.get(index).copied() {
            Some(suggestion) => {
                self.apply(buffer, suggestion);
                true
            }
            None => false,
        }
    }

    pub fn hide(&mut self) {
        self.suggestions.clear();
        self.selected = None;
    }

    /// Replace the word before the cursor with `suggestion`.
    pub fn apply(&mut self, buffer: &mut SourceBuffer, suggestion: &str) {
        let before = buffer.text_before_cursor();
        let word_chars = current_word(&before).chars().count();
        let cursor = buffer.cursor();
        buffer.replace_range(cursor - word_chars, cursor, suggestion);
        self.hide();
    }

    /// Dropdown navigation. Keys are only consumed while the dropdown is
    /// visible, and Enter/Tab only when a suggestion is highlighted.
    pub fn handle_key(&mut self, key: &Key, buffer: &mut SourceBuffer) -> KeydownResult {
        if !self.is_visible() {
            return KeydownResult::NotHandled;
        }
        match key {
            Key::ArrowDown => {
                self.select_next();
                KeydownResult::Handled
            }
            Key::ArrowUp => {
                self.select_previous();
                KeydownResult::Handled
            }
            Key::Enter | Key::Tab => match self.selected() {
                Some(suggestion) => {
                    self.apply(buffer, suggestion);
                    KeydownResult::Handled
                }
                None => KeydownResult::NotHandled,
            },
            Key::Escape => {
                self.hide();
                KeydownResult::Handled
            }
            // The caret leaves the word being completed.
            key if key.is_navigation() => {
                self.hide();
                KeydownResult::PassThrough
            }
            _ => KeydownResult::PassThrough,
        }
    }
}
