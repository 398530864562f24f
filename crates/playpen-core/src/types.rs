//! Core playground types: source kinds, selections, themes.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Deserializer, Serialize};

/// Which of the three source panes a buffer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// HTML fragment embedded as the document body.
    #[serde(rename = "html")]
    Markup,
    /// CSS merged into the document's style block.
    #[serde(rename = "css")]
    Style,
    /// JavaScript run inside the preview's failure boundary.
    #[serde(rename = "js")]
    Script,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Markup, SourceKind::Style, SourceKind::Script];

    /// Short name used for element ids, storage fields and file extensions.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Markup => "html",
            SourceKind::Style => "css",
            SourceKind::Script => "js",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "html" => Some(SourceKind::Markup),
            "css" => Some(SourceKind::Style),
            "js" => Some(SourceKind::Script),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// The three source fragments as plain strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sources {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl Sources {
    pub fn new(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            style: style.into(),
            script: script.into(),
        }
    }

    pub fn get(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.markup,
            SourceKind::Style => &self.style,
            SourceKind::Script => &self.script,
        }
    }
}

/// Colour theme of the host page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parse a stored theme name. Anything unrecognised is the default theme.
    pub fn from_name(s: &str) -> Self {
        match s {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Theme::from_name(&name))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
