//! Keyboard shortcuts and the playground actions they trigger.
//!
//! Platform code converts native key events into [`KeyCombo`]s; the
//! [`KeyBindings`] table maps combos to [`PlaygroundAction`]s.

use std::collections::HashMap;

use smol_str::SmolStr;

/// Key values for keyboard input.
///
/// Platform-agnostic key representation, covering the keys the playground
/// reacts to. Anything else is a character or `Unidentified`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Function keys ===
    F1,
    F5,
    F12,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Tab" => Key::Tab,
            "Escape" => Key::Escape,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "F1" => Key::F1,
            "F5" => Key::F5,
            "F12" => Key::F12,
            s if s.chars().count() == 1 => Key::character(s),
            _ => Key::Unidentified,
        }
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Character keys compare case-insensitively (Shift+S reports "S").
    fn normalized(&self) -> Self {
        match self {
            Key::Character(s) => Key::Character(SmolStr::new(s.to_lowercase())),
            other => other.clone(),
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Get the primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(is_mac: bool) -> Self {
        if is_mac { Self::META } else { Self::CTRL }
    }

    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }
}

/// A key combination for triggering an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::META,
        }
    }

    pub fn primary(key: Key, is_mac: bool) -> Self {
        Self {
            key,
            modifiers: Modifiers::primary(is_mac),
        }
    }
}

/// Something the user can ask the playground to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaygroundAction {
    /// Compose and render immediately.
    Run,
    /// Persist the project now.
    Save,
    /// Insert one indent unit at the cursor.
    Indent,
    ToggleConsole,
    ClearConsole,
    /// Clear every pane and the console.
    Reset,
    ToggleTheme,
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not a keybinding, let platform handle it.
    NotHandled,
    /// Event should be passed through (navigation, etc.).
    PassThrough,
}

/// Key combo to action table.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    bindings: HashMap<KeyCombo, PlaygroundAction>,
}

impl KeyBindings {
    /// The standard shortcuts, with Cmd standing in for Ctrl on macOS.
    pub fn default_for_platform(is_mac: bool) -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };
        bindings.bind(
            KeyCombo::primary(Key::character("s"), is_mac),
            PlaygroundAction::Save,
        );
        bindings.bind(
            KeyCombo::primary(Key::Enter, is_mac),
            PlaygroundAction::Run,
        );
        bindings.bind(KeyCombo::new(Key::Tab), PlaygroundAction::Indent);
        bindings.bind(KeyCombo::new(Key::F12), PlaygroundAction::ToggleConsole);
        bindings
    }

    pub fn bind(&mut self, combo: KeyCombo, action: PlaygroundAction) {
        self.bindings.insert(
            KeyCombo::with_modifiers(combo.key.normalized(), combo.modifiers),
            action,
        );
    }

    pub fn lookup(&self, combo: &KeyCombo) -> Option<PlaygroundAction> {
        let normalized = KeyCombo::with_modifiers(combo.key.normalized(), combo.modifiers);
        self.bindings.get(&normalized).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Look up `combo` in the standard shortcuts.
pub fn action_for_key(combo: &KeyCombo, is_mac: bool) -> Option<PlaygroundAction> {
    KeyBindings::default_for_platform(is_mac).lookup(combo)
}
