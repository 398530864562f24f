//! Browser event extraction.
//!
//! Textareas report caret positions in UTF-16 code units while buffers use
//! chars, so offsets are converted at this boundary.

use playpen_core::{Key, KeyCombo, Modifiers};
use web_sys::KeyboardEvent;

/// Build a key combo from a DOM keyboard event.
pub fn combo_from_keyboard_event(event: &KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::from_dom(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// Convert a UTF-16 offset into `text` to a char offset. Offsets past the
/// end, or inside a surrogate pair, round down.
pub fn utf16_to_char_offset(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        units += c.len_utf16();
        if units > utf16 {
            return i;
        }
    }
    text.chars().count()
}

/// Convert a char offset into `text` to a UTF-16 offset.
pub fn char_to_utf16_offset(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}
