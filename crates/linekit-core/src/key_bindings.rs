//! Key bindings: what a decoded key does to the [`Buffer`].
//!
//! The controller runs the common bindings for every key, the emacs bindings
//! when [`KeyBindMode::Emacs`] is active, and then the user's bindings.
//! Bindings only ever touch the buffer.

use std::fmt;
use std::sync::Arc;

use crate::buffer::Buffer;
use crate::key::Key;
use crate::unicode::rune_count;

/// Action run when a binding matches.
pub type KeyBindFunc = Arc<dyn Fn(&mut Buffer) + Send + Sync>;

/// Binds a logical key to an action.
#[derive(Clone)]
pub struct KeyBind {
    pub key: Key,
    pub func: KeyBindFunc,
}

impl KeyBind {
    /// # Examples
    ///
    /// ```
    /// use linekit_core::{Buffer, Key, KeyBind};
    ///
    /// let bind = KeyBind::new(Key::ControlT, |buf: &mut Buffer| buf.insert_text("t", false, true));
    /// let mut buffer = Buffer::new();
    /// (bind.func)(&mut buffer);
    /// assert_eq!(buffer.text(), "t");
    /// ```
    pub fn new<F>(key: Key, func: F) -> Self
    where
        F: Fn(&mut Buffer) + Send + Sync + 'static,
    {
        Self {
            key,
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBind").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Binds an exact raw byte sequence to an action. Checked before undefined
/// input is inserted as text.
#[derive(Clone)]
pub struct AsciiCodeBind {
    pub bytes: Vec<u8>,
    pub func: KeyBindFunc,
}

impl AsciiCodeBind {
    pub fn new<F>(bytes: impl Into<Vec<u8>>, func: F) -> Self
    where
        F: Fn(&mut Buffer) + Send + Sync + 'static,
    {
        Self {
            bytes: bytes.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for AsciiCodeBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsciiCodeBind")
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBindMode {
    /// Only the common bindings
    #[default]
    Common,
    /// Common plus emacs-style bindings
    Emacs,
}

pub fn go_line_end(buf: &mut Buffer) {
    let count = rune_count(buf.document().text_after_cursor());
    buf.cursor_right(count);
}

pub fn go_line_beginning(buf: &mut Buffer) {
    let count = rune_count(buf.document().text_before_cursor());
    buf.cursor_left(count);
}

pub fn delete_char(buf: &mut Buffer) {
    buf.delete(1);
}

pub fn delete_before_char(buf: &mut Buffer) {
    buf.delete_before_cursor(1);
}

pub fn go_right_char(buf: &mut Buffer) {
    buf.cursor_right(1);
}

pub fn go_left_char(buf: &mut Buffer) {
    buf.cursor_left(1);
}

pub fn go_right_word(buf: &mut Buffer) {
    buf.cursor_word_right();
}

pub fn go_left_word(buf: &mut Buffer) {
    buf.cursor_word_left();
}

/// Bindings active in every mode.
pub fn common_key_bindings() -> Vec<KeyBind> {
    vec![
        KeyBind::new(Key::End, go_line_end),
        KeyBind::new(Key::Home, go_line_beginning),
        KeyBind::new(Key::Delete, delete_char),
        KeyBind::new(Key::Backspace, delete_before_char),
        KeyBind::new(Key::Right, go_right_char),
        KeyBind::new(Key::Left, go_left_char),
        KeyBind::new(Key::ControlRight, go_right_word),
        KeyBind::new(Key::ControlLeft, go_left_word),
    ]
}

/// Emacs-style bindings.
pub fn emacs_key_bindings() -> Vec<KeyBind> {
    vec![
        // Start and end of the current line
        KeyBind::new(Key::ControlA, |buf: &mut Buffer| {
            let count = rune_count(buf.document().current_line_before_cursor());
            buf.cursor_left(count);
        }),
        KeyBind::new(Key::ControlE, |buf: &mut Buffer| {
            let count = rune_count(buf.document().current_line_after_cursor());
            buf.cursor_right(count);
        }),
        // Kill to end / start of line
        KeyBind::new(Key::ControlK, |buf: &mut Buffer| {
            let count = rune_count(buf.document().current_line_after_cursor());
            buf.delete(count);
        }),
        KeyBind::new(Key::ControlU, |buf: &mut Buffer| {
            let count = rune_count(buf.document().current_line_before_cursor());
            buf.delete_before_cursor(count);
        }),
        KeyBind::new(Key::ControlD, |buf: &mut Buffer| {
            if !buf.text().is_empty() {
                buf.delete(1);
            }
        }),
        KeyBind::new(Key::ControlH, delete_before_char),
        KeyBind::new(Key::ControlF, go_right_char),
        KeyBind::new(Key::ControlB, go_left_char),
        KeyBind::new(Key::ControlW, |buf: &mut Buffer| {
            let count = rune_count(buf.document().get_word_before_cursor_with_space());
            buf.delete_before_cursor(count);
        }),
    ]
}

/// Run every binding in `binds` whose key is `key`.
pub fn apply(binds: &[KeyBind], key: Key, buf: &mut Buffer) {
    for bind in binds.iter().filter(|b| b.key == key) {
        (bind.func)(buf);
    }
}
