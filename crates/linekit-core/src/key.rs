//! Logical key definitions and the decoded key event.

/// A logical key decoded from a run of raw terminal bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,

    // Control characters (Ctrl+A through Ctrl+Z)
    ControlA,
    ControlB,
    ControlC,
    ControlD,
    ControlE,
    ControlF,
    ControlG,
    ControlH,
    ControlI,
    ControlJ,
    ControlK,
    ControlL,
    ControlM,
    ControlN,
    ControlO,
    ControlP,
    ControlQ,
    ControlR,
    ControlS,
    ControlT,
    ControlU,
    ControlV,
    ControlW,
    ControlX,
    ControlY,
    ControlZ,

    ControlSpace,
    ControlBackslash,
    ControlSquareClose,
    ControlCircumflex,
    ControlUnderscore,
    ControlLeft,
    ControlRight,
    ControlUp,
    ControlDown,

    Up,
    Down,
    Right,
    Left,

    ShiftLeft,
    ShiftUp,
    ShiftDown,
    ShiftRight,

    Home,
    End,
    Delete,
    ShiftDelete,
    ControlDelete,
    PageUp,
    PageDown,
    BackTab,
    Insert,
    Backspace,

    // Aliases that share a byte value with a control key
    Tab,
    Enter,
    /// Escape followed by carriage return
    AltEnter,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    /// Matches any key in a binding table.
    Any,

    /// A recognised sequence that must have no effect.
    Ignore,

    /// Bytes that match no known sequence; they are literal text.
    NotDefined,
}

impl Key {
    /// True for the keys that finish or break the current line.
    pub fn is_submission(self) -> bool {
        matches!(self, Key::Enter | Key::ControlJ | Key::ControlM | Key::AltEnter)
    }

    /// True for function keys F1 through F24.
    pub fn is_function_key(self) -> bool {
        matches!(
            self,
            Key::F1
                | Key::F2
                | Key::F3
                | Key::F4
                | Key::F5
                | Key::F6
                | Key::F7
                | Key::F8
                | Key::F9
                | Key::F10
                | Key::F11
                | Key::F12
                | Key::F13
                | Key::F14
                | Key::F15
                | Key::F16
                | Key::F17
                | Key::F18
                | Key::F19
                | Key::F20
                | Key::F21
                | Key::F22
                | Key::F23
                | Key::F24
        )
    }
}

/// A decoded key together with the bytes it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The logical key
    pub key: Key,
    /// Raw bytes exactly as read from the input source
    pub raw_bytes: Vec<u8>,
}

impl KeyEvent {
    pub fn new(key: Key, raw_bytes: Vec<u8>) -> Self {
        Self { key, raw_bytes }
    }

    /// Decode a raw chunk with [`crate::key_decoder::get_key`].
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::{Key, KeyEvent};
    ///
    /// let event = KeyEvent::from_bytes(&[0x1b, 0x5b, 0x41]);
    /// assert_eq!(event.key, Key::Up);
    ///
    /// let event = KeyEvent::from_bytes(b"hi");
    /// assert_eq!(event.key, Key::NotDefined);
    /// assert_eq!(event.text(), Some("hi"));
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(crate::key_decoder::get_key(bytes), bytes.to_vec())
    }

    /// The raw bytes as text, only for undefined keys that are valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        if self.key != Key::NotDefined {
            return None;
        }
        std::str::from_utf8(&self.raw_bytes).ok()
    }
}

impl Default for KeyEvent {
    fn default() -> Self {
        Self {
            key: Key::NotDefined,
            raw_bytes: Vec::new(),
        }
    }
}
