//! The boundary between the engine and the terminal.
//!
//! The engine never emits escape codes itself. It reads raw bytes through a
//! [`ConsoleInput`] and draws through the primitives of a [`ConsoleOutput`];
//! `linekit-io` provides the terminal, file-backed, no-op and recording
//! implementations.

use crate::error::ConsoleResult;

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinSize {
    pub rows: u16,
    pub cols: u16,
}

impl WinSize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// The sixteen terminal colors plus the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    DefaultColor,

    // Low intensity
    Black,
    DarkRed,
    DarkGreen,
    Brown,
    DarkBlue,
    Purple,
    Cyan,
    LightGray,

    // High intensity
    DarkGray,
    Red,
    Green,
    Yellow,
    Blue,
    Fuchsia,
    Turquoise,
    White,
}

/// Source of raw keystroke bytes.
///
/// Implementations must survive repeated `setup`/`tear_down` cycles within
/// one process, and `read` must never block for long: when nothing is
/// available it returns `Ok(None)`.
pub trait ConsoleInput: Send + Sync {
    /// Put the source into the mode needed for keystroke reading.
    fn setup(&self) -> ConsoleResult<()>;

    /// Restore whatever `setup` changed.
    fn tear_down(&self) -> ConsoleResult<()>;

    fn get_win_size(&self) -> WinSize;

    /// Bytes available right now, or `None`.
    fn read(&self) -> ConsoleResult<Option<Vec<u8>>>;
}

/// Drawing primitives. Writes are buffered until [`ConsoleOutput::flush`].
///
/// Relative cursor moves take signed counts: a negative count moves the
/// other way and zero does nothing.
pub trait ConsoleOutput: Send {
    /// Queue bytes unchanged.
    fn write_raw(&mut self, data: &[u8]);

    /// Queue bytes with escape characters neutralized.
    fn write(&mut self, data: &[u8]);

    fn write_raw_str(&mut self, data: &str) {
        self.write_raw(data.as_bytes());
    }

    fn write_str(&mut self, data: &str) {
        self.write(data.as_bytes());
    }

    /// Send everything queued to the terminal.
    fn flush(&mut self) -> ConsoleResult<()>;

    fn erase_screen(&mut self);
    fn erase_up(&mut self);
    fn erase_down(&mut self);
    fn erase_start_of_line(&mut self);
    fn erase_end_of_line(&mut self);
    fn erase_line(&mut self);

    fn show_cursor(&mut self);
    fn hide_cursor(&mut self);

    /// Absolute move; `(0, 0)` is the home position.
    fn cursor_go_to(&mut self, row: u16, col: u16);
    fn cursor_up(&mut self, n: i32);
    fn cursor_down(&mut self, n: i32);
    fn cursor_forward(&mut self, n: i32);
    fn cursor_backward(&mut self, n: i32);

    fn save_cursor(&mut self);
    fn unsave_cursor(&mut self);

    fn scroll_down(&mut self);
    fn scroll_up(&mut self);

    fn set_title(&mut self, title: &str);
    fn clear_title(&mut self);

    fn set_color(&mut self, fg: Color, bg: Color, bold: bool);
}
