//! VT100/xterm encoding of the drawing primitives.
//!
//! [`Vt100Writer`] queues escape codes in memory and hands them to any
//! [`std::io::Write`] sink on flush. The terminal backend wraps stdout; tests
//! wrap a `Vec<u8>`.

use std::io::Write;

use linekit_core::{Color, ConsoleOutput, ConsoleResult};

fn foreground_code(color: Color) -> &'static [u8] {
    match color {
        Color::DefaultColor => b"39",
        Color::Black => b"30",
        Color::DarkRed => b"31",
        Color::DarkGreen => b"32",
        Color::Brown => b"33",
        Color::DarkBlue => b"34",
        Color::Purple => b"35",
        Color::Cyan => b"36",
        Color::LightGray => b"37",
        Color::DarkGray => b"90",
        Color::Red => b"91",
        Color::Green => b"92",
        Color::Yellow => b"93",
        Color::Blue => b"94",
        Color::Fuchsia => b"95",
        Color::Turquoise => b"96",
        Color::White => b"97",
    }
}

fn background_code(color: Color) -> &'static [u8] {
    match color {
        Color::DefaultColor => b"49",
        Color::Black => b"40",
        Color::DarkRed => b"41",
        Color::DarkGreen => b"42",
        Color::Brown => b"43",
        Color::DarkBlue => b"44",
        Color::Purple => b"45",
        Color::Cyan => b"46",
        Color::LightGray => b"47",
        Color::DarkGray => b"100",
        Color::Red => b"101",
        Color::Green => b"102",
        Color::Yellow => b"103",
        Color::Blue => b"104",
        Color::Fuchsia => b"105",
        Color::Turquoise => b"106",
        Color::White => b"107",
    }
}

/// Buffered VT100 writer over `W`.
#[derive(Debug)]
pub struct Vt100Writer<W> {
    sink: W,
    buffer: Vec<u8>,
}

impl<W: Write + Send> Vt100Writer<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buffer: Vec::new(),
        }
    }

    /// Bytes queued since the last flush.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    fn csi(&mut self, n: i32, code: u8) {
        self.buffer.extend_from_slice(b"\x1b[");
        self.buffer.extend_from_slice(n.to_string().as_bytes());
        self.buffer.push(code);
    }
}

impl<W: Write + Send> ConsoleOutput for Vt100Writer<W> {
    fn write_raw(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn write(&mut self, data: &[u8]) {
        self.buffer
            .extend(data.iter().map(|&b| if b == 0x1b { b'?' } else { b }));
    }

    fn flush(&mut self) -> ConsoleResult<()> {
        self.sink.write_all(&self.buffer)?;
        self.sink.flush()?;
        self.buffer.clear();
        Ok(())
    }

    fn erase_screen(&mut self) {
        self.write_raw(b"\x1b[2J");
    }

    fn erase_up(&mut self) {
        self.write_raw(b"\x1b[1J");
    }

    fn erase_down(&mut self) {
        self.write_raw(b"\x1b[J");
    }

    fn erase_start_of_line(&mut self) {
        self.write_raw(b"\x1b[1K");
    }

    fn erase_end_of_line(&mut self) {
        self.write_raw(b"\x1b[K");
    }

    fn erase_line(&mut self) {
        self.write_raw(b"\x1b[2K");
    }

    fn show_cursor(&mut self) {
        self.write_raw(b"\x1b[?12l\x1b[?25h");
    }

    fn hide_cursor(&mut self) {
        self.write_raw(b"\x1b[?25l");
    }

    fn cursor_go_to(&mut self, row: u16, col: u16) {
        if row == 0 && col == 0 {
            self.write_raw(b"\x1b[H");
            return;
        }
        let seq = format!("\x1b[{row};{col}H");
        self.write_raw(seq.as_bytes());
    }

    fn cursor_up(&mut self, n: i32) {
        match n {
            0 => {}
            n if n < 0 => self.cursor_down(-n),
            n => self.csi(n, b'A'),
        }
    }

    fn cursor_down(&mut self, n: i32) {
        match n {
            0 => {}
            n if n < 0 => self.cursor_up(-n),
            n => self.csi(n, b'B'),
        }
    }

    fn cursor_forward(&mut self, n: i32) {
        match n {
            0 => {}
            n if n < 0 => self.cursor_backward(-n),
            n => self.csi(n, b'C'),
        }
    }

    fn cursor_backward(&mut self, n: i32) {
        match n {
            0 => {}
            n if n < 0 => self.cursor_forward(-n),
            n => self.csi(n, b'D'),
        }
    }

    fn save_cursor(&mut self) {
        self.write_raw(b"\x1b[s");
    }

    fn unsave_cursor(&mut self) {
        self.write_raw(b"\x1b[u");
    }

    fn scroll_down(&mut self) {
        self.write_raw(b"\x1bD");
    }

    fn scroll_up(&mut self) {
        self.write_raw(b"\x1bM");
    }

    fn set_title(&mut self, title: &str) {
        self.write_raw(b"\x1b]2;");
        let cleaned: Vec<u8> = title
            .bytes()
            .filter(|&b| b != 0x13 && b != 0x07)
            .collect();
        self.write_raw(&cleaned);
        self.write_raw(b"\x07");
    }

    fn clear_title(&mut self) {
        self.write_raw(b"\x1b]2;\x07");
    }

    fn set_color(&mut self, fg: Color, bg: Color, bold: bool) {
        self.write_raw(b"\x1b[");
        self.write_raw(if bold { b"1" } else { b"10" });
        self.write_raw(b";");
        self.write_raw(foreground_code(fg));
        self.write_raw(b";");
        self.write_raw(background_code(bg));
        self.write_raw(b"m");
    }
}
