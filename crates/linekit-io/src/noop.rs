//! Output that discards everything.

use linekit_core::{Color, ConsoleOutput, ConsoleResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConsoleOutput;

impl ConsoleOutput for NoopConsoleOutput {
    fn write_raw(&mut self, _data: &[u8]) {}
    fn write(&mut self, _data: &[u8]) {}

    fn flush(&mut self) -> ConsoleResult<()> {
        Ok(())
    }

    fn erase_screen(&mut self) {}
    fn erase_up(&mut self) {}
    fn erase_down(&mut self) {}
    fn erase_start_of_line(&mut self) {}
    fn erase_end_of_line(&mut self) {}
    fn erase_line(&mut self) {}
    fn show_cursor(&mut self) {}
    fn hide_cursor(&mut self) {}
    fn cursor_go_to(&mut self, _row: u16, _col: u16) {}
    fn cursor_up(&mut self, _n: i32) {}
    fn cursor_down(&mut self, _n: i32) {}
    fn cursor_forward(&mut self, _n: i32) {}
    fn cursor_backward(&mut self, _n: i32) {}
    fn save_cursor(&mut self) {}
    fn unsave_cursor(&mut self) {}
    fn scroll_down(&mut self) {}
    fn scroll_up(&mut self) {}
    fn set_title(&mut self, _title: &str) {}
    fn clear_title(&mut self) {}
    fn set_color(&mut self, _fg: Color, _bg: Color, _bold: bool) {}
}
