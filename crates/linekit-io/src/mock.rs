//! Scripted input and recording output for tests.
//!
//! Both mocks are cheap to clone and clones share state, so a test can hand
//! one clone to the prompt and keep another to script input or inspect what
//! was drawn.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use linekit_core::{Color, ConsoleInput, ConsoleOutput, ConsoleResult, WinSize};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct InputState {
    chunks: VecDeque<Vec<u8>>,
    win_size: WinSize,
    setup_calls: usize,
    tear_down_calls: usize,
}

/// Input source that replays queued byte chunks, one chunk per read.
#[derive(Debug, Clone)]
pub struct MockConsoleInput {
    state: Arc<Mutex<InputState>>,
}

impl Default for MockConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConsoleInput {
    /// A 24x80 source with nothing queued.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InputState {
                win_size: WinSize::new(24, 80),
                ..InputState::default()
            })),
        }
    }

    pub fn with_win_size(self, rows: u16, cols: u16) -> Self {
        self.set_win_size(rows, cols);
        self
    }

    pub fn set_win_size(&self, rows: u16, cols: u16) {
        lock(&self.state).win_size = WinSize::new(rows, cols);
    }

    /// Queue one chunk, returned whole by the next read.
    pub fn push_bytes(&self, bytes: impl Into<Vec<u8>>) {
        lock(&self.state).chunks.push_back(bytes.into());
    }

    /// Queue each char of `text` as its own chunk, as if typed.
    pub fn type_text(&self, text: &str) {
        let mut state = lock(&self.state);
        for c in text.chars() {
            let mut buf = [0u8; 4];
            state.chunks.push_back(c.encode_utf8(&mut buf).as_bytes().to_vec());
        }
    }

    pub fn pending(&self) -> usize {
        lock(&self.state).chunks.len()
    }

    pub fn setup_calls(&self) -> usize {
        lock(&self.state).setup_calls
    }

    pub fn tear_down_calls(&self) -> usize {
        lock(&self.state).tear_down_calls
    }
}

impl ConsoleInput for MockConsoleInput {
    fn setup(&self) -> ConsoleResult<()> {
        lock(&self.state).setup_calls += 1;
        Ok(())
    }

    fn tear_down(&self) -> ConsoleResult<()> {
        lock(&self.state).tear_down_calls += 1;
        Ok(())
    }

    fn get_win_size(&self) -> WinSize {
        lock(&self.state).win_size
    }

    fn read(&self) -> ConsoleResult<Option<Vec<u8>>> {
        Ok(lock(&self.state).chunks.pop_front())
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputOp {
    WriteRaw(Vec<u8>),
    Write(Vec<u8>),
    Flush,
    EraseScreen,
    EraseUp,
    EraseDown,
    EraseStartOfLine,
    EraseEndOfLine,
    EraseLine,
    ShowCursor,
    HideCursor,
    CursorGoTo(u16, u16),
    CursorUp(i32),
    CursorDown(i32),
    CursorForward(i32),
    CursorBackward(i32),
    SaveCursor,
    UnsaveCursor,
    ScrollDown,
    ScrollUp,
    SetTitle(String),
    ClearTitle,
    SetColor(Color, Color, bool),
}

/// Output that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct MockConsoleOutput {
    ops: Arc<Mutex<Vec<OutputOp>>>,
}

impl MockConsoleOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<OutputOp> {
        lock(&self.ops).clone()
    }

    pub fn clear(&self) {
        lock(&self.ops).clear();
    }

    /// Everything written, raw or not, as lossy UTF-8.
    pub fn written_text(&self) -> String {
        let ops = lock(&self.ops);
        let mut bytes = Vec::new();
        for op in ops.iter() {
            if let OutputOp::WriteRaw(data) | OutputOp::Write(data) = op {
                bytes.extend_from_slice(data);
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn count(&self, wanted: &OutputOp) -> usize {
        lock(&self.ops).iter().filter(|op| *op == wanted).count()
    }

    fn record(&self, op: OutputOp) {
        lock(&self.ops).push(op);
    }
}

impl ConsoleOutput for MockConsoleOutput {
    fn write_raw(&mut self, data: &[u8]) {
        self.record(OutputOp::WriteRaw(data.to_vec()));
    }

    fn write(&mut self, data: &[u8]) {
        self.record(OutputOp::Write(data.to_vec()));
    }

    fn flush(&mut self) -> ConsoleResult<()> {
        self.record(OutputOp::Flush);
        Ok(())
    }

    fn erase_screen(&mut self) {
        self.record(OutputOp::EraseScreen);
    }

    fn erase_up(&mut self) {
        self.record(OutputOp::EraseUp);
    }

    fn erase_down(&mut self) {
        self.record(OutputOp::EraseDown);
    }

    fn erase_start_of_line(&mut self) {
        self.record(OutputOp::EraseStartOfLine);
    }

    fn erase_end_of_line(&mut self) {
        self.record(OutputOp::EraseEndOfLine);
    }

    fn erase_line(&mut self) {
        self.record(OutputOp::EraseLine);
    }

    fn show_cursor(&mut self) {
        self.record(OutputOp::ShowCursor);
    }

    fn hide_cursor(&mut self) {
        self.record(OutputOp::HideCursor);
    }

    fn cursor_go_to(&mut self, row: u16, col: u16) {
        self.record(OutputOp::CursorGoTo(row, col));
    }

    fn cursor_up(&mut self, n: i32) {
        self.record(OutputOp::CursorUp(n));
    }

    fn cursor_down(&mut self, n: i32) {
        self.record(OutputOp::CursorDown(n));
    }

    fn cursor_forward(&mut self, n: i32) {
        self.record(OutputOp::CursorForward(n));
    }

    fn cursor_backward(&mut self, n: i32) {
        self.record(OutputOp::CursorBackward(n));
    }

    fn save_cursor(&mut self) {
        self.record(OutputOp::SaveCursor);
    }

    fn unsave_cursor(&mut self) {
        self.record(OutputOp::UnsaveCursor);
    }

    fn scroll_down(&mut self) {
        self.record(OutputOp::ScrollDown);
    }

    fn scroll_up(&mut self) {
        self.record(OutputOp::ScrollUp);
    }

    fn set_title(&mut self, title: &str) {
        self.record(OutputOp::SetTitle(title.to_string()));
    }

    fn clear_title(&mut self) {
        self.record(OutputOp::ClearTitle);
    }

    fn set_color(&mut self, fg: Color, bg: Color, bold: bool) {
        self.record(OutputOp::SetColor(fg, bg, bold));
    }
}
