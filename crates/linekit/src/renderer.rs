//! Incremental terminal rendering.
//!
//! The renderer never asks the terminal where the cursor is. It tracks a
//! linear cursor offset instead: cells counted from the start of the prompt,
//! with wrapped rows laid end to end, so offset `n` is column `n % cols` of
//! row `n / cols`. Every move, erase and overlay is computed from that offset
//! with [`Renderer::get_cursor_end_pos`], and `previous_cursor` remembers
//! where the last frame left the cursor so the next frame can erase it.

use linekit_core::completion::format_suggestions;
use linekit_core::unicode::{display_width, truncate_with_tail};
use linekit_core::{
    has_diagnostic, lexer, Buffer, Color, CompletionManager, ConsoleOutput, Diagnostic, Document,
    Key, Lexer, LexerElement, WinSize,
};
use linekit_io::debug::assert_no_error;
use log::trace;

/// Returns a prefix to show instead of the static one, or `None` to keep it.
pub type LivePrefix = Box<dyn Fn() -> Option<String> + Send>;

/// Called with the finished document after each line break.
pub type BreakLineCallback = Box<dyn Fn(&Document) + Send>;

/// Colors used by every part of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderColors {
    pub prefix_text: Color,
    pub prefix_bg: Color,
    pub input_text: Color,
    pub input_bg: Color,
    pub preview_suggestion_text: Color,
    pub preview_suggestion_bg: Color,
    pub suggestion_text: Color,
    pub suggestion_bg: Color,
    pub selected_suggestion_text: Color,
    pub selected_suggestion_bg: Color,
    pub description_text: Color,
    pub description_bg: Color,
    pub selected_description_text: Color,
    pub selected_description_bg: Color,
    pub scrollbar_thumb: Color,
    pub scrollbar_bg: Color,
    /// Characters inside a diagnostic range
    pub diagnostics_text: Color,
    pub diagnostics_bg: Color,
    /// The message box under the input
    pub diagnostics_details_text: Color,
    pub diagnostics_details_bg: Color,
}

impl Default for RenderColors {
    fn default() -> Self {
        Self {
            prefix_text: Color::Blue,
            prefix_bg: Color::DefaultColor,
            input_text: Color::DefaultColor,
            input_bg: Color::DefaultColor,
            preview_suggestion_text: Color::Green,
            preview_suggestion_bg: Color::DefaultColor,
            suggestion_text: Color::White,
            suggestion_bg: Color::Cyan,
            selected_suggestion_text: Color::Black,
            selected_suggestion_bg: Color::Turquoise,
            description_text: Color::Black,
            description_bg: Color::Turquoise,
            selected_description_text: Color::White,
            selected_description_bg: Color::Cyan,
            scrollbar_thumb: Color::DarkGray,
            scrollbar_bg: Color::Cyan,
            diagnostics_text: Color::Red,
            diagnostics_bg: Color::DefaultColor,
            diagnostics_details_text: Color::White,
            diagnostics_details_bg: Color::DarkRed,
        }
    }
}

/// Draws the prompt through a [`ConsoleOutput`].
pub struct Renderer {
    out: Box<dyn ConsoleOutput>,
    prefix: String,
    live_prefix: Option<LivePrefix>,
    break_line_callback: Option<BreakLineCallback>,
    title: String,
    row: u16,
    col: u16,
    hide_completion: bool,
    previous_cursor: usize,
    colors: RenderColors,
    diagnostics_max_rows: u16,
}

impl Renderer {
    /// A renderer with the default colors and an unknown window size.
    ///
    /// Nothing is drawn until [`Renderer::update_win_size`] reports a
    /// non-zero width.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit::{Buffer, CompletionManager, Renderer, StaticCompleter, WinSize};
    /// use linekit_io::MockConsoleOutput;
    ///
    /// let out = MockConsoleOutput::new();
    /// let mut renderer = Renderer::new(Box::new(out.clone()), "> ");
    /// renderer.update_win_size(WinSize::new(24, 80));
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.insert_text("select", false, true);
    /// let completion = CompletionManager::new(None::<StaticCompleter>, 6);
    /// renderer.render(&buffer, None, &completion, None, &[]);
    ///
    /// assert!(out.written_text().contains("> select"));
    /// ```
    pub fn new(out: Box<dyn ConsoleOutput>, prefix: impl Into<String>) -> Self {
        Self {
            out,
            prefix: prefix.into(),
            live_prefix: None,
            break_line_callback: None,
            title: String::new(),
            row: 0,
            col: 0,
            hide_completion: false,
            previous_cursor: 0,
            colors: RenderColors::default(),
            diagnostics_max_rows: 5,
        }
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn set_live_prefix(&mut self, live_prefix: LivePrefix) {
        self.live_prefix = Some(live_prefix);
    }

    pub fn set_break_line_callback(&mut self, callback: BreakLineCallback) {
        self.break_line_callback = Some(callback);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn colors(&self) -> &RenderColors {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut RenderColors {
        &mut self.colors
    }

    pub fn set_diagnostics_max_rows(&mut self, rows: u16) {
        self.diagnostics_max_rows = rows;
    }

    pub fn hide_completion(&self) -> bool {
        self.hide_completion
    }

    pub fn set_hide_completion(&mut self, hide: bool) {
        self.hide_completion = hide;
    }

    pub fn win_size(&self) -> WinSize {
        WinSize::new(self.row, self.col)
    }

    pub fn update_win_size(&mut self, size: WinSize) {
        self.row = size.rows;
        self.col = size.cols;
    }

    /// Linear offset where the last frame left the cursor.
    pub fn previous_cursor(&self) -> usize {
        self.previous_cursor
    }

    pub fn set_previous_cursor(&mut self, cursor: usize) {
        self.previous_cursor = cursor;
    }

    /// Set the terminal title, if one is configured.
    pub fn setup(&mut self) {
        if !self.title.is_empty() {
            let title = self.title.clone();
            self.out.set_title(&title);
            assert_no_error(self.out.flush());
        }
    }

    /// Clear the title and anything drawn below the cursor.
    pub fn tear_down(&mut self) {
        self.out.clear_title();
        self.out.erase_down();
        assert_no_error(self.out.flush());
    }

    pub fn clear_screen(&mut self) {
        self.out.erase_screen();
        self.out.cursor_go_to(0, 0);
        assert_no_error(self.out.flush());
    }

    fn current_prefix(&self) -> String {
        self.live_prefix
            .as_ref()
            .and_then(|live| live())
            .unwrap_or_else(|| self.prefix.clone())
    }

    fn render_prefix(&mut self) {
        let prefix = self.current_prefix();
        self.out
            .set_color(self.colors.prefix_text, self.colors.prefix_bg, false);
        self.out.write_str(&prefix);
        self.out
            .set_color(Color::DefaultColor, Color::DefaultColor, false);
    }

    fn prepare_area(&mut self, lines: usize) {
        for _ in 0..lines {
            self.out.scroll_down();
        }
        for _ in 0..lines {
            self.out.scroll_up();
        }
    }

    /// Linear offset after printing `text` starting at `start`.
    ///
    /// Each `\n` pads the offset to the start of the next row.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit::{Renderer, WinSize};
    /// use linekit_io::NoopConsoleOutput;
    ///
    /// let mut r = Renderer::new(Box::new(NoopConsoleOutput), "");
    /// r.update_win_size(WinSize::new(10, 5));
    /// assert_eq!(r.get_cursor_end_pos("abc", 0), 3);
    /// assert_eq!(r.get_cursor_end_pos("abc\n", 0), 5);
    /// assert_eq!(r.get_cursor_end_pos("ab\n\nc", 0), 11);
    /// ```
    pub fn get_cursor_end_pos(&self, text: &str, start: usize) -> usize {
        let col = usize::from(self.col).max(1);
        let mut cursor = start;
        for line in text.split_inclusive('\n') {
            cursor += display_width(line);
            if line.ends_with('\n') {
                cursor += col - cursor % col;
            }
        }
        cursor
    }

    fn to_pos(&self, cursor: usize) -> (usize, usize) {
        let col = usize::from(self.col).max(1);
        (cursor % col, cursor / col)
    }

    /// Move the terminal cursor between two linear offsets.
    fn move_cursor(&mut self, from: usize, to: usize) -> usize {
        let (from_x, from_y) = self.to_pos(from);
        let (to_x, to_y) = self.to_pos(to);
        self.out.cursor_up(delta(from_y, to_y));
        self.out.cursor_backward(delta(from_x, to_x));
        to
    }

    fn backward(&mut self, from: usize, n: usize) -> usize {
        self.move_cursor(from, from.saturating_sub(n))
    }

    /// Erase from `cursor` back to the start of the prompt.
    fn clear(&mut self, cursor: usize) {
        self.move_cursor(cursor, 0);
        self.out.erase_down();
    }

    fn line_wrap(&mut self, cursor: usize) {
        if cursor > 0 && cursor % usize::from(self.col) == 0 {
            self.out.write_raw(b"\n");
        }
    }

    fn write_lexed(&mut self, text: &str, lexer: &dyn Lexer) {
        let tokens = lexer.process(text);
        for (chunk, token) in lexer::split_tokens(text, &tokens) {
            self.out.set_color(token.color, self.colors.input_bg, false);
            self.out.write_str(chunk);
        }
    }

    /// Write `line` colored by `lexer`, painting characters covered by a
    /// diagnostic in the diagnostics colors.
    fn render_line(&mut self, line: &str, lexer: Option<&dyn Lexer>, diagnostics: &[Diagnostic]) {
        let tokens = match lexer {
            Some(lexer) => lexer.process(line),
            None if diagnostics.is_empty() => {
                self.out
                    .set_color(self.colors.input_text, self.colors.input_bg, false);
                self.out.write_str(line);
                return;
            }
            None => vec![LexerElement::new(line, self.colors.input_text)],
        };

        let mut row = 0;
        let mut col = 0;
        for (chunk, token) in lexer::split_tokens(line, &tokens) {
            for c in chunk.chars() {
                if has_diagnostic(row, col, diagnostics) {
                    self.out.set_color(
                        self.colors.diagnostics_text,
                        self.colors.diagnostics_bg,
                        false,
                    );
                } else {
                    self.out.set_color(token.color, self.colors.input_bg, false);
                }
                let mut buf = [0u8; 4];
                self.out.write_str(c.encode_utf8(&mut buf));
                if c == '\n' {
                    row += 1;
                    col = 0;
                } else {
                    col += 1;
                }
            }
        }
    }

    /// Draw one frame and return how many rows of the previous frame were
    /// traced back over.
    pub fn render(
        &mut self,
        buffer: &Buffer,
        last_key: Option<Key>,
        completion: &CompletionManager,
        lexer: Option<&dyn Lexer>,
        diagnostics: &[Diagnostic],
    ) -> usize {
        // A pty can report 0x0 until the first resize.
        if self.col == 0 {
            return 0;
        }

        let prefix = self.current_prefix();
        let document = buffer.document();
        let line = document.text();

        let mut trace_back_lines = self.previous_cursor / usize::from(self.col);
        if line.is_empty() && !matches!(last_key, Some(Key::ControlDown) | Some(Key::Down)) {
            trace_back_lines = 0;
        }
        trace!("render {line:?}, tracing back {trace_back_lines} lines");

        let cursor_end_pos = self.get_cursor_end_pos(&format!("{prefix}{line}"), 0);

        self.clear(self.previous_cursor);

        self.render_prefix();
        self.out
            .set_color(Color::DefaultColor, Color::DefaultColor, false);
        self.render_line(line, lexer, diagnostics);
        self.out
            .set_color(Color::DefaultColor, Color::DefaultColor, false);

        let buffer_cursor_pos =
            self.get_cursor_end_pos(&format!("{prefix}{}", document.text_before_cursor()), 0);
        let mut cursor_pos = self.move_cursor(cursor_end_pos, buffer_cursor_pos);

        if let Some(suggest) = completion.get_selected_suggestion() {
            let word = document.get_word_before_cursor_until_separator(completion.word_separator());
            cursor_pos = self.backward(cursor_pos, display_width(word));

            self.out.set_color(
                self.colors.preview_suggestion_text,
                self.colors.preview_suggestion_bg,
                false,
            );
            self.out.write_str(&suggest.text);
            self.out
                .set_color(Color::DefaultColor, Color::DefaultColor, false);

            let rest = document.text_after_cursor();
            match lexer {
                Some(lexer) => self.write_lexed(rest, lexer),
                None => self.out.write_str(rest),
            }
            let behind_suggestion = cursor_pos + display_width(&suggest.text);
            let end_with_suggestion =
                self.get_cursor_end_pos(&format!("{}{rest}", suggest.text), cursor_pos);
            self.out
                .set_color(Color::DefaultColor, Color::DefaultColor, false);

            cursor_pos = self.move_cursor(end_with_suggestion, behind_suggestion);
        }

        let completion_len = self.render_completion(completion, cursor_pos);
        cursor_pos = self.render_diagnostics_msg(cursor_pos, completion_len, document, diagnostics);

        self.previous_cursor = cursor_pos;
        assert_no_error(self.out.flush());
        trace_back_lines
    }

    /// Draw the dropdown under the cursor and return the cells it spans.
    fn render_completion(&mut self, completion: &CompletionManager, cursor_pos: usize) -> usize {
        let suggestions = completion.suggestions();
        if suggestions.is_empty() || self.hide_completion {
            return 0;
        }

        let col = usize::from(self.col);
        let vertical_scroll = completion.vertical_scroll();
        let prefix = self.current_prefix();
        // One column is kept for the scrollbar.
        let (formatted, width) =
            format_suggestions(&suggestions, col.saturating_sub(display_width(&prefix) + 1));
        let width = width + 1;

        let window_height = formatted.len().min(usize::from(completion.max()));
        let visible: Vec<_> = formatted
            .into_iter()
            .skip(vertical_scroll)
            .take(window_height)
            .collect();
        let window_height = visible.len();
        self.prepare_area(window_height);

        let mut cursor = cursor_pos;
        let (x, _) = self.to_pos(cursor);
        let overflow = (x + width).checked_sub(col);
        if let Some(n) = overflow {
            cursor = self.backward(cursor, n);
        }

        let content_height = suggestions.len() as f64;
        let fraction_visible = window_height as f64 / content_height;
        let fraction_above = vertical_scroll as f64 / content_height;
        let scrollbar_height = clamp(
            window_height as f64,
            1.0,
            window_height as f64 * fraction_visible,
        ) as usize;
        let scrollbar_top = (window_height as f64 * fraction_above) as usize;
        let is_scroll_thumb =
            |row: usize| scrollbar_top <= row && row <= scrollbar_top + scrollbar_height;

        let selected = completion
            .selected()
            .and_then(|s| s.checked_sub(vertical_scroll));

        self.out.set_color(Color::White, Color::Cyan, false);
        for (i, row) in visible.iter().enumerate() {
            self.out.cursor_down(1);
            let is_selected = selected == Some(i);
            if is_selected {
                self.out.set_color(
                    self.colors.selected_suggestion_text,
                    self.colors.selected_suggestion_bg,
                    true,
                );
            } else {
                self.out.set_color(
                    self.colors.suggestion_text,
                    self.colors.suggestion_bg,
                    false,
                );
            }
            self.out.write_str(&row.text);

            if is_selected {
                self.out.set_color(
                    self.colors.selected_description_text,
                    self.colors.selected_description_bg,
                    false,
                );
            } else {
                self.out.set_color(
                    self.colors.description_text,
                    self.colors.description_bg,
                    false,
                );
            }
            self.out.write_str(&row.description);

            let bar = if is_scroll_thumb(i) {
                self.colors.scrollbar_thumb
            } else {
                self.colors.scrollbar_bg
            };
            self.out.set_color(Color::DefaultColor, bar, false);
            self.out.write_str(" ");
            self.out
                .set_color(Color::DefaultColor, Color::DefaultColor, false);

            self.line_wrap(cursor + width);
            self.backward(cursor + width, width);
        }

        if let Some(n) = overflow {
            self.out.cursor_forward(to_i32(n));
        }

        self.out
            .set_color(Color::DefaultColor, Color::DefaultColor, false);
        col * window_height
    }

    /// Draw the message box when the cursor sits inside a diagnostic, then
    /// return the cursor to `cursor_pos`.
    fn render_diagnostics_msg(
        &mut self,
        cursor_pos: usize,
        completion_len: usize,
        document: &Document,
        diagnostics: &[Diagnostic],
    ) -> usize {
        if !document.text().is_empty() {
            let (line, col) = document.translate_index_to_position(document.cursor_position());
            if has_diagnostic(line, col, diagnostics) {
                let text = diagnostics_detail(
                    diagnostics,
                    usize::from(self.diagnostics_max_rows),
                    usize::from(self.col),
                );
                // The padded box leaves the terminal cursor on the last cell
                // of its final row, not at the start of the next one.
                let end = self.get_cursor_end_pos(&text, cursor_pos).saturating_sub(1);
                self.out.set_color(
                    self.colors.diagnostics_details_text,
                    self.colors.diagnostics_details_bg,
                    false,
                );
                self.out.write_str(&text);
                self.out
                    .set_color(self.colors.diagnostics_details_text, Color::DefaultColor, false);
                return self.move_cursor(end + completion_len, cursor_pos);
            }
        }
        self.move_cursor(cursor_pos + completion_len, cursor_pos)
    }

    /// Finish the current line: redraw it in full, move to a fresh row and
    /// forget the previous frame.
    pub fn break_line(&mut self, buffer: &Buffer, lexer: Option<&dyn Lexer>) {
        let document = buffer.document();
        let before = format!("{}{}", self.current_prefix(), document.text_before_cursor());
        self.clear(self.get_cursor_end_pos(&before, 0));

        self.render_prefix();
        let text = format!("{}\n", document.text());
        match lexer {
            Some(lexer) => self.write_lexed(&text, lexer),
            None => {
                self.out
                    .set_color(self.colors.input_text, self.colors.input_bg, false);
                self.out.write_str(&text);
            }
        }
        self.out
            .set_color(Color::DefaultColor, Color::DefaultColor, false);
        assert_no_error(self.out.flush());

        if let Some(callback) = &self.break_line_callback {
            callback(document);
        }
        self.previous_cursor = 0;
    }
}

fn delta(from: usize, to: usize) -> i32 {
    to_i32(from) - to_i32(to)
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn clamp(high: f64, low: f64, x: f64) -> f64 {
    if high < x {
        high
    } else if x < low {
        low
    } else {
        x
    }
}

/// Format diagnostic messages as a solid block: every line is padded to a
/// multiple of `max_col` cells, and the block is cut to `rows` rows.
pub fn diagnostics_detail(diagnostics: &[Diagnostic], rows: usize, max_col: usize) -> String {
    if max_col == 0 {
        return String::new();
    }
    let mut messages = String::new();
    for diagnostic in diagnostics.iter().filter(|d| !d.message.is_empty()) {
        for line in diagnostic.message.split('\n') {
            let rest = max_col - display_width(line) % max_col;
            messages.push_str(line);
            messages.extend(std::iter::repeat(' ').take(rest));
        }
    }
    if messages.is_empty() {
        return messages;
    }

    let formatted = format!("\n{messages}");
    if display_width(&formatted) > max_col * rows {
        truncate_with_tail(&formatted, max_col * rows, "...")
    } else {
        formatted
    }
}
