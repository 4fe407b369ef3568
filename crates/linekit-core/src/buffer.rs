//! Mutable owner of the current [`Document`].
//!
//! Every edit produces a fresh document snapshot, so readers holding a
//! `&Document` from [`Buffer::document`] always see a consistent pair of text
//! and cursor. Counts passed to edit and motion methods are clamped to the
//! text; none of them fail.

use crate::document::Document;
use crate::key::Key;
use crate::unicode;

/// An editable text buffer.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    document: Document,
    /// Column to aim for on the next vertical move
    preferred_column: Option<usize>,
    last_key_stroke: Option<Key>,
}

impl Buffer {
    /// Create an empty buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Buffer;
    ///
    /// let buffer = Buffer::new();
    /// assert_eq!(buffer.text(), "");
    /// assert_eq!(buffer.cursor_position(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn cursor_position(&self) -> usize {
        self.document.cursor_position()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn display_cursor_position(&self) -> usize {
        self.document.display_cursor_position()
    }

    pub fn last_key_stroke(&self) -> Option<Key> {
        self.last_key_stroke
    }

    pub fn set_last_key_stroke(&mut self, key: Key) {
        self.last_key_stroke = Some(key);
        self.replace(self.text().to_string(), self.cursor_position());
    }

    pub fn preferred_column(&self) -> Option<usize> {
        self.preferred_column
    }

    /// Replace the text, keeping the cursor if it still fits.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let cursor = self.cursor_position();
        self.replace(text.into(), cursor);
        self.preferred_column = None;
    }

    /// Replace text and cursor together.
    pub fn set_document(&mut self, document: Document) {
        self.replace(document.text().to_string(), document.cursor_position());
        self.preferred_column = None;
    }

    /// Move the cursor to an absolute rune index, clamped to the text.
    pub fn set_cursor_position(&mut self, position: usize) {
        self.replace(self.text().to_string(), position);
        self.preferred_column = None;
    }

    fn replace(&mut self, text: String, cursor: usize) {
        self.document = Document::with_text_and_key(text, cursor, self.last_key_stroke);
    }

    fn shift_cursor(&mut self, delta: isize) {
        let target = self.cursor_position().saturating_add_signed(delta);
        self.replace(self.text().to_string(), target);
    }

    /// Insert `text` at the cursor.
    ///
    /// With `overwrite`, the runes under the cursor are replaced instead of
    /// shifted, but never past the end of the current line. With
    /// `move_cursor`, the cursor ends up after the inserted text.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.insert_text("world", false, true);
    /// buffer.set_cursor_position(0);
    /// buffer.insert_text("hello ", false, true);
    /// assert_eq!(buffer.text(), "hello world");
    /// assert_eq!(buffer.cursor_position(), 6);
    ///
    /// buffer.insert_text("W", true, false);
    /// assert_eq!(buffer.text(), "hello World");
    /// assert_eq!(buffer.cursor_position(), 6);
    /// ```
    pub fn insert_text(&mut self, text: &str, overwrite: bool, move_cursor: bool) {
        if text.is_empty() {
            return;
        }
        let cursor = self.cursor_position();
        let before = self.document.text_before_cursor();
        let after = self.document.text_after_cursor();
        let inserted = unicode::rune_count(text);

        let kept_after = if overwrite {
            let line_rest = unicode::rune_count(self.document.current_line_after_cursor());
            let skip = inserted.min(line_rest);
            &after[unicode::byte_index_from_rune_index(after, skip)..]
        } else {
            after
        };

        let mut new_text = String::with_capacity(before.len() + text.len() + kept_after.len());
        new_text.push_str(before);
        new_text.push_str(text);
        new_text.push_str(kept_after);

        let new_cursor = if move_cursor { cursor + inserted } else { cursor };
        self.replace(new_text, new_cursor);
        self.preferred_column = None;
    }

    /// Delete up to `count` runes before the cursor and return them.
    pub fn delete_before_cursor(&mut self, count: usize) -> String {
        let cursor = self.cursor_position();
        if count == 0 || cursor == 0 {
            return String::new();
        }
        let start = cursor.saturating_sub(count);
        let text = self.text();
        let start_byte = unicode::byte_index_from_rune_index(text, start);
        let cursor_byte = unicode::byte_index_from_rune_index(text, cursor);
        let deleted = text[start_byte..cursor_byte].to_string();

        let mut new_text = String::with_capacity(text.len() - deleted.len());
        new_text.push_str(&text[..start_byte]);
        new_text.push_str(&text[cursor_byte..]);
        self.replace(new_text, start);
        self.preferred_column = None;
        deleted
    }

    /// Delete up to `count` runes after the cursor and return them.
    pub fn delete(&mut self, count: usize) -> String {
        let cursor = self.cursor_position();
        let after = self.document.text_after_cursor();
        if count == 0 || after.is_empty() {
            return String::new();
        }
        let end = unicode::byte_index_from_rune_index(after, count);
        let deleted = after[..end].to_string();

        let mut new_text = String::from(self.document.text_before_cursor());
        new_text.push_str(&after[end..]);
        self.replace(new_text, cursor);
        self.preferred_column = None;
        deleted
    }

    /// Insert a line break; with `copy_margin` the new line starts with the
    /// current line's leading whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.insert_text("    if x:", false, true);
    /// buffer.new_line(true);
    /// assert_eq!(buffer.text(), "    if x:\n    ");
    /// ```
    pub fn new_line(&mut self, copy_margin: bool) {
        if copy_margin {
            let margin = self.document.leading_whitespace_in_current_line();
            self.insert_text(&format!("\n{margin}"), false, true);
        } else {
            self.insert_text("\n", false, true);
        }
    }

    /// Join the next line onto the current one, replacing the line break and
    /// the next line's leading spaces with `separator`.
    pub fn join_next_line(&mut self, separator: &str) {
        if self.document.on_last_line() {
            return;
        }
        let end_of_line = self.document.get_end_of_line_position();
        self.shift_cursor(end_of_line as isize);
        self.delete(1);

        let after = self.document.text_after_cursor().trim_start_matches(' ');
        let mut new_text = String::from(self.document.text_before_cursor());
        new_text.push_str(separator);
        new_text.push_str(after);
        let cursor = self.cursor_position();
        self.replace(new_text, cursor);
    }

    /// Swap the two runes before the cursor.
    pub fn swap_characters_before_cursor(&mut self) {
        let cursor = self.cursor_position();
        if cursor < 2 {
            return;
        }
        let mut chars: Vec<char> = self.text().chars().collect();
        chars.swap(cursor - 2, cursor - 1);
        self.replace(chars.into_iter().collect(), cursor);
    }

    pub fn cursor_left(&mut self, count: usize) {
        let delta = self.document.get_cursor_left_position(count);
        self.shift_cursor(delta);
        self.preferred_column = None;
    }

    pub fn cursor_right(&mut self, count: usize) {
        let delta = self.document.get_cursor_right_position(count);
        self.shift_cursor(delta);
        self.preferred_column = None;
    }

    /// Move up `count` lines, remembering the starting column for the next
    /// vertical move.
    pub fn cursor_up(&mut self, count: usize) {
        let column = self
            .preferred_column
            .unwrap_or_else(|| self.document.cursor_position_col());
        let delta = self.document.get_cursor_up_position(count, Some(column));
        self.shift_cursor(delta);
        self.preferred_column = Some(column);
    }

    pub fn cursor_down(&mut self, count: usize) {
        let column = self
            .preferred_column
            .unwrap_or_else(|| self.document.cursor_position_col());
        let delta = self.document.get_cursor_down_position(count, Some(column));
        self.shift_cursor(delta);
        self.preferred_column = Some(column);
    }

    /// Move back to the start of the word before the cursor.
    pub fn cursor_word_left(&mut self) {
        let start = self.document.find_start_of_previous_word_with_space();
        let before = unicode::rune_count(self.document.text_before_cursor());
        self.cursor_left(before - start);
    }

    /// Move forward past the word after the cursor.
    pub fn cursor_word_right(&mut self) {
        let end = self.document.find_end_of_current_word_with_space();
        self.cursor_right(end);
    }

    pub fn has_prev_line(&self) -> bool {
        self.document.has_prev_line()
    }

    pub fn has_next_line(&self) -> bool {
        self.document.has_next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(text: &str, cursor: usize) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.set_document(Document::with_text(text, cursor));
        buffer
    }

    #[test]
    fn test_insert_text_moves_cursor() {
        let mut buffer = Buffer::new();
        buffer.insert_text("some_text", false, true);
        assert_eq!(buffer.text(), "some_text");
        assert_eq!(buffer.cursor_position(), 9);
    }

    #[test]
    fn test_insert_text_without_moving_cursor() {
        let mut buffer = buffer_with("ab", 1);
        buffer.insert_text("XY", false, false);
        assert_eq!(buffer.text(), "aXYb");
        assert_eq!(buffer.cursor_position(), 1);
    }

    #[test]
    fn test_insert_empty_text_is_noop() {
        let mut buffer = buffer_with("ab", 1);
        buffer.insert_text("", true, true);
        assert_eq!(buffer.text(), "ab");
        assert_eq!(buffer.cursor_position(), 1);
    }

    #[test]
    fn test_insert_text_overwrite() {
        let mut buffer = buffer_with("abcdef", 2);
        buffer.insert_text("XY", true, true);
        assert_eq!(buffer.text(), "abXYef");
        assert_eq!(buffer.cursor_position(), 4);
    }

    #[test]
    fn test_insert_text_overwrite_stops_at_line_end() {
        let mut buffer = buffer_with("ab\ncd", 1);
        buffer.insert_text("XYZ", true, true);
        assert_eq!(buffer.text(), "aXYZ\ncd");
    }

    #[test]
    fn test_insert_text_multibyte() {
        let mut buffer = buffer_with("あう", 1);
        buffer.insert_text("い", false, true);
        assert_eq!(buffer.text(), "あいう");
        assert_eq!(buffer.cursor_position(), 2);
    }

    #[test]
    fn test_delete_before_cursor_clamps() {
        let mut buffer = buffer_with("hello", 3);
        assert_eq!(buffer.delete_before_cursor(10), "hel");
        assert_eq!(buffer.text(), "lo");
        assert_eq!(buffer.cursor_position(), 0);
        assert_eq!(buffer.delete_before_cursor(1), "");
    }

    #[test]
    fn test_delete_clamps() {
        let mut buffer = buffer_with("hello", 3);
        assert_eq!(buffer.delete(1), "l");
        assert_eq!(buffer.text(), "helo");
        assert_eq!(buffer.delete(10), "o");
        assert_eq!(buffer.text(), "hel");
        assert_eq!(buffer.cursor_position(), 3);
        assert_eq!(buffer.delete(1), "");
    }

    #[test]
    fn test_new_line() {
        let mut buffer = buffer_with("  indented", 10);
        buffer.new_line(false);
        assert_eq!(buffer.text(), "  indented\n");

        let mut buffer = buffer_with("  indented", 10);
        buffer.new_line(true);
        assert_eq!(buffer.text(), "  indented\n  ");
        assert_eq!(buffer.cursor_position(), 13);
    }

    #[test]
    fn test_join_next_line() {
        let mut buffer = buffer_with("line1\n   line2", 0);
        buffer.join_next_line(" ");
        assert_eq!(buffer.text(), "line1 line2");

        let mut last = buffer_with("only", 0);
        last.join_next_line(" ");
        assert_eq!(last.text(), "only");
    }

    #[test]
    fn test_swap_characters_before_cursor() {
        let mut short = buffer_with("a", 1);
        short.swap_characters_before_cursor();
        assert_eq!(short.text(), "a");

        let mut buffer = buffer_with("abcd", 3);
        buffer.swap_characters_before_cursor();
        assert_eq!(buffer.text(), "acbd");
    }

    #[test]
    fn test_cursor_left_right() {
        let mut buffer = buffer_with("ab\ncd", 4);
        buffer.cursor_left(5);
        assert_eq!(buffer.cursor_position(), 3);
        buffer.cursor_right(10);
        assert_eq!(buffer.cursor_position(), 5);
    }

    #[test]
    fn test_cursor_up_down_keep_column() {
        let mut buffer = buffer_with("abcdef\nab\nabcdef", 15);
        buffer.cursor_up(1);
        assert_eq!(buffer.cursor_position(), 9);
        buffer.cursor_up(1);
        assert_eq!(buffer.cursor_position(), 5);
        buffer.cursor_down(2);
        assert_eq!(buffer.cursor_position(), 15);
    }

    #[test]
    fn test_horizontal_move_forgets_preferred_column() {
        let mut buffer = buffer_with("abcdef\nab", 5);
        buffer.cursor_down(1);
        assert_eq!(buffer.preferred_column(), Some(5));
        buffer.cursor_left(1);
        assert_eq!(buffer.preferred_column(), None);
    }

    #[test]
    fn test_word_motion() {
        let mut buffer = buffer_with("select a from", 13);
        buffer.cursor_word_left();
        assert_eq!(buffer.cursor_position(), 9);
        buffer.cursor_word_left();
        assert_eq!(buffer.cursor_position(), 7);
        buffer.cursor_word_right();
        assert_eq!(buffer.cursor_position(), 8);
        buffer.cursor_word_right();
        assert_eq!(buffer.cursor_position(), 13);
    }

    #[test]
    fn test_has_prev_next_line() {
        let buffer = buffer_with("a\nb\nc", 2);
        assert!(buffer.has_prev_line());
        assert!(buffer.has_next_line());
    }

    #[test]
    fn test_last_key_stroke_flows_into_document() {
        let mut buffer = buffer_with("abc", 3);
        buffer.set_last_key_stroke(Key::Tab);
        assert_eq!(buffer.last_key_stroke(), Some(Key::Tab));
        assert_eq!(buffer.document().last_key_stroke(), Some(Key::Tab));
        assert_eq!(buffer.cursor_position(), 3);
    }
}
