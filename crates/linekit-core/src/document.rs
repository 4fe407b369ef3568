//! Immutable text snapshot with a cursor and positional queries.
//!
//! A [`Document`] is what the completer, the renderer and key bindings look
//! at. Every method is a pure query: nothing here mutates the text. Cursor
//! offsets and the results of the `find_*` and `get_cursor_*` methods are in
//! runes, never bytes.

use crate::key::Key;
use crate::unicode;

/// Text plus a cursor offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    text: String,
    /// Rune index, `0..=rune_count(text)`
    cursor_position: usize,
    last_key: Option<Key>,
}

impl Document {
    /// Create an empty document.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Document;
    ///
    /// let doc = Document::new();
    /// assert_eq!(doc.text(), "");
    /// assert_eq!(doc.cursor_position(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document; the cursor is clamped to the end of `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Document;
    ///
    /// let doc = Document::with_text("hello world", 5);
    /// assert_eq!(doc.text_before_cursor(), "hello");
    ///
    /// let clamped = Document::with_text("abc", 10);
    /// assert_eq!(clamped.cursor_position(), 3);
    /// ```
    pub fn with_text(text: impl Into<String>, cursor_position: usize) -> Self {
        Self::with_text_and_key(text, cursor_position, None)
    }

    pub fn with_text_and_key(
        text: impl Into<String>,
        cursor_position: usize,
        last_key: Option<Key>,
    ) -> Self {
        let text = text.into();
        let cursor_position = cursor_position.min(unicode::rune_count(&text));
        Document {
            text,
            cursor_position,
            last_key,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// The key that produced this state, if any.
    pub fn last_key_stroke(&self) -> Option<Key> {
        self.last_key
    }

    /// Cell width of the text before the cursor.
    pub fn display_cursor_position(&self) -> usize {
        unicode::display_width(self.text_before_cursor())
    }

    /// Character at `cursor + offset`, if it exists.
    pub fn get_char_relative_to_cursor(&self, offset: isize) -> Option<char> {
        let target = self.cursor_position.checked_add_signed(offset)?;
        unicode::char_at_rune_index(&self.text, target)
    }

    pub fn text_before_cursor(&self) -> &str {
        let end = unicode::byte_index_from_rune_index(&self.text, self.cursor_position);
        &self.text[..end]
    }

    pub fn text_after_cursor(&self) -> &str {
        let start = unicode::byte_index_from_rune_index(&self.text, self.cursor_position);
        &self.text[start..]
    }

    /// Word ending at the cursor, delimited by spaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Document;
    ///
    /// let doc = Document::with_text("select a fr", 11);
    /// assert_eq!(doc.get_word_before_cursor(), "fr");
    /// ```
    pub fn get_word_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        &before[word_start(before, is_space)..]
    }

    /// Word before the cursor, including the spaces between it and the cursor.
    pub fn get_word_before_cursor_with_space(&self) -> &str {
        let before = self.text_before_cursor();
        &before[word_start_with_space(before, is_space)..]
    }

    /// Word starting at the cursor, delimited by spaces.
    pub fn get_word_after_cursor(&self) -> &str {
        let after = self.text_after_cursor();
        &after[..word_end(after, is_space)]
    }

    /// Word after the cursor, including the spaces between the cursor and it.
    pub fn get_word_after_cursor_with_space(&self) -> &str {
        let after = self.text_after_cursor();
        &after[..word_end_with_space(after, is_space)]
    }

    /// Like [`get_word_before_cursor`](Self::get_word_before_cursor) with
    /// every character of `separators` acting as a delimiter. An empty
    /// separator set falls back to spaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Document;
    ///
    /// let doc = Document::with_text("path/to/fi", 10);
    /// assert_eq!(doc.get_word_before_cursor_until_separator("/"), "fi");
    /// ```
    pub fn get_word_before_cursor_until_separator(&self, separators: &str) -> &str {
        if separators.is_empty() {
            return self.get_word_before_cursor();
        }
        let before = self.text_before_cursor();
        &before[word_start(before, |c| separators.contains(c))..]
    }

    pub fn get_word_before_cursor_until_separator_with_space(&self, separators: &str) -> &str {
        if separators.is_empty() {
            return self.get_word_before_cursor_with_space();
        }
        let before = self.text_before_cursor();
        &before[word_start_with_space(before, |c| separators.contains(c))..]
    }

    pub fn get_word_after_cursor_until_separator(&self, separators: &str) -> &str {
        if separators.is_empty() {
            return self.get_word_after_cursor();
        }
        let after = self.text_after_cursor();
        &after[..word_end(after, |c| separators.contains(c))]
    }

    pub fn get_word_after_cursor_until_separator_with_space(&self, separators: &str) -> &str {
        if separators.is_empty() {
            return self.get_word_after_cursor_with_space();
        }
        let after = self.text_after_cursor();
        &after[..word_end_with_space(after, |c| separators.contains(c))]
    }

    /// Rune index, within the text before the cursor, where the word before
    /// the cursor starts.
    pub fn find_start_of_previous_word(&self) -> usize {
        let before = self.text_before_cursor();
        unicode::rune_count(&before[..word_start(before, is_space)])
    }

    pub fn find_start_of_previous_word_with_space(&self) -> usize {
        let before = self.text_before_cursor();
        unicode::rune_count(&before[..word_start_with_space(before, is_space)])
    }

    pub fn find_start_of_previous_word_until_separator(&self, separators: &str) -> usize {
        rune_len_before(self.text_before_cursor(), self.get_word_before_cursor_until_separator(separators))
    }

    pub fn find_start_of_previous_word_until_separator_with_space(&self, separators: &str) -> usize {
        rune_len_before(
            self.text_before_cursor(),
            self.get_word_before_cursor_until_separator_with_space(separators),
        )
    }

    /// Rune count from the cursor to the end of the current word.
    pub fn find_end_of_current_word(&self) -> usize {
        unicode::rune_count(self.get_word_after_cursor())
    }

    pub fn find_end_of_current_word_with_space(&self) -> usize {
        unicode::rune_count(self.get_word_after_cursor_with_space())
    }

    pub fn find_end_of_current_word_until_separator(&self, separators: &str) -> usize {
        unicode::rune_count(self.get_word_after_cursor_until_separator(separators))
    }

    pub fn find_end_of_current_word_until_separator_with_space(&self, separators: &str) -> usize {
        unicode::rune_count(self.get_word_after_cursor_until_separator_with_space(separators))
    }

    /// Text from the start of the cursor's line up to the cursor.
    pub fn current_line_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        match before.rfind('\n') {
            Some(i) => &before[i + 1..],
            None => before,
        }
    }

    /// Text from the cursor to the end of its line.
    pub fn current_line_after_cursor(&self) -> &str {
        let after = self.text_after_cursor();
        match after.find('\n') {
            Some(i) => &after[..i],
            None => after,
        }
    }

    /// The full line the cursor is on.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Document;
    ///
    /// let doc = Document::with_text("select *\nfrom users", 12);
    /// assert_eq!(doc.current_line(), "from users");
    /// ```
    pub fn current_line(&self) -> String {
        let mut line = String::from(self.current_line_before_cursor());
        line.push_str(self.current_line_after_cursor());
        line
    }

    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Rune index at which each line starts.
    pub fn line_start_indexes(&self) -> Vec<usize> {
        let mut indexes = Vec::with_capacity(self.line_count());
        let mut pos = 0;
        for line in self.text.split('\n') {
            indexes.push(pos);
            pos += unicode::rune_count(line) + 1;
        }
        indexes
    }

    pub fn cursor_position_row(&self) -> usize {
        self.translate_index_to_position(self.cursor_position).0
    }

    pub fn cursor_position_col(&self) -> usize {
        self.translate_index_to_position(self.cursor_position).1
    }

    /// Convert a rune index into `(row, col)`, both zero based.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Document;
    ///
    /// let doc = Document::with_text("ab\ncde", 0);
    /// assert_eq!(doc.translate_index_to_position(4), (1, 1));
    /// ```
    pub fn translate_index_to_position(&self, index: usize) -> (usize, usize) {
        let starts = self.line_start_indexes();
        let row = starts.partition_point(|&start| start <= index).saturating_sub(1);
        (row, index - starts[row])
    }

    /// Convert `(row, col)` into a rune index, clamping both to the text.
    pub fn translate_row_col_to_index(&self, row: usize, col: usize) -> usize {
        let starts = self.line_start_indexes();
        let lines = self.lines();
        let row = row.min(lines.len() - 1);
        let col = col.min(unicode::rune_count(lines[row]));
        (starts[row] + col).min(unicode::rune_count(&self.text))
    }

    /// Relative offset for moving left `count` runes without leaving the line.
    pub fn get_cursor_left_position(&self, count: usize) -> isize {
        let col = unicode::rune_count(self.current_line_before_cursor());
        -(count.min(col) as isize)
    }

    /// Relative offset for moving right `count` runes without leaving the line.
    pub fn get_cursor_right_position(&self, count: usize) -> isize {
        let rest = unicode::rune_count(self.current_line_after_cursor());
        count.min(rest) as isize
    }

    /// Relative offset for moving up `count` lines, keeping the column when
    /// the target line is long enough.
    pub fn get_cursor_up_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let col = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_sub(count);
        self.translate_row_col_to_index(row, col) as isize - self.cursor_position as isize
    }

    /// Relative offset for moving down `count` lines.
    pub fn get_cursor_down_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let col = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row() + count;
        self.translate_row_col_to_index(row, col) as isize - self.cursor_position as isize
    }

    pub fn on_last_line(&self) -> bool {
        self.cursor_position_row() + 1 == self.line_count()
    }

    /// True when a line exists above the cursor's line.
    pub fn has_prev_line(&self) -> bool {
        self.cursor_position_row() > 0
    }

    /// True when a line exists below the cursor's line.
    pub fn has_next_line(&self) -> bool {
        !self.on_last_line()
    }

    /// Rune count from the cursor to the end of its line.
    pub fn get_end_of_line_position(&self) -> usize {
        unicode::rune_count(self.current_line_after_cursor())
    }

    /// Rune count from the start of the cursor's line to the cursor.
    pub fn get_start_of_line_position(&self) -> usize {
        unicode::rune_count(self.current_line_before_cursor())
    }

    pub fn leading_whitespace_in_current_line(&self) -> String {
        self.current_line()
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect()
    }
}

fn is_space(c: char) -> bool {
    c == ' '
}

/// Byte index just past the last delimiter in `text`, or 0.
fn word_start(text: &str, is_sep: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .rev()
        .find(|&(_, c)| is_sep(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

/// Like [`word_start`] but skips delimiters that trail the word.
fn word_start_with_space(text: &str, is_sep: impl Fn(char) -> bool) -> usize {
    match text.char_indices().rev().find(|&(_, c)| !is_sep(c)) {
        Some((end, _)) => word_start(&text[..end], is_sep),
        None => 0,
    }
}

/// Byte index of the first delimiter in `text`, or its length.
fn word_end(text: &str, is_sep: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| is_sep(c))
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn word_end_with_space(text: &str, is_sep: impl Fn(char) -> bool) -> usize {
    match text.char_indices().find(|&(_, c)| !is_sep(c)) {
        Some((start, _)) => start + word_end(&text[start..], is_sep),
        None => text.len(),
    }
}

/// Runes in `whole` before its suffix `tail`.
fn rune_len_before(whole: &str, tail: &str) -> usize {
    unicode::rune_count(&whole[..whole.len() - tail.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_text_clamps_cursor() {
        let doc = Document::with_text("abc", 99);
        assert_eq!(doc.cursor_position(), 3);
        assert_eq!(doc.text_after_cursor(), "");
    }

    #[test]
    fn test_text_around_cursor_with_wide_chars() {
        let doc = Document::with_text("あいうえお", 2);
        assert_eq!(doc.text_before_cursor(), "あい");
        assert_eq!(doc.text_after_cursor(), "うえお");
        assert_eq!(doc.display_cursor_position(), 4);
    }

    #[test]
    fn test_get_char_relative_to_cursor() {
        let doc = Document::with_text("hello", 2);
        assert_eq!(doc.get_char_relative_to_cursor(-1), Some('e'));
        assert_eq!(doc.get_char_relative_to_cursor(0), Some('l'));
        assert_eq!(doc.get_char_relative_to_cursor(-3), None);
        assert_eq!(doc.get_char_relative_to_cursor(3), None);
    }

    #[test]
    fn test_get_word_before_cursor() {
        let doc = Document::with_text("apple bana", 10);
        assert_eq!(doc.get_word_before_cursor(), "bana");
        assert_eq!(doc.find_start_of_previous_word(), 6);

        let doc = Document::with_text("apple ", 6);
        assert_eq!(doc.get_word_before_cursor(), "");

        // mid-word: only the part before the cursor
        let doc = Document::with_text("apple bana", 8);
        assert_eq!(doc.get_word_before_cursor(), "ba");
    }

    #[test]
    fn test_get_word_before_cursor_with_space() {
        let doc = Document::with_text("apple bana ", 11);
        assert_eq!(doc.get_word_before_cursor_with_space(), "bana ");
        assert_eq!(doc.find_start_of_previous_word_with_space(), 6);

        let doc = Document::with_text("   ", 3);
        assert_eq!(doc.get_word_before_cursor_with_space(), "   ");
        assert_eq!(doc.find_start_of_previous_word_with_space(), 0);
    }

    #[test]
    fn test_get_word_after_cursor() {
        let doc = Document::with_text("apple bana", 0);
        assert_eq!(doc.get_word_after_cursor(), "apple");
        assert_eq!(doc.find_end_of_current_word(), 5);

        let doc = Document::with_text("apple bana", 5);
        assert_eq!(doc.get_word_after_cursor(), "");
        assert_eq!(doc.get_word_after_cursor_with_space(), " bana");
        assert_eq!(doc.find_end_of_current_word_with_space(), 5);
    }

    #[test]
    fn test_word_until_separator() {
        let doc = Document::with_text("aaa.bbb/ccc", 11);
        assert_eq!(doc.get_word_before_cursor_until_separator("./"), "ccc");
        assert_eq!(doc.find_start_of_previous_word_until_separator("./"), 8);

        let doc = Document::with_text("aaa.bbb/", 8);
        assert_eq!(doc.get_word_before_cursor_until_separator("./"), "");
        assert_eq!(
            doc.get_word_before_cursor_until_separator_with_space("./"),
            "bbb/"
        );

        let doc = Document::with_text("aaa.bbb", 0);
        assert_eq!(doc.get_word_after_cursor_until_separator("."), "aaa");
        let doc = Document::with_text("..aaa.bbb", 0);
        assert_eq!(
            doc.get_word_after_cursor_until_separator_with_space("."),
            "..aaa"
        );
    }

    #[test]
    fn test_empty_separator_falls_back_to_space() {
        let doc = Document::with_text("a.b c.d", 7);
        assert_eq!(doc.get_word_before_cursor_until_separator(""), "c.d");
    }

    #[test]
    fn test_word_before_cursor_multibyte() {
        let doc = Document::with_text("あい うえ", 5);
        assert_eq!(doc.get_word_before_cursor(), "うえ");
        assert_eq!(doc.find_start_of_previous_word(), 3);
    }

    #[test]
    fn test_current_line() {
        let doc = Document::with_text("line 1\nline 2\nline 3", 10);
        assert_eq!(doc.current_line_before_cursor(), "lin");
        assert_eq!(doc.current_line_after_cursor(), "e 2");
        assert_eq!(doc.current_line(), "line 2");
    }

    #[test]
    fn test_lines_and_start_indexes() {
        let doc = Document::with_text("ab\n\ncde\n", 0);
        assert_eq!(doc.lines(), vec!["ab", "", "cde", ""]);
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_start_indexes(), vec![0, 3, 4, 8]);
    }

    #[test]
    fn test_translate_index_to_position() {
        let doc = Document::with_text("ab\n\ncde\n", 0);
        assert_eq!(doc.translate_index_to_position(0), (0, 0));
        assert_eq!(doc.translate_index_to_position(2), (0, 2));
        assert_eq!(doc.translate_index_to_position(3), (1, 0));
        assert_eq!(doc.translate_index_to_position(6), (2, 2));
        assert_eq!(doc.translate_index_to_position(8), (3, 0));
    }

    #[test]
    fn test_translate_row_col_to_index_clamps() {
        let doc = Document::with_text("ab\ncdef", 0);
        assert_eq!(doc.translate_row_col_to_index(1, 2), 5);
        assert_eq!(doc.translate_row_col_to_index(0, 10), 2);
        assert_eq!(doc.translate_row_col_to_index(9, 1), 4);
    }

    #[test]
    fn test_cursor_left_right_stay_on_line() {
        let doc = Document::with_text("ab\ncdef", 4);
        assert_eq!(doc.get_cursor_left_position(1), -1);
        assert_eq!(doc.get_cursor_left_position(10), -1);
        assert_eq!(doc.get_cursor_right_position(2), 2);
        assert_eq!(doc.get_cursor_right_position(10), 3);
    }

    #[test]
    fn test_cursor_up_down_preserve_column() {
        let doc = Document::with_text("abcdef\nab\nabcdef", 15);
        assert_eq!(doc.cursor_position_row(), 2);
        assert_eq!(doc.cursor_position_col(), 5);

        // line 1 is shorter, so the column clamps to its end
        assert_eq!(doc.get_cursor_up_position(1, None), 9 - 15);
        // the remembered column brings it back on line 0
        let up = Document::with_text(doc.text(), 9);
        assert_eq!(up.get_cursor_up_position(1, Some(5)), 5 - 9);
        assert_eq!(up.get_cursor_down_position(1, Some(5)), 15 - 9);
    }

    #[test]
    fn test_has_prev_and_next_line() {
        let single = Document::with_text("abc", 1);
        assert!(!single.has_prev_line());
        assert!(!single.has_next_line());

        let multi = Document::with_text("abc\ndef", 1);
        assert!(!multi.has_prev_line());
        assert!(multi.has_next_line());

        let multi = Document::with_text("abc\ndef", 6);
        assert!(multi.has_prev_line());
        assert!(!multi.has_next_line());
    }

    #[test]
    fn test_line_positions() {
        let doc = Document::with_text("  foo bar\nbaz", 4);
        assert_eq!(doc.get_end_of_line_position(), 5);
        assert_eq!(doc.get_start_of_line_position(), 4);
        assert_eq!(doc.leading_whitespace_in_current_line(), "  ");
    }
}
