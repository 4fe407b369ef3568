//! Submitted-input history with a browsing cursor.
//!
//! Browsing works on a temporary copy of the entries plus the text currently
//! being edited, so edits made while browsing are kept until the next
//! [`History::add`] or [`History::clear`].

use crate::buffer::Buffer;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    tmp: Vec<String>,
    selected: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::{Buffer, History};
    ///
    /// let mut history = History::new();
    /// history.add("first");
    ///
    /// let older = history.older(&Buffer::new()).unwrap();
    /// assert_eq!(older.text(), "first");
    /// ```
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            tmp: vec![String::new()],
            selected: 0,
        }
    }

    /// Create a history preloaded with `entries`, oldest first.
    pub fn with_entries(entries: Vec<String>) -> Self {
        let mut history = Self {
            entries,
            tmp: Vec::new(),
            selected: 0,
        };
        history.clear();
        history
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append a submitted input and stop browsing.
    pub fn add(&mut self, input: impl Into<String>) {
        self.entries.push(input.into());
        self.clear();
    }

    /// Drop browsing state; entries are kept.
    pub fn clear(&mut self) {
        self.tmp = self.entries.clone();
        self.tmp.push(String::new());
        self.selected = self.tmp.len() - 1;
    }

    /// Step back one entry. `buffer` holds the text being left, which is
    /// remembered for when the user returns to it.
    pub fn older(&mut self, buffer: &Buffer) -> Option<Buffer> {
        if self.tmp.len() == 1 || self.selected == 0 {
            return None;
        }
        self.tmp[self.selected] = buffer.text().to_string();
        self.selected -= 1;
        Some(self.selected_buffer())
    }

    /// Step forward one entry.
    pub fn newer(&mut self, buffer: &Buffer) -> Option<Buffer> {
        if self.selected + 1 >= self.tmp.len() {
            return None;
        }
        self.tmp[self.selected] = buffer.text().to_string();
        self.selected += 1;
        Some(self.selected_buffer())
    }

    /// True while browsing and a newer entry exists.
    pub fn has_newer(&self) -> bool {
        self.selected + 1 < self.tmp.len()
    }

    fn selected_buffer(&self) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.insert_text(&self.tmp[self.selected], false, true);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_resets_browsing() {
        let mut history = History::new();
        history.add("echo 1");
        assert_eq!(history.entries(), &["echo 1".to_string()]);
        assert!(!history.has_newer());
    }

    #[test]
    fn test_older_and_newer() {
        let mut history = History::with_entries(vec!["echo 1".into(), "echo 2".into()]);
        let current = Buffer::new();

        let older = history.older(&current).unwrap();
        assert_eq!(older.text(), "echo 2");
        assert_eq!(older.cursor_position(), 6);
        let oldest = history.older(&older).unwrap();
        assert_eq!(oldest.text(), "echo 1");
        assert!(history.older(&oldest).is_none());

        let newer = history.newer(&oldest).unwrap();
        assert_eq!(newer.text(), "echo 2");
        let back = history.newer(&newer).unwrap();
        assert_eq!(back.text(), "");
        assert!(history.newer(&back).is_none());
    }

    #[test]
    fn test_edits_while_browsing_are_kept() {
        let mut history = History::with_entries(vec!["a".into(), "b".into()]);
        let mut draft = Buffer::new();
        draft.insert_text("draft", false, true);

        let mut entry = history.older(&draft).unwrap();
        entry.insert_text("!", false, true);
        let previous = history.older(&entry).unwrap();
        assert_eq!(previous.text(), "a");

        let edited = history.newer(&previous).unwrap();
        assert_eq!(edited.text(), "b!");
        let restored = history.newer(&edited).unwrap();
        assert_eq!(restored.text(), "draft");
    }

    #[test]
    fn test_clear_discards_browse_edits() {
        let mut history = History::with_entries(vec!["a".into()]);
        let mut entry = history.older(&Buffer::new()).unwrap();
        entry.insert_text("x", false, true);
        history.newer(&entry);
        history.clear();
        let again = history.older(&Buffer::new()).unwrap();
        assert_eq!(again.text(), "a");
    }

    #[test]
    fn test_empty_history_has_nothing_to_browse() {
        let mut history = History::new();
        assert!(history.older(&Buffer::new()).is_none());
        assert!(history.newer(&Buffer::new()).is_none());
        assert!(!history.has_newer());
    }

    #[test]
    fn test_has_newer_while_browsing() {
        let mut history = History::with_entries(vec!["a".into()]);
        history.older(&Buffer::new());
        assert!(history.has_newer());
    }
}
