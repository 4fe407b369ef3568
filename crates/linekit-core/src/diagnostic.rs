//! Externally supplied error and warning ranges.
//!
//! Columns are character offsets within the line, the same unit lexer token
//! boundaries use. Ranges are closed: both `start_char` and `end_char` are
//! covered.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostic {
    /// Zero-based line in the document
    pub line: usize,
    pub start_char: usize,
    pub end_char: usize,
    /// May span several lines; an empty message is highlighted but not shown
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, start_char: usize, end_char: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            start_char,
            end_char,
            message: message.into(),
        }
    }

    /// True when `(line, col)` falls inside this range.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Diagnostic;
    ///
    /// let diag = Diagnostic::new(0, 2, 4, "unknown column");
    /// assert!(diag.covers(0, 2));
    /// assert!(diag.covers(0, 4));
    /// assert!(!diag.covers(0, 5));
    /// assert!(!diag.covers(1, 3));
    /// ```
    pub fn covers(&self, line: usize, col: usize) -> bool {
        self.line == line && self.start_char <= col && col <= self.end_char
    }
}

/// True when any diagnostic covers `(line, col)`.
pub fn has_diagnostic(line: usize, col: usize, diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.covers(line, col))
}
