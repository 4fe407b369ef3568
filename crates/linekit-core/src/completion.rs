//! Completion state: the current candidates, the selection and the scroll
//! offset of the dropdown window.
//!
//! All mutable state sits behind one lock so the renderer and the controller
//! can share a [`CompletionManager`] through `&self`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::warn;

use crate::document::Document;
use crate::suggestion::Suggest;
use crate::unicode;

const SHORTEN_SUFFIX: &str = "...";
const LEFT_PREFIX: &str = " ";
const LEFT_SUFFIX: &str = " ";
const RIGHT_PREFIX: &str = " ";
const RIGHT_SUFFIX: &str = " ";

/// Produces candidates for the current document.
///
/// Lookups can run on a background thread, so implementations must be
/// `Send + Sync`. Closures get an implementation for free:
///
/// ```
/// use linekit_core::{Completer, Document, Suggest};
///
/// let completer = |doc: &Document| -> Vec<Suggest> {
///     vec![Suggest::new(format!("{}!", doc.text()), "")]
/// };
/// let out = completer.complete(&Document::with_text("hi", 2));
/// assert_eq!(out[0].text, "hi!");
/// ```
pub trait Completer: Send + Sync {
    fn complete(&self, document: &Document) -> Vec<Suggest>;
}

impl<F> Completer for F
where
    F: Fn(&Document) -> Vec<Suggest> + Send + Sync,
{
    fn complete(&self, document: &Document) -> Vec<Suggest> {
        self(document)
    }
}

/// Completes against a fixed list, keeping the entries whose text starts with
/// the word before the cursor.
#[derive(Debug, Clone)]
pub struct StaticCompleter {
    suggests: Vec<Suggest>,
    ignore_case: bool,
}

impl StaticCompleter {
    pub fn new(suggests: Vec<Suggest>) -> Self {
        Self {
            suggests,
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

impl Completer for StaticCompleter {
    fn complete(&self, document: &Document) -> Vec<Suggest> {
        crate::suggestion::filter_has_prefix(
            self.suggests.clone(),
            document.get_word_before_cursor(),
            self.ignore_case,
        )
    }
}

#[derive(Debug, Default)]
struct State {
    suggests: Vec<Suggest>,
    /// -1 when nothing is selected
    selected: isize,
    vertical_scroll: isize,
}

impl State {
    fn reset(&mut self) {
        self.selected = -1;
        self.vertical_scroll = 0;
        self.suggests.clear();
    }
}

/// Owns the candidate list and the dropdown cursor.
pub struct CompletionManager {
    state: RwLock<State>,
    completer: Option<Arc<dyn Completer>>,
    max: u16,
    word_separator: String,
    show_at_start: bool,
}

impl std::fmt::Debug for CompletionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionManager")
            .field("state", &*self.read())
            .field("max", &self.max)
            .field("word_separator", &self.word_separator)
            .field("show_at_start", &self.show_at_start)
            .finish_non_exhaustive()
    }
}

impl CompletionManager {
    /// Create a manager showing at most `max` rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit_core::{CompletionManager, Document, Suggest};
    ///
    /// let manager = CompletionManager::new(
    ///     Some(|_: &Document| vec![Suggest::from("a"), Suggest::from("b")]),
    ///     6,
    /// );
    /// manager.update(&Document::new());
    /// assert!(!manager.completing());
    ///
    /// manager.next();
    /// assert_eq!(manager.get_selected_suggestion(), Some(Suggest::from("a")));
    /// ```
    pub fn new<C>(completer: Option<C>, max: u16) -> Self
    where
        C: Completer + 'static,
    {
        Self::with_shared_completer(completer.map(|c| Arc::new(c) as Arc<dyn Completer>), max)
    }

    pub fn with_shared_completer(completer: Option<Arc<dyn Completer>>, max: u16) -> Self {
        Self {
            state: RwLock::new(State {
                selected: -1,
                ..State::default()
            }),
            completer,
            max,
            word_separator: String::new(),
            show_at_start: false,
        }
    }

    pub fn with_word_separator(mut self, separator: impl Into<String>) -> Self {
        self.word_separator = separator.into();
        self
    }

    pub fn with_show_at_start(mut self, show_at_start: bool) -> Self {
        self.show_at_start = show_at_start;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn completer(&self) -> Option<Arc<dyn Completer>> {
        self.completer.clone()
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn word_separator(&self) -> &str {
        &self.word_separator
    }

    pub fn show_at_start(&self) -> bool {
        self.show_at_start
    }

    pub fn suggestions(&self) -> Vec<Suggest> {
        self.read().suggests.clone()
    }

    /// Index of the selected candidate.
    pub fn selected(&self) -> Option<usize> {
        usize::try_from(self.read().selected).ok()
    }

    pub fn vertical_scroll(&self) -> usize {
        usize::try_from(self.read().vertical_scroll).unwrap_or(0)
    }

    /// True while a candidate is selected.
    pub fn completing(&self) -> bool {
        self.read().selected != -1
    }

    /// The selected candidate. An out-of-range selection is dropped.
    pub fn get_selected_suggestion(&self) -> Option<Suggest> {
        let mut state = self.write();
        if state.selected == -1 {
            return None;
        }
        match usize::try_from(state.selected)
            .ok()
            .and_then(|i| state.suggests.get(i).cloned())
        {
            Some(suggest) => Some(suggest),
            None => {
                warn!(
                    "completion selection {} out of range for {} candidates",
                    state.selected,
                    state.suggests.len()
                );
                state.selected = -1;
                state.vertical_scroll = 0;
                None
            }
        }
    }

    /// Deselect and drop the candidates.
    pub fn reset(&self) {
        self.write().reset();
    }

    /// Ask the completer for `document` and replace the candidates.
    pub fn update(&self, document: &Document) {
        let Some(completer) = &self.completer else {
            return;
        };
        let suggests = completer.complete(document);
        self.set_suggestions(suggests);
    }

    /// Replace the candidates with an already computed list.
    pub fn set_suggestions(&self, suggests: Vec<Suggest>) {
        let mut state = self.write();
        state.reset();
        state.suggests = suggests;
    }

    /// Select the next candidate; past the last one the selection wraps to none.
    pub fn next(&self) {
        let mut state = self.write();
        if state.vertical_scroll + self.max as isize - 1 == state.selected {
            state.vertical_scroll += 1;
        }
        state.selected += 1;
        self.settle(&mut state);
    }

    /// Select the previous candidate; before none the selection wraps to the last.
    pub fn previous(&self) {
        let mut state = self.write();
        if state.vertical_scroll == state.selected && state.selected > 0 {
            state.vertical_scroll -= 1;
        }
        state.selected -= 1;
        self.settle(&mut state);
    }

    /// Keeps the suggestions when wrapping past the end.
    fn settle(&self, state: &mut State) {
        let len = state.suggests.len() as isize;
        let window = (self.max as isize).min(len);
        if state.selected >= len {
            state.selected = -1;
            state.vertical_scroll = 0;
        } else if state.selected < -1 {
            state.selected = len - 1;
            state.vertical_scroll = len - window;
        }
    }
}

fn delete_break_line_characters(s: &str) -> String {
    s.replace(['\n', '\r'], "")
}

/// Pad or truncate every string to one shared cell width and wrap it in
/// `prefix` and `suffix`. Returns empty strings and width 0 when nothing fits.
pub fn format_texts(texts: &[String], max: usize, prefix: &str, suffix: &str) -> (Vec<String>, usize) {
    let mut out = vec![String::new(); texts.len()];
    let prefix_width = unicode::display_width(prefix);
    let suffix_width = unicode::display_width(suffix);
    let min = prefix_width + suffix_width + unicode::display_width(SHORTEN_SUFFIX);

    let cleaned: Vec<String> = texts.iter().map(|t| delete_break_line_characters(t)).collect();
    let mut width = cleaned
        .iter()
        .map(|t| unicode::display_width(t))
        .max()
        .unwrap_or(0);

    if width == 0 || min >= max {
        return (out, 0);
    }
    if prefix_width + width + suffix_width > max {
        width = max - prefix_width - suffix_width;
    }

    for (slot, text) in out.iter_mut().zip(&cleaned) {
        let body = if unicode::display_width(text) <= width {
            unicode::fill_right(text, width)
        } else {
            unicode::fill_right(&unicode::truncate_with_tail(text, width, SHORTEN_SUFFIX), width)
        };
        *slot = format!("{prefix}{body}{suffix}");
    }
    (out, prefix_width + width + suffix_width)
}

/// Lay candidates out as two padded columns fitting in `max` cells.
///
/// # Examples
///
/// ```
/// use linekit_core::{completion::format_suggestions, Suggest};
///
/// let (rows, width) = format_suggestions(
///     &[Suggest::new("select", "pick rows"), Suggest::new("from", "")],
///     40,
/// );
/// assert_eq!(rows[0].text, " select ");
/// assert_eq!(rows[1].description, "           ");
/// assert_eq!(width, 19);
/// ```
pub fn format_suggestions(suggests: &[Suggest], max: usize) -> (Vec<Suggest>, usize) {
    let left: Vec<String> = suggests.iter().map(|s| s.text.clone()).collect();
    let right: Vec<String> = suggests.iter().map(|s| s.description.clone()).collect();

    let (left, left_width) = format_texts(&left, max, LEFT_PREFIX, LEFT_SUFFIX);
    if left_width == 0 {
        return (Vec::new(), 0);
    }
    let (right, right_width) = format_texts(&right, max - left_width, RIGHT_PREFIX, RIGHT_SUFFIX);

    let rows = left
        .into_iter()
        .zip(right)
        .map(|(text, description)| Suggest { text, description })
        .collect();
    (rows, left_width + right_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manager_with(count: usize, max: u16) -> CompletionManager {
        let suggests: Vec<Suggest> = (0..count).map(|i| Suggest::from(format!("s{i}"))).collect();
        let manager = CompletionManager::new(None::<StaticCompleter>, max);
        manager.set_suggestions(suggests);
        manager
    }

    #[test]
    fn test_next_scrolls_one_row_at_a_time() {
        let manager = manager_with(10, 3);
        for _ in 0..3 {
            manager.next();
        }
        assert_eq!(manager.selected(), Some(2));
        assert_eq!(manager.vertical_scroll(), 0);
        manager.next();
        assert_eq!(manager.selected(), Some(3));
        assert_eq!(manager.vertical_scroll(), 1);
    }

    #[test]
    fn test_next_past_end_wraps_to_none() {
        let manager = manager_with(2, 6);
        manager.next();
        manager.next();
        manager.next();
        assert_eq!(manager.selected(), None);
        assert!(!manager.completing());
        assert_eq!(manager.vertical_scroll(), 0);
    }

    #[test]
    fn test_previous_from_none_wraps_to_last() {
        let manager = manager_with(10, 3);
        manager.previous();
        assert_eq!(manager.selected(), Some(9));
        assert_eq!(manager.vertical_scroll(), 7);
        manager.previous();
        manager.previous();
        assert_eq!(manager.vertical_scroll(), 7);
        manager.previous();
        assert_eq!(manager.selected(), Some(6));
        assert_eq!(manager.vertical_scroll(), 6);
    }

    #[test]
    fn test_reset_drops_suggestions() {
        let manager = manager_with(3, 6);
        manager.next();
        manager.reset();
        assert!(manager.suggestions().is_empty());
        assert_eq!(manager.selected(), None);
    }

    #[test]
    fn test_update_uses_completer_and_deselects() {
        let manager = CompletionManager::new(
            Some(|doc: &Document| vec![Suggest::from(doc.text())]),
            6,
        );
        manager.update(&Document::with_text("abc", 3));
        manager.next();
        manager.update(&Document::with_text("abcd", 4));
        assert_eq!(manager.selected(), None);
        assert_eq!(manager.suggestions(), vec![Suggest::from("abcd")]);
    }

    #[test]
    fn test_update_without_completer_is_noop() {
        let manager = manager_with(2, 6);
        manager.update(&Document::new());
        assert_eq!(manager.suggestions().len(), 2);
    }

    #[test]
    fn test_selected_suggestion_out_of_range_resets() {
        let manager = manager_with(2, 6);
        manager.next();
        manager.next();
        manager.write().suggests.truncate(1);
        assert_eq!(manager.get_selected_suggestion(), None);
        assert!(!manager.completing());
    }

    #[test]
    fn test_static_completer_filters_by_word() {
        let completer = StaticCompleter::new(vec![
            Suggest::from("users"),
            Suggest::from("upload"),
            Suggest::from("articles"),
        ]);
        let found = completer.complete(&Document::with_text("select u", 8));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_format_texts() {
        let texts: Vec<String> = ["foo", "bar", "fuga"].iter().map(|s| s.to_string()).collect();
        let (out, width) = format_texts(&texts, 10, " ", " ");
        assert_eq!(out, [" foo  ", " bar  ", " fuga "]);
        assert_eq!(width, 6);

        let (out, width) = format_texts(&texts, 5, " ", " ");
        assert_eq!(out, ["", "", ""]);
        assert_eq!(width, 0);
    }

    #[test]
    fn test_format_texts_truncates_wide_chars() {
        let texts = vec!["您好xxx您好xxx".to_string(), "abc".to_string()];
        let (out, width) = format_texts(&texts, 13, " ", " ");
        assert_eq!(width, 13);
        assert_eq!(out[0], " 您好xxx...  ");
        assert_eq!(unicode::display_width(&out[0]), 13);
        assert_eq!(out[1], " abc         ");
    }

    #[test]
    fn test_format_texts_strips_line_breaks() {
        let texts = vec!["a\nb\r".to_string()];
        let (out, _) = format_texts(&texts, 10, "", "");
        assert_eq!(out, ["ab"]);
    }

    #[test]
    fn test_format_suggestions_without_descriptions() {
        let suggests: Vec<Suggest> = ["select", "from", "insert", "where"]
            .into_iter()
            .map(Suggest::from)
            .collect();
        let (rows, width) = format_suggestions(&suggests, 20);
        let texts: Vec<&str> = rows.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, [" select ", " from   ", " insert ", " where  "]);
        assert!(rows.iter().all(|s| s.description.is_empty()));
        assert_eq!(width, 8);
    }

    #[test]
    fn test_format_suggestions_with_descriptions() {
        let suggests: Vec<Suggest> = ["select", "from", "insert", "where"]
            .into_iter()
            .map(|t| Suggest::new(t, format!("{t} description")))
            .collect();
        let (rows, width) = format_suggestions(&suggests, 40);
        assert_eq!(rows[0].text, " select ");
        assert_eq!(rows[0].description, " select description ");
        assert_eq!(rows[1].description, " from description   ");
        assert_eq!(rows[2].description, " insert description ");
        assert_eq!(rows[3].description, " where description  ");
        assert_eq!(width, 28);
    }

    #[test]
    fn test_format_suggestions_too_narrow() {
        let (rows, width) = format_suggestions(&[Suggest::from("select")], 4);
        assert!(rows.is_empty());
        assert_eq!(width, 0);
    }

    proptest! {
        #[test]
        fn prop_next_then_previous_round_trips(
            count in 1usize..20,
            max in 1u16..10,
            steps in 0usize..60,
        ) {
            let manager = manager_with(count, max);
            for _ in 0..steps {
                manager.next();
            }
            for _ in 0..steps {
                manager.previous();
            }
            prop_assert_eq!(manager.selected(), None);
            prop_assert_eq!(manager.vertical_scroll(), 0);
        }
    }
}
