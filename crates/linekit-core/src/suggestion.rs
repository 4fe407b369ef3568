//! Completion candidates and the stock filters used to narrow them.

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggest {
    /// Text inserted when the candidate is accepted
    pub text: String,
    /// Shown next to the text in the dropdown
    pub description: String,
}

impl Suggest {
    /// # Examples
    ///
    /// ```
    /// use linekit_core::Suggest;
    ///
    /// let suggest = Suggest::new("users", "Store the username and age");
    /// assert_eq!(suggest.text, "users");
    /// assert_eq!(suggest.description, "Store the username and age");
    /// ```
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }

    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, String::new())
    }
}

impl From<&str> for Suggest {
    fn from(text: &str) -> Self {
        Self::text_only(text)
    }
}

impl From<String> for Suggest {
    fn from(text: String) -> Self {
        Self::text_only(text)
    }
}

impl From<(&str, &str)> for Suggest {
    fn from((text, description): (&str, &str)) -> Self {
        Self::new(text, description)
    }
}

fn filter_with(
    suggests: Vec<Suggest>,
    sub: &str,
    ignore_case: bool,
    matches: impl Fn(&str, &str) -> bool,
) -> Vec<Suggest> {
    if sub.is_empty() {
        return suggests;
    }
    if ignore_case {
        let sub = sub.to_uppercase();
        suggests
            .into_iter()
            .filter(|s| matches(&s.text.to_uppercase(), &sub))
            .collect()
    } else {
        suggests.into_iter().filter(|s| matches(&s.text, sub)).collect()
    }
}

/// Keep the candidates whose text starts with `sub`.
///
/// # Examples
///
/// ```
/// use linekit_core::suggestion::{filter_has_prefix, Suggest};
///
/// let all = vec![Suggest::from("select"), Suggest::from("SET"), Suggest::from("from")];
/// let kept = filter_has_prefix(all, "se", true);
/// assert_eq!(kept.len(), 2);
/// ```
pub fn filter_has_prefix(suggests: Vec<Suggest>, sub: &str, ignore_case: bool) -> Vec<Suggest> {
    filter_with(suggests, sub, ignore_case, |text, sub| text.starts_with(sub))
}

/// Keep the candidates whose text ends with `sub`.
pub fn filter_has_suffix(suggests: Vec<Suggest>, sub: &str, ignore_case: bool) -> Vec<Suggest> {
    filter_with(suggests, sub, ignore_case, |text, sub| text.ends_with(sub))
}

/// Keep the candidates whose text contains `sub`.
pub fn filter_contains(suggests: Vec<Suggest>, sub: &str, ignore_case: bool) -> Vec<Suggest> {
    filter_with(suggests, sub, ignore_case, |text, sub| text.contains(sub))
}

/// Keep the candidates that contain every char of `sub` in order.
pub fn filter_fuzzy(suggests: Vec<Suggest>, sub: &str, ignore_case: bool) -> Vec<Suggest> {
    filter_with(suggests, sub, ignore_case, fuzzy_match)
}

fn fuzzy_match(text: &str, sub: &str) -> bool {
    let mut chars = text.chars();
    sub.chars().all(|wanted| chars.any(|c| c == wanted))
}
