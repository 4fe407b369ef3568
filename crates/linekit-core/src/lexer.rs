//! Token stream consumed by the renderer for syntax coloring.

use crate::console::Color;

/// One colored token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerElement {
    pub text: String,
    pub color: Color,
}

impl LexerElement {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Splits a line into colored tokens whose texts concatenate back to the
/// line.
///
/// ```
/// use linekit_core::{Color, Lexer, LexerElement};
///
/// let lexer = |line: &str| -> Vec<LexerElement> {
///     line.split_inclusive(' ')
///         .map(|word| LexerElement::new(word, Color::Green))
///         .collect()
/// };
/// let tokens = lexer.process("select a");
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].text, "select ");
/// ```
pub trait Lexer: Send + Sync {
    fn process(&self, line: &str) -> Vec<LexerElement>;
}

impl<F> Lexer for F
where
    F: Fn(&str) -> Vec<LexerElement> + Send + Sync,
{
    fn process(&self, line: &str) -> Vec<LexerElement> {
        self(line)
    }
}

/// Walk `line` token by token, pairing each token with the slice of `line`
/// it covers.
///
/// Each chunk runs from the current position up to and including the first
/// occurrence of the token's text; a token that is not found takes the rest
/// of the line.
pub fn split_tokens<'a>(line: &'a str, tokens: &'a [LexerElement]) -> Vec<(&'a str, &'a LexerElement)> {
    let mut rest = line;
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let end = if token.text.is_empty() {
            rest.chars().next().map(char::len_utf8).unwrap_or(0)
        } else {
            rest.find(token.text.as_str())
                .map(|i| i + token.text.len())
                .unwrap_or(rest.len())
        };
        let (chunk, tail) = rest.split_at(end);
        out.push((chunk, token));
        rest = tail;
    }
    out
}
