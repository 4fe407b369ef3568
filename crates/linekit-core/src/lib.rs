//! Core engine of linekit.
//!
//! This crate holds everything that does not touch a real terminal: key
//! decoding, the text model ([`Document`], [`Buffer`]), [`History`],
//! completion state, diagnostics, lexer tokens and the console traits that
//! the terminal backends in `linekit-io` implement.

pub mod buffer;
pub mod completion;
pub mod console;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod history;
pub mod key;
pub mod key_bindings;
pub mod key_decoder;
pub mod lexer;
pub mod suggestion;
pub mod unicode;

pub mod prelude;

pub use buffer::Buffer;
pub use completion::{format_suggestions, Completer, CompletionManager, StaticCompleter};
pub use console::{Color, ConsoleInput, ConsoleOutput, WinSize};
pub use diagnostic::{has_diagnostic, Diagnostic};
pub use document::Document;
pub use error::{ConsoleError, ConsoleResult};
pub use history::History;
pub use key::{Key, KeyEvent};
pub use key_bindings::{AsciiCodeBind, KeyBind, KeyBindFunc, KeyBindMode};
pub use key_decoder::{get_key, remove_ascii_sequences, AsciiCode};
pub use lexer::{Lexer, LexerElement};
pub use suggestion::{filter_contains, filter_fuzzy, filter_has_prefix, filter_has_suffix, Suggest};
