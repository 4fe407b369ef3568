//! Common imports.
//!
//! ```
//! use linekit_core::prelude::*;
//!
//! let doc = Document::with_text("select", 6);
//! let suggest = Suggest::new("select", "Pick rows");
//! assert_eq!(doc.get_word_before_cursor(), suggest.text);
//! ```

pub use crate::buffer::Buffer;
pub use crate::completion::{Completer, CompletionManager};
pub use crate::console::{Color, ConsoleInput, ConsoleOutput, WinSize};
pub use crate::diagnostic::Diagnostic;
pub use crate::document::Document;
pub use crate::error::{ConsoleError, ConsoleResult};
pub use crate::history::History;
pub use crate::key::{Key, KeyEvent};
pub use crate::key_bindings::{AsciiCodeBind, KeyBind, KeyBindMode};
pub use crate::lexer::{Lexer, LexerElement};
pub use crate::suggestion::{filter_has_prefix, Suggest};
