//! # linekit: interactive terminal prompts
//!
//! linekit reads a line from the terminal with completion, history, syntax
//! coloring and inline diagnostics, redrawing the prompt in place after
//! every keystroke.
//!
//! ## Quick Start
//!
//! ```no_run
//! use linekit::prelude::*;
//!
//! let mut prompt = Prompt::builder()
//!     .with_prefix("sql> ")
//!     .with_completer(StaticCompleter::new(vec![
//!         Suggest::new("select", "Pick rows"),
//!         Suggest::new("from", "Name the table"),
//!     ]))
//!     .with_statement_terminator(|_, buf: &Buffer| buf.text().trim_end().ends_with(';'))
//!     .build()?;
//!
//! prompt.run(|statement| println!("running {statement}"))?;
//! # Ok::<(), PromptError>(())
//! ```
//!
//! ## Architecture
//!
//! - `linekit-core`: key decoding, [`Document`], [`Buffer`], [`History`],
//!   completion state and the console traits
//! - `linekit-io`: terminal, file and test backends for those traits
//! - `linekit`: the [`Renderer`] and the [`Prompt`] controller (this crate)

pub mod prompt;
pub mod renderer;
pub mod shortcut;

pub mod prelude;

pub use linekit_core::{
    filter_contains, filter_fuzzy, filter_has_prefix, filter_has_suffix, has_diagnostic,
    AsciiCodeBind, Buffer, Color, Completer, CompletionManager, ConsoleError, ConsoleInput,
    ConsoleOutput, ConsoleResult, Diagnostic, Document, History, Key, KeyBind, KeyBindMode,
    Lexer, LexerElement, StaticCompleter, Suggest, WinSize,
};

pub use prompt::{
    ExitChecker, Feed, Prompt, PromptBuilder, PromptError, PromptHandle, PromptResult,
    StatementTerminator,
};
pub use renderer::{RenderColors, Renderer};
pub use shortcut::{choose, input};
