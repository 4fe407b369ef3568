//! Common imports for building a prompt.
//!
//! ```
//! use linekit::prelude::*;
//! use linekit_io::{MockConsoleInput, MockConsoleOutput};
//!
//! let prompt = Prompt::builder()
//!     .with_prefix("$ ")
//!     .with_key_bind_mode(KeyBindMode::Emacs)
//!     .with_input(Box::new(MockConsoleInput::new()))
//!     .with_output(Box::new(MockConsoleOutput::new()))
//!     .build()
//!     .unwrap();
//! assert_eq!(prompt.buffer().text(), "");
//! ```

pub use linekit_core::prelude::*;
pub use linekit_core::StaticCompleter;

pub use crate::prompt::{Feed, Prompt, PromptBuilder, PromptError, PromptHandle, PromptResult};
pub use crate::renderer::RenderColors;
