//! Console backends for linekit.
//!
//! - [`UnixConsoleInput`]: raw-mode keystroke reading from stdin (Unix)
//! - [`Vt100Writer`] / `Vt100Output`: VT100 escape-code output
//! - [`FileConsoleInput`]: replays a file as keystrokes
//! - [`NoopConsoleOutput`]: discards all drawing
//! - [`mock`]: scripted input and recording output for tests

use linekit_core::{ConsoleInput, ConsoleOutput, ConsoleResult};

pub mod debug;
pub mod file_input;
pub mod mock;
pub mod noop;
pub mod vt100;

#[cfg(unix)]
mod unix;

pub use file_input::FileConsoleInput;
pub use mock::{MockConsoleInput, MockConsoleOutput, OutputOp};
pub use noop::NoopConsoleOutput;
pub use vt100::Vt100Writer;

#[cfg(unix)]
pub use unix::{StdoutFd, UnixConsoleInput, Vt100Output};

/// Environment variable naming a file to read keystrokes from.
pub const ENV_INPUT_FILE: &str = "LINEKIT_INPUT_FILE";

/// Input source for this process: the file named by `LINEKIT_INPUT_FILE`
/// when set, otherwise the terminal.
pub fn default_console_input() -> ConsoleResult<Box<dyn ConsoleInput>> {
    if let Some(path) = std::env::var_os(ENV_INPUT_FILE).filter(|p| !p.is_empty()) {
        log::debug!("using file input {:?}", path);
        return Ok(Box::new(FileConsoleInput::new(path)));
    }

    #[cfg(unix)]
    {
        Ok(Box::new(UnixConsoleInput::new()?))
    }

    #[cfg(not(unix))]
    {
        Err(linekit_core::ConsoleError::unsupported("terminal input"))
    }
}

/// VT100 output to stdout.
pub fn default_console_output() -> Box<dyn ConsoleOutput> {
    #[cfg(unix)]
    {
        Box::new(Vt100Output::stdout())
    }

    #[cfg(not(unix))]
    {
        Box::new(Vt100Writer::new(std::io::stdout()))
    }
}
