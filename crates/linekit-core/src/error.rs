//! Error types shared by the console boundary.

use thiserror::Error;

/// Failures reported by input sources and output writers.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is not a terminal")]
    NotATerminal,

    #[error("'{feature}' is not supported on this platform")]
    Unsupported { feature: String },

    #[error("input source is closed")]
    InputClosed,
}

impl ConsoleError {
    pub fn unsupported(feature: impl Into<String>) -> Self {
        ConsoleError::Unsupported {
            feature: feature.into(),
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_error_display() {
        assert_eq!(ConsoleError::NotATerminal.to_string(), "input is not a terminal");
        assert_eq!(
            ConsoleError::unsupported("raw mode").to_string(),
            "'raw mode' is not supported on this platform"
        );
    }

    #[test]
    fn test_console_error_from_io() {
        let err: ConsoleError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, ConsoleError::Io(_)));
        assert_eq!(err.to_string(), "console I/O error: boom");
    }
}
