//! File-backed debug logging.
//!
//! Set `LINEKIT_DEBUG=1` (or `true`) and call [`init`] to append every log
//! record to `tmp/linekit-debug.log`, or to `/tmp/linekit-debug.log` when
//! there is no `tmp/` directory. Nothing is written to the terminal, which
//! belongs to the prompt.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

const ENV_ENABLE_LOG: &str = "LINEKIT_DEBUG";

/// A [`Log`] that appends timestamped lines to a file.
pub struct FileLogger {
    file: Mutex<File>,
}

impl FileLogger {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(
            file,
            "[{timestamp}] {:<5} {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = self.file.lock().unwrap_or_else(PoisonError::into_inner).flush();
    }
}

fn enabled_by_env() -> bool {
    matches!(
        std::env::var(ENV_ENABLE_LOG).as_deref(),
        Ok("1") | Ok("true")
    )
}

/// Install the file logger when `LINEKIT_DEBUG` asks for it.
///
/// Returns `true` when a logger was installed. Safe to call more than once;
/// later calls find a logger already set and do nothing.
pub fn init() -> bool {
    if !enabled_by_env() {
        return false;
    }
    let path = if Path::new("tmp").is_dir() {
        "tmp/linekit-debug.log"
    } else {
        "/tmp/linekit-debug.log"
    };
    match FileLogger::open(path) {
        Ok(logger) => install(logger),
        Err(_) => false,
    }
}

/// Make `logger` the process-wide logger. Fails when one is already set.
fn install(logger: FileLogger) -> bool {
    if log::set_boxed_logger(Box::new(logger)).is_err() {
        return false;
    }
    log::set_max_level(LevelFilter::Trace);
    true
}

/// Log a failed result instead of propagating it.
pub fn assert_no_error<T, E: std::fmt::Display>(result: Result<T, E>) {
    if let Err(err) = result {
        log::error!("unexpected error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_file_logger_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        let logger = FileLogger::open(&path).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("linekit::prompt")
                .args(format_args!("start prompt"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("DEBUG linekit::prompt: start prompt"));
    }

    #[test]
    fn test_install_sets_global_logger_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("global.log");

        assert!(install(FileLogger::open(&path).unwrap()));
        log::info!(target: "linekit::renderer", "installed");
        log::logger().flush();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("INFO  linekit::renderer: installed"));

        assert!(!install(FileLogger::open(&path).unwrap()));
    }

    #[test]
    fn test_assert_no_error_swallows_errors() {
        assert_no_error::<(), _>(Err("broken pipe"));
        assert_no_error::<_, String>(Ok(1));
    }
}
