//! Input source that replays a file's bytes.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use linekit_core::{ConsoleError, ConsoleInput, ConsoleResult, WinSize};
use log::debug;

const MAX_READ_BYTES: u64 = 1024;

#[derive(Debug, Default)]
struct Cursor {
    file: Option<File>,
    offset: u64,
}

/// Reads the file named at construction, continuing where the last read
/// stopped. The window size is fixed at 50x100.
///
/// # Examples
///
/// ```
/// use linekit_core::ConsoleInput;
/// use linekit_io::FileConsoleInput;
///
/// let dir = std::env::temp_dir().join("linekit-doc-file-input");
/// std::fs::create_dir_all(&dir).unwrap();
/// let path = dir.join("keys.txt");
/// std::fs::write(&path, "select 1;").unwrap();
///
/// let input = FileConsoleInput::new(&path);
/// input.setup().unwrap();
/// assert_eq!(input.read().unwrap(), Some(b"select 1;".to_vec()));
/// assert_eq!(input.read().unwrap(), None);
/// input.tear_down().unwrap();
/// ```
#[derive(Debug)]
pub struct FileConsoleInput {
    path: PathBuf,
    cursor: Mutex<Cursor>,
}

impl FileConsoleInput {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cursor: Mutex::new(Cursor::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConsoleInput for FileConsoleInput {
    fn setup(&self) -> ConsoleResult<()> {
        let file = File::open(&self.path)?;
        debug!("replaying input from {}", self.path.display());
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner).file = Some(file);
        Ok(())
    }

    fn tear_down(&self) -> ConsoleResult<()> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner).file = None;
        Ok(())
    }

    fn get_win_size(&self) -> WinSize {
        WinSize::new(50, 100)
    }

    fn read(&self) -> ConsoleResult<Option<Vec<u8>>> {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let offset = cursor.offset;
        let file = cursor.file.as_mut().ok_or(ConsoleError::InputClosed)?;

        file.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(MAX_READ_BYTES as usize);
        let n = file.take(MAX_READ_BYTES).read_to_end(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        cursor.offset += n as u64;
        Ok(Some(buf))
    }
}
