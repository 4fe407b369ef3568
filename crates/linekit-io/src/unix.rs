use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::{Mutex, PoisonError};

use linekit_core::{ConsoleError, ConsoleInput, ConsoleResult, WinSize};
use log::{debug, warn};

use crate::vt100::Vt100Writer;

const MAX_READ_BYTES: usize = 1024;

/// Terminal state saved by `setup` and put back by `tear_down`.
struct SavedMode {
    termios: libc::termios,
    flags: i32,
}

/// Reads keystrokes from stdin in raw, non-blocking mode.
pub struct UnixConsoleInput {
    fd: RawFd,
    saved: Mutex<Option<SavedMode>>,
}

impl UnixConsoleInput {
    pub fn new() -> ConsoleResult<Self> {
        let fd = io::stdin().as_raw_fd();
        if unsafe { libc::isatty(fd) } == 0 {
            return Err(ConsoleError::NotATerminal);
        }
        Ok(Self {
            fd,
            saved: Mutex::new(None),
        })
    }

    fn enter_raw_mode(fd: RawFd) -> io::Result<SavedMode> {
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let mut raw = original;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN);
        raw.c_iflag &= !(libc::IXON | libc::ICRNL | libc::INLCR | libc::BRKINT | libc::ISTRIP);
        raw.c_cflag &= !libc::CSIZE;
        raw.c_cflag |= libc::CS8;
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(SavedMode {
            termios: original,
            flags,
        })
    }

    fn restore(fd: RawFd, saved: &SavedMode) -> io::Result<()> {
        if unsafe { libc::fcntl(fd, libc::F_SETFL, saved.flags) } == -1 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &saved.termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl ConsoleInput for UnixConsoleInput {
    fn setup(&self) -> ConsoleResult<()> {
        let mut saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        if saved.is_some() {
            return Ok(());
        }
        *saved = Some(Self::enter_raw_mode(self.fd)?);
        debug!("raw mode enabled on fd {}", self.fd);
        Ok(())
    }

    fn tear_down(&self) -> ConsoleResult<()> {
        let mut saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mode) = saved.take() {
            Self::restore(self.fd, &mode)?;
            debug!("raw mode disabled on fd {}", self.fd);
        }
        Ok(())
    }

    fn get_win_size(&self) -> WinSize {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(self.fd, libc::TIOCGWINSZ, &mut ws) } == -1 {
            warn!("TIOCGWINSZ failed: {}", io::Error::last_os_error());
            return WinSize::default();
        }
        WinSize::new(ws.ws_row, ws.ws_col)
    }

    fn read(&self) -> ConsoleResult<Option<Vec<u8>>> {
        let mut buf = [0u8; MAX_READ_BYTES];
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                _ => Err(err.into()),
            };
        }
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf[..n as usize].to_vec()))
    }
}

impl Drop for UnixConsoleInput {
    fn drop(&mut self) {
        let saved = self.saved.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(mode) = saved.take() {
            let _ = Self::restore(self.fd, &mode);
        }
    }
}

/// Unbuffered stdout sink; retries writes interrupted by signals.
#[derive(Debug, Default)]
pub struct StdoutFd;

impl io::Write for StdoutFd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            let n = unsafe {
                libc::write(libc::STDOUT_FILENO, buf.as_ptr() as *const libc::c_void, buf.len())
            };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EINTR) {
                return Err(err);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// VT100 output to the process's stdout.
pub type Vt100Output = Vt100Writer<StdoutFd>;

impl Vt100Output {
    pub fn stdout() -> Self {
        Vt100Writer::new(StdoutFd)
    }
}
