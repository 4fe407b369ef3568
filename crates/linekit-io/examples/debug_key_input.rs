//! Prints how each keystroke chunk decodes.
//!
//! Usage: cargo run --example debug_key_input
//! Press Ctrl+C to exit.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use linekit_core::{ConsoleInput, Key, KeyEvent};
use linekit_io::default_console_input;

/// Puts the terminal back even when the loop exits early.
struct RawModeGuard {
    input: Box<dyn ConsoleInput>,
}

impl RawModeGuard {
    fn new(input: Box<dyn ConsoleInput>) -> io::Result<Self> {
        input.setup().map_err(io::Error::other)?;
        Ok(Self { input })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.input.tear_down();
    }
}

fn format_bytes(bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let ascii: String = bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();
    format!("[{}] \"{}\"", hex.join(" "), ascii)
}

fn main() -> io::Result<()> {
    println!("Key input debug tool");
    println!("Press keys to see how they decode. Press Ctrl+C to exit.");

    let input = default_console_input().map_err(io::Error::other)?;
    let guard = RawModeGuard::new(input)?;

    let size = guard.input.get_win_size();
    // raw mode: lines need an explicit carriage return
    print!("[window size] rows={}, cols={}\r\n", size.rows, size.cols);
    io::stdout().flush()?;

    loop {
        match guard.input.read() {
            Ok(Some(bytes)) => {
                let event = KeyEvent::from_bytes(&bytes);
                print!(
                    "Key: {:?} | Raw: {} | Text: {:?}\r\n",
                    event.key,
                    format_bytes(&event.raw_bytes),
                    event.text()
                );
                io::stdout().flush()?;
                if event.key == Key::ControlC {
                    break;
                }
            }
            Ok(None) => thread::sleep(Duration::from_millis(10)),
            Err(err) => {
                print!("Input error: {err}\r\n");
                break;
            }
        }
    }
    Ok(())
}
