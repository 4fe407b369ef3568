// Shared helpers for the prompt integration tests

#![allow(dead_code)]

use linekit::prelude::*;
use linekit_io::{MockConsoleInput, MockConsoleOutput};

pub const UP: &[u8] = &[0x1b, 0x5b, 0x41];
pub const DOWN: &[u8] = &[0x1b, 0x5b, 0x42];
pub const LEFT: &[u8] = &[0x1b, 0x5b, 0x44];
pub const HOME: &[u8] = &[0x1b, 0x5b, 0x48];
pub const TAB: &[u8] = &[0x09];
pub const ENTER: &[u8] = &[0x0d];
pub const CONTROL_C: &[u8] = &[0x03];
pub const CONTROL_D: &[u8] = &[0x04];

/// A builder wired to fresh mocks, plus handles to those mocks.
pub fn mock_builder() -> (PromptBuilder, MockConsoleInput, MockConsoleOutput) {
    let input = MockConsoleInput::new();
    let output = MockConsoleOutput::new();
    let builder = Prompt::builder()
        .with_input(Box::new(input.clone()))
        .with_output(Box::new(output.clone()));
    (builder, input, output)
}

/// Feed `text` one character at a time, as a terminal delivers typing.
pub fn type_text(prompt: &mut Prompt, text: &str) {
    for c in text.chars() {
        let mut buf = [0u8; 4];
        assert_eq!(prompt.feed(c.encode_utf8(&mut buf).as_bytes()), Feed::Continue);
    }
}

pub fn sql_terminator(_: Key, buffer: &Buffer) -> bool {
    buffer.text().trim_end().ends_with(';')
}
