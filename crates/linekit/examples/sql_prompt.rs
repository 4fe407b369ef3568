//! SQL-flavored prompt with syntax coloring and diagnostics pushed from a
//! background thread.
//!
//! Run with: cargo run --example sql_prompt

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use linekit::prelude::*;

const SEPARATORS: &[char] = &['\t', '\n', '\x0b', '\x0c', '\r', ' ', ';', '=', '<', '>', ','];

fn completer(document: &Document) -> Vec<Suggest> {
    let tables = vec![
        Suggest::new("users", "Store the username and age"),
        Suggest::new("articles", "Store the article text posted by user"),
        Suggest::new("comments", "Store the text commented to articles"),
        Suggest::new("groups", "Combine users with specific rules"),
    ];
    filter_has_prefix(tables, document.get_word_before_cursor(), true)
}

/// Split on separators, keeping each separator as its own token.
fn split_with_separators(line: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (i, c) in line.char_indices() {
        if SEPARATORS.contains(&c) {
            if start < i {
                words.push(&line[start..i]);
            }
            words.push(&line[i..i + c.len_utf8()]);
            start = i + c.len_utf8();
        }
    }
    if start < line.len() {
        words.push(&line[start..]);
    }
    words
}

fn lexer(line: &str) -> Vec<LexerElement> {
    split_with_separators(line)
        .into_iter()
        .map(|word| {
            let color = if word.eq_ignore_ascii_case("select") {
                Color::Yellow
            } else {
                Color::DefaultColor
            };
            LexerElement::new(word, color)
        })
        .collect()
}

/// A fake linter result covering the first few characters of the first line.
fn mock_diagnostic() -> Diagnostic {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let end = (nanos % 10) as usize;
    Diagnostic::new(0, 0, end, "Error: this is a lsp diagnostic")
}

fn main() -> Result<(), PromptError> {
    let mut prompt = Prompt::builder()
        .with_prefix(">>> ")
        .with_title("sql-prompt")
        .with_completer(completer)
        .with_history(vec!["SELECT * FROM users;".to_string()])
        .with_prefix_text_color(Color::Yellow)
        .with_preview_suggestion_text_color(Color::Blue)
        .with_selected_suggestion_background_color(Color::LightGray)
        .with_suggestion_background_color(Color::DarkGray)
        .with_lexer(lexer)
        .with_statement_terminator(|_, buf: &Buffer| buf.text().trim_end().ends_with(';'))
        .build()?;

    prompt.set_diagnostics(vec![mock_diagnostic()]);

    let handle = prompt.handle();
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(5));
        if !handle.set_diagnostics(vec![mock_diagnostic()]) {
            break;
        }
    });

    let statement = prompt.input()?;
    println!("Your input: {statement}");
    Ok(())
}
