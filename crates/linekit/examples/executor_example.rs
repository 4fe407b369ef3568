//! Command loop built on `Prompt::run`.
//!
//! Run with: cargo run --example executor_example

use linekit::prelude::*;

fn main() -> Result<(), PromptError> {
    println!("Commands: help, echo <text>, status, quit");
    println!("Press Ctrl+D on an empty line to leave");

    let mut prompt = Prompt::builder()
        .with_prefix("cmd> ")
        .with_completer(StaticCompleter::new(vec![
            Suggest::new("help", "Show the commands"),
            Suggest::new("echo", "Print the rest of the line"),
            Suggest::new("status", "Show prompt status"),
            Suggest::new("quit", "Leave the prompt"),
        ]))
        .with_key_bind_mode(KeyBindMode::Emacs)
        .with_exit_checker(|input: &str, final_submission: bool| {
            final_submission && input.trim() == "quit"
        })
        .build()?;

    let code = prompt.run(|input: &str| {
        let input = input.trim();
        match input.split_once(' ').unwrap_or((input, "")) {
            ("", _) => {}
            ("help", _) => println!("help, echo <text>, status, quit"),
            ("echo", rest) => println!("{rest}"),
            ("status", _) => println!("running"),
            ("quit", _) => println!("Goodbye!"),
            (other, _) => println!("unknown command: {other}"),
        }
    })?;

    std::process::exit(code);
}
