//! One-call prompts on the process terminal.

use linekit_core::{filter_has_prefix, Color, Completer, Document, Suggest};

use crate::prompt::{Prompt, PromptResult};

/// Read one line from the terminal with `completer` suggesting as you type.
///
/// ```no_run
/// use linekit::{Document, Suggest};
///
/// let answer = linekit::input("name? ", |_: &Document| vec![Suggest::from("alice")])?;
/// println!("hello {answer}");
/// # Ok::<(), linekit::PromptError>(())
/// ```
pub fn input<C>(prefix: &str, completer: C) -> PromptResult<String>
where
    C: Completer + 'static,
{
    Prompt::builder()
        .with_prefix(prefix)
        .with_prefix_text_color(Color::DefaultColor)
        .with_completer(completer)
        .build()?
        .input()
}

/// Read one line, suggesting the `choices` that start with the word being
/// typed, ignoring case.
pub fn choose<S: AsRef<str>>(prefix: &str, choices: &[S]) -> PromptResult<String> {
    let suggests = choices
        .iter()
        .map(|choice| Suggest::text_only(choice.as_ref()))
        .collect();
    input(prefix, choice_completer(suggests))
}

fn choice_completer(suggests: Vec<Suggest>) -> impl Completer {
    move |document: &Document| {
        filter_has_prefix(suggests.clone(), document.get_word_before_cursor(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linekit_io::{MockConsoleInput, MockConsoleOutput};

    #[test]
    fn test_choice_completer_ignores_case() {
        let completer = choice_completer(vec![
            Suggest::text_only("Apple"),
            Suggest::text_only("apricot"),
            Suggest::text_only("banana"),
        ]);
        let found = completer.complete(&Document::with_text("ap", 2));
        assert_eq!(
            found,
            vec![Suggest::from("Apple"), Suggest::from("apricot")]
        );
        assert_eq!(completer.complete(&Document::new()).len(), 3);
    }

    #[test]
    fn test_choice_completer_outlives_borrowed_choices() {
        let choices = vec!["alpha".to_string(), "beta".to_string()];
        let suggests = choices
            .iter()
            .map(|choice| Suggest::text_only(choice.as_str()))
            .collect();
        let prompt = Prompt::builder()
            .with_completer(choice_completer(suggests))
            .with_input(Box::new(MockConsoleInput::new()))
            .with_output(Box::new(MockConsoleOutput::new()))
            .build()
            .unwrap();
        drop(choices);

        prompt.completion().update(&Document::with_text("BE", 2));
        assert_eq!(prompt.completion().suggestions(), vec![Suggest::from("beta")]);
    }
}
