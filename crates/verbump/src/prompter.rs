//! Terminal prompts for interactive mode, backed by `inquire`.

use inquire::{Confirm, InquireError, Select, Text};
use owo_colors::{OwoColorize, Stream, Style};

use verbump_core::{PromptError, PromptResult, Prompter, Summary, VersionChoice};

/// Prompts on the controlling terminal.
///
/// Only constructed when stdin and stdout are both terminals.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select_version(
        &mut self,
        current: &str,
        choices: &[VersionChoice],
        default: usize,
    ) -> PromptResult<Option<usize>> {
        let labels: Vec<String> = choices.iter().map(choice_label).collect();
        let message = format!("Current version {current}");
        let answer = Select::new(&message, labels)
            .with_starting_cursor(default)
            .with_page_size(choices.len())
            .raw_prompt();
        cancellable(answer).map(|picked| picked.map(|option| option.index))
    }

    fn custom_version(
        &mut self,
        current: &str,
        error: Option<&str>,
    ) -> PromptResult<Option<String>> {
        if let Some(error) = error {
            eprintln!(
                "{} {error}",
                "✖".if_supports_color(Stream::Stderr, |t| t.red())
            );
        }
        let answer = Text::new("Enter the new version number:")
            .with_initial_value(current)
            .prompt();
        cancellable(answer)
    }

    fn confirm(&mut self, summary: &Summary) -> PromptResult<bool> {
        print_summary(summary);
        let answer = Confirm::new("Bump?").with_default(true).prompt();
        cancellable(answer).map(|answer| answer.unwrap_or(false))
    }
}

/// Escape and Ctrl-C become `None`; anything else is a real failure.
fn cancellable<T>(answer: Result<T, InquireError>) -> PromptResult<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(PromptError::new(e)),
    }
}

fn choice_label(choice: &VersionChoice) -> String {
    match &choice.version {
        Some(version) => format!("{:>11} {version}", choice.label()),
        None => format!("{:>11}", choice.label()),
    }
}

fn print_summary(summary: &Summary) {
    let row = |name: &str, text: &str, style: Style| {
        println!(
            "{:>9} {}",
            name.if_supports_color(Stream::Stdout, |t| t.dimmed()),
            text.if_supports_color(Stream::Stdout, |t| t.style(style))
        );
    };
    let plain = Style::new().bold();

    println!();
    row("files", &summary.files.join(", "), plain);
    if let Some(commit) = &summary.commit {
        row("commit", commit, plain);
    }
    if let Some(tag) = &summary.tag {
        row("tag", tag, plain);
    }
    if let Some(execute) = &summary.execute {
        row("execute", execute, plain);
    }
    if summary.push {
        row("push", "yes", Style::new().cyan().bold());
    }
    println!();
    row("from", &summary.from, plain);
    row("to", &summary.to, Style::new().green().bold());
    println!();
}
