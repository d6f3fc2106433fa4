// Interactive prompts for the period and input file
// Used by `txsum -i` when the values are easier to type than to quote

use anyhow::{bail, Result};
use rustyline::completion::{Completer, FilenameCompleter};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};
use std::path::{Path, PathBuf};

use crate::period::Period;

/// Helper for interactive mode with file completion
#[derive(Default)]
struct PromptHelper {
    completer: FilenameCompleter,
}

impl Completer for PromptHelper {
    type Candidate = <FilenameCompleter as Completer>::Candidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for PromptHelper {
    type Hint = String;
}

impl Highlighter for PromptHelper {}

impl Validator for PromptHelper {}

impl Helper for PromptHelper {}

/// Something that can ask the user for one line of text
pub trait LineSource {
    /// `Ok(None)` means the user cancelled (Ctrl-C / Ctrl-D)
    fn read_line(&mut self, prompt: &str, initial: &str) -> Result<Option<String>>;

    /// Feedback shown before asking again
    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

impl LineSource for Editor<PromptHelper, DefaultHistory> {
    fn read_line(&mut self, prompt: &str, initial: &str) -> Result<Option<String>> {
        match self.readline_with_initial(prompt, (initial, "")) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Values collected at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAnswers {
    pub period: String,
    pub file: PathBuf,
}

/// Prompt on the terminal, prefilled with any values given on the command line
pub fn prompt_for_inputs(period: Option<&str>, file: Option<&Path>) -> Result<PromptAnswers> {
    let config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<PromptHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(PromptHelper::default()));

    let initial_file = file.map(|p| p.to_string_lossy().into_owned());
    collect_answers(&mut rl, period, initial_file.as_deref())
}

/// Ask for both values, repeating each question until the answer is usable
pub fn collect_answers<S: LineSource>(
    source: &mut S,
    period: Option<&str>,
    file: Option<&str>,
) -> Result<PromptAnswers> {
    let period = ask(
        source,
        "Period (YYYYMM): ",
        period.unwrap_or(""),
        |answer| Period::parse(answer).map(|_| ()).map_err(|e| e.to_string()),
    )?;
    let file = ask(source, "Transaction file: ", file.unwrap_or(""), |_| Ok(()))?;

    Ok(PromptAnswers {
        period,
        file: PathBuf::from(file),
    })
}

fn ask<S, F>(source: &mut S, prompt: &str, initial: &str, check: F) -> Result<String>
where
    S: LineSource,
    F: Fn(&str) -> std::result::Result<(), String>,
{
    loop {
        let Some(line) = source.read_line(prompt, initial)? else {
            bail!("interactive input cancelled");
        };
        let answer = line.trim();
        if answer.is_empty() {
            source.notify("Input cannot be empty. Please try again.");
            continue;
        }
        match check(answer) {
            Ok(()) => return Ok(answer.to_string()),
            Err(message) => source.notify(&message),
        }
    }
}
