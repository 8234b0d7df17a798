//! Line input with reserved navigation tokens.
//!
//! # Responsibility
//! - Read one line per prompt from a pluggable [`LineSource`].
//! - Turn the reserved `back` / `cancel` tokens into [`PromptOutcome`] values.
//!
//! # Invariants
//! - Every prompt recognizes both tokens, case-insensitively, surrounding
//!   whitespace ignored.
//! - End of input behaves like `cancel` and is remembered so the menu loop
//!   can exit.

#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub const BACK_TOKEN: &str = "back";
pub const CANCEL_TOKEN: &str = "cancel";

/// Result of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Raw line without its trailing newline.
    Value(String),
    /// Abandon the current step and return one level up.
    Back,
    /// Abandon the whole interaction and return to the top-level menu.
    Cancel,
}

/// Source of input lines.
pub trait LineSource {
    /// Shows `prompt` and reads one line. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Reads from any buffered reader, echoing prompts to a writer.
pub struct ReaderSource<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.prompt_out, "{prompt}")?;
        self.prompt_out.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

/// Pre-recorded lines, used for scripted sessions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedSource {
    lines: VecDeque<String>,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
impl LineSource for ScriptedSource {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Wraps a [`LineSource`] with token recognition.
pub struct Prompter<S> {
    source: S,
    exhausted: bool,
}

impl<S: LineSource> Prompter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            exhausted: false,
        }
    }

    /// Returns whether the source reached end of input.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn ask(&mut self, prompt: &str) -> io::Result<PromptOutcome> {
        if self.exhausted {
            return Ok(PromptOutcome::Cancel);
        }
        let Some(line) = self.source.read_line(prompt)? else {
            self.exhausted = true;
            return Ok(PromptOutcome::Cancel);
        };
        Ok(classify(line))
    }
}

fn classify(line: String) -> PromptOutcome {
    let token = line.trim().to_lowercase();
    if token == BACK_TOKEN {
        PromptOutcome::Back
    } else if token == CANCEL_TOKEN {
        PromptOutcome::Cancel
    } else {
        PromptOutcome::Value(line)
    }
}
