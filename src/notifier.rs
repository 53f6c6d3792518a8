//! Progress output for the provisioning workflow.
//!
//! The workflow reports through a [`StepNotifier`] instead of writing to the
//! console directly. [`ConsolePrompt`] reproduces the interactive sample:
//! each step is printed and followed by a "press any key" pause.
//! [`Recorder`] keeps the lines in memory for tests.

use crate::error::{Error, Result};
use std::io::{BufRead, Write};

/// Prompt printed after each provisioning step.
pub const CONTINUE_PROMPT: &str = "Press any key to continue ...";

/// Sink for workflow progress.
pub trait StepNotifier {
    /// A provisioning step finished (`Created FamilyDB`). Interactive
    /// notifiers pause here.
    fn step(&mut self, message: &str) -> Result<()>;

    /// Informational output (query results). Never pauses.
    fn line(&mut self, message: &str) -> Result<()>;
}

impl<N: StepNotifier + ?Sized> StepNotifier for &mut N {
    fn step(&mut self, message: &str) -> Result<()> {
        (**self).step(message)
    }

    fn line(&mut self, message: &str) -> Result<()> {
        (**self).line(message)
    }
}

/// Writes to an output stream and optionally blocks on an input stream
/// after each step.
#[derive(Debug)]
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
    pause: bool,
}

impl ConsolePrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on the process's stdin/stdout.
    pub fn stdio(pause: bool) -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout(), pause)
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Prompt on arbitrary streams.
    pub fn new(input: R, output: W, pause: bool) -> Self {
        Self { input, output, pause }
    }

    /// Consume the prompt, returning its output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn wait_for_key(&mut self) -> Result<()> {
        writeln!(self.output, "{}", CONTINUE_PROMPT).map_err(Error::Console)?;
        self.output.flush().map_err(Error::Console)?;

        // Any byte continues; the terminal delivers it with the line, so
        // drop the rest of the line as well.
        let mut discard = String::new();
        self.input.read_line(&mut discard).map_err(Error::Console)?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> StepNotifier for ConsolePrompt<R, W> {
    fn step(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message).map_err(Error::Console)?;
        if self.pause {
            self.wait_for_key()?;
        }
        Ok(())
    }

    fn line(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message).map_err(Error::Console)
    }
}

/// Kind of recorded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// From [`StepNotifier::step`].
    Step,
    /// From [`StepNotifier::line`].
    Line,
}

/// Keeps every message in memory.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    entries: Vec<(Output, String)>,
}

impl Recorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Step messages, in order.
    pub fn steps(&self) -> Vec<&str> {
        self.of(Output::Step)
    }

    /// Informational lines, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.of(Output::Line)
    }

    /// Everything, in order.
    pub fn entries(&self) -> &[(Output, String)] {
        &self.entries
    }

    fn of(&self, kind: Output) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.as_str())
            .collect()
    }
}

impl StepNotifier for Recorder {
    fn step(&mut self, message: &str) -> Result<()> {
        self.entries.push((Output::Step, message.to_string()));
        Ok(())
    }

    fn line(&mut self, message: &str) -> Result<()> {
        self.entries.push((Output::Line, message.to_string()));
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl StepNotifier for Silent {
    fn step(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    fn line(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }
}
