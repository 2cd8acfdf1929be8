use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::canvas::{self, DisplayMessage, TextStyle};
use crate::discover::{discover_working_copies, display_label};
use crate::git::Invoker;
use crate::repo::WorkingCopy;
use crate::theme::Palette;

/// Columns between the end of the longest label and the first task segment:
/// the label's trailing `:` plus a two-column gutter.
const LABEL_GUTTER: u16 = 3;

#[derive(Debug)]
pub enum RunnerError {
    Io(io::Error),
    WriterPanicked,
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerError::Io(error) => write!(f, "{error}"),
            RunnerError::WriterPanicked => write!(f, "terminal writer thread panicked"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunnerError::Io(error) => Some(error),
            RunnerError::WriterPanicked => None,
        }
    }
}

impl From<io::Error> for RunnerError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// One full run: discovery, row assignment, task fan-out, writer loop.
pub struct Session {
    roots: Vec<PathBuf>,
    palette: Palette,
    invoker: Invoker,
}

impl Session {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            palette: Palette::detect(),
            invoker: Invoker::default(),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// Runs against stdout.
    pub fn run(self) -> Result<(), RunnerError> {
        self.run_to(io::stdout())?;
        Ok(())
    }

    /// Runs the session rendering into `out`, returning the writer so tests
    /// can inspect the emitted byte stream.
    ///
    /// Each working copy gets row = discovery index + 1 and a start column
    /// just past the longest label. Labels are announced on the queue before
    /// their task spawns, so the writer learns of every row before that
    /// row's task can speak. The queue closes structurally: the orchestrator
    /// drops its sender after the spawn loop and each task's sender drops
    /// when the task returns, so the writer drains everything and exits only
    /// after all producers are done.
    pub fn run_to<W>(self, out: W) -> Result<W, RunnerError>
    where
        W: Write + Send + 'static,
    {
        let single_root = self.roots.len() == 1;
        let copies = discover_working_copies(&self.roots);
        let labels = copies
            .iter()
            .map(|path| display_label(path, single_root))
            .collect::<Vec<String>>();
        let longest = labels
            .iter()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0);
        let start_col = longest as u16 + LABEL_GUTTER;

        // Bounded to the row count so no producer blocks on a full queue
        // under normal operation. max(1) keeps the empty run off the
        // zero-capacity rendezvous path.
        let (sender, receiver) = mpsc::sync_channel::<DisplayMessage>(copies.len().max(1));
        let writer = thread::spawn(move || canvas::drain(out, receiver));

        let mut tasks = Vec::with_capacity(copies.len());
        for (index, (path, label)) in copies.into_iter().zip(labels).enumerate() {
            let row = index as u16 + 1;
            let _ = sender.send(DisplayMessage {
                text: format!("{label:>longest$}:"),
                row,
                col: 1,
                color: self.palette.neutral,
                style: TextStyle::Normal,
            });
            let task = WorkingCopy::new(
                path,
                row,
                start_col,
                sender.clone(),
                self.invoker.clone(),
                self.palette,
            );
            tasks.push(thread::spawn(move || task.run()));
        }
        drop(sender);

        for task in tasks {
            let _ = task.join();
        }
        match writer.join() {
            Ok(result) => result.map_err(RunnerError::Io),
            Err(_) => Err(RunnerError::WriterPanicked),
        }
    }
}
