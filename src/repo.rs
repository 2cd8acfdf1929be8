use std::path::{Path, PathBuf};
use std::sync::mpsc::SyncSender;

use crossterm::style::Color;

use crate::canvas::{DisplayMessage, TextStyle};
use crate::git::{GitError, Invoker};
use crate::theme::Palette;

/// One working copy and its task state: a fixed display row plus a column
/// cursor that only ever advances as segments are appended. The task owns
/// this struct for its whole lifetime and is the only thing that touches
/// the copy's filesystem tree.
pub struct WorkingCopy {
    path: PathBuf,
    row: u16,
    col: u16,
    messages: SyncSender<DisplayMessage>,
    invoker: Invoker,
    palette: Palette,
}

impl WorkingCopy {
    pub fn new(
        path: PathBuf,
        row: u16,
        col: u16,
        messages: SyncSender<DisplayMessage>,
        invoker: Invoker,
        palette: Palette,
    ) -> Self {
        Self {
            path,
            row,
            col,
            messages,
            invoker,
            palette,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    /// Runs the check-then-pull protocol to exactly one terminal outcome.
    /// Steps run in strict sequence with no way back: read branch, check
    /// for local modifications, pull, classify the pull output.
    pub fn run(mut self) {
        let branch = match self.git(&["branch", "--show-current"]) {
            Ok(branch) => branch,
            Err(error) => {
                self.send_skipped(&error);
                return;
            }
        };

        self.send("[", self.palette.neutral, TextStyle::Normal);
        self.col += 1;
        self.send(&branch, self.palette.neutral, TextStyle::Bold);
        self.col += branch.chars().count() as u16;
        self.send("]", self.palette.neutral, TextStyle::Normal);
        self.col += 2;

        let status = match self.git(&["status", "--porcelain"]) {
            Ok(status) => status,
            Err(error) => {
                self.send_skipped(&error);
                return;
            }
        };
        if !status.is_empty() {
            self.send(
                "skipped due to changes",
                self.palette.attention,
                TextStyle::Bold,
            );
            return;
        }

        let output = match self.git(&["pull"]) {
            Ok(output) => output,
            Err(error) => {
                self.send(
                    &format!("failed to pull: {error}"),
                    self.palette.error,
                    TextStyle::Bold,
                );
                return;
            }
        };
        match summary_line(&output) {
            Some(line) => self.send(line, self.palette.attention, TextStyle::Bold),
            None => self.send("no changes", self.palette.info, TextStyle::Normal),
        }
    }

    fn git(&self, args: &[&str]) -> Result<String, GitError> {
        self.invoker.run(&self.path, args, |attempt, error| {
            self.send(
                &format!("retry #{attempt} for {error}"),
                self.palette.attention,
                TextStyle::Bold,
            );
        })
    }

    fn send_skipped(&self, error: &GitError) {
        self.send(
            &format!("skipped due to error: {error}"),
            self.palette.error,
            TextStyle::Bold,
        );
    }

    fn send(&self, text: &str, color: Color, style: TextStyle) {
        // A send only fails once the canvas is gone; there is no one left
        // to tell.
        let _ = self.messages.send(DisplayMessage {
            text: text.to_owned(),
            row: self.row,
            col: self.col,
            color,
            style,
        });
    }
}

/// First pull output line carrying a file-change summary, trimmed. Merge and
/// fast-forward pulls print one when anything changed; its absence means the
/// copy was already current.
pub fn summary_line(output: &str) -> Option<&str> {
    output
        .lines()
        .find(|line| line.contains(" changed, "))
        .map(str::trim)
}

#[cfg(test)]
#[path = "tests/repo_tests.rs"]
mod tests;
