use std::io::{self, Write};
use std::sync::mpsc::Receiver;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Normal,
    Bold,
}

/// One positioned, colored unit of output. Produced by any task (or the
/// orchestrator, for row labels) and consumed exactly once by the canvas.
/// Coordinates are 1-based terminal coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub text: String,
    pub row: u16,
    pub col: u16,
    pub color: Color,
    pub style: TextStyle,
}

/// Sole owner of the terminal handle. Every concurrent task funnels its
/// output through the message queue into exactly one `Canvas`, so cursor
/// position and color state are never contended.
pub struct Canvas<W: Write> {
    out: W,
    max_row: u16,
}

impl<W: Write> Canvas<W> {
    pub fn new(out: W) -> Self {
        Self { out, max_row: 1 }
    }

    pub fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()
    }

    /// Renders one message at its absolute position. Only the first line of
    /// the text is drawn; the rest of the terminal row is erased so a short
    /// replacement fully overwrites a longer predecessor.
    pub fn render(&mut self, message: &DisplayMessage) -> io::Result<()> {
        if self.max_row < message.row {
            self.max_row = message.row;
        }
        let line = message.text.lines().next().unwrap_or("");
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(message.color)
        )?;
        if message.style == TextStyle::Bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            self.out,
            MoveTo(message.col.saturating_sub(1), message.row.saturating_sub(1)),
            Print(line),
            Clear(ClearType::UntilNewLine)
        )?;
        self.out.flush()
    }

    /// Resets style and parks the cursor one row below everything rendered,
    /// so the shell prompt lands under the output.
    pub fn finish(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            MoveTo(0, self.max_row)
        )?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Writer loop: clear once, render messages until every sender has hung up,
/// then restore the cursor. Queue closure happens structurally, by the last
/// `SyncSender` dropping, which cannot precede producer completion.
pub fn drain<W: Write>(out: W, messages: Receiver<DisplayMessage>) -> io::Result<W> {
    let mut canvas = Canvas::new(out);
    canvas.clear()?;
    for message in messages {
        canvas.render(&message)?;
    }
    canvas.finish()?;
    Ok(canvas.into_inner())
}

#[cfg(test)]
#[path = "tests/canvas_tests.rs"]
mod tests;
