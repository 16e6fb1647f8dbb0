//! Terminal output for the chat transcript.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::activity::Activity;
use crate::render::ActivityRenderer;

/// Owns the output side of the terminal: prompt, incoming messages, cursor.
pub struct Console<W: Write> {
    out: W,
    prompt: String,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, prompt: impl Into<String>) -> Self {
        Self {
            out,
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", self.prompt)?;
        self.out.flush()
    }

    /// Erase whatever is on the current line (prompt, partial input) and
    /// return to column 0.
    pub fn clear_input_line(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::CurrentLine), MoveToColumn(0))
    }

    /// Print incoming activities above a fresh prompt.
    ///
    /// Does nothing for an empty batch, so self-echo-only frames leave the
    /// prompt untouched.
    pub fn show_activities(&mut self, renderer: &ActivityRenderer, activities: &[Activity]) -> io::Result<()> {
        if activities.is_empty() {
            return Ok(());
        }
        self.clear_input_line()?;
        for activity in activities {
            renderer.render(activity, &mut self.out)?;
        }
        self.prompt()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
