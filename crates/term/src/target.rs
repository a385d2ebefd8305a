//! TermTarget: double-buffered terminal presentation backend.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{cursor, style::Print, terminal, QueueableCommand};

use game_kernel_core::buffer::CellBuffer;
use game_kernel_core::surface::{Acquire, DrawTarget, Surface};

/// Terminal-backed [`DrawTarget`].
///
/// Buffers are allocated lazily from the terminal size: the `acquire` call
/// that triggers allocation reports [`Acquire::NotReady`], and the kernel
/// retries on the next due frame.
pub struct TermTarget {
    stdout: io::Stdout,
    front: CellBuffer,
    back: CellBuffer,
    allocated: bool,
    drawn_once: bool,
}

impl TermTarget {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            front: CellBuffer::new(0, 0),
            back: CellBuffer::new(0, 0),
            allocated: false,
            drawn_once: false,
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next present to be a full redraw and re-read the terminal
    /// size. Useful on resize events.
    pub fn invalidate(&mut self) {
        self.allocated = false;
        self.drawn_once = false;
    }

    fn full_redraw(&mut self) -> Result<()> {
        self.stdout
            .queue(terminal::Clear(terminal::ClearType::All))?;

        let mut row = String::with_capacity(self.back.width() as usize);
        for y in 0..self.back.height() {
            row.clear();
            for x in 0..self.back.width() {
                row.push(self.back.get(x, y).unwrap_or(' '));
            }
            self.stdout.queue(cursor::MoveTo(0, y))?;
            self.stdout.queue(Print(&row))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn diff_redraw(&mut self) -> Result<()> {
        for run in changed_runs(&self.front, &self.back) {
            self.stdout.queue(cursor::MoveTo(run.x, run.y))?;
            self.stdout.queue(Print(&run.text))?;
        }
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TermTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for TermTarget {
    fn acquire(&mut self) -> Result<Acquire> {
        if !self.allocated {
            let (w, h) = terminal::size()?;
            self.back.resize(w, h);
            self.front.resize(w, h);
            self.allocated = true;
            self.drawn_once = false;
            // The frame that triggered allocation is skipped.
            return Ok(Acquire::NotReady);
        }
        Ok(Acquire::Ready)
    }

    fn surface(&mut self) -> &mut dyn Surface {
        &mut self.back
    }

    fn present(&mut self) -> Result<()> {
        if self.drawn_once {
            self.diff_redraw()?;
        } else {
            self.full_redraw()?;
            self.drawn_once = true;
        }
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

/// A horizontal run of changed cells.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Run {
    x: u16,
    y: u16,
    text: String,
}

/// Collect contiguous differing cells per row, coalescing neighbors into
/// one cursor move + print each.
fn changed_runs(prev: &CellBuffer, next: &CellBuffer) -> Vec<Run> {
    let mut runs = Vec::new();
    let (w, h) = next.size();

    for y in 0..h {
        let mut x = 0;
        while x < w {
            if prev.get(x, y) == next.get(x, y) {
                x += 1;
                continue;
            }

            let start = x;
            let mut text = String::new();
            while x < w && prev.get(x, y) != next.get(x, y) {
                text.push(next.get(x, y).unwrap_or(' '));
                x += 1;
            }
            runs.push(Run { x: start, y, text });
        }
    }

    runs
}
