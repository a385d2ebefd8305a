//! In-memory char-cell buffers.

use anyhow::Result;

use crate::surface::{Acquire, DrawTarget, Surface};

/// Plain char grid implementing [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![' '; len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize the buffer, preserving the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.cells.clear();
        self.cells.resize(len, ' ');
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<char> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, ch: char) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = ch;
        }
    }
}

impl Surface for CellBuffer {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn put_str(&mut self, x: u16, y: u16, s: &str) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, ch);
            cx += 1;
        }
    }

    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x.saturating_add(dx), y.saturating_add(dy), ch);
            }
        }
    }
}

/// Always-in-memory [`DrawTarget`] for tests and headless runs.
///
/// `with_warmup(n)` makes the first `n` acquires report
/// [`Acquire::NotReady`], imitating a backend that allocates lazily.
pub struct MemoryTarget {
    front: CellBuffer,
    back: CellBuffer,
    warmup: u32,
    acquires: u64,
    presented: u64,
}

impl MemoryTarget {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            front: CellBuffer::new(width, height),
            back: CellBuffer::new(width, height),
            warmup: 0,
            acquires: 0,
            presented: 0,
        }
    }

    pub fn with_warmup(mut self, acquires: u32) -> Self {
        self.warmup = acquires;
        self
    }

    /// Buffer most recently swapped into view.
    pub fn front(&self) -> &CellBuffer {
        &self.front
    }

    pub fn acquires(&self) -> u64 {
        self.acquires
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DrawTarget for MemoryTarget {
    fn acquire(&mut self) -> Result<Acquire> {
        self.acquires += 1;
        if self.warmup > 0 {
            self.warmup -= 1;
            return Ok(Acquire::NotReady);
        }
        Ok(Acquire::Ready)
    }

    fn surface(&mut self) -> &mut dyn Surface {
        &mut self.back
    }

    fn present(&mut self) -> Result<()> {
        std::mem::swap(&mut self.front, &mut self.back);
        self.presented += 1;
        Ok(())
    }
}
