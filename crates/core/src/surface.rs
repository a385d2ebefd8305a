//! Drawing-surface contract between the kernel and a presentation backend.
//!
//! The kernel never draws anything itself. Each due frame it runs the
//! protocol `acquire` → (on [`Acquire::Ready`]) clear the surface, invoke
//! the paint callback, then `present`. The `present` call runs even when
//! the paint callback fails, so a failing frame never stays acquired.

use anyhow::Result;

/// Char-cell drawing surface handed to the paint callback.
///
/// The kernel itself only calls [`Surface::clear`]; the remaining ops exist
/// for paint callbacks.
pub trait Surface {
    /// (width, height) in cells.
    fn size(&self) -> (u16, u16);

    /// Reset every cell to the background state.
    fn clear(&mut self);

    /// Write a string starting at (x, y), clipped at the right edge.
    fn put_str(&mut self, x: u16, y: u16, s: &str);

    /// Fill a rectangle with one character, clipped to the surface.
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char);
}

/// Outcome of [`DrawTarget::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A back buffer is ready to draw into.
    Ready,
    /// The backend is still allocating its buffers. Not a failure: the
    /// frame is skipped and retried on the next due one.
    NotReady,
}

/// Double-buffered presentation backend consumed by the kernel.
pub trait DrawTarget {
    /// Acquire the back buffer for the coming frame. A backend that
    /// allocates lazily returns [`Acquire::NotReady`] from the call that
    /// triggered allocation.
    fn acquire(&mut self) -> Result<Acquire>;

    /// Back buffer for the current frame. Only meaningful between a
    /// `Ready` acquire and the matching `present`.
    fn surface(&mut self) -> &mut dyn Surface;

    /// Dispose of the frame and swap it into view.
    fn present(&mut self) -> Result<()>;
}
