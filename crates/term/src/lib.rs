//! Crossterm-backed drawing target for the loop kernel.
//!
//! Presents a double-buffered char grid to a real terminal: the kernel
//! draws into the back buffer, `present` diffs against the previous frame,
//! flushes the changed runs, and swaps.

pub mod target;

pub use game_kernel_core as core;

pub use target::TermTarget;
