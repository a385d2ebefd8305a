//! Fixed-timestep update/render loop kernel.
//!
//! Decouples simulation update frequency from display frame frequency with
//! a monotonic clock and an accumulator: each outer iteration drains the
//! ticks owed since start, renders if the frame interval has elapsed, and
//! reports the observed frame rate once per second.
//!
//! The loop is single-threaded and cooperative. Both callbacks run
//! synchronously on the calling thread, which rules out data races on
//! simulation state but means blocking work inside a callback stalls the
//! whole loop. Baseline behavior is a busy-poll; see
//! [`config::IdleWait::SpinSleep`] for the bounded-sleep alternative.
//!
//! # Module structure
//!
//! - [`clock`]: monotonic nanosecond time sources
//! - [`config`]: fluent builder for rates and callbacks
//! - [`scheduler`]: the loop itself ([`Kernel`]) and cancellation
//! - [`surface`]: drawing-surface contract consumed by the render step
//! - [`buffer`]: in-memory char-cell buffers and a headless target
//! - [`diag`]: per-second frame-rate diagnostics

pub mod buffer;
pub mod clock;
pub mod config;
pub mod diag;
pub mod scheduler;
pub mod surface;

pub use buffer::{CellBuffer, MemoryTarget};
pub use clock::{Clock, ManualClock, MonotonicClock, ScriptClock, SteppingClock, NANOS_PER_SEC};
pub use config::{Config, ConfigError, IdleWait, KernelBuilder, PaintFn, UpdateFn};
pub use diag::{FrameRateSink, FpsWindow, LogSink, WriterSink};
pub use scheduler::{Kernel, RunError, StopHandle};
pub use surface::{Acquire, DrawTarget, Surface};
