//! Kernel configuration and its fluent builder.

use thiserror::Error;

use crate::clock::NANOS_PER_SEC;
use crate::diag::{FrameRateSink, LogSink};
use crate::surface::Surface;

/// Simulation tick callback. One invocation is one discrete simulation step.
pub type UpdateFn = Box<dyn FnMut() -> anyhow::Result<()>>;

/// Render callback, handed the cleared back buffer of the current frame.
pub type PaintFn = Box<dyn FnMut(&mut dyn Surface) -> anyhow::Result<()>>;

/// How the loop waits when no tick or frame is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleWait {
    /// Busy-poll. Lowest latency, occupies a core.
    #[default]
    Busy,
    /// Precise sleep until the next due tick, frame, or diagnostics report.
    SpinSleep,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{which} rate out of range (must be 1..=1000000000): {value}")]
    InvalidRate { which: &'static str, value: u32 },
}

/// Immutable kernel configuration. Built once via [`KernelBuilder`], then
/// owned by the kernel for the lifetime of the run.
pub struct Config {
    pub(crate) update_interval_ns: u64,
    pub(crate) frame_interval_ns: u64,
    pub(crate) update: Option<UpdateFn>,
    pub(crate) paint: Option<PaintFn>,
    pub(crate) sink: Box<dyn FrameRateSink>,
    pub(crate) max_catchup: Option<u64>,
    pub(crate) idle: IdleWait,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("update_interval_ns", &self.update_interval_ns)
            .field("frame_interval_ns", &self.frame_interval_ns)
            .field("update", &self.update.as_ref().map(|_| ".."))
            .field("paint", &self.paint.as_ref().map(|_| ".."))
            .field("max_catchup", &self.max_catchup)
            .field("idle", &self.idle)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn update_interval_ns(&self) -> u64 {
        self.update_interval_ns
    }

    pub fn frame_interval_ns(&self) -> u64 {
        self.frame_interval_ns
    }
}

/// Fluent builder for [`Config`]. Both rates default to 60; both callbacks
/// default to absent, which silently skips that phase every iteration.
pub struct KernelBuilder {
    update: Option<UpdateFn>,
    paint: Option<PaintFn>,
    ups: u32,
    fps: u32,
    sink: Option<Box<dyn FrameRateSink>>,
    max_catchup: Option<u64>,
    idle: IdleWait,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self {
            update: None,
            paint: None,
            ups: 60,
            fps: 60,
            sink: None,
            max_catchup: None,
            idle: IdleWait::default(),
        }
    }

    /// Set the render callback.
    pub fn paint(
        mut self,
        cb: impl FnMut(&mut dyn Surface) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.paint = Some(Box::new(cb));
        self
    }

    /// Set the update callback.
    pub fn update(mut self, cb: impl FnMut() -> anyhow::Result<()> + 'static) -> Self {
        self.update = Some(Box::new(cb));
        self
    }

    /// Target frames per second.
    pub fn fps(mut self, frames_per_sec: u32) -> Self {
        self.fps = frames_per_sec;
        self
    }

    /// Target updates per second.
    pub fn ups(mut self, updates_per_sec: u32) -> Self {
        self.ups = updates_per_sec;
        self
    }

    /// Replace the default `log`-based frame-rate sink.
    pub fn diagnostics(mut self, sink: Box<dyn FrameRateSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Cap the ticks drained per outer iteration. When the cap fires, the
    /// debt beyond it is forgiven rather than carried forward, so a slow
    /// update callback degrades to a slower simulation instead of a
    /// catch-up loop that never terminates. Unbounded by default.
    pub fn max_catchup(mut self, ticks: u64) -> Self {
        self.max_catchup = Some(ticks);
        self
    }

    pub fn idle_wait(mut self, idle: IdleWait) -> Self {
        self.idle = idle;
        self
    }

    /// Validate the rates and produce the immutable configuration.
    /// A rate of zero fails here, never as a division during the run.
    pub fn build(self) -> Result<Config, ConfigError> {
        let update_interval_ns = interval_ns("update", self.ups)?;
        let frame_interval_ns = interval_ns("frame", self.fps)?;
        Ok(Config {
            update_interval_ns,
            frame_interval_ns,
            update: self.update,
            paint: self.paint,
            sink: self.sink.unwrap_or_else(|| Box::new(LogSink)),
            max_catchup: self.max_catchup,
            idle: self.idle,
        })
    }
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn interval_ns(which: &'static str, rate: u32) -> Result<u64, ConfigError> {
    if rate == 0 || u64::from(rate) > NANOS_PER_SEC {
        return Err(ConfigError::InvalidRate { which, value: rate });
    }
    Ok(NANOS_PER_SEC / u64::from(rate))
}
