//! The loop itself: accumulator, catch-up, render gating, cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::clock::{Clock, MonotonicClock};
use crate::config::{Config, IdleWait};
use crate::diag::FpsWindow;
use crate::surface::{Acquire, DrawTarget};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("update callback failed at tick {tick}")]
    Update {
        tick: u64,
        #[source]
        source: anyhow::Error,
    },
    #[error("render failed at frame {frame}")]
    Render {
        frame: u64,
        #[source]
        source: anyhow::Error,
    },
}

/// Cloneable cancellation flag for a running [`Kernel`].
///
/// `request_stop` is idempotent; the loop checks the flag once at the top
/// of each outer iteration and returns after finishing the iteration in
/// flight, never mid-step.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Fixed-timestep update/render loop.
///
/// Owns its counters exclusively; the configuration is owned for the run's
/// lifetime and nothing else mutates scheduler state. One instance per run.
pub struct Kernel {
    config: Config,
    clock: Box<dyn Clock>,
    stop: StopHandle,
}

impl Kernel {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Box::new(MonotonicClock::new()),
            stop: StopHandle::new(),
        }
    }

    /// Replace the time source. Tests drive the loop with scripted clocks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Share a stop flag created ahead of the kernel, so callbacks built
    /// into the configuration can request cancellation.
    pub fn with_stop(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Run the loop until cancelled. Blocks the calling thread; update and
    /// paint callbacks execute synchronously on it, so a slow callback of
    /// either kind delays the other.
    ///
    /// Per iteration: drain the ticks owed since start, render if the
    /// frame interval has elapsed, report the frame rate once per elapsed
    /// second. Ticks for an iteration always complete before that
    /// iteration's render check.
    pub fn run(&mut self, target: &mut dyn DrawTarget) -> Result<(), RunError> {
        let update_interval = self.config.update_interval_ns;
        let frame_interval = self.config.frame_interval_ns;

        let mut start_ns = self.clock.now_ns();
        let mut last_render_ns = start_ns;
        let mut completed: u64 = 0;
        let mut rendered: u64 = 0;
        let mut window = FpsWindow::new(start_ns);

        while !self.stop.is_stop_requested() {
            let now = self.clock.now_ns();

            // Total ticks that should have happened by now.
            let mut target_ticks = now.saturating_sub(start_ns) / update_interval;
            if let Some(cap) = self.config.max_catchup {
                let owed = target_ticks - completed;
                if owed > cap {
                    // Forgive the debt beyond the cap by re-anchoring.
                    let forgiven = owed - cap;
                    start_ns += forgiven * update_interval;
                    target_ticks -= forgiven;
                }
            }

            // Catch-up loop: zero, one, or many ticks per iteration.
            while completed < target_ticks {
                if let Some(cb) = self.config.update.as_mut() {
                    if let Err(source) = cb() {
                        log::error!("update callback failed at tick {completed}: {source:#}");
                        return Err(RunError::Update {
                            tick: completed,
                            source,
                        });
                    }
                }
                completed += 1;
            }

            if now - last_render_ns >= frame_interval {
                last_render_ns = now;
                if render_frame(&mut self.config, target, rendered)? {
                    rendered += 1;
                    window.record_frame();
                }
            }

            window.maybe_report(now, self.config.sink.as_mut());

            if self.config.idle == IdleWait::SpinSleep {
                let next_tick = start_ns + (completed + 1) * update_interval;
                let next_frame = last_render_ns + frame_interval;
                let next_due = next_tick.min(next_frame).min(window.next_deadline_ns());
                let now = self.clock.now_ns();
                if next_due > now {
                    spin_sleep::sleep(Duration::from_nanos(next_due - now));
                }
            }
        }

        Ok(())
    }
}

/// One render pass: acquire, clear, paint, present. Returns false when the
/// backend reported `NotReady` (frame skipped, retried when next due).
fn render_frame(
    config: &mut Config,
    target: &mut dyn DrawTarget,
    frame: u64,
) -> Result<bool, RunError> {
    match target.acquire() {
        Err(source) => return Err(render_error(frame, source)),
        Ok(Acquire::NotReady) => return Ok(false),
        Ok(Acquire::Ready) => {}
    }

    let surface = target.surface();
    surface.clear();
    let painted = match config.paint.as_mut() {
        Some(cb) => cb(surface),
        None => Ok(()),
    };

    // Release the frame before surfacing any paint failure.
    let presented = target.present();
    if let Err(source) = painted {
        return Err(render_error(frame, source));
    }
    if let Err(source) = presented {
        return Err(render_error(frame, source));
    }
    Ok(true)
}

fn render_error(frame: u64, source: anyhow::Error) -> RunError {
    log::error!("render failed at frame {frame}: {source:#}");
    RunError::Render { frame, source }
}
