//! Monotonic time sources.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Monotonic nanosecond time source.
///
/// `now_ns` must never decrease between calls. Values are only meaningful
/// for interval arithmetic; they have no relation to wall-clock date/time.
pub trait Clock {
    fn now_ns(&mut self) -> u64;
}

/// `Instant`-backed clock anchored at construction.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ns(&mut self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Hand-advanced clock for tests and headless drivers.
///
/// Clones share the same underlying time, so a clone kept outside the loop
/// can advance the clock the loop reads.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ns: u64) {
        self.now.set(self.now.get() + ns);
    }

    /// Jump to an absolute time. Must not move backwards.
    pub fn set(&self, ns: u64) {
        debug_assert!(ns >= self.now.get(), "ManualClock must not go backwards");
        self.now.set(ns);
    }
}

impl Clock for ManualClock {
    fn now_ns(&mut self) -> u64 {
        self.now.get()
    }
}

/// Advances a [`ManualClock`] by a fixed step on every read.
///
/// Deterministic loop driver: iteration k of a run observes `k * step`
/// nanoseconds of elapsed time.
pub struct SteppingClock {
    time: ManualClock,
    step: u64,
}

impl SteppingClock {
    pub fn new(step: u64) -> Self {
        Self {
            time: ManualClock::new(),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now_ns(&mut self) -> u64 {
        let now = self.time.now_ns();
        self.time.advance(self.step);
        now
    }
}

/// Replays scripted times through a [`ManualClock`], repeating the last
/// one once the script runs out. Times must be non-decreasing.
pub struct ScriptClock {
    time: ManualClock,
    times: Vec<u64>,
    next: usize,
}

impl ScriptClock {
    pub fn new(times: &[u64]) -> Self {
        let times = if times.is_empty() {
            vec![0]
        } else {
            times.to_vec()
        };
        Self {
            time: ManualClock::new(),
            times,
            next: 0,
        }
    }
}

impl Clock for ScriptClock {
    fn now_ns(&mut self) -> u64 {
        let i = self.next.min(self.times.len() - 1);
        self.next += 1;
        self.time.set(self.times[i]);
        self.time.now_ns()
    }
}
