use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use game_kernel::core::{
    FrameRateSink, IdleWait, Kernel, KernelBuilder, MemoryTarget, ScriptClock, SteppingClock,
    StopHandle,
};

struct RecordingSink(Rc<RefCell<Vec<u32>>>);

impl FrameRateSink for RecordingSink {
    fn frames_per_second(&mut self, frames: u32) {
        self.0.borrow_mut().push(frames);
    }
}

#[test]
fn one_second_jump_owes_exactly_hundred_ticks_before_render() {
    let stop = StopHandle::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let ticks = Rc::new(Cell::new(0u64));

    let config = KernelBuilder::new()
        .ups(100)
        .fps(60)
        .update({
            let events = Rc::clone(&events);
            let ticks = Rc::clone(&ticks);
            let stop = stop.clone();
            move || {
                events.borrow_mut().push("tick");
                ticks.set(ticks.get() + 1);
                if ticks.get() == 100 {
                    stop.request_stop();
                }
                Ok(())
            }
        })
        .paint({
            let events = Rc::clone(&events);
            move |_surface| {
                events.borrow_mut().push("frame");
                Ok(())
            }
        })
        .build()
        .unwrap();

    let mut kernel = Kernel::new(config)
        .with_stop(stop)
        .with_clock(ScriptClock::new(&[0, 1_000_000_000]));
    let mut target = MemoryTarget::new(8, 4);
    kernel.run(&mut target).unwrap();

    // All 100 owed ticks drain before the iteration's render check.
    let events = events.borrow();
    assert_eq!(events.len(), 101);
    assert!(events[..100].iter().all(|e| *e == "tick"));
    assert_eq!(events[100], "frame");
}

#[test]
fn thirty_fps_over_two_seconds_renders_between_59_and_60_frames() {
    let stop = StopHandle::new();
    let ticks = Rc::new(Cell::new(0u64));
    let frames = Rc::new(Cell::new(0u64));

    let config = KernelBuilder::new()
        .ups(10_000)
        .fps(30)
        .update({
            let ticks = Rc::clone(&ticks);
            let stop = stop.clone();
            move || {
                ticks.set(ticks.get() + 1);
                if ticks.get() == 20_000 {
                    stop.request_stop();
                }
                Ok(())
            }
        })
        .paint({
            let frames = Rc::clone(&frames);
            move |_surface| {
                frames.set(frames.get() + 1);
                Ok(())
            }
        })
        .build()
        .unwrap();

    // 100us per iteration; stop lands at 2_000_000_000 ns elapsed.
    let mut kernel = Kernel::new(config)
        .with_stop(stop)
        .with_clock(SteppingClock::new(100_000));
    let mut target = MemoryTarget::new(8, 4);
    kernel.run(&mut target).unwrap();

    assert_eq!(ticks.get(), 20_000);
    assert!(
        (59..=60).contains(&frames.get()),
        "expected 59..=60 frames, got {}",
        frames.get()
    );
}

#[test]
fn frame_rate_reports_once_per_elapsed_second() {
    let stop = StopHandle::new();
    let ticks = Rc::new(Cell::new(0u64));
    let reports = Rc::new(RefCell::new(Vec::new()));

    let config = KernelBuilder::new()
        .ups(10_000)
        .fps(30)
        .update({
            let ticks = Rc::clone(&ticks);
            let stop = stop.clone();
            move || {
                ticks.set(ticks.get() + 1);
                if ticks.get() == 20_000 {
                    stop.request_stop();
                }
                Ok(())
            }
        })
        .paint(|_surface| Ok(()))
        .diagnostics(Box::new(RecordingSink(Rc::clone(&reports))))
        .build()
        .unwrap();

    let mut kernel = Kernel::new(config)
        .with_stop(stop)
        .with_clock(SteppingClock::new(100_000));
    let mut target = MemoryTarget::new(8, 4);
    kernel.run(&mut target).unwrap();

    // Two elapsed seconds, one report each, counter reset in between.
    let reports = reports.borrow();
    assert_eq!(reports.len(), 2);
    assert!(
        reports.iter().all(|f| (29..=30).contains(f)),
        "per-second counts out of range: {reports:?}"
    );
}

#[test]
fn missing_paint_callback_still_ticks_and_presents() {
    let stop = StopHandle::new();
    let ticks = Rc::new(Cell::new(0u64));

    let config = KernelBuilder::new()
        .ups(100)
        .update({
            let ticks = Rc::clone(&ticks);
            let stop = stop.clone();
            move || {
                ticks.set(ticks.get() + 1);
                if ticks.get() == 100 {
                    stop.request_stop();
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    let mut kernel = Kernel::new(config)
        .with_stop(stop)
        .with_clock(ScriptClock::new(&[0, 1_000_000_000]));
    let mut target = MemoryTarget::new(8, 4);
    kernel.run(&mut target).unwrap();

    assert_eq!(ticks.get(), 100);
    // The clear/present sequence runs even with no paint callback.
    assert_eq!(target.presented(), 1);
}

#[test]
fn missing_update_callback_still_renders() {
    let stop = StopHandle::new();
    let frames = Rc::new(Cell::new(0u64));

    let config = KernelBuilder::new()
        .fps(60)
        .paint({
            let frames = Rc::clone(&frames);
            let stop = stop.clone();
            move |_surface| {
                frames.set(frames.get() + 1);
                if frames.get() == 3 {
                    stop.request_stop();
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    let mut kernel = Kernel::new(config)
        .with_stop(stop)
        .with_clock(SteppingClock::new(16_700_000));
    let mut target = MemoryTarget::new(8, 4);
    kernel.run(&mut target).unwrap();

    assert_eq!(frames.get(), 3);
    assert_eq!(target.presented(), 3);
}

#[test]
fn spin_sleep_idle_wait_does_not_delay_due_ticks() {
    let stop = StopHandle::new();
    let ticks = Rc::new(Cell::new(0u64));

    let config = KernelBuilder::new()
        .ups(200)
        .fps(50)
        .idle_wait(IdleWait::SpinSleep)
        .update({
            let ticks = Rc::clone(&ticks);
            let stop = stop.clone();
            move || {
                ticks.set(ticks.get() + 1);
                if ticks.get() == 20 {
                    stop.request_stop();
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    // Real monotonic clock: at 200 ups, tick 20 is due 100ms in.
    let started = Instant::now();
    let mut kernel = Kernel::new(config).with_stop(stop);
    let mut target = MemoryTarget::new(8, 4);
    kernel.run(&mut target).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(ticks.get(), 20);
    assert!(
        elapsed >= Duration::from_millis(95),
        "ticks ran ahead of schedule: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(500),
        "due ticks were delayed: {elapsed:?}"
    );
}
