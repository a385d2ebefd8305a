//! Per-second frame-rate diagnostics.

use std::io::Write;

use crate::clock::NANOS_PER_SEC;

/// Receives the number of render passes completed in each elapsed second.
pub trait FrameRateSink {
    fn frames_per_second(&mut self, frames: u32);
}

/// Default sink: logs through the `log` facade.
pub struct LogSink;

impl FrameRateSink for LogSink {
    fn frames_per_second(&mut self, frames: u32) {
        log::info!("fps: {frames}");
    }
}

/// Sink writing one `FPS: n` line per second to any writer.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> FrameRateSink for WriterSink<W> {
    fn frames_per_second(&mut self, frames: u32) {
        // Diagnostics must never take the loop down.
        let _ = writeln!(self.out, "FPS: {frames}");
    }
}

/// One-second reporting window over completed render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsWindow {
    window_start_ns: u64,
    frames: u32,
}

impl FpsWindow {
    pub fn new(start_ns: u64) -> Self {
        Self {
            window_start_ns: start_ns,
            frames: 0,
        }
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    /// Time at which the current window closes.
    pub fn next_deadline_ns(&self) -> u64 {
        self.window_start_ns.saturating_add(NANOS_PER_SEC)
    }

    /// Report and reset if a full second has elapsed since the window
    /// opened. The counter resets regardless of the count observed.
    pub fn maybe_report(&mut self, now_ns: u64, sink: &mut dyn FrameRateSink) {
        if now_ns.saturating_sub(self.window_start_ns) >= NANOS_PER_SEC {
            sink.frames_per_second(self.frames);
            self.frames = 0;
            self.window_start_ns = now_ns;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink(Vec<u32>);

    impl FrameRateSink for RecordingSink {
        fn frames_per_second(&mut self, frames: u32) {
            self.0.push(frames);
        }
    }

    #[test]
    fn no_report_before_window_closes() {
        let mut sink = RecordingSink::default();
        let mut window = FpsWindow::new(0);
        window.record_frame();
        window.maybe_report(NANOS_PER_SEC - 1, &mut sink);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn window_reports_and_resets_at_each_boundary() {
        let mut sink = RecordingSink::default();
        let mut window = FpsWindow::new(0);

        for _ in 0..5 {
            window.record_frame();
        }
        window.maybe_report(NANOS_PER_SEC, &mut sink);

        for _ in 0..2 {
            window.record_frame();
        }
        window.maybe_report(2 * NANOS_PER_SEC, &mut sink);

        // Empty window still reports, then resets.
        window.maybe_report(3 * NANOS_PER_SEC, &mut sink);

        assert_eq!(sink.0, vec![5, 2, 0]);
    }

    #[test]
    fn deadline_tracks_window_start() {
        let mut sink = RecordingSink::default();
        let mut window = FpsWindow::new(100);
        assert_eq!(window.next_deadline_ns(), 100 + NANOS_PER_SEC);
        window.maybe_report(100 + NANOS_PER_SEC, &mut sink);
        assert_eq!(window.next_deadline_ns(), 100 + 2 * NANOS_PER_SEC);
    }

    #[test]
    fn writer_sink_emits_one_line_per_report() {
        let mut out = Vec::new();
        {
            let mut sink = WriterSink::new(&mut out);
            sink.frames_per_second(60);
            sink.frames_per_second(59);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "FPS: 60\nFPS: 59\n");
    }
}
