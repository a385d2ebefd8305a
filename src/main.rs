//! Bouncing-block demo (default binary).
//!
//! Wires the kernel to a terminal target: a 120 Hz simulation of a block
//! bouncing around the screen, rendered at 60 fps, with the observed frame
//! rate drawn in the corner. Quit with `q`, `Esc`, or `Ctrl-C`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use game_kernel::core::{FrameRateSink, IdleWait, Kernel, KernelBuilder, StopHandle, Surface};
use game_kernel::term::TermTarget;

const UPS: u32 = 120;
const FPS: u32 = 60;
const BLOCK_W: u16 = 4;
const BLOCK_H: u16 = 2;

fn main() -> Result<()> {
    let mut target = TermTarget::new();
    target.enter()?;

    let result = run(&mut target);

    // Always try to restore terminal state.
    let _ = target.exit();
    result
}

fn run(target: &mut TermTarget) -> Result<()> {
    let stop = StopHandle::new();
    let last_fps = Rc::new(Cell::new(0u32));
    let block = Rc::new(RefCell::new(Block::new()));

    let config = KernelBuilder::new()
        .ups(UPS)
        .fps(FPS)
        .update({
            let stop = stop.clone();
            let block = Rc::clone(&block);
            move || {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press && is_quit(key.code, key.modifiers) {
                            stop.request_stop();
                        }
                    }
                }
                let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
                block.borrow_mut().step(w, h);
                Ok(())
            }
        })
        .paint({
            let block = Rc::clone(&block);
            let last_fps = Rc::clone(&last_fps);
            move |surface: &mut dyn Surface| {
                let block = block.borrow();
                surface.fill_rect(block.x as u16, block.y as u16, BLOCK_W, BLOCK_H, '█');
                surface.put_str(0, 0, &format!("fps {:3}  [q] quit", last_fps.get()));
                Ok(())
            }
        })
        .diagnostics(Box::new(SharedFps(Rc::clone(&last_fps))))
        .idle_wait(IdleWait::SpinSleep)
        .build()?;

    let mut kernel = Kernel::new(config).with_stop(stop);
    kernel.run(target)?;
    Ok(())
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Esc)
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
}

/// Sink that parks the latest per-second frame count where the paint
/// callback can read it.
struct SharedFps(Rc<Cell<u32>>);

impl FrameRateSink for SharedFps {
    fn frames_per_second(&mut self, frames: u32) {
        self.0.set(frames);
    }
}

struct Block {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

impl Block {
    fn new() -> Self {
        Self {
            x: 10.0,
            y: 5.0,
            dx: 0.31,
            dy: 0.17,
        }
    }

    /// One simulation tick: advance and bounce off the edges.
    fn step(&mut self, w: u16, h: u16) {
        let max_x = f32::from(w.saturating_sub(BLOCK_W)).max(1.0);
        let max_y = f32::from(h.saturating_sub(BLOCK_H)).max(2.0);

        self.x += self.dx;
        self.y += self.dy;

        if self.x <= 0.0 || self.x >= max_x {
            self.dx = -self.dx;
            self.x = self.x.clamp(0.0, max_x);
        }
        // Row 0 is the status line.
        if self.y <= 1.0 || self.y >= max_y {
            self.dy = -self.dy;
            self.y = self.y.clamp(1.0, max_y);
        }
    }
}
