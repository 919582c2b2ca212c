//! Run-until-cancelled render loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::app::App;

/// A cancellation token shared between the loop and whoever stops it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of frame timestamps in milliseconds.
pub trait FrameClock {
    fn next_timestamp(&mut self) -> f64;
}

/// Wall-clock timestamps since the clock was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn next_timestamp(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock advancing a fixed step per frame.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    next: f64,
    step_ms: f64,
}

impl FixedStepClock {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            next: start_ms,
            step_ms,
        }
    }

    /// Clock producing one timestamp per frame at `fps`, starting at zero.
    pub fn at_fps(fps: u32) -> Self {
        Self::new(0.0, 1000.0 / fps.max(1) as f64)
    }
}

impl FrameClock for FixedStepClock {
    fn next_timestamp(&mut self) -> f64 {
        let t = self.next;
        self.next += self.step_ms;
        t
    }
}

/// Pending viewport size, set from outside the loop and applied at the start
/// of the next frame. Later requests overwrite earlier ones.
#[derive(Debug, Clone, Default)]
pub struct ResizeHandle {
    pending: Arc<Mutex<Option<(u32, u32)>>>,
}

impl ResizeHandle {
    pub fn request(&self, width: u32, height: u32) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some((width, height));
        }
    }

    fn take(&self) -> Option<(u32, u32)> {
        self.pending.lock().ok().and_then(|mut p| p.take())
    }
}

/// Something that turns the current app state into a frame.
pub trait FrameTarget {
    type Error;

    fn draw_frame(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Called after the app has been resized.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// The render loop.
pub struct FrameLoop<C: FrameClock> {
    clock: C,
    token: CancellationToken,
    resize: ResizeHandle,
    max_frames: Option<u64>,
}

impl<C: FrameClock> FrameLoop<C> {
    pub fn new(clock: C, token: CancellationToken) -> Self {
        Self {
            clock,
            token,
            resize: ResizeHandle::default(),
            max_frames: None,
        }
    }

    /// Stop on its own after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn resize_handle(&self) -> ResizeHandle {
        self.resize.clone()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Update and draw frames until cancelled. Returns the number of frames drawn.
    pub fn run<T: FrameTarget>(&mut self, app: &mut App, target: &mut T) -> Result<u64, T::Error> {
        let mut frames = 0u64;
        log::info!("Frame loop started");

        while !self.token.is_cancelled() {
            if self.max_frames.is_some_and(|max| frames >= max) {
                break;
            }

            if let Some((width, height)) = self.resize.take() {
                app.resize(width, height);
                let surface = app.surface();
                target.resize(surface.width, surface.height);
            }

            let timestamp = self.clock.next_timestamp();
            app.update(timestamp);
            target.draw_frame(app)?;
            frames += 1;
        }

        log::info!("Frame loop stopped after {} frames", frames);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    struct CountingTarget {
        frames: u64,
        stop_after: u64,
        token: CancellationToken,
        sizes: Vec<(u32, u32)>,
    }

    impl FrameTarget for CountingTarget {
        type Error = std::convert::Infallible;

        fn draw_frame(&mut self, _app: &App) -> Result<(), Self::Error> {
            self.frames += 1;
            if self.frames >= self.stop_after {
                self.token.cancel();
            }
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    #[test]
    fn test_fixed_step_clock() {
        let mut clock = FixedStepClock::at_fps(50);
        assert_eq!(clock.next_timestamp(), 0.0);
        assert_eq!(clock.next_timestamp(), 20.0);
        assert_eq!(clock.next_timestamp(), 40.0);
    }

    #[test]
    fn test_loop_stops_when_cancelled() {
        let token = CancellationToken::new();
        let mut frame_loop = FrameLoop::new(FixedStepClock::at_fps(60), token.clone());
        let mut target = CountingTarget {
            frames: 0,
            stop_after: 5,
            token,
            sizes: Vec::new(),
        };
        let mut app = App::new(Settings::default(), 320, 240);

        let frames = frame_loop.run(&mut app, &mut target).unwrap();
        assert_eq!(frames, 5);
        assert_eq!(app.frame_count(), 5);
    }

    #[test]
    fn test_pre_cancelled_loop_draws_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let mut frame_loop = FrameLoop::new(SystemClock::new(), token.clone());
        let mut target = CountingTarget {
            frames: 0,
            stop_after: 1,
            token,
            sizes: Vec::new(),
        };
        let mut app = App::new(Settings::default(), 320, 240);
        assert_eq!(frame_loop.run(&mut app, &mut target).unwrap(), 0);
    }

    #[test]
    fn test_resize_requests_coalesce() {
        let token = CancellationToken::new();
        let mut frame_loop =
            FrameLoop::new(FixedStepClock::at_fps(60), token.clone()).with_frame_limit(2);
        let handle = frame_loop.resize_handle();
        handle.request(800, 600);
        handle.request(400, 300);

        let mut target = CountingTarget {
            frames: 0,
            stop_after: u64::MAX,
            token,
            sizes: Vec::new(),
        };
        let mut app = App::new(Settings::default(), 320, 240);
        assert_eq!(frame_loop.run(&mut app, &mut target).unwrap(), 2);
        assert_eq!(target.sizes, vec![(400, 300)]);
        assert_eq!(app.surface().width, 400);
    }
}
