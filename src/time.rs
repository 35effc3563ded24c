//! Frame timing.
//!
//! Particle motion is measured in frames, but overlays and the boot sequence
//! run on seconds. A [`FrameClock`] turns frame callbacks into elapsed
//! seconds, a per-frame delta and an FPS estimate.
//!
//! The clock accumulates deltas instead of subtracting from a start instant,
//! so it can be driven by the wall clock ([`FrameClock::tick`]) or by hand
//! ([`FrameClock::advance`]) with identical results.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // once per frame
//! let dt = clock.tick();
//! boot.advance(dt);
//! log::debug!("{:.1} fps", clock.fps());
//! ```

use std::time::Instant;

/// Longest delta a single frame may report. A window that stalls (dragged,
/// minimized) resumes smoothly instead of jumping ahead.
pub const MAX_DELTA: f32 = 0.25;

/// How often the FPS estimate is refreshed, in seconds.
const FPS_WINDOW: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: f32,
    delta: f32,
    frame: u64,
    fps: f32,
    fps_time: f32,
    fps_frames: u32,
    paused: bool,
    fixed_delta: Option<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            fps: 0.0,
            fps_time: 0.0,
            fps_frames: 0,
            paused: false,
            fixed_delta: None,
        }
    }

    /// Report every frame as exactly `delta` seconds, ignoring the wall
    /// clock. Used for recording and for deterministic runs.
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.fixed_delta = Some(delta.max(0.0));
        self
    }

    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Advance by the wall-clock time since the previous tick. The first
    /// tick reports zero.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        self.advance(raw)
    }

    /// Advance by `raw` seconds. Returns the delta actually applied.
    ///
    /// Measured deltas are capped at [`MAX_DELTA`]; a fixed delta is used
    /// as given.
    pub fn advance(&mut self, raw: f32) -> f32 {
        if self.paused {
            self.delta = 0.0;
            return 0.0;
        }

        let dt = match self.fixed_delta {
            Some(fixed) => fixed,
            None => raw.clamp(0.0, MAX_DELTA),
        };
        self.delta = dt;
        self.elapsed += dt;
        self.frame += 1;

        self.fps_time += dt;
        self.fps_frames += 1;
        if self.fps_time >= FPS_WINDOW {
            self.fps = self.fps_frames as f32 / self.fps_time;
            self.fps_time = 0.0;
            self.fps_frames = 0;
        }

        dt
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume without counting the paused span.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last = None;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            fixed_delta: self.fixed_delta,
            ..Self::new()
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
