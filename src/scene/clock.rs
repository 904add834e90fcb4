use crate::foundation::core::{Fps, FrameIndex};

/// Monotonic scene clock counting elapsed seconds and ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    elapsed: f64,
    ticks: u64,
}

impl FrameClock {
    /// Clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock positioned at the start of `frame` at `fps`.
    pub fn at_frame(fps: Fps, frame: FrameIndex) -> Self {
        Self {
            elapsed: frame.0 as f64 * fps.frame_duration_secs(),
            ticks: frame.0,
        }
    }

    /// Advance by `dt` seconds and return the new elapsed time.
    ///
    /// Negative and non-finite deltas count as zero, so time never runs backwards.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.ticks = self.ticks.wrapping_add(1);
        self.elapsed
    }

    /// Advance by one frame at `fps`.
    pub fn advance_frame(&mut self, fps: Fps) -> f64 {
        self.advance(fps.frame_duration_secs())
    }

    /// Seconds elapsed since the clock started.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed
    }

    /// Number of `advance` calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/clock.rs"]
mod tests;
