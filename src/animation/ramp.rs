use crate::{
    animation::ease::Ease,
    foundation::core::FrameIndex,
    foundation::error::{MaskflowError, MaskflowResult},
};

/// Eased progress transition over a span of frames.
///
/// Before `start` the value is `from`; after `start + frames` it is `to`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProgressRamp {
    /// Progress at and before `start`.
    pub from: f32,
    /// Progress once the ramp has finished.
    pub to: f32,
    /// First frame of the ramp.
    #[serde(default)]
    pub start: FrameIndex,
    /// Ramp length in frames; 0 jumps straight to `to`.
    pub frames: u64,
    /// Curve applied to the normalized frame position.
    #[serde(default)]
    pub ease: Ease,
}

impl ProgressRamp {
    /// Ramp from 0 to 1 over `frames` frames starting at frame 0.
    pub fn fade_in(frames: u64, ease: Ease) -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            start: FrameIndex(0),
            frames,
            ease,
        }
    }

    /// Check that both endpoints are valid progress values.
    pub fn validate(&self) -> MaskflowResult<()> {
        for (name, v) in [("from", self.from), ("to", self.to)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(MaskflowError::validation(format!(
                    "progress ramp `{name}` must be in [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Progress at `frame`.
    pub fn at(&self, frame: FrameIndex) -> f32 {
        if frame.0 < self.start.0 {
            return self.from;
        }
        let offset = frame.0 - self.start.0;
        if self.frames == 0 || offset >= self.frames {
            return self.to;
        }
        let t = self.ease.apply(offset as f64 / self.frames as f64) as f32;
        self.from + (self.to - self.from) * t
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ramp.rs"]
mod tests;
