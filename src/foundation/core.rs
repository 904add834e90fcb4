use crate::foundation::error::{MaskflowError, MaskflowResult};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Absolute 0-based frame index in a rendered sequence.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MaskflowResult<Self> {
        if den == 0 {
            return Err(MaskflowError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MaskflowError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }
}

/// Pixel dimensions of a viewport or surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated, non-empty canvas.
    pub fn new(width: u32, height: u32) -> MaskflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(MaskflowError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Horizontal/vertical grid step used when sampling a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Stride {
    /// Column step, `>= 1`.
    pub x: u32,
    /// Row step, `>= 1`.
    pub y: u32,
}

impl Stride {
    /// Create a validated stride; both steps must be at least 1.
    pub fn new(x: u32, y: u32) -> MaskflowResult<Self> {
        if x == 0 || y == 0 {
            return Err(MaskflowError::validation(format!(
                "sample stride must be >= 1 on both axes, got ({x}, {y})"
            )));
        }
        Ok(Self { x, y })
    }

    /// Raise both steps to at least 1.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(1),
            y: self.y.max(1),
        }
    }
}

impl Default for Stride {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
