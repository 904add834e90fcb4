use std::f32::consts::PI;

use crate::{foundation::math::wrap_angle, mask::buffer::MaskBuffer};

/// Decides how particles interact with the mask silhouette.
///
/// Implementations must be pure: the answer may depend only on the arguments, because
/// [`ParticleField::step_parallel`](crate::ParticleField::step_parallel) calls them from many
/// threads at once.
pub trait BoundaryPolicy: Sync {
    /// Return `true` when grid position `(gx, gy)` is outside the silhouette.
    fn is_blocked(&self, mask: &MaskBuffer, gx: f32, gy: f32) -> bool;

    /// New heading for a blocked particle. `jitter_sample` is uniform in `[0, 1)`.
    fn reflect(&self, heading: f32, jitter_sample: f32) -> f32;
}

/// Reflect off the mask edge and the raster border.
///
/// A cell is blocked when it lies on or past the raster border or its mask intensity is 0.
/// Reflection turns the heading by `π · (1 + jitter · u)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaskBoundary {
    /// Extra fraction of π added to each reflection, scaled by a per-step random sample.
    pub jitter: f32,
}

impl MaskBoundary {
    /// Exact π reflection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reflection with `jitter` (clamped to be non-negative).
    pub fn with_jitter(jitter: f32) -> Self {
        Self {
            jitter: jitter.max(0.0),
        }
    }
}

impl BoundaryPolicy for MaskBoundary {
    fn is_blocked(&self, mask: &MaskBuffer, gx: f32, gy: f32) -> bool {
        let w = mask.width() as f32;
        let h = mask.height() as f32;
        // NaN fails every comparison below, so treat it as outside explicitly.
        if !(gx > 0.0 && gx < w && gy > 0.0 && gy < h) {
            return true;
        }
        mask.intensity(gx.floor() as u32, gy.floor() as u32) == 0
    }

    fn reflect(&self, heading: f32, jitter_sample: f32) -> f32 {
        wrap_angle(heading + PI * (1.0 + self.jitter * jitter_sample))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/boundary.rs"]
mod tests;
