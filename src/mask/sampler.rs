use crate::{foundation::core::Stride, mask::buffer::MaskBuffer};

/// Integer mask cell selected as a particle seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridPoint {
    /// Column.
    pub x: u32,
    /// Row, counted top-down.
    pub y: u32,
}

/// Rule deciding whether a mask intensity counts as inside the silhouette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsidePredicate {
    /// Only fully opaque cells (`== 255`).
    #[default]
    Opaque,
    /// Any cell that is not background (`> 0`).
    NonZero,
}

impl InsidePredicate {
    /// Apply the rule to one intensity sample.
    pub fn is_inside(self, intensity: u8) -> bool {
        match self {
            Self::Opaque => intensity == 255,
            Self::NonZero => intensity > 0,
        }
    }
}

/// Collect seed cells from `mask` at the given stride.
///
/// Iteration is column-major: `x` is the outer loop and `y` the inner one. Particle buffers are
/// laid out in this order, so it must not change.
pub fn sample(mask: &MaskBuffer, stride: Stride, predicate: InsidePredicate) -> Vec<GridPoint> {
    let stride = stride.clamped();
    let mut out = Vec::new();
    for x in (0..mask.width()).step_by(stride.x as usize) {
        for y in (0..mask.height()).step_by(stride.y as usize) {
            if predicate.is_inside(mask.intensity(x, y)) {
                out.push(GridPoint { x, y });
            }
        }
    }
    out
}

/// Mapping between mask grid coordinates and normalized mask space.
///
/// Mask space is centered on the mask, spans exactly 1.0 vertically and has `+y` pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskSpace {
    width: f32,
    height: f32,
    position_scale: f32,
}

impl MaskSpace {
    /// Mask space for a `width x height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        let height = height.max(1) as f32;
        Self {
            width: width as f32,
            height,
            position_scale: 1.0 / height,
        }
    }

    /// Mask space matching `mask`.
    pub fn for_mask(mask: &MaskBuffer) -> Self {
        Self::new(mask.width(), mask.height())
    }

    /// Units of mask space per grid cell (`1 / height`).
    pub fn position_scale(&self) -> f32 {
        self.position_scale
    }

    /// Width over height of the grid.
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Grid cell to mask-space coordinates.
    pub fn to_local(&self, gx: f32, gy: f32) -> (f32, f32) {
        (
            (gx - self.width * 0.5) * self.position_scale,
            -(gy - self.height * 0.5) * self.position_scale,
        )
    }

    /// Mask-space coordinates back to (fractional) grid coordinates.
    pub fn to_grid(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x / self.position_scale + self.width * 0.5,
            -y / self.position_scale + self.height * 0.5,
        )
    }

    /// Convert seed cells to mask-space `(x, y)` pairs.
    pub fn seeds_to_local(&self, seeds: &[GridPoint]) -> Vec<(f32, f32)> {
        seeds
            .iter()
            .map(|p| self.to_local(p.x as f32, p.y as f32))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/sampler.rs"]
mod tests;
