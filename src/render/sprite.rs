use std::f64::consts::TAU;

use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Point};

/// Radians per second of the shimmer oscillation.
pub const SHIMMER_RATE: f32 = 2.0;

/// Shape drawn for every particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteShape {
    /// Equilateral triangle pointing along the particle heading.
    #[default]
    Triangle,
    /// Filled circle; heading has no visible effect.
    Disc,
}

impl SpriteShape {
    /// Outline of a sprite `size` pixels across centered on `center`.
    ///
    /// `heading` is in mask space (counter-clockwise, `+y` up); surfaces have `+y` down, so the
    /// rotation is mirrored here.
    pub fn path(self, center: Point, size: f64, heading: f64) -> BezPath {
        let r = (size * 0.5).max(0.0);
        match self {
            Self::Triangle => {
                let mut p = BezPath::new();
                for k in 0..3 {
                    let a = -heading + f64::from(k) * TAU / 3.0;
                    let v = Point::new(center.x + r * a.cos(), center.y + r * a.sin());
                    if k == 0 {
                        p.move_to(v);
                    } else {
                        p.line_to(v);
                    }
                }
                p.close_path();
                p
            }
            Self::Disc => kurbo::Circle::new(center, r).to_path(0.1),
        }
    }
}

/// Opacity multiplier in `[1 - amount, 1]` oscillating with time and a per-particle phase.
pub fn shimmer(time_secs: f32, phase: f32, amount: f32) -> f32 {
    let amount = amount.clamp(0.0, 1.0);
    let wave = 0.5 + 0.5 * (time_secs * SHIMMER_RATE + phase).sin();
    1.0 - amount * (1.0 - wave)
}

#[cfg(test)]
#[path = "../../tests/unit/render/sprite.rs"]
mod tests;
