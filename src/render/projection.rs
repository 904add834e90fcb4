use crate::foundation::core::{Affine, Canvas, Point};

/// Viewport width at or below which points render at the smallest perceptual size.
pub const POINT_SCALE_MIN_WIDTH: f64 = 375.0;
/// Viewport width at or above which points render at the largest perceptual size.
pub const POINT_SCALE_MAX_WIDTH: f64 = 1920.0;

/// Orthographic camera over mask space.
///
/// Mask space is height-normalized with the origin at the center and `+y` up, so the visible
/// region spans `aspect` units horizontally and one unit vertically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoProjection {
    half_width: f64,
    half_height: f64,
}

impl OrthoProjection {
    /// Projection whose view box is `aspect` wide and 1 tall.
    pub fn for_aspect(aspect: f64) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Self {
            half_width: aspect * 0.5,
            half_height: 0.5,
        }
    }

    /// Map a mask-space point onto a surface of `surface` pixels.
    pub fn to_surface(&self, x: f64, y: f64, surface: Canvas) -> Point {
        let w = f64::from(surface.width);
        let h = f64::from(surface.height);
        Point::new(
            (x + self.half_width) / (2.0 * self.half_width) * w,
            (self.half_height - y) / (2.0 * self.half_height) * h,
        )
    }

    /// Surface pixels covered by one mask-space unit along the vertical axis.
    pub fn pixels_per_unit(&self, surface: Canvas) -> f64 {
        f64::from(surface.height) / (2.0 * self.half_height)
    }
}

/// Perceptual point size for a viewport `viewport_width` pixels wide.
///
/// Interpolates a factor from 0.5 (narrow screens) to 1.5 (wide screens), clamped, and
/// multiplies it by `base`.
pub fn point_scale_for_viewport(viewport_width: u32, base: f64) -> f64 {
    let t = (f64::from(viewport_width) - POINT_SCALE_MIN_WIDTH)
        / (POINT_SCALE_MAX_WIDTH - POINT_SCALE_MIN_WIDTH);
    let factor = 0.5 + t.clamp(0.0, 1.0);
    factor * base
}

/// Aspect correction that makes the image quad cover the whole viewport.
///
/// When the viewport is wider than the image, the quad is scaled by `scale` and shifted down
/// by `y_offset` mask units so the bottom edges line up. Otherwise the quad is left at height
/// 1 and its sides overflow the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform quad scale, `>= 1`.
    pub scale: f64,
    /// Downward shift in mask-space units.
    pub y_offset: f64,
}

impl CoverFit {
    /// Fit for a viewport and an image of aspect `image_aspect`.
    pub fn compute(viewport: Canvas, image_aspect: f64) -> Self {
        let va = viewport.aspect();
        if image_aspect.is_finite() && image_aspect > 0.0 && va > image_aspect {
            let scale = va / image_aspect;
            Self {
                scale,
                y_offset: (scale - 1.0) / 2.0,
            }
        } else {
            Self {
                scale: 1.0,
                y_offset: 0.0,
            }
        }
    }

    /// Affine taking image pixels (`image_w × image_h`) to viewport pixels.
    pub fn image_to_viewport(&self, viewport: Canvas, image_w: u32, image_h: u32) -> Affine {
        let vw = f64::from(viewport.width);
        let vh = f64::from(viewport.height);
        let iw = f64::from(image_w.max(1));
        let ih = f64::from(image_h.max(1));
        let k = self.scale * vh / ih;
        let tx = 0.5 * (vw - k * iw);
        let ty = vh * (0.5 - 0.5 * self.scale - self.y_offset);
        Affine::new([k, 0.0, 0.0, k, tx, ty])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/projection.rs"]
mod tests;
