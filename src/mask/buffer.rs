use crate::{
    assets::{decode::resize_image, store::DecodedImage},
    foundation::error::{MaskflowError, MaskflowResult},
};

/// Single-channel mask raster.
///
/// Only the first channel of the source image is kept; intensity 0 is background and 255 is
/// fully inside. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskBuffer {
    width: u32,
    height: u32,
    intensity: Vec<u8>,
}

impl MaskBuffer {
    /// Build a mask from row-major per-pixel intensities.
    pub fn from_luma(width: u32, height: u32, intensity: Vec<u8>) -> MaskflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(MaskflowError::validation(format!(
                "mask must be non-empty, got {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize);
        if intensity.len() != expected {
            return Err(MaskflowError::validation(format!(
                "mask intensity length {} does not match {width}x{height}",
                intensity.len()
            )));
        }
        Ok(Self {
            width,
            height,
            intensity,
        })
    }

    /// Build a mask from a decoded image scaled by `decode_scale`, keeping the red channel.
    pub fn from_image(image: &DecodedImage, decode_scale: f64) -> MaskflowResult<Self> {
        let scaled = resize_image(image, decode_scale)?;
        let intensity = scaled.rgba8.chunks_exact(4).map(|px| px[0]).collect();
        Self::from_luma(scaled.width, scaled.height, intensity)
    }

    /// Width in mask pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in mask pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Intensity at integer cell `(x, y)`, or `None` outside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.intensity
            .get((y as usize) * (self.width as usize) + (x as usize))
            .copied()
    }

    /// Intensity at integer cell `(x, y)`; out-of-range cells read as background.
    pub fn intensity(&self, x: u32, y: u32) -> u8 {
        self.get(x, y).unwrap_or(0)
    }

    /// Raw row-major intensities.
    pub fn as_slice(&self) -> &[u8] {
        &self.intensity
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/buffer.rs"]
mod tests;
