use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::store::{DecodedImage, PreparedImage},
    foundation::error::{MaskflowError, MaskflowResult},
};

/// Decode encoded image bytes into straight-alpha RGBA8.
///
/// Any format the `image` crate recognizes is accepted. Failures surface as
/// [`MaskflowError::Resource`].
pub fn decode_image(bytes: &[u8]) -> MaskflowResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| MaskflowError::resource(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(MaskflowError::resource("decoded image has zero size"));
    }

    Ok(DecodedImage {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

/// Convert a decoded image into premultiplied RGBA8 for compositing.
pub fn prepare_image(decoded: &DecodedImage) -> PreparedImage {
    let mut rgba8_premul = decoded.rgba8.as_ref().clone();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage {
        width: decoded.width,
        height: decoded.height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

/// Resize a decoded image by `scale` (per axis, rounded, at least 1px) with bilinear filtering.
///
/// `scale == 1.0` returns the original pixels untouched.
pub fn resize_image(decoded: &DecodedImage, scale: f64) -> MaskflowResult<DecodedImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(MaskflowError::validation(
            "image resize scale must be finite and > 0",
        ));
    }
    if scale == 1.0 {
        return Ok(decoded.clone());
    }

    let w = ((f64::from(decoded.width) * scale).round() as u32).max(1);
    let h = ((f64::from(decoded.height) * scale).round() as u32).max(1);
    let src = image::RgbaImage::from_raw(
        decoded.width,
        decoded.height,
        decoded.rgba8.as_ref().clone(),
    )
    .ok_or_else(|| MaskflowError::resource("decoded image byte length mismatch"))?;
    let resized = image::imageops::resize(&src, w, h, image::imageops::FilterType::Triangle);

    Ok(DecodedImage {
        width: w,
        height: h,
        rgba8: Arc::new(resized.into_raw()),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
