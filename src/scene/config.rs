use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::core::{Canvas, Fps, Stride},
    foundation::error::{MaskflowError, MaskflowResult},
    mask::sampler::InsidePredicate,
    particles::field::{SpawnParams, SpawnRanges},
    render::{
        compositor::{CompositeBlend, CompositorSettings, MAX_SUPERSAMPLE},
        palette::Palette,
        sprite::SpriteShape,
    },
};

/// Named bundles of spawn ranges matching the two demo looks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPreset {
    /// Deep layering, strong opacity.
    #[default]
    Standard,
    /// Shallow layering, faint particles.
    Soft,
}

impl VariantPreset {
    /// Spawn ranges of this variant.
    pub fn spawn_ranges(self) -> SpawnRanges {
        match self {
            Self::Standard => SpawnRanges::standard(),
            Self::Soft => SpawnRanges::soft(),
        }
    }
}

/// Write-once description of a scene, loaded from JSON.
///
/// Every field except the two image paths has a default, so a minimal config is
/// `{"mask": "mask.png", "background": "photo.jpg"}`. Image paths are relative to the asset
/// root the scene is loaded with.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Mask image path.
    pub mask: String,
    /// Background photo path.
    pub background: String,
    /// Preset the spawn ranges default to.
    pub variant: VariantPreset,
    /// Explicit spawn ranges; overrides `variant` when set.
    pub spawn: Option<SpawnRanges>,
    /// Factor the mask image is resized by before sampling.
    pub mask_decode_scale: f64,
    /// Sampling stride over the mask grid.
    pub stride: Stride,
    /// Which mask intensities count as inside.
    pub inside: InsidePredicate,
    /// Base particle speed in mask units per step.
    pub speed_scale: f32,
    /// Base sprite size in image pixels.
    pub point_scale: f64,
    /// Off-screen supersampling factor, `1..=4`.
    pub supersample: u32,
    /// Fraction of π added at random to each reflection; 0 is a pure flip.
    pub reflection_jitter: f32,
    /// Particle colors.
    pub palette: Palette,
    /// Particle sprite.
    pub sprite: SpriteShape,
    /// Blend of the particle layer over the photo.
    pub blend: CompositeBlend,
    /// Shimmer depth in `[0, 1]`.
    pub shimmer: f32,
    /// Output clear color, straight RGB.
    pub clear_rgb: [u8; 3],
    /// Seed for spawning and reflection jitter; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Output size.
    pub viewport: Canvas,
    /// Frame rate used by range renders.
    pub fps: Fps,
    /// Progress at load time.
    pub progress: f32,
    /// Step particles on the rayon pool.
    pub parallel: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mask: String::new(),
            background: String::new(),
            variant: VariantPreset::Standard,
            spawn: None,
            mask_decode_scale: 100.0 / 1920.0,
            stride: Stride::default(),
            inside: InsidePredicate::Opaque,
            speed_scale: 0.0006,
            point_scale: 3.0,
            supersample: 1,
            reflection_jitter: 0.0,
            palette: Palette::default(),
            sprite: SpriteShape::Triangle,
            blend: CompositeBlend::Over,
            shimmer: 0.0,
            clear_rgb: [0, 0, 0],
            seed: None,
            viewport: Canvas {
                width: 1280,
                height: 720,
            },
            fps: Fps { num: 30, den: 1 },
            progress: 1.0,
            parallel: true,
        }
    }
}

impl SceneConfig {
    /// Config for `mask` over `background` with every other field defaulted.
    pub fn new(mask: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            mask: mask.into(),
            background: background.into(),
            ..Self::default()
        }
    }

    /// Parse a config from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> MaskflowResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MaskflowError::validation(format!("parse scene config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MaskflowResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MaskflowError::validation(format!("open scene config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> MaskflowResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MaskflowError::validation(format!("serialize scene config: {e}")))
    }

    /// Effective spawn ranges.
    pub fn spawn_ranges(&self) -> SpawnRanges {
        self.spawn.unwrap_or_else(|| self.variant.spawn_ranges())
    }

    /// Particle spawn inputs derived from this config.
    pub fn spawn_params(&self) -> SpawnParams {
        SpawnParams {
            speed_scale: self.speed_scale,
            palette_size: self.palette.len(),
            ranges: self.spawn_ranges(),
            jitter_seed: self.seed.unwrap_or(0),
        }
    }

    /// Compositor settings derived from this config.
    pub fn compositor_settings(&self) -> CompositorSettings {
        CompositorSettings {
            supersample: self.supersample,
            point_scale: self.point_scale,
            sprite: self.sprite,
            blend: self.blend,
            clear_rgb: self.clear_rgb,
            shimmer: self.shimmer,
        }
    }

    /// Check every field; returns the first problem found.
    pub fn validate(&self) -> MaskflowResult<()> {
        if self.mask.trim().is_empty() {
            return Err(MaskflowError::validation("mask path must not be empty"));
        }
        if self.background.trim().is_empty() {
            return Err(MaskflowError::validation("background path must not be empty"));
        }
        if !self.mask_decode_scale.is_finite() || self.mask_decode_scale <= 0.0 {
            return Err(MaskflowError::validation(
                "mask_decode_scale must be finite and > 0",
            ));
        }
        Stride::new(self.stride.x, self.stride.y)?;
        if !self.speed_scale.is_finite() || self.speed_scale < 0.0 {
            return Err(MaskflowError::validation(
                "speed_scale must be finite and >= 0",
            ));
        }
        if !(1..=MAX_SUPERSAMPLE).contains(&self.supersample) {
            return Err(MaskflowError::validation(format!(
                "supersample must be in 1..={MAX_SUPERSAMPLE}, got {}",
                self.supersample
            )));
        }
        if !self.reflection_jitter.is_finite() || self.reflection_jitter < 0.0 {
            return Err(MaskflowError::validation(
                "reflection_jitter must be finite and >= 0",
            ));
        }
        if !self.progress.is_finite() || !(0.0..=1.0).contains(&self.progress) {
            return Err(MaskflowError::validation("progress must be in [0, 1]"));
        }
        Canvas::new(self.viewport.width, self.viewport.height)?;
        Fps::new(self.fps.num, self.fps.den)?;
        self.palette.validate()?;
        self.spawn_ranges().validate()?;
        self.compositor_settings().validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
