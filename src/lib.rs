//! Maskflow renders particle fields confined to the silhouette of a mask image.
//!
//! A grayscale mask is sampled into seed positions, each seed spawns one particle, and every
//! frame the particles drift along their headings, reflecting off the mask edge. Frames are
//! produced by two CPU passes: the particles are drawn into an off-screen surface, which is then
//! composited over a background photo.
//!
//! - Describe a scene with a [`SceneConfig`]
//! - Load it into a [`Scene`] through an [`AssetStore`]
//! - Call [`Scene::tick`] per frame, or stream a range into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod encode;
mod foundation;
mod mask;
mod particles;
mod render;
mod scene;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Fps, FrameIndex, Point, Stride, Vec2};
pub use crate::foundation::error::{MaskflowError, MaskflowResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::ramp::ProgressRamp;
pub use crate::assets::decode::{decode_image, prepare_image, resize_image};
pub use crate::assets::store::{
    AssetId, AssetStore, DecodedImage, PreparedImage, normalize_rel_path,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::mask::buffer::MaskBuffer;
pub use crate::mask::sampler::{GridPoint, InsidePredicate, MaskSpace, sample};
pub use crate::particles::boundary::{BoundaryPolicy, MaskBoundary};
pub use crate::particles::field::{ParticleField, ParticleView, SpawnParams, SpawnRanges};
pub use crate::particles::random::{RandomSource, SeededRandom};
pub use crate::render::compositor::{
    CompositeBlend, Compositor, CompositorSettings, FrameParams, MAX_SUPERSAMPLE,
};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::palette::Palette;
pub use crate::render::projection::{CoverFit, OrthoProjection, point_scale_for_viewport};
pub use crate::render::sprite::{SpriteShape, shimmer};
pub use crate::scene::clock::FrameClock;
pub use crate::scene::config::{SceneConfig, VariantPreset};
pub use crate::scene::driver::Scene;
