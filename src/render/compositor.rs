use std::sync::Arc;

use crate::{
    assets::store::PreparedImage,
    foundation::core::{Affine, BezPath, Canvas},
    foundation::error::{MaskflowError, MaskflowResult},
    foundation::math::{lerp, mul_div255_u8},
    particles::field::ParticleField,
    render::{
        frame::FrameRGBA,
        palette::Palette,
        projection::{CoverFit, OrthoProjection, point_scale_for_viewport},
        sprite::{SpriteShape, shimmer},
    },
};

/// Largest supported supersampling factor for the particle pass.
pub const MAX_SUPERSAMPLE: u32 = 4;

/// How the particle layer is combined with the background in the composite pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeBlend {
    /// Source-over.
    #[default]
    Over,
    /// Additive (`plus`) compositing; particles brighten the photo.
    Add,
}

impl CompositeBlend {
    fn to_cpu(self) -> vello_cpu::peniko::BlendMode {
        use vello_cpu::peniko::{BlendMode, Compose, Mix};
        match self {
            Self::Over => BlendMode::default(),
            Self::Add => BlendMode::new(Mix::Normal, Compose::Plus),
        }
    }
}

/// Fixed settings of a [`Compositor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositorSettings {
    /// Off-screen resolution multiplier in `1..=4`.
    pub supersample: u32,
    /// Base sprite size in image pixels before the viewport and depth factors.
    pub point_scale: f64,
    /// Sprite outline.
    pub sprite: SpriteShape,
    /// Blend used for the particle layer.
    pub blend: CompositeBlend,
    /// Straight RGB the output is cleared to before the background is drawn.
    pub clear_rgb: [u8; 3],
    /// Shimmer depth in `[0, 1]`; 0 disables it.
    pub shimmer: f32,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            supersample: 1,
            point_scale: 3.0,
            sprite: SpriteShape::Triangle,
            blend: CompositeBlend::Over,
            clear_rgb: [0, 0, 0],
            shimmer: 0.0,
        }
    }
}

impl CompositorSettings {
    pub(crate) fn validate(&self) -> MaskflowResult<()> {
        validate_supersample(self.supersample)?;
        if !self.point_scale.is_finite() || self.point_scale < 0.0 {
            return Err(MaskflowError::validation(
                "point_scale must be finite and >= 0",
            ));
        }
        if !self.shimmer.is_finite() || !(0.0..=1.0).contains(&self.shimmer) {
            return Err(MaskflowError::validation("shimmer must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Per-frame inputs shared by both passes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameParams {
    /// Transition scalar; clamped to `[0, 1]`.
    pub progress: f32,
    /// Scene time in seconds, drives the shimmer.
    pub time_secs: f32,
}

struct Surface {
    canvas: Canvas,
    pixmap: vello_cpu::Pixmap,
}

/// Two-pass CPU compositor.
///
/// Pass 1 ([`Compositor::render_particles`]) draws the particle field into an off-screen
/// surface sized to the background image times the supersampling factor. Pass 2
/// ([`Compositor::render_composite`]) draws the background photo with a cover fit over the
/// viewport and lays the off-screen surface over it.
pub struct Compositor {
    settings: CompositorSettings,
    palette: Palette,
    background: vello_cpu::Image,
    image: Canvas,
    viewport: Canvas,
    offscreen: Option<Surface>,
    output: Option<Surface>,
    ctx: Option<vello_cpu::RenderContext>,
    surface_allocations: u64,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("settings", &self.settings)
            .field("image", &self.image)
            .field("viewport", &self.viewport)
            .field("surface_allocations", &self.surface_allocations)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Create a compositor for `background` shown in `viewport`.
    pub fn new(
        background: &PreparedImage,
        viewport: Canvas,
        palette: Palette,
        settings: CompositorSettings,
    ) -> MaskflowResult<Self> {
        settings.validate()?;
        palette.validate()?;
        let image = Canvas::new(background.width, background.height)?;
        let viewport = Canvas::new(viewport.width, viewport.height)?;
        let background = rgba_premul_to_image(
            &background.rgba8_premul,
            background.width,
            background.height,
        )?;
        Ok(Self {
            settings,
            palette,
            background,
            image,
            viewport,
            offscreen: None,
            output: None,
            ctx: None,
            surface_allocations: 0,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// Palette used by the particle pass.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Current viewport.
    pub fn viewport(&self) -> Canvas {
        self.viewport
    }

    /// Change the viewport. Surfaces are re-derived on the next pass.
    pub fn set_viewport(&mut self, viewport: Canvas) -> MaskflowResult<()> {
        self.viewport = Canvas::new(viewport.width, viewport.height)?;
        Ok(())
    }

    /// Change the supersampling factor. Surfaces are re-derived on the next pass.
    pub fn set_supersample(&mut self, supersample: u32) -> MaskflowResult<()> {
        validate_supersample(supersample)?;
        self.settings.supersample = supersample;
        Ok(())
    }

    /// Size the off-screen surface must have for the current image and supersampling.
    pub fn offscreen_size(&self) -> Canvas {
        let ss = self.settings.supersample;
        Canvas {
            width: self.image.width.saturating_mul(ss),
            height: self.image.height.saturating_mul(ss),
        }
    }

    /// Number of surfaces allocated so far. Stays flat while sizes are unchanged.
    pub fn surface_allocations(&self) -> u64 {
        self.surface_allocations
    }

    /// Premultiplied RGBA8 bytes of the off-screen surface after the last particle pass.
    pub fn particle_layer(&self) -> Option<&[u8]> {
        self.offscreen.as_ref().map(|s| s.pixmap.data_as_u8_slice())
    }

    /// Allocate the off-screen and output surfaces if missing or mis-sized.
    pub fn ensure_surfaces(&mut self) -> MaskflowResult<()> {
        let offscreen = self.offscreen_size();
        let viewport = self.viewport;
        if ensure_surface(&mut self.offscreen, offscreen)? {
            self.surface_allocations += 1;
            tracing::debug!(
                width = offscreen.width,
                height = offscreen.height,
                "allocated offscreen surface"
            );
        }
        if ensure_surface(&mut self.output, viewport)? {
            self.surface_allocations += 1;
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "allocated output surface"
            );
        }
        Ok(())
    }

    /// Pass 1: draw `field` into the off-screen surface.
    ///
    /// The surface is cleared to transparent first. Nothing is drawn when progress is 0 or the
    /// field is empty.
    #[tracing::instrument(skip_all, fields(particles = field.len()))]
    pub fn render_particles(
        &mut self,
        field: &ParticleField,
        params: FrameParams,
    ) -> MaskflowResult<()> {
        self.ensure_surfaces()?;
        let viewport_width = self.viewport.width;
        let settings = self.settings;
        let palette = &self.palette;
        let off = self
            .offscreen
            .as_mut()
            .ok_or_else(|| MaskflowError::render("offscreen surface missing"))?;
        clear_pixmap_to_transparent(&mut off.pixmap);

        let progress = params.progress.clamp(0.0, 1.0);
        if progress <= 0.0 || field.is_empty() {
            return Ok(());
        }

        let canvas = off.canvas;
        let proj = OrthoProjection::for_aspect(canvas.aspect());
        let base_size = point_scale_for_viewport(viewport_width, settings.point_scale)
            * f64::from(settings.supersample);
        let (w, h) = canvas_dims_u16(canvas)?;
        let pos = field.positions();
        let start = field.start_positions();
        let headings = field.headings();
        let alphas = field.alphas();
        let phases = field.phases();
        let colors = field.color_indices();

        let drawn = with_ctx(&mut self.ctx, w, h, |ctx| {
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

            let mut drawn = 0usize;
            for i in 0..field.len() {
                let a = alphas[i]
                    * progress
                    * shimmer(params.time_secs, phases[i], settings.shimmer);
                let a8 = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
                if a8 == 0 {
                    continue;
                }
                let x = lerp(start[i * 3], pos[i * 3], progress);
                let y = lerp(start[i * 3 + 1], pos[i * 3 + 1], progress);
                let z = pos[i * 3 + 2];
                let center = proj.to_surface(f64::from(x), f64::from(y), canvas);
                let path = settings.sprite.path(
                    center,
                    base_size * f64::from(z),
                    f64::from(headings[i]),
                );

                let [r, g, b] = palette.color(colors[i]);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a8));
                ctx.fill_path(&bezpath_to_cpu(&path));
                drawn += 1;
            }

            ctx.flush();
            ctx.render_to_pixmap(&mut off.pixmap);
            Ok(drawn)
        })?;

        tracing::debug!(drawn, "particle pass");
        Ok(())
    }

    /// Pass 2: background photo plus the particle layer, at viewport size.
    #[tracing::instrument(skip_all)]
    pub fn render_composite(&mut self, params: FrameParams) -> MaskflowResult<FrameRGBA> {
        self.ensure_surfaces()?;
        let progress = params.progress.clamp(0.0, 1.0);
        let ss = f64::from(self.settings.supersample);
        let image = self.image;
        let viewport = self.viewport;
        let blend = self.settings.blend;
        let [cr, cg, cb] = self.settings.clear_rgb;

        let overlay = match &self.offscreen {
            Some(off) if progress > 0.0 => Some((scaled_layer_image(off, progress)?, off.canvas)),
            _ => None,
        };

        let to_viewport = CoverFit::compute(viewport, image.aspect()).image_to_viewport(
            viewport,
            image.width,
            image.height,
        );
        let background = self.background.clone();
        let out = self
            .output
            .as_mut()
            .ok_or_else(|| MaskflowError::render("output surface missing"))?;
        clear_pixmap(&mut out.pixmap, [cr, cg, cb, 255]);
        let (w, h) = canvas_dims_u16(out.canvas)?;

        with_ctx(&mut self.ctx, w, h, |ctx| {
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(cr, cg, cb, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(w),
                f64::from(h),
            ));

            ctx.set_transform(affine_to_cpu(to_viewport));
            ctx.set_paint(background);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(image.width),
                f64::from(image.height),
            ));

            if let Some((layer, size)) = overlay {
                ctx.set_transform(affine_to_cpu(to_viewport * Affine::scale(1.0 / ss)));
                ctx.set_paint(layer);
                ctx.set_blend_mode(blend.to_cpu());
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(size.width),
                    f64::from(size.height),
                ));
                ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            }

            ctx.flush();
            ctx.render_to_pixmap(&mut out.pixmap);
            Ok(())
        })?;

        Ok(FrameRGBA {
            width: out.canvas.width,
            height: out.canvas.height,
            data: out.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn validate_supersample(ss: u32) -> MaskflowResult<()> {
    if !(1..=MAX_SUPERSAMPLE).contains(&ss) {
        return Err(MaskflowError::validation(format!(
            "supersample must be in 1..={MAX_SUPERSAMPLE}, got {ss}"
        )));
    }
    Ok(())
}

/// Returns `true` when a new surface was allocated.
fn ensure_surface(slot: &mut Option<Surface>, canvas: Canvas) -> MaskflowResult<bool> {
    if slot.as_ref().is_some_and(|s| s.canvas == canvas) {
        return Ok(false);
    }
    let (w, h) = canvas_dims_u16(canvas)?;
    *slot = Some(Surface {
        canvas,
        pixmap: vello_cpu::Pixmap::new(w, h),
    });
    Ok(true)
}

fn with_ctx<R>(
    slot: &mut Option<vello_cpu::RenderContext>,
    width: u16,
    height: u16,
    f: impl FnOnce(&mut vello_cpu::RenderContext) -> MaskflowResult<R>,
) -> MaskflowResult<R> {
    let mut ctx = match slot.take() {
        Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
        _ => vello_cpu::RenderContext::new(width, height),
    };
    ctx.reset();
    let out = f(&mut ctx)?;
    *slot = Some(ctx);
    Ok(out)
}

fn canvas_dims_u16(canvas: Canvas) -> MaskflowResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| MaskflowError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| MaskflowError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(MaskflowError::render("surface must be non-empty"));
    }
    Ok((w, h))
}

/// The off-screen layer as an image paint with every channel scaled by `opacity`.
fn scaled_layer_image(off: &Surface, opacity: f32) -> MaskflowResult<vello_cpu::Image> {
    let mut bytes = off.pixmap.data_as_u8_slice().to_vec();
    if opacity < 1.0 {
        let k = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
        for b in &mut bytes {
            *b = mul_div255_u8(u16::from(*b), k);
        }
    }
    rgba_premul_to_image(&bytes, off.canvas.width, off.canvas.height)
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MaskflowResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_dims_u16(Canvas { width, height })?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MaskflowError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> MaskflowResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
