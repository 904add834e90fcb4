use crate::{
    animation::ramp::ProgressRamp,
    assets::{
        decode::prepare_image,
        store::{AssetStore, PreparedImage},
    },
    encode::sink::{FrameSink, SinkConfig},
    foundation::core::{Canvas, Fps, FrameIndex},
    foundation::error::{MaskflowError, MaskflowResult},
    mask::{
        buffer::MaskBuffer,
        sampler::{MaskSpace, sample},
    },
    particles::{
        boundary::MaskBoundary,
        field::ParticleField,
        random::{RandomSource, SeededRandom},
    },
    render::{
        compositor::{Compositor, FrameParams},
        frame::FrameRGBA,
    },
    scene::{clock::FrameClock, config::SceneConfig},
};

/// A loaded scene: mask, particle field, compositor and clock.
///
/// Everything long-lived is owned here and built once in [`Scene::load`]. Each
/// [`Scene::tick`] performs exactly one simulation step and one two-pass render.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    mask: MaskBuffer,
    field: ParticleField,
    boundary: MaskBoundary,
    compositor: Compositor,
    clock: FrameClock,
    progress: f32,
}

impl Scene {
    /// Decode the config's images through `assets` and build the scene.
    ///
    /// Randomness comes from the config seed, or OS entropy when no seed is set.
    #[tracing::instrument(skip_all, fields(mask = %config.mask, background = %config.background))]
    pub fn load(config: SceneConfig, assets: &mut AssetStore) -> MaskflowResult<Self> {
        let mut rng = match config.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };
        Self::load_with_random(config, assets, &mut rng)
    }

    /// Same as [`Scene::load`] with an explicit random source.
    pub fn load_with_random(
        config: SceneConfig,
        assets: &mut AssetStore,
        rng: &mut dyn RandomSource,
    ) -> MaskflowResult<Self> {
        config.validate()?;
        let mask_image = assets.load_image(&config.mask)?;
        let mask = MaskBuffer::from_image(&mask_image, config.mask_decode_scale)?;
        let background = prepare_image(&assets.load_image(&config.background)?);
        Self::from_parts(config, mask, &background, rng)
    }

    /// Build a scene from an already decoded mask and background.
    pub fn from_parts(
        config: SceneConfig,
        mask: MaskBuffer,
        background: &PreparedImage,
        rng: &mut dyn RandomSource,
    ) -> MaskflowResult<Self> {
        config.validate()?;
        let field = build_field(&config, &mask, rng)?;
        let compositor = Compositor::new(
            background,
            config.viewport,
            config.palette.clone(),
            config.compositor_settings(),
        )?;
        warn_on_aspect_mismatch(&mask, background);

        tracing::info!(
            particles = field.len(),
            mask_width = mask.width(),
            mask_height = mask.height(),
            "scene ready"
        );
        Ok(Self {
            boundary: MaskBoundary::with_jitter(config.reflection_jitter),
            progress: config.progress,
            clock: FrameClock::new(),
            config,
            mask,
            field,
            compositor,
        })
    }

    /// Swap in a new mask and rebuild the particle field from it.
    pub fn replace_mask(
        &mut self,
        mask: MaskBuffer,
        rng: &mut dyn RandomSource,
    ) -> MaskflowResult<()> {
        self.field = build_field(&self.config, &mask, rng)?;
        self.mask = mask;
        Ok(())
    }

    /// Advance the particle field by one step.
    pub fn step(&mut self) {
        if self.config.parallel {
            self.field.step_parallel(&self.boundary, &self.mask);
        } else {
            self.field.step(&self.boundary, &self.mask);
        }
    }

    /// Render the current state (particle pass, then composite pass) without stepping.
    pub fn render(&mut self) -> MaskflowResult<FrameRGBA> {
        let params = FrameParams {
            progress: self.progress,
            time_secs: self.clock.elapsed_secs() as f32,
        };
        self.compositor.render_particles(&self.field, params)?;
        self.compositor.render_composite(params)
    }

    /// Advance the clock by `dt` seconds, step once and render.
    ///
    /// The step is skipped while progress is 0; the frame is still rendered.
    pub fn tick(&mut self, dt: f64) -> MaskflowResult<FrameRGBA> {
        self.clock.advance(dt);
        if self.progress > 0.0 {
            self.step();
        }
        self.render()
    }

    /// Set the transition scalar. Values are clamped to `[0, 1]`; NaN is rejected.
    pub fn set_progress(&mut self, progress: f32) -> MaskflowResult<()> {
        if progress.is_nan() {
            return Err(MaskflowError::validation("progress must not be NaN"));
        }
        self.progress = progress.clamp(0.0, 1.0);
        Ok(())
    }

    /// Current progress.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Resize the output. Surfaces are re-derived on the next render.
    pub fn set_viewport(&mut self, viewport: Canvas) -> MaskflowResult<()> {
        if viewport == self.compositor.viewport() {
            return Ok(());
        }
        self.compositor.set_viewport(viewport)?;
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "viewport changed"
        );
        Ok(())
    }

    /// Render `frames` consecutive ticks at `fps` into `sink`.
    ///
    /// When `ramp` is set, progress follows it frame by frame; otherwise the current progress
    /// is held.
    #[tracing::instrument(skip(self, sink, ramp))]
    pub fn render_range(
        &mut self,
        frames: u64,
        fps: Fps,
        sink: &mut dyn FrameSink,
        ramp: Option<&ProgressRamp>,
    ) -> MaskflowResult<()> {
        let fps = Fps::new(fps.num, fps.den)?;
        if let Some(ramp) = ramp {
            ramp.validate()?;
        }
        let viewport = self.compositor.viewport();
        sink.begin(SinkConfig {
            width: viewport.width,
            height: viewport.height,
            fps,
        })?;
        for i in 0..frames {
            let idx = FrameIndex(i);
            if let Some(ramp) = ramp {
                self.set_progress(ramp.at(idx))?;
            }
            let frame = self.tick(fps.frame_duration_secs())?;
            sink.push_frame(idx, &frame)?;
        }
        sink.end()
    }

    /// Config the scene was built from.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Sampled mask.
    pub fn mask(&self) -> &MaskBuffer {
        &self.mask
    }

    /// Particle state.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Compositor and its surfaces.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Scene clock.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}

fn build_field(
    config: &SceneConfig,
    mask: &MaskBuffer,
    rng: &mut dyn RandomSource,
) -> MaskflowResult<ParticleField> {
    let space = MaskSpace::for_mask(mask);
    let seeds = space.seeds_to_local(&sample(mask, config.stride, config.inside));
    ParticleField::build(&seeds, space, &config.spawn_params(), rng)
}

fn warn_on_aspect_mismatch(mask: &MaskBuffer, background: &PreparedImage) {
    let ma = f64::from(mask.width()) / f64::from(mask.height().max(1));
    let ba = f64::from(background.width) / f64::from(background.height.max(1));
    if (ma - ba).abs() > 0.01 * ba {
        tracing::warn!(
            mask_aspect = ma,
            background_aspect = ba,
            "mask and background aspect ratios differ; particles will not line up with the photo"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/driver.rs"]
mod tests;
