use std::f32::consts::TAU;

use rayon::prelude::*;

use crate::{
    foundation::error::{MaskflowError, MaskflowResult},
    foundation::math::{mix64, unit_from_bits},
    mask::{buffer::MaskBuffer, sampler::MaskSpace},
    particles::{boundary::BoundaryPolicy, random::RandomSource},
};

/// Ranges the per-particle write-once attributes are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpawnRanges {
    /// `[min, max)` of the fixed z depth.
    pub depth: [f32; 2],
    /// `[min, max)` of the static opacity.
    pub alpha: [f32; 2],
    /// Radius (mask-space units) of the disc start positions are scattered in.
    pub scatter_radius: f32,
}

impl SpawnRanges {
    /// Ranges of the standard demo: deep layering and strong opacity.
    pub fn standard() -> Self {
        Self {
            depth: [0.7, 1.2],
            alpha: [0.4, 1.0],
            scatter_radius: 0.5,
        }
    }

    /// Ranges of the soft demo variant: shallower depth and fainter particles.
    pub fn soft() -> Self {
        Self {
            depth: [0.4, 1.0],
            alpha: [0.1, 0.8],
            scatter_radius: 0.5,
        }
    }

    pub(crate) fn validate(&self) -> MaskflowResult<()> {
        let [d0, d1] = self.depth;
        if !(d0.is_finite() && d1.is_finite() && d0 > 0.0 && d0 <= d1) {
            return Err(MaskflowError::validation(
                "depth range must be finite with 0 < min <= max",
            ));
        }
        let [a0, a1] = self.alpha;
        if !(a0.is_finite() && a1.is_finite() && 0.0 <= a0 && a0 <= a1 && a1 <= 1.0) {
            return Err(MaskflowError::validation(
                "alpha range must satisfy 0 <= min <= max <= 1",
            ));
        }
        if !self.scatter_radius.is_finite() || self.scatter_radius < 0.0 {
            return Err(MaskflowError::validation(
                "scatter_radius must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self::standard()
    }
}

/// Inputs to [`ParticleField::build`] besides the seeds and randomness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnParams {
    /// Base speed in mask-space units per step; each particle moves at `[1, 1.5)` times this.
    pub speed_scale: f32,
    /// Number of palette entries color indices are drawn from.
    pub palette_size: usize,
    /// Attribute ranges.
    pub ranges: SpawnRanges,
    /// Salt for the per-step reflection jitter stream.
    pub jitter_seed: u64,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            speed_scale: 0.0006,
            palette_size: 2,
            ranges: SpawnRanges::standard(),
            jitter_seed: 0,
        }
    }
}

/// Read-only snapshot of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
    /// Current `(x, y, z)`.
    pub position: [f32; 3],
    /// Dispersed `(x, y, z)` the progress transition starts from.
    pub start_position: [f32; 3],
    /// Heading in radians.
    pub heading: f32,
    /// Constant speed.
    pub speed: f32,
    /// Static opacity.
    pub alpha: f32,
    /// Shimmer phase in radians.
    pub phase: f32,
    /// Palette slot.
    pub color_index: u8,
}

/// Particle state in structure-of-arrays layout.
///
/// Positions are interleaved `x, y, z` triples. Only positions and headings change after
/// [`ParticleField::build`]; the particle count never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    space: MaskSpace,
    position: Vec<f32>,
    start_position: Vec<f32>,
    heading: Vec<f32>,
    speed: Vec<f32>,
    alpha: Vec<f32>,
    phase: Vec<f32>,
    color_index: Vec<u8>,
    steps: u64,
    jitter_seed: u64,
}

impl ParticleField {
    /// A field with no particles.
    pub fn empty(space: MaskSpace) -> Self {
        Self {
            space,
            position: Vec::new(),
            start_position: Vec::new(),
            heading: Vec::new(),
            speed: Vec::new(),
            alpha: Vec::new(),
            phase: Vec::new(),
            color_index: Vec::new(),
            steps: 0,
            jitter_seed: 0,
        }
    }

    /// Spawn one particle per seed position, in seed order.
    ///
    /// `seeds` are mask-space `(x, y)` pairs. Every random draw goes through `rng`, so equal
    /// seeds, params and random streams produce identical fields.
    #[tracing::instrument(skip_all, fields(seeds = seeds.len()))]
    pub fn build(
        seeds: &[(f32, f32)],
        space: MaskSpace,
        params: &SpawnParams,
        rng: &mut dyn RandomSource,
    ) -> MaskflowResult<Self> {
        if !params.speed_scale.is_finite() || params.speed_scale < 0.0 {
            return Err(MaskflowError::validation(
                "speed_scale must be finite and >= 0",
            ));
        }
        if params.palette_size == 0 || params.palette_size > usize::from(u8::MAX) + 1 {
            return Err(MaskflowError::validation(
                "palette_size must be in 1..=256",
            ));
        }
        params.ranges.validate()?;

        let n = seeds.len();
        let mut out = Self::empty(space);
        out.jitter_seed = params.jitter_seed;
        out.position.reserve_exact(n * 3);
        out.start_position.reserve_exact(n * 3);
        out.heading.reserve_exact(n);
        out.speed.reserve_exact(n);
        out.alpha.reserve_exact(n);
        out.phase.reserve_exact(n);
        out.color_index.reserve_exact(n);

        let SpawnRanges {
            depth,
            alpha,
            scatter_radius,
        } = params.ranges;
        for &(x, y) in seeds {
            let z = rng.uniform(depth[0], depth[1]);
            out.position.extend_from_slice(&[x, y, z]);
            out.alpha.push(rng.uniform(alpha[0], alpha[1]));
            out.color_index
                .push(rng.uniform_index(params.palette_size) as u8);
            out.heading.push(rng.uniform(0.0, TAU));
            out.speed
                .push(rng.next_unit() * params.speed_scale * 0.5 + params.speed_scale);
            out.phase.push(rng.uniform(0.0, TAU));

            let theta = rng.uniform(0.0, TAU);
            let r = scatter_radius * rng.next_unit().sqrt();
            out.start_position
                .extend_from_slice(&[x + r * theta.cos(), y + r * theta.sin(), z]);
        }

        tracing::debug!(particles = n, "built particle field");
        Ok(out)
    }

    /// Advance every particle by one step.
    pub fn step(&mut self, policy: &dyn BoundaryPolicy, mask: &MaskBuffer) {
        let ctx = StepCtx {
            space: self.space,
            steps: self.steps,
            jitter_seed: self.jitter_seed,
        };
        for (i, ((pos, heading), &speed)) in self
            .position
            .chunks_exact_mut(3)
            .zip(self.heading.iter_mut())
            .zip(self.speed.iter())
            .enumerate()
        {
            advance(&ctx, i, pos, heading, speed, policy, mask);
        }
        self.steps = self.steps.wrapping_add(1);
    }

    /// Same as [`ParticleField::step`], spread across the rayon thread pool.
    ///
    /// Each particle reads only its own slot and the shared mask, so the result is bit-identical
    /// to the serial step.
    pub fn step_parallel(&mut self, policy: &dyn BoundaryPolicy, mask: &MaskBuffer) {
        let ctx = StepCtx {
            space: self.space,
            steps: self.steps,
            jitter_seed: self.jitter_seed,
        };
        self.position
            .par_chunks_exact_mut(3)
            .zip(self.heading.par_iter_mut())
            .zip(self.speed.par_iter())
            .enumerate()
            .for_each(|(i, ((pos, heading), &speed))| {
                advance(&ctx, i, pos, heading, speed, policy, mask);
            });
        self.steps = self.steps.wrapping_add(1);
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.heading.len()
    }

    /// Return `true` when the field has no particles.
    pub fn is_empty(&self) -> bool {
        self.heading.is_empty()
    }

    /// Number of steps taken since construction.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Mask space the field lives in.
    pub fn space(&self) -> MaskSpace {
        self.space
    }

    /// Snapshot of particle `i`.
    pub fn particle(&self, i: usize) -> Option<ParticleView> {
        if i >= self.len() {
            return None;
        }
        let p = &self.position[i * 3..i * 3 + 3];
        let s = &self.start_position[i * 3..i * 3 + 3];
        Some(ParticleView {
            position: [p[0], p[1], p[2]],
            start_position: [s[0], s[1], s[2]],
            heading: self.heading[i],
            speed: self.speed[i],
            alpha: self.alpha[i],
            phase: self.phase[i],
            color_index: self.color_index[i],
        })
    }

    /// Interleaved `x, y, z` positions.
    pub fn positions(&self) -> &[f32] {
        &self.position
    }

    /// Interleaved `x, y, z` start positions.
    pub fn start_positions(&self) -> &[f32] {
        &self.start_position
    }

    /// Headings in radians.
    pub fn headings(&self) -> &[f32] {
        &self.heading
    }

    /// Speeds.
    pub fn speeds(&self) -> &[f32] {
        &self.speed
    }

    /// Static opacities.
    pub fn alphas(&self) -> &[f32] {
        &self.alpha
    }

    /// Shimmer phases.
    pub fn phases(&self) -> &[f32] {
        &self.phase
    }

    /// Palette slots.
    pub fn color_indices(&self) -> &[u8] {
        &self.color_index
    }

    /// Overwrite the position and heading of particle `i`.
    ///
    /// Hosts use this to pin a particle (for example to probe boundary behavior); the write-once
    /// attributes are untouched.
    pub fn set_motion(&mut self, i: usize, x: f32, y: f32, heading: f32) -> MaskflowResult<()> {
        if i >= self.len() {
            return Err(MaskflowError::validation(format!(
                "particle index {i} out of range for {} particles",
                self.len()
            )));
        }
        self.position[i * 3] = x;
        self.position[i * 3 + 1] = y;
        self.heading[i] = heading;
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct StepCtx {
    space: MaskSpace,
    steps: u64,
    jitter_seed: u64,
}

fn advance(
    ctx: &StepCtx,
    index: usize,
    pos: &mut [f32],
    heading: &mut f32,
    speed: f32,
    policy: &dyn BoundaryPolicy,
    mask: &MaskBuffer,
) {
    let (x, y) = (pos[0], pos[1]);
    let (gx, gy) = ctx.space.to_grid(x, y);

    let mut h = *heading;
    if policy.is_blocked(mask, gx, gy) {
        h = policy.reflect(h, jitter_sample(ctx, index));
    }

    pos[0] = x + speed * h.cos();
    pos[1] = y + speed * h.sin();
    *heading = h;
}

fn jitter_sample(ctx: &StepCtx, index: usize) -> f32 {
    let key = ctx.jitter_seed
        ^ mix64(ctx.steps)
        ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    unit_from_bits(mix64(key))
}

#[cfg(test)]
#[path = "../../tests/unit/particles/field.rs"]
mod tests;
