use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniform randomness used when spawning particles.
///
/// Construction draws every per-particle value through this trait, so injecting a seeded or
/// scripted source makes a particle field fully reproducible.
pub trait RandomSource {
    /// Next sample, uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[min, max)`.
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }

    /// Uniform integer in `[0, n)`; returns 0 when `n == 0`.
    fn uniform_index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_unit() * n as f32) as usize).min(n - 1)
    }
}

/// Seeded production generator backed by `rand`'s `StdRng`.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic generator for `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/random.rs"]
mod tests;
