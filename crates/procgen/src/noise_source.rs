//! Seeded 2D coherent noise.

use noise::{NoiseFn, Simplex};

/// Seed the terrain noise is built from unless configured otherwise.
pub const DEFAULT_NOISE_SEED: u32 = 80;

/// Deterministic 2D simplex noise. The permutation table is built once from the
/// seed and only read afterwards, so one source can be shared freely.
#[derive(Clone)]
pub struct NoiseSource {
    seed: u32,
    simplex: Simplex,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample the noise at `(x, y)`. Output is continuous and lies in [-1, 1];
    /// the raw simplex kernel can overshoot by a hair, so it is clamped.
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.simplex.get([x, y]).clamp(-1.0, 1.0)
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

impl std::fmt::Debug for NoiseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSource").field("seed", &self.seed).finish()
    }
}
