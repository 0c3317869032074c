//! Multi-octave height field over world-space (x, z).

use crate::error::TerrainError;
use crate::noise_source::{NoiseSource, DEFAULT_NOISE_SEED};

/// The fine-detail term is the raw noise divided by this.
pub const DETAIL_ATTENUATION: f64 = 60.0;
/// Input divisors for the mid, coarse and continental octaves.
pub const OCTAVE_DIVISORS: [f64; 3] = [10.0, 20.0, 40.0];

/// Amplitudes of the three scalable octaves (mid, coarse, continental).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl Coefficients {
    pub const fn new(c1: f64, c2: f64, c3: f64) -> Self {
        Self { c1, c2, c3 }
    }

    pub const fn splat(c: f64) -> Self {
        Self::new(c, c, c)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.c1, self.c2, self.c3]
    }

    pub fn from_array([c1, c2, c3]: [f64; 3]) -> Self {
        Self::new(c1, c2, c3)
    }

    /// True when every coefficient lies in `[min, max]` componentwise.
    pub fn within(&self, min: &Coefficients, max: &Coefficients) -> bool {
        self.to_array()
            .iter()
            .zip(min.to_array().iter().zip(max.to_array().iter()))
            .all(|(c, (lo, hi))| *c >= *lo && *c <= *hi)
    }
}

impl Default for Coefficients {
    /// The rugged extreme: the static terrain and the start of every animation period.
    fn default() -> Self {
        Self::new(1.0, 2.0, 8.0)
    }
}

/// One weighted noise term: the input is divided by `divisor`, the sample scaled by `amplitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveSpec {
    pub divisor: f64,
    pub amplitude: f64,
}

/// Configuration for [`HeightField`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeightFieldConfig {
    /// Noise seed.
    pub seed: u32,
    /// Divides the unscaled fine-detail sample.
    pub detail_attenuation: f64,
    /// Input divisors for the three coefficient-scaled octaves, in summation order.
    pub octave_divisors: [f64; 3],
}

impl Default for HeightFieldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_NOISE_SEED,
            detail_attenuation: DETAIL_ATTENUATION,
            octave_divisors: OCTAVE_DIVISORS,
        }
    }
}

impl HeightFieldConfig {
    pub fn validate(&self) -> Result<(), TerrainError> {
        std::iter::once(self.detail_attenuation)
            .chain(self.octave_divisors)
            .try_for_each(|d| {
                if d.is_finite() && d != 0.0 {
                    Ok(())
                } else {
                    Err(TerrainError::InvalidDivisor(d))
                }
            })
    }
}

/// Elevation as a sum of one fixed fine-detail term and three coefficient-scaled
/// octaves at increasing wavelengths. Evaluated in world space so neighbouring
/// tiles agree along shared edges.
#[derive(Debug, Clone)]
pub struct HeightField {
    noise: NoiseSource,
    detail_attenuation: f64,
    octave_divisors: [f64; 3],
}

impl Default for HeightField {
    fn default() -> Self {
        Self {
            noise: NoiseSource::default(),
            detail_attenuation: DETAIL_ATTENUATION,
            octave_divisors: OCTAVE_DIVISORS,
        }
    }
}

impl HeightField {
    pub fn new(config: &HeightFieldConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        Ok(Self {
            noise: NoiseSource::new(config.seed),
            detail_attenuation: config.detail_attenuation,
            octave_divisors: config.octave_divisors,
        })
    }

    pub fn noise(&self) -> &NoiseSource {
        &self.noise
    }

    /// The three scalable octaves paired with their amplitudes, in summation order.
    pub fn octaves(&self, coefficients: &Coefficients) -> [OctaveSpec; 3] {
        let amplitudes = coefficients.to_array();
        std::array::from_fn(|i| OctaveSpec {
            divisor: self.octave_divisors[i],
            amplitude: amplitudes[i],
        })
    }

    /// Elevation at world `(x, z)`.
    #[inline]
    pub fn elevation(&self, x: f64, z: f64, coefficients: &Coefficients) -> f64 {
        let mut height = self.noise.evaluate(x, z) / self.detail_attenuation;
        for octave in self.octaves(coefficients) {
            height += self.noise.evaluate(x / octave.divisor, z / octave.divisor) * octave.amplitude;
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Upper bound on `|elevation|`: each noise term is within [-1, 1].
    fn amplitude_bound(field: &HeightField, coefficients: &Coefficients) -> f64 {
        1.0 / field.detail_attenuation.abs()
            + coefficients.to_array().iter().map(|c| c.abs()).sum::<f64>()
    }

    #[test]
    fn elevation_is_deterministic() {
        let a = HeightField::default();
        let b = HeightField::new(&HeightFieldConfig::default()).unwrap();
        let c = Coefficients::default();
        for i in 0..50 {
            let x = i as f64 * 3.7 - 90.0;
            let z = i as f64 * -2.3 + 40.0;
            assert_eq!(a.elevation(x, z, &c), a.elevation(x, z, &c));
            assert_eq!(a.elevation(x, z, &c), b.elevation(x, z, &c));
        }
    }

    #[test]
    fn elevation_matches_closed_form() {
        let field = HeightField::default();
        let n = field.noise();
        let c = Coefficients::new(0.7, 1.3, 5.0);
        let (x, z) = (12.5, -33.25);
        let expected = n.evaluate(x, z) / 60.0
            + n.evaluate(x / 10.0, z / 10.0) * 0.7
            + n.evaluate(x / 20.0, z / 20.0) * 1.3
            + n.evaluate(x / 40.0, z / 40.0) * 5.0;
        assert_eq!(field.elevation(x, z, &c), expected);
    }

    #[test]
    fn elevation_is_finite_and_bounded() {
        let field = HeightField::default();
        let c = Coefficients::default();
        let bound = amplitude_bound(&field, &c);
        for iz in -40..40 {
            for ix in -40..40 {
                let h = field.elevation(ix as f64 * 7.3, iz as f64 * 5.1, &c);
                assert!(h.is_finite());
                assert!(h.abs() <= bound);
            }
        }
    }

    #[test]
    fn zero_coefficients_leave_only_fine_detail() {
        let field = HeightField::default();
        let h = field.elevation(3.3, 4.4, &Coefficients::splat(0.0));
        assert_eq!(h, field.noise().evaluate(3.3, 4.4) / 60.0);
    }

    #[test]
    fn octaves_keep_summation_order() {
        let field = HeightField::default();
        let octaves = field.octaves(&Coefficients::new(1.0, 2.0, 8.0));
        assert_eq!(octaves[0], OctaveSpec { divisor: 10.0, amplitude: 1.0 });
        assert_eq!(octaves[1], OctaveSpec { divisor: 20.0, amplitude: 2.0 });
        assert_eq!(octaves[2], OctaveSpec { divisor: 40.0, amplitude: 8.0 });
    }

    #[test]
    fn zero_divisor_rejected() {
        let config = HeightFieldConfig {
            octave_divisors: [10.0, 0.0, 40.0],
            ..Default::default()
        };
        assert_eq!(HeightField::new(&config).unwrap_err(), TerrainError::InvalidDivisor(0.0));
    }

    #[test]
    fn coefficients_within_bounds() {
        let min = Coefficients::splat(0.1);
        let max = Coefficients::default();
        assert!(Coefficients::new(0.5, 1.0, 4.0).within(&min, &max));
        assert!(max.within(&min, &max));
        assert!(!Coefficients::new(0.5, 2.5, 4.0).within(&min, &max));
    }
}
