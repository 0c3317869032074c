//! Time-driven octave amplitudes for the animated terrain.

use crate::error::TerrainError;
use crate::height::Coefficients;

/// Seconds for one rugged-to-smooth sweep.
pub const DEFAULT_PERIOD: f64 = 6.0;

/// Sawtooth schedule: each coefficient falls linearly from its maximum at the
/// start of a period to its minimum at the end, then snaps back.
///
/// Stateless; the caller passes the elapsed time every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSchedule {
    period: f64,
    max: Coefficients,
    min: Coefficients,
}

impl Default for CoefficientSchedule {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            max: Coefficients::default(),
            min: Coefficients::splat(0.1),
        }
    }
}

impl CoefficientSchedule {
    pub fn new(period: f64, max: Coefficients, min: Coefficients) -> Result<Self, TerrainError> {
        if !period.is_finite() || period <= 0.0 {
            return Err(TerrainError::InvalidPeriod(period));
        }
        for (index, (lo, hi)) in min.to_array().into_iter().zip(max.to_array()).enumerate() {
            if !(lo <= hi) {
                return Err(TerrainError::InvertedBounds { index, min: lo, max: hi });
            }
        }
        Ok(Self { period, max, min })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn max(&self) -> Coefficients {
        self.max
    }

    pub fn min(&self) -> Coefficients {
        self.min
    }

    /// Normalised position in the current period, in [0, 1).
    pub fn phase(&self, elapsed_seconds: f64) -> f64 {
        let t = elapsed_seconds.rem_euclid(self.period) / self.period;
        // rem_euclid can round up to the divisor for tiny negative inputs.
        if t >= 1.0 {
            0.0
        } else {
            t
        }
    }

    /// Coefficients at `elapsed_seconds`.
    pub fn update(&self, elapsed_seconds: f64) -> Coefficients {
        let t = self.phase(elapsed_seconds);
        let max = self.max.to_array();
        let min = self.min.to_array();
        Coefficients::from_array(std::array::from_fn(|i| max[i] - t * (max[i] - min[i])))
    }
}
