//! Construction errors for terrain components.

use thiserror::Error;

/// Invalid terrain configuration. Rejected at construction; only the component
/// being built is affected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("patch resolution must be between 1 and {max}, got {0}", max = crate::patch::MAX_PATCH_RESOLUTION)]
    InvalidResolution(u32),
    #[error("tile width must be finite and greater than zero, got {0}")]
    InvalidTileWidth(f32),
    #[error("schedule period must be finite and greater than zero, got {0}")]
    InvalidPeriod(f64),
    #[error("coefficient {index} has minimum {min} above maximum {max}")]
    InvertedBounds { index: usize, min: f64, max: f64 },
    #[error("octave divisor and detail attenuation must be finite and non-zero, got {0}")]
    InvalidDivisor(f64),
}
