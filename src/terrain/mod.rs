//! Elevation rasters: loading, scaling and export.

mod ascii;
mod geotiff;

pub use ascii::WriteAsciiGrid;
pub use geotiff::LoadGeoTiff;

use crate::error::{FieldError, Result};
use crate::field::{Grid, ScalarField};

/// Approximate metres per degree of latitude, used to turn geographic
/// pixel scales into linear spacing.
pub const DEGREES_TO_METERS: f64 = 110_000.0;

/// A heightmap together with its horizontal sample spacing.
#[derive(Debug, Clone)]
pub struct Terrain {
    /// Elevation samples.
    pub heightmap: ScalarField,
    /// Distance between adjacent samples, in the same unit as elevations.
    pub spacing: f64,
}

impl Terrain {
    /// Creates a terrain from a heightmap and spacing.
    #[must_use]
    pub fn new(heightmap: ScalarField, spacing: f64) -> Self {
        Self { heightmap, spacing }
    }

    /// Builds a terrain from 8-bit grayscale samples, mapping the darkest
    /// sample to `min` and the brightest to `max`.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::LengthMismatch` if `values` does not hold
    /// `width * height` samples, or `FieldError::Empty` if it holds none.
    pub fn from_gray(
        values: &[u8],
        width: usize,
        height: usize,
        min: f32,
        max: f32,
        spacing: f64,
    ) -> Result<Self> {
        let lo = values.iter().copied().min().ok_or(FieldError::Empty)?;
        let hi = values.iter().copied().max().ok_or(FieldError::Empty)?;
        let scale = if hi > lo {
            (max - min) / f32::from(hi - lo)
        } else {
            0.0
        };
        let samples = values
            .iter()
            .map(|&v| min + scale * f32::from(v - lo))
            .collect();
        Ok(Self::new(Grid::from_vec(width, height, samples)?, spacing))
    }
}

/// Maps `field` to 8-bit intensities, row-major.
///
/// `range` gives the values mapped to 0 and 255; `None` uses the field's own
/// defined range. Values outside the range saturate and undefined cells
/// map to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_grayscale(field: &ScalarField, range: Option<(f32, f32)>) -> Vec<u8> {
    let (lo, hi) = range.or_else(|| field.value_range()).unwrap_or((0.0, 0.0));
    let span = hi - lo;
    field
        .as_slice()
        .iter()
        .map(|&v| {
            if v.is_nan() || span <= 0.0 {
                return 0;
            }
            (255.0 * (v - lo) / span).round().clamp(0.0, 255.0) as u8
        })
        .collect()
}
