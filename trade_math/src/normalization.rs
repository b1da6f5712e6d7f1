//! Min/max normalization of price series into the unit interval

use crate::{ensure_finite, MathError, Result};
use serde::{Deserialize, Serialize};

/// Value every point maps to when the series has no range
pub const NEUTRAL_VALUE: f64 = 0.5;

/// Bounds captured from a series so normalized values can be mapped back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    /// Smallest value in the source series
    pub min: f64,
    /// Largest value in the source series
    pub max: f64,
}

impl NormalizationParams {
    /// Capture the bounds of `values`
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot normalize an empty series".to_string(),
            ));
        }
        ensure_finite(values)?;

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(Self { min, max })
    }

    /// Width of the captured range
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// True when the source series was constant
    pub fn is_degenerate(&self) -> bool {
        self.range() == 0.0
    }

    /// Map a value into [0, 1]; constant series map to the neutral value
    pub fn normalize_value(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            NEUTRAL_VALUE
        } else {
            (value - self.min) / self.range()
        }
    }

    /// Map a normalized value back into the original price space
    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }
}

/// Normalize a series to [0, 1] using its own min and max
pub fn normalize(values: &[f64]) -> Result<(Vec<f64>, NormalizationParams)> {
    let params = NormalizationParams::from_values(values)?;
    let normalized = values.iter().map(|&v| params.normalize_value(v)).collect();
    Ok((normalized, params))
}

/// Inverse of [`normalize`] for a single value
pub fn denormalize(value: f64, params: &NormalizationParams) -> f64 {
    params.denormalize(value)
}
