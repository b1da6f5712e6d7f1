//! Volatility statistics over price windows
//!
//! The forecasting models size their confidence bands from the population
//! standard deviation (divisor = window length) of recent prices.

use crate::{ensure_finite, MathError, Result};
use statrs::statistics::Statistics;

/// Mean and population standard deviation of a window of prices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Number of values the statistics were computed from
    pub len: usize,
}

impl WindowStats {
    /// Statistics over every value in `values`
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot compute statistics of an empty window".to_string(),
            ));
        }
        ensure_finite(values)?;

        Ok(Self {
            mean: values.iter().mean(),
            std_dev: values.iter().population_std_dev(),
            len: values.len(),
        })
    }

    /// Statistics over the last `window` values (or all of them if fewer)
    pub fn trailing(values: &[f64], window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window must be greater than zero".to_string(),
            ));
        }
        let start = values.len().saturating_sub(window);
        Self::from_values(&values[start..])
    }
}
