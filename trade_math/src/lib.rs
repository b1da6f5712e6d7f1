//! # Trade Math
//!
//! Numerical building blocks shared by the forecasting models.
//! This crate provides min/max normalization, a closed-form least-squares
//! trend fit and summary statistics over trailing price windows.

use thiserror::Error;

pub mod forecasting;
pub mod normalization;
pub mod volatility;

pub use forecasting::LinearRegression;
pub use normalization::{denormalize, normalize, NormalizationParams};
pub use volatility::WindowStats;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Reject series containing NaN or infinite values
pub(crate) fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(MathError::InvalidInput(format!(
            "Non-finite value at position {}",
            idx
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[1.0, 2.0, 3.0]).is_ok());
        assert!(ensure_finite(&[]).is_ok());
        assert!(matches!(
            ensure_finite(&[1.0, f64::NAN]),
            Err(MathError::InvalidInput(_))
        ));
    }
}
