//! Utility functions for the forecast_engine crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// Calendar date `offset` days after `start`
pub fn target_date(start: NaiveDate, offset: usize) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(offset as u64))
        .ok_or_else(|| ForecastError::Unexpected(format!("Date overflow: {} + {} days", start, offset)))
}

/// Limit `value` to within `fraction` of `reference` in either direction
pub fn clamp_to_band(value: f64, reference: f64, fraction: f64) -> f64 {
    let lower = reference - fraction * reference;
    let upper = reference + fraction * reference;
    value.max(lower).min(upper)
}

/// Half-width of a confidence band that widens linearly with `progress`
///
/// `progress` is the position within the horizon, 0.0 at the start and 1.0
/// at the end.
pub fn confidence_half_width(std_dev: f64, progress: f64, widening: f64, z_score: f64) -> f64 {
    std_dev * (1.0 + progress * widening) * z_score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_date_crosses_year_end() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();

        assert_eq!(target_date(start, 1).unwrap(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(target_date(start, 3).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(target_date(NaiveDate::MAX, 1).is_err());
    }

    #[test]
    fn test_clamp_to_band() {
        assert_eq!(clamp_to_band(130.0, 100.0, 0.15), 115.0);
        assert_eq!(clamp_to_band(70.0, 100.0, 0.15), 85.0);
        assert_eq!(clamp_to_band(104.0, 100.0, 0.15), 104.0);
    }

    #[test]
    fn test_confidence_half_width() {
        assert_eq!(confidence_half_width(2.0, 0.0, 0.5, 1.96), 3.92);
        assert!(confidence_half_width(2.0, 1.0, 0.5, 1.96) > confidence_half_width(2.0, 0.5, 0.5, 1.96));
        assert_eq!(confidence_half_width(0.0, 1.0, 0.5, 1.96), 0.0);
    }
}
