//! Linear trend model
//!
//! Fits a least-squares line to the most recent prices and extrapolates it,
//! bounding every prediction to a band around the last observed price.

use crate::cancel::Cancellation;
use crate::config::TrendConfig;
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ensure_history, ForecastModel, ModelKind, Prediction, TrainedForecastModel};
use crate::utils::{clamp_to_band, confidence_half_width, target_date};
use chrono::NaiveDate;
use trade_math::{LinearRegression, WindowStats};
use tracing::debug;

/// Linear trend model
#[derive(Debug, Clone)]
pub struct LinearTrend {
    config: TrendConfig,
}

/// Trained linear trend model
#[derive(Debug, Clone)]
pub struct TrainedLinearTrend {
    config: TrendConfig,
    /// Number of trailing prices the line was fitted on
    window: usize,
    /// Fitted line
    regression: LinearRegression,
    /// Statistics of the fitting window
    stats: WindowStats,
    /// Last observed price, the reference of the deviation clamp
    last_price: f64,
}

impl LinearTrend {
    /// Create a new linear trend model
    pub fn new(config: TrendConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fitting window for a series of `len` points
    pub fn window_size(&self, len: usize) -> usize {
        (len / self.config.window_divisor).min(self.config.max_window)
    }
}

impl Default for LinearTrend {
    fn default() -> Self {
        Self {
            config: TrendConfig::default(),
        }
    }
}

impl ForecastModel for LinearTrend {
    type Trained = TrainedLinearTrend;

    fn train(&self, series: &HistoricalSeries, _cancel: &Cancellation) -> Result<Self::Trained> {
        ensure_history(series, self.config.min_history, self.kind())?;

        let prices = series.close_prices();
        let window = self.window_size(prices.len());
        let recent = &prices[prices.len() - window..];

        let regression = LinearRegression::fit(recent)?;
        let stats = WindowStats::from_values(recent)?;
        let last_price = series
            .last_price()
            .ok_or_else(|| ForecastError::DataError("Empty price series".to_string()))?;

        debug!(
            window,
            slope = regression.slope(),
            intercept = regression.intercept(),
            std_dev = stats.std_dev,
            "Fitted linear trend"
        );

        Ok(TrainedLinearTrend {
            config: self.config.clone(),
            window,
            regression,
            stats,
            last_price,
        })
    }

    fn min_history(&self) -> usize {
        self.config.min_history
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }
}

impl TrainedLinearTrend {
    /// Slope of the fitted line per day
    pub fn slope(&self) -> f64 {
        self.regression.slope()
    }

    /// Intercept of the fitted line
    pub fn intercept(&self) -> f64 {
        self.regression.intercept()
    }

    /// Number of trailing prices the line was fitted on
    pub fn window(&self) -> usize {
        self.window
    }

    /// Population standard deviation of the fitting window
    pub fn std_dev(&self) -> f64 {
        self.stats.std_dev
    }

    /// Mean of the fitting window
    pub fn mean(&self) -> f64 {
        self.stats.mean
    }
}

impl TrainedForecastModel for TrainedLinearTrend {
    fn forecast(
        &self,
        days: usize,
        request_date: NaiveDate,
        cancel: &Cancellation,
    ) -> Result<Vec<Prediction>> {
        let mut predictions = Vec::with_capacity(days);

        for day in 1..=days {
            cancel.check()?;

            // x continues the fitting positions 0..window-1
            let raw = self.regression.value_at((self.window + day) as f64);
            let bounded = clamp_to_band(raw, self.last_price, self.config.max_deviation);
            let half_width = confidence_half_width(
                self.stats.std_dev,
                day as f64 / days as f64,
                self.config.widening,
                self.config.z_score,
            );

            predictions.push(Prediction::new(
                target_date(request_date, day)?,
                bounded,
                half_width,
            )?);
        }

        Ok(predictions)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> HistoricalSeries {
        HistoricalSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes).unwrap()
    }

    #[test]
    fn test_window_size() {
        let model = LinearTrend::default();
        assert_eq!(model.window_size(10), 3);
        assert_eq!(model.window_size(59), 19);
        assert_eq!(model.window_size(90), 30);
        assert_eq!(model.window_size(365), 30);
    }

    #[test]
    fn test_fits_only_recent_window() {
        // Stale history trends down; the last 30 points trend up
        let mut closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        closes.extend((0..30).map(|i| 100.0 + i as f64));

        let trained = LinearTrend::default()
            .train(&series(&closes), &Cancellation::new())
            .unwrap();

        assert_eq!(trained.window(), 30);
        assert!((trained.slope() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_short_series() {
        let result = LinearTrend::default().train(&series(&[1.0; 9]), &Cancellation::new());
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData {
                required: 10,
                actual: 9,
                ..
            })
        ));
    }

    #[test]
    fn test_forecast_respects_cancellation() {
        let trained = LinearTrend::default()
            .train(&series(&[10.0; 12]), &Cancellation::new())
            .unwrap();
        let cancel = Cancellation::new();
        cancel.cancel();

        let result = trained.forecast(5, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), &cancel);
        assert!(matches!(result, Err(ForecastError::Cancelled)));
    }
}
