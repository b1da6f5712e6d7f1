//! Forecasting models for closing price series

use crate::cancel::Cancellation;
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Stable identifier of a forecasting model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Least-squares trend over a recent window
    LinearRegression,
    /// Single-layer LSTM with an online-trained readout
    Lstm,
}

impl ModelKind {
    /// Machine-readable identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::Lstm => "lstm",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point forecast with a confidence band for one day
///
/// Always satisfies `0 <= confidence_lower <= predicted_price <= confidence_upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Day the prediction is for
    pub target_date: NaiveDate,
    /// Predicted closing price
    pub predicted_price: f64,
    /// Lower edge of the confidence band
    pub confidence_lower: f64,
    /// Upper edge of the confidence band
    pub confidence_upper: f64,
}

impl Prediction {
    /// Build a prediction centered on `price`, flooring price and lower bound at zero
    pub fn new(target_date: NaiveDate, price: f64, half_width: f64) -> Result<Self> {
        if !price.is_finite() || !half_width.is_finite() || half_width < 0.0 {
            return Err(ForecastError::Unexpected(format!(
                "Invalid prediction for {}: price {}, half-width {}",
                target_date, price, half_width
            )));
        }

        let predicted_price = price.max(0.0);
        Ok(Self {
            target_date,
            predicted_price,
            confidence_lower: (price - half_width).max(0.0).min(predicted_price),
            confidence_upper: predicted_price + half_width,
        })
    }

    /// Width of the confidence band
    pub fn interval_width(&self) -> f64 {
        self.confidence_upper - self.confidence_lower
    }
}

/// Predictions of one model, ordered by target date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    /// Model that produced the predictions
    pub model: ModelKind,
    /// One prediction per forecast day
    pub predictions: Vec<Prediction>,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict `days` future closing prices, the first one dated the day after `request_date`
    fn forecast(
        &self,
        days: usize,
        request_date: NaiveDate,
        cancel: &Cancellation,
    ) -> Result<Vec<Prediction>>;

    /// Identifier of the model
    fn kind(&self) -> ModelKind;
}

/// Forecast model that can be trained on a historical series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a historical series
    fn train(&self, series: &HistoricalSeries, cancel: &Cancellation) -> Result<Self::Trained>;

    /// Minimum number of points `train` accepts
    fn min_history(&self) -> usize;

    /// Identifier of the model
    fn kind(&self) -> ModelKind;

    /// Train and forecast in one step
    fn run(
        &self,
        series: &HistoricalSeries,
        days: usize,
        request_date: NaiveDate,
        cancel: &Cancellation,
    ) -> Result<ModelForecast> {
        let trained = self.train(series, cancel)?;
        Ok(ModelForecast {
            model: self.kind(),
            predictions: trained.forecast(days, request_date, cancel)?,
        })
    }
}

/// Fail with `InsufficientData` when `series` is shorter than `required`
pub(crate) fn ensure_history(series: &HistoricalSeries, required: usize, kind: ModelKind) -> Result<()> {
    if series.len() < required {
        return Err(ForecastError::InsufficientData {
            context: format!("{} model", kind),
            required,
            actual: series.len(),
        });
    }
    Ok(())
}

pub mod linear_trend;
pub mod lstm;

pub use linear_trend::{LinearTrend, TrainedLinearTrend};
pub use lstm::{LstmCell, LstmForecaster, LstmState, TrainedLstm};
