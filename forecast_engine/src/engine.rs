//! Multi-model forecast orchestration
//!
//! [`ForecastEngine`] validates a request, runs the linear trend model and the
//! LSTM model independently and merges their output into a
//! [`ForecastResult`]. The trend model is the minimum viable model and its
//! failure fails the request; an LSTM failure is reported in
//! [`ForecastResult::lstm_error`] instead.

use crate::cancel::Cancellation;
use crate::config::EngineConfig;
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, LinearTrend, LstmForecaster, ModelForecast, ModelKind};
use crate::persistence::{NullSink, PredictionRecord, PredictionSink};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Text attached to every forecast
pub const DISCLAIMER: &str = "These forecasts are generated by simple statistical models for \
educational purposes only. They are not financial advice and should not be used to make \
investment decisions.";

/// Combined output of every model that ran for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Normalized ticker
    pub ticker: String,
    /// Number of forecast days
    pub horizon_days: usize,
    /// Day the forecast was made; the first prediction is for the day after
    pub request_date: NaiveDate,
    /// Forecasts in model order: linear trend first, then LSTM
    pub models: Vec<ModelForecast>,
    /// Why the LSTM model is absent, if it is
    pub lstm_error: Option<String>,
    /// Educational-use disclaimer
    pub disclaimer: String,
}

impl ForecastResult {
    /// Forecast of a specific model, if it ran
    pub fn model(&self, kind: ModelKind) -> Option<&ModelForecast> {
        self.models.iter().find(|m| m.model == kind)
    }

    /// Flatten into storage records
    pub fn records(&self) -> Vec<PredictionRecord> {
        self.models
            .iter()
            .flat_map(|forecast| {
                forecast.predictions.iter().map(move |p| PredictionRecord {
                    ticker: self.ticker.clone(),
                    request_date: self.request_date,
                    target_date: p.target_date,
                    predicted_price: p.predicted_price,
                    confidence_lower: p.confidence_lower,
                    confidence_upper: p.confidence_upper,
                    model: forecast.model,
                })
            })
            .collect()
    }

    /// Encode as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Trim and upper-case a ticker, rejecting empty or malformed identifiers
pub fn normalize_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Ticker must not be empty".to_string(),
        ));
    }
    if let Some(c) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(ForecastError::InvalidParameter(format!(
            "Ticker contains invalid character {:?}",
            c
        )));
    }
    Ok(ticker.to_ascii_uppercase())
}

/// Forecast orchestrator
pub struct ForecastEngine {
    config: EngineConfig,
    trend: LinearTrend,
    lstm: LstmForecaster,
    sink: Arc<dyn PredictionSink>,
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("config", &self.config)
            .field("sink", &self.sink.name())
            .finish()
    }
}

impl ForecastEngine {
    /// Create an engine that does not persist predictions
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut lstm = LstmForecaster::new(config.lstm.clone())?;
        if let Some(seed) = config.seed {
            lstm = lstm.with_seed(seed);
        }

        Ok(Self {
            trend: LinearTrend::new(config.trend.clone())?,
            lstm,
            config,
            sink: Arc::new(NullSink),
        })
    }

    /// Hand every successful forecast to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn PredictionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fail with `InvalidParameter` unless `days` is within [1, max_days]
    pub fn validate_days(&self, days: usize) -> Result<()> {
        if days == 0 || days > self.config.max_days {
            return Err(ForecastError::InvalidParameter(format!(
                "Days must be between 1 and {}, got {}",
                self.config.max_days, days
            )));
        }
        Ok(())
    }

    /// Forecast `days` ahead of today
    pub fn forecast(
        &self,
        ticker: &str,
        series: &HistoricalSeries,
        days: usize,
    ) -> Result<ForecastResult> {
        self.forecast_on(
            ticker,
            series,
            days,
            Local::now().date_naive(),
            &Cancellation::new(),
        )
    }

    /// Forecast `days` ahead of `request_date`, honoring `cancel`
    pub fn forecast_on(
        &self,
        ticker: &str,
        series: &HistoricalSeries,
        days: usize,
        request_date: NaiveDate,
        cancel: &Cancellation,
    ) -> Result<ForecastResult> {
        let ticker = normalize_ticker(ticker)?;
        self.validate_days(days)?;

        let required = self.trend.min_history();
        if series.len() < required {
            return Err(ForecastError::InsufficientData {
                context: "forecast".to_string(),
                required,
                actual: series.len(),
            });
        }

        info!(ticker = %ticker, days, points = series.len(), "Starting forecast");
        let started = Instant::now();

        let (trend, lstm) = if self.config.parallel_models {
            std::thread::scope(|scope| {
                let lstm = scope.spawn(|| self.run_lstm(series, days, request_date, cancel));
                let trend = self.trend.run(series, days, request_date, cancel);
                let lstm = lstm.join().unwrap_or_else(|_| {
                    Err(ForecastError::Unexpected("LSTM worker panicked".to_string()))
                });
                (trend, lstm)
            })
        } else {
            let trend = self.trend.run(series, days, request_date, cancel)?;
            (Ok(trend), self.run_lstm(series, days, request_date, cancel))
        };

        let mut models = vec![trend?];
        let lstm_error = match lstm {
            Ok(forecast) => {
                models.push(forecast);
                None
            }
            // Cancellation ends the whole request
            Err(ForecastError::Cancelled) => return Err(ForecastError::Cancelled),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "LSTM model unavailable");
                Some(e.to_string())
            }
        };

        let result = ForecastResult {
            ticker,
            horizon_days: days,
            request_date,
            models,
            lstm_error,
            disclaimer: DISCLAIMER.to_string(),
        };

        debug!(
            ticker = %result.ticker,
            models = result.models.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Forecast complete"
        );

        self.persist(&result);
        Ok(result)
    }

    fn run_lstm(
        &self,
        series: &HistoricalSeries,
        days: usize,
        request_date: NaiveDate,
        cancel: &Cancellation,
    ) -> Result<ModelForecast> {
        self.lstm.run(series, days, request_date, cancel)
    }

    /// Store the predictions; failures are logged and dropped
    fn persist(&self, result: &ForecastResult) {
        let records = result.records();
        match self.sink.store(&records) {
            Ok(()) => debug!(
                sink = self.sink.name(),
                records = records.len(),
                "Stored predictions"
            ),
            Err(e) => warn!(
                sink = self.sink.name(),
                ticker = %result.ticker,
                error = %e,
                "Failed to store predictions"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_ticker("^gspc").unwrap(), "^GSPC");
        assert!(matches!(
            normalize_ticker("   "),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(normalize_ticker("AA PL").is_err());
        assert!(normalize_ticker("../x").is_err());
    }

    #[test]
    fn test_validate_days() {
        let engine = ForecastEngine::new(EngineConfig::default()).unwrap();
        assert!(engine.validate_days(1).is_ok());
        assert!(engine.validate_days(90).is_ok());
        assert!(engine.validate_days(0).is_err());
        assert!(engine.validate_days(91).is_err());
    }
}
