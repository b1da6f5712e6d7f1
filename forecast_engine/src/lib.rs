//! # Forecast Engine
//!
//! Short-horizon forecasting of daily closing prices.
//!
//! ## Features
//!
//! - Validated historical series (`date`, `close`) loaded from memory or CSV
//! - Linear trend model: least-squares fit over a recent window, bounded to
//!   ±15% of the last price, with confidence bands that widen with the horizon
//! - LSTM model: a single-layer LSTM whose readout is trained online for every
//!   request, smoothed toward the last price and bounded to ±20%
//! - An orchestrator that runs both models with independent failure handling
//!   and hands predictions to a pluggable sink
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use forecast_engine::{EngineConfig, ForecastEngine, HistoricalSeries, ModelKind};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
//! let series = HistoricalSeries::from_closes(start, &closes)?;
//!
//! let engine = ForecastEngine::new(EngineConfig::default())?;
//! let result = engine.forecast("aapl", &series, 5)?;
//!
//! assert_eq!(result.ticker, "AAPL");
//! assert!(result.model(ModelKind::LinearRegression).is_some());
//! // 30 points are not enough for the LSTM model
//! assert!(result.lstm_error.is_some());
//! # Ok::<(), forecast_engine::ForecastError>(())
//! ```

pub mod cancel;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod service;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use crate::cancel::Cancellation;
pub use crate::config::{EngineConfig, LstmConfig, TrendConfig};
pub use crate::data::{DataLoader, HistoricalSeries, PricePoint};
pub use crate::engine::{ForecastEngine, ForecastResult, DISCLAIMER};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{
    ForecastModel, ModelForecast, ModelKind, Prediction, TrainedForecastModel,
};
pub use crate::persistence::{
    InMemorySink, JsonLinesSink, NullSink, PredictionRecord, PredictionSink,
};
pub use crate::service::{ErrorResponse, ForecastRequest, ForecastService};
pub use crate::source::{CsvDataSource, HistoricalDataSource, InMemoryDataSource};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
