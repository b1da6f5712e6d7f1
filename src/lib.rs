//! # Stock Forecast
//!
//! `stock_forecast` bundles the workspace crates behind one dependency:
//! [`trade_math`] for the numeric building blocks and [`forecast_engine`] for
//! the models and the orchestrator.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use stock_forecast::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let closes: Vec<f64> = (0..90).map(|i| 50.0 + i as f64).collect();
//! let series = HistoricalSeries::from_closes(start, &closes)?;
//!
//! let engine = ForecastEngine::new(EngineConfig::default().with_seed(7))?;
//! let result = engine.forecast("nvda", &series, 10)?;
//!
//! assert_eq!(result.models.len(), 2);
//! # Ok::<(), ForecastError>(())
//! ```

pub use forecast_engine;
pub use trade_math;

/// Types needed for the common forecasting flow
pub mod prelude {
    pub use forecast_engine::{
        Cancellation, DataLoader, EngineConfig, ForecastEngine, ForecastError, ForecastRequest,
        ForecastResult, ForecastService, HistoricalSeries, InMemoryDataSource, ModelKind,
        Prediction,
    };
    pub use trade_math::{LinearRegression, NormalizationParams};
}
