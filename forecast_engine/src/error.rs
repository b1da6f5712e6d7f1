//! Error types for the forecast_engine crate

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the forecast_engine crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Request parameter outside its accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Series shorter than a model's required minimum
    #[error("Insufficient data for {context}: need at least {required} data points, got {actual}")]
    InsufficientData {
        /// What needed the data (a model name or the request itself)
        context: String,
        /// Minimum number of points
        required: usize,
        /// Number of points supplied
        actual: usize,
    },

    /// Malformed historical data
    #[error("Data error: {0}")]
    DataError(String),

    /// No history is available for the requested ticker
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Prediction storage failed
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// The caller cancelled the request
    #[error("Forecast cancelled")]
    Cancelled,

    /// Any other internal failure
    #[error("Unexpected failure: {0}")]
    Unexpected(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON encoding or decoding
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ForecastError {
    /// HTTP-equivalent status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ForecastError::InvalidParameter(_)
            | ForecastError::InsufficientData { .. }
            | ForecastError::DataError(_)
            | ForecastError::UnknownTicker(_) => 400,
            ForecastError::Cancelled => 503,
            _ => 500,
        }
    }

    /// Machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            ForecastError::InvalidParameter(_) => "invalid_parameter",
            ForecastError::InsufficientData { .. } => "insufficient_data",
            ForecastError::DataError(_) => "data_error",
            ForecastError::UnknownTicker(_) => "unknown_ticker",
            ForecastError::Cancelled => "cancelled",
            _ => "internal_error",
        }
    }

    /// True for errors caused by the caller's input rather than the engine
    pub fn is_client_error(&self) -> bool {
        self.status_code() == 400
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
