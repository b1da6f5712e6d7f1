//! Request handling on top of the engine
//!
//! Turns a `{ticker, days}` request into a forecast by fetching history from a
//! [`HistoricalDataSource`]. Failures become an [`ErrorResponse`] carrying an
//! HTTP-equivalent status and a machine-readable reason; internal failures are
//! logged with their cause and reported to the caller generically.

use crate::engine::{normalize_ticker, ForecastEngine, ForecastResult};
use crate::error::{ForecastError, Result};
use crate::source::HistoricalDataSource;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Message returned for every internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred while generating the forecast";

fn default_days() -> i64 {
    30
}

/// Incoming forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Ticker symbol, any case
    pub ticker: String,
    /// Forecast horizon in days
    #[serde(default = "default_days")]
    pub days: i64,
}

impl ForecastRequest {
    /// Create a request
    pub fn new(ticker: &str, days: i64) -> Self {
        Self {
            ticker: ticker.to_string(),
            days,
        }
    }
}

/// Error returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP-equivalent status
    pub status: u16,
    /// Machine-readable reason
    pub reason: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ForecastError> for ErrorResponse {
    fn from(err: &ForecastError) -> Self {
        let status = err.status_code();
        let message = if status >= 500 && !matches!(err, ForecastError::Cancelled) {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            err.to_string()
        };

        Self {
            status,
            reason: err.reason().to_string(),
            message,
        }
    }
}

/// Forecast service combining a data source and an engine
#[derive(Debug)]
pub struct ForecastService<S: HistoricalDataSource> {
    source: S,
    engine: ForecastEngine,
}

impl<S: HistoricalDataSource> ForecastService<S> {
    /// Create a service
    pub fn new(source: S, engine: ForecastEngine) -> Self {
        Self { source, engine }
    }

    /// The wrapped engine
    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Handle a request
    pub fn handle(&self, request: &ForecastRequest) -> std::result::Result<ForecastResult, ErrorResponse> {
        self.try_handle(request).map_err(|err| {
            if err.is_client_error() {
                info!(ticker = %request.ticker, error = %err, "Rejected forecast request");
            } else {
                error!(ticker = %request.ticker, error = %err, "Forecast request failed");
            }
            ErrorResponse::from(&err)
        })
    }

    /// Handle a JSON request body, returning a status and a JSON response body
    pub fn handle_json(&self, body: &str) -> (u16, String) {
        let request: ForecastRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                let response = ErrorResponse {
                    status: 400,
                    reason: "invalid_request".to_string(),
                    message: format!("Malformed request: {}", e),
                };
                return (400, encode(&response));
            }
        };

        match self.handle(&request) {
            Ok(result) => (200, encode(&result)),
            Err(response) => (response.status, encode(&response)),
        }
    }

    fn try_handle(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        let ticker = normalize_ticker(&request.ticker)?;
        let days = usize::try_from(request.days).map_err(|_| {
            ForecastError::InvalidParameter(format!(
                "Days must be between 1 and {}, got {}",
                self.engine.config().max_days,
                request.days
            ))
        })?;
        self.engine.validate_days(days)?;

        let series = self.source.fetch(&ticker)?;
        self.engine.forecast(&ticker, &series, days)
    }
}

fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| {
        format!(
            r#"{{"status":500,"reason":"internal_error","message":"{}"}}"#,
            INTERNAL_ERROR_MESSAGE
        )
    })
}
