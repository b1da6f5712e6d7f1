//! Engine configuration
//!
//! Every tunable of the two models lives here with its production default.
//! Configurations deserialize from JSON; missing fields fall back to the
//! defaults, so `{}` is a complete configuration.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest horizon the engine will forecast
pub const MAX_HORIZON_DAYS: usize = 90;

/// Parameters of the linear trend model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum number of historical prices
    pub min_history: usize,
    /// Upper bound on the fitting window
    pub max_window: usize,
    /// The window is `len / window_divisor`, capped at `max_window`
    pub window_divisor: usize,
    /// Largest allowed deviation from the last price, as a fraction
    pub max_deviation: f64,
    /// Normal-approximation multiplier for the confidence band
    pub z_score: f64,
    /// Relative band growth between the first and last forecast day
    pub widening: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_history: 10,
            max_window: 30,
            window_divisor: 3,
            max_deviation: 0.15,
            z_score: 1.96,
            widening: 0.5,
        }
    }
}

impl TrendConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        // A line needs two points, and the window is at least len / divisor
        if self.min_history < 2 * self.window_divisor.max(1) {
            return Err(config_error(
                "trend.min_history must allow a window of at least 2 points",
            ));
        }
        if self.max_window < 2 {
            return Err(config_error("trend.max_window must be at least 2"));
        }
        if self.window_divisor == 0 {
            return Err(config_error("trend.window_divisor must be positive"));
        }
        validate_band("trend", self.max_deviation, self.z_score, self.widening)
    }
}

/// Parameters of the recurrent (LSTM) model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmConfig {
    /// Minimum number of historical prices
    pub min_history: usize,
    /// Width of the hidden and cell state
    pub hidden_size: usize,
    /// Passes over the series when training the readout
    pub epochs: usize,
    /// Step size of the readout update
    pub learning_rate: f64,
    /// Readout weights start uniform in ±`readout_init_scale`
    pub readout_init_scale: f64,
    /// Number of trailing values replayed before predicting
    pub warmup: usize,
    /// Trailing prices used to size the confidence band
    pub recent_window: usize,
    /// Weight kept on the model output at long horizons
    pub smoothing_floor: f64,
    /// Decay constant (in days) of the extra model weight at short horizons
    pub smoothing_decay: f64,
    /// Largest allowed deviation from the last price, as a fraction
    pub max_deviation: f64,
    /// Multiplier for the confidence band
    pub z_score: f64,
    /// Relative band growth across the horizon
    pub widening: f64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            min_history: 60,
            hidden_size: 50,
            epochs: 50,
            learning_rate: 0.001,
            readout_init_scale: 0.05,
            warmup: 60,
            recent_window: 30,
            smoothing_floor: 0.7,
            smoothing_decay: 10.0,
            max_deviation: 0.20,
            z_score: 2.0,
            widening: 0.6,
        }
    }
}

impl LstmConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if self.min_history < 2 {
            return Err(config_error("lstm.min_history must be at least 2"));
        }
        if self.hidden_size == 0 {
            return Err(config_error("lstm.hidden_size must be positive"));
        }
        if self.warmup == 0 || self.recent_window == 0 {
            return Err(config_error(
                "lstm.warmup and lstm.recent_window must be positive",
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(config_error("lstm.learning_rate must be positive"));
        }
        if !(self.readout_init_scale > 0.0 && self.readout_init_scale.is_finite()) {
            return Err(config_error("lstm.readout_init_scale must be positive"));
        }
        if !(0.0..=1.0).contains(&self.smoothing_floor) {
            return Err(config_error("lstm.smoothing_floor must be within [0, 1]"));
        }
        if !(self.smoothing_decay > 0.0 && self.smoothing_decay.is_finite()) {
            return Err(config_error("lstm.smoothing_decay must be positive"));
        }
        validate_band("lstm", self.max_deviation, self.z_score, self.widening)
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest forecast horizon accepted, in days
    pub max_days: usize,
    /// Run the two models on separate threads
    pub parallel_models: bool,
    /// Fixed seed for weight initialization; a fresh seed is drawn when unset
    pub seed: Option<u64>,
    /// Linear trend model parameters
    pub trend: TrendConfig,
    /// LSTM model parameters
    pub lstm: LstmConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_days: MAX_HORIZON_DAYS,
            parallel_models: false,
            seed: None,
            trend: TrendConfig::default(),
            lstm: LstmConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Set a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_days == 0 || self.max_days > MAX_HORIZON_DAYS {
            return Err(config_error(&format!(
                "max_days must be between 1 and {}",
                MAX_HORIZON_DAYS
            )));
        }
        self.trend.validate()?;
        self.lstm.validate()
    }
}

fn validate_band(section: &str, max_deviation: f64, z_score: f64, widening: f64) -> Result<()> {
    if !(max_deviation > 0.0 && max_deviation < 1.0) {
        return Err(config_error(&format!(
            "{}.max_deviation must be within (0, 1)",
            section
        )));
    }
    if !(z_score >= 0.0 && z_score.is_finite()) || !(widening >= 0.0 && widening.is_finite()) {
        return Err(config_error(&format!(
            "{}.z_score and {}.widening must be non-negative",
            section, section
        )));
    }
    Ok(())
}

fn config_error(message: &str) -> ForecastError {
    ForecastError::ConfigError(message.to_string())
}
