//! Recurrent forecasting model
//!
//! A single-layer LSTM cell with a linear readout. The cell weights stay at
//! their random initialization; only the readout is trained, online, with
//! `readout += learning_rate * error * hidden` for every adjacent pair of the
//! normalized series. Forecasts are generated autoregressively and then pulled
//! toward the last observed price.

use crate::cancel::Cancellation;
use crate::config::LstmConfig;
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ensure_history, ForecastModel, ModelKind, Prediction, TrainedForecastModel};
use crate::utils::{clamp_to_band, confidence_half_width, target_date};
use chrono::NaiveDate;
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use trade_math::{normalize, NormalizationParams, WindowStats};
use tracing::{debug, trace};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Matrix with entries uniform in ±sqrt(2 / (rows + cols))
fn scaled_uniform<R: Rng + ?Sized>(shape: (usize, usize), rng: &mut R) -> Array2<f64> {
    let limit = (2.0 / (shape.0 + shape.1) as f64).sqrt();
    let dist = Uniform::new_inclusive(-limit, limit);
    Array2::from_shape_fn(shape, |_| dist.sample(rng))
}

/// Hidden and cell state of an LSTM between two steps
#[derive(Debug, Clone, PartialEq)]
pub struct LstmState {
    /// Hidden state, the cell's output
    pub hidden: Array1<f64>,
    /// Cell (memory) state
    pub cell: Array1<f64>,
}

impl LstmState {
    /// All-zero state
    pub fn zeros(hidden_size: usize) -> Self {
        Self {
            hidden: Array1::zeros(hidden_size),
            cell: Array1::zeros(hidden_size),
        }
    }
}

/// Gate weights of a single-layer LSTM cell with a scalar input
///
/// Each gate matrix has shape `hidden × (1 + hidden)` and acts on the
/// concatenation `[x, h_prev]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmCell {
    hidden_size: usize,
    forget: Array2<f64>,
    input: Array2<f64>,
    candidate: Array2<f64>,
    output: Array2<f64>,
}

impl LstmCell {
    /// Initialize weights uniformly in ±sqrt(2 / (rows + cols))
    pub fn random<R: Rng + ?Sized>(hidden_size: usize, rng: &mut R) -> Self {
        let shape = (hidden_size, hidden_size + 1);

        Self {
            hidden_size,
            forget: scaled_uniform(shape, rng),
            input: scaled_uniform(shape, rng),
            candidate: scaled_uniform(shape, rng),
            output: scaled_uniform(shape, rng),
        }
    }

    /// Width of the hidden state
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Advance one step on input `x`, returning the next state
    pub fn step(&self, state: &LstmState, x: f64) -> LstmState {
        let mut combined = Array1::<f64>::zeros(self.hidden_size + 1);
        combined[0] = x;
        combined.slice_mut(s![1..]).assign(&state.hidden);

        let forget = self.forget.dot(&combined).mapv(sigmoid);
        let input = self.input.dot(&combined).mapv(sigmoid);
        let candidate = self.candidate.dot(&combined).mapv(f64::tanh);
        let output = self.output.dot(&combined).mapv(sigmoid);

        let cell = &forget * &state.cell + &input * &candidate;
        let hidden = &output * &cell.mapv(f64::tanh);

        LstmState { hidden, cell }
    }

    /// Feed every value in `values` starting from `state`
    pub fn replay(&self, state: LstmState, values: &[f64]) -> LstmState {
        values.iter().fold(state, |state, &x| self.step(&state, x))
    }
}

/// LSTM forecasting model
#[derive(Debug, Clone)]
pub struct LstmForecaster {
    config: LstmConfig,
    seed: Option<u64>,
}

/// Trained LSTM model, warmed up on the most recent history
#[derive(Debug, Clone)]
pub struct TrainedLstm {
    config: LstmConfig,
    cell: LstmCell,
    readout: Array1<f64>,
    /// State after replaying the trailing window
    warm_state: LstmState,
    params: NormalizationParams,
    last_price: f64,
    recent: WindowStats,
    training_loss: f64,
}

impl LstmForecaster {
    /// Create a new LSTM model
    pub fn new(config: LstmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, seed: None })
    }

    /// Fix the initialization seed; without one every training run draws fresh entropy
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Random cell weights and the untrained readout
    fn initial_weights(&self) -> (LstmCell, Array1<f64>) {
        let mut rng = self.rng();
        let cell = LstmCell::random(self.config.hidden_size, &mut rng);
        let scale = self.config.readout_init_scale;
        let readout_dist = Uniform::new_inclusive(-scale, scale);
        let readout =
            Array1::from_shape_fn(self.config.hidden_size, |_| readout_dist.sample(&mut rng));
        (cell, readout)
    }

    /// Train the readout over `normalized`, returning the mean squared error of the last epoch
    fn train_readout(
        &self,
        cell: &LstmCell,
        readout: &mut Array1<f64>,
        normalized: &[f64],
        cancel: &Cancellation,
    ) -> Result<f64> {
        let mut last_loss = 0.0;
        let pairs = normalized.len().saturating_sub(1).max(1) as f64;

        for epoch in 0..self.config.epochs {
            cancel.check()?;

            let mut state = LstmState::zeros(cell.hidden_size());
            let mut squared_error = 0.0;

            for pair in normalized.windows(2) {
                state = cell.step(&state, pair[0]);
                let prediction = readout.dot(&state.hidden);
                let error = pair[1] - prediction;
                readout.scaled_add(self.config.learning_rate * error, &state.hidden);
                squared_error += error * error;
            }

            last_loss = squared_error / pairs;
            trace!(epoch, loss = last_loss, "LSTM epoch");
        }

        if !last_loss.is_finite() {
            return Err(ForecastError::Unexpected(
                "LSTM training diverged".to_string(),
            ));
        }

        Ok(last_loss)
    }
}

impl Default for LstmForecaster {
    fn default() -> Self {
        Self {
            config: LstmConfig::default(),
            seed: None,
        }
    }
}

impl ForecastModel for LstmForecaster {
    type Trained = TrainedLstm;

    fn train(&self, series: &HistoricalSeries, cancel: &Cancellation) -> Result<Self::Trained> {
        ensure_history(series, self.config.min_history, self.kind())?;

        let prices = series.close_prices();
        let (normalized, params) = normalize(&prices)?;

        let (cell, mut readout) = self.initial_weights();
        let training_loss = self.train_readout(&cell, &mut readout, &normalized, cancel)?;

        let warmup_start = normalized.len().saturating_sub(self.config.warmup);
        let warm_state = cell.replay(
            LstmState::zeros(self.config.hidden_size),
            &normalized[warmup_start..],
        );

        let last_price = series
            .last_price()
            .ok_or_else(|| ForecastError::DataError("Empty price series".to_string()))?;
        let recent = WindowStats::trailing(&prices, self.config.recent_window)?;

        debug!(
            epochs = self.config.epochs,
            loss = training_loss,
            min = params.min,
            max = params.max,
            "Trained LSTM readout"
        );

        Ok(TrainedLstm {
            config: self.config.clone(),
            cell,
            readout,
            warm_state,
            params,
            last_price,
            recent,
            training_loss,
        })
    }

    fn min_history(&self) -> usize {
        self.config.min_history
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Lstm
    }
}

impl TrainedLstm {
    /// Mean squared error of the final training epoch, in normalized units
    pub fn training_loss(&self) -> f64 {
        self.training_loss
    }

    /// Bounds used to normalize the training series
    pub fn normalization(&self) -> NormalizationParams {
        self.params
    }

    /// Raw autoregressive predictions in price space, before smoothing and clamping
    pub fn raw_forecast(&self, days: usize, cancel: &Cancellation) -> Result<Vec<f64>> {
        let mut state = self.warm_state.clone();
        let mut raw = Vec::with_capacity(days);

        for day in 0..days {
            cancel.check()?;

            let next = self.readout.dot(&state.hidden);
            if !next.is_finite() {
                return Err(ForecastError::Unexpected(format!(
                    "LSTM produced a non-finite value on day {}",
                    day + 1
                )));
            }
            raw.push(self.params.denormalize(next));

            if day + 1 < days {
                state = self.cell.step(&state, next);
            }
        }

        Ok(raw)
    }

    /// Weight given to the model output on 0-indexed forecast day `day`
    pub fn smoothing(&self, day: usize) -> f64 {
        let floor = self.config.smoothing_floor;
        floor + (1.0 - floor) * (-(day as f64) / self.config.smoothing_decay).exp()
    }
}

impl TrainedForecastModel for TrainedLstm {
    fn forecast(
        &self,
        days: usize,
        request_date: NaiveDate,
        cancel: &Cancellation,
    ) -> Result<Vec<Prediction>> {
        let raw = self.raw_forecast(days, cancel)?;

        raw.iter()
            .enumerate()
            .map(|(day, &value)| {
                let smoothing = self.smoothing(day);
                let blended = value * smoothing + self.last_price * (1.0 - smoothing);
                let bounded = clamp_to_band(blended, self.last_price, self.config.max_deviation);
                let half_width = confidence_half_width(
                    self.recent.std_dev,
                    day as f64 / days as f64,
                    self.config.widening,
                    self.config.z_score,
                );

                Prediction::new(target_date(request_date, day + 1)?, bounded, half_width)
            })
            .collect()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Lstm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_cell(hidden: usize) -> LstmCell {
        LstmCell::random(hidden, &mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_cell_weight_shapes_and_range() {
        let cell = seeded_cell(50);
        let limit = (2.0f64 / 101.0).sqrt();

        for gate in [&cell.forget, &cell.input, &cell.candidate, &cell.output] {
            assert_eq!(gate.dim(), (50, 51));
            assert!(gate.iter().all(|w| w.abs() <= limit));
        }
    }

    #[test]
    fn test_step_is_pure() {
        let cell = seeded_cell(8);
        let start = LstmState::zeros(8);

        let a = cell.step(&start, 0.4);
        let b = cell.step(&start, 0.4);

        assert_eq!(a, b);
        assert_eq!(start, LstmState::zeros(8));
        // tanh-bounded output gate product
        assert!(a.hidden.iter().all(|h| h.abs() < 1.0));
    }

    #[test]
    fn test_replay_matches_manual_steps() {
        let cell = seeded_cell(4);
        let values = [0.1, 0.5, 0.9];

        let manual = values
            .iter()
            .fold(LstmState::zeros(4), |state, &x| cell.step(&state, x));
        assert_eq!(cell.replay(LstmState::zeros(4), &values), manual);
    }

    #[test]
    fn test_smoothing_decays_toward_floor() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 5) as f64).collect();
        let series =
            HistoricalSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &closes)
                .unwrap();
        let trained = LstmForecaster::default()
            .with_seed(3)
            .train(&series, &Cancellation::new())
            .unwrap();

        assert!((trained.smoothing(0) - 1.0).abs() < 1e-12);
        assert!(trained.smoothing(10) < trained.smoothing(1));
        assert!(trained.smoothing(1000) >= 0.7);
        assert!(trained.training_loss().is_finite());
    }

    #[test]
    fn test_training_updates_only_the_readout() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 40.0 + 3.0 * (i as f64 / 6.0).sin() + 0.1 * i as f64)
            .collect();
        let series =
            HistoricalSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &closes)
                .unwrap();
        let config = LstmConfig {
            hidden_size: 6,
            epochs: 1,
            ..LstmConfig::default()
        };
        let forecaster = LstmForecaster::new(config.clone()).unwrap().with_seed(17);

        let trained = forecaster.train(&series, &Cancellation::new()).unwrap();
        let (cell, mut readout) = forecaster.initial_weights();
        assert_eq!(trained.cell, cell);

        let (normalized, _) = normalize(&closes).unwrap();
        let mut state = LstmState::zeros(6);
        for pair in normalized.windows(2) {
            state = cell.step(&state, pair[0]);
            let error = pair[1] - readout.dot(&state.hidden);
            readout = &readout + &state.hidden.mapv(|h| config.learning_rate * error * h);
        }
        for (trained_w, expected_w) in trained.readout.iter().zip(readout.iter()) {
            assert!((trained_w - expected_w).abs() < 1e-12);
        }
        assert_ne!(trained.readout, forecaster.initial_weights().1);

        let warm = cell.replay(LstmState::zeros(6), &normalized[80 - 60..]);
        assert_eq!(trained.warm_state, warm);
        assert_ne!(trained.warm_state, LstmState::zeros(6));
    }

    #[test]
    fn test_training_checks_cancellation() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + i as f64).collect();
        let series =
            HistoricalSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &closes)
                .unwrap();
        let cancel = Cancellation::new();
        cancel.cancel();

        let result = LstmForecaster::default().train(&series, &cancel);
        assert!(matches!(result, Err(ForecastError::Cancelled)));
    }
}
