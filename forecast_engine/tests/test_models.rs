use approx::assert_relative_eq;
use chrono::NaiveDate;
use forecast_engine::models::{LinearTrend, LstmForecaster};
use forecast_engine::{
    Cancellation, ForecastError, ForecastModel, HistoricalSeries, LstmConfig, Prediction,
    TrainedForecastModel,
};
use rstest::rstest;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
}

fn request_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn create_series(closes: &[f64]) -> HistoricalSeries {
    HistoricalSeries::from_closes(start_date(), closes).unwrap()
}

/// Oscillating series with a mild upward drift
fn wave(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 100.0 + 8.0 * (i as f64 / 5.0).sin() + 0.2 * i as f64)
        .collect()
}

fn assert_well_formed(predictions: &[Prediction], days: usize) {
    assert_eq!(predictions.len(), days);

    for (i, p) in predictions.iter().enumerate() {
        assert_eq!(
            p.target_date,
            request_date() + chrono::Duration::days(i as i64 + 1)
        );
        assert!(p.predicted_price >= 0.0);
        assert!(p.confidence_lower >= 0.0);
        assert!(p.confidence_lower <= p.predicted_price);
        assert!(p.predicted_price <= p.confidence_upper);
    }

    assert!(predictions
        .windows(2)
        .all(|w| w[0].target_date < w[1].target_date));
}

fn trend_forecast(closes: &[f64], days: usize) -> Vec<Prediction> {
    LinearTrend::default()
        .train(&create_series(closes), &Cancellation::new())
        .unwrap()
        .forecast(days, request_date(), &Cancellation::new())
        .unwrap()
}

#[rstest]
#[case(10, 1)]
#[case(10, 90)]
#[case(45, 7)]
#[case(120, 30)]
#[case(365, 90)]
fn test_trend_forecast_shape(#[case] len: usize, #[case] days: usize) {
    let predictions = trend_forecast(&wave(len), days);
    assert_well_formed(&predictions, days);
}

#[rstest]
#[case(12)]
#[case(60)]
#[case(200)]
fn test_trend_stays_within_fifteen_percent(#[case] len: usize) {
    // Steep exponential growth pushes the raw line far past the band
    let closes: Vec<f64> = (0..len).map(|i| 20.0 * 1.05f64.powi(i as i32)).collect();
    let last = *closes.last().unwrap();

    for p in trend_forecast(&closes, 90) {
        assert!((p.predicted_price - last).abs() <= 0.15 * last + 1e-9);
    }
}

#[test]
fn test_trend_confidence_widens_with_horizon() {
    let predictions = trend_forecast(&wave(80), 20);
    let half_widths: Vec<f64> = predictions
        .iter()
        .map(|p| p.confidence_upper - p.predicted_price)
        .collect();

    assert!(half_widths[0] > 0.0);
    assert!(half_widths.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_trend_constant_series() {
    let predictions = trend_forecast(&[100.0; 20], 5);

    assert_eq!(predictions.len(), 5);
    for p in &predictions {
        assert_relative_eq!(p.predicted_price, 100.0, epsilon = 1e-9);
        assert!(p.interval_width() < 1e-9);
    }
}

#[test]
fn test_trend_linear_series_continues_slope() {
    // 90 evenly spaced values from 50.0 to 140.0
    let step = 90.0 / 89.0;
    let closes: Vec<f64> = (0..90).map(|i| 50.0 + step * i as f64).collect();

    let trained = LinearTrend::default()
        .train(&create_series(&closes), &Cancellation::new())
        .unwrap();
    assert_eq!(trained.window(), 30);
    assert_relative_eq!(trained.slope(), step, epsilon = 1e-9);

    let predictions = trained
        .forecast(10, request_date(), &Cancellation::new())
        .unwrap();
    for (i, p) in predictions.iter().enumerate() {
        let day = (i + 1) as f64;
        assert_relative_eq!(p.predicted_price, 140.0 + step * (day + 1.0), epsilon = 1e-6);
    }

    // Far enough out the line crosses the +15% band and is clamped to it
    let long = trained
        .forecast(90, request_date(), &Cancellation::new())
        .unwrap();
    assert_relative_eq!(long[89].predicted_price, 161.0, epsilon = 1e-9);
    assert!(long.iter().all(|p| p.predicted_price <= 161.0 + 1e-9));
}

#[test]
fn test_trend_insufficient_data() {
    let result = LinearTrend::default().train(&create_series(&wave(9)), &Cancellation::new());

    match result {
        Err(ForecastError::InsufficientData {
            required, actual, ..
        }) => {
            assert_eq!(required, 10);
            assert_eq!(actual, 9);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[rstest]
#[case(60, 1)]
#[case(60, 14)]
#[case(250, 45)]
fn test_lstm_forecast_shape_and_bounds(#[case] len: usize, #[case] days: usize) {
    let closes = wave(len);
    let last = *closes.last().unwrap();

    let predictions = LstmForecaster::default()
        .run(&create_series(&closes), days, request_date(), &Cancellation::new())
        .unwrap()
        .predictions;

    assert_well_formed(&predictions, days);
    for p in &predictions {
        assert!((p.predicted_price - last).abs() <= 0.20 * last + 1e-9);
    }
}

#[test]
fn test_lstm_fixed_seed_is_reproducible() {
    let series = create_series(&wave(90));
    let model = LstmForecaster::default().with_seed(42);

    let first = model
        .run(&series, 10, request_date(), &Cancellation::new())
        .unwrap();
    let second = model
        .run(&series, 10, request_date(), &Cancellation::new())
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_lstm_constant_series_stays_at_price() {
    let predictions = LstmForecaster::default()
        .with_seed(1)
        .run(&create_series(&[75.0; 70]), 5, request_date(), &Cancellation::new())
        .unwrap()
        .predictions;

    for p in &predictions {
        // Zero range maps every denormalized value back onto the price
        assert_relative_eq!(p.predicted_price, 75.0, epsilon = 1e-9);
        assert!(p.interval_width() < 1e-9);
    }
}

#[test]
fn test_lstm_insufficient_data() {
    let result = LstmForecaster::default().train(&create_series(&wave(59)), &Cancellation::new());

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 60,
            actual: 59,
            ..
        })
    ));
}

#[test]
fn test_lstm_raw_forecast_is_denormalized() {
    let closes = wave(120);
    let trained = LstmForecaster::default()
        .with_seed(9)
        .train(&create_series(&closes), &Cancellation::new())
        .unwrap();

    let bounds = trained.normalization();
    assert!(bounds.min < bounds.max);

    let raw = trained.raw_forecast(5, &Cancellation::new()).unwrap();
    assert_eq!(raw.len(), 5);
    assert!(raw.iter().all(|v| v.is_finite()));
}

#[test]
fn test_lstm_small_config() {
    let config = LstmConfig {
        hidden_size: 8,
        epochs: 3,
        ..LstmConfig::default()
    };
    let predictions = LstmForecaster::new(config)
        .unwrap()
        .with_seed(5)
        .run(&create_series(&wave(60)), 3, request_date(), &Cancellation::new())
        .unwrap()
        .predictions;

    assert_well_formed(&predictions, 3);
}

#[test]
fn test_invalid_model_config() {
    let config = LstmConfig {
        learning_rate: 0.0,
        ..LstmConfig::default()
    };
    assert!(matches!(
        LstmForecaster::new(config),
        Err(ForecastError::ConfigError(_))
    ));
}
