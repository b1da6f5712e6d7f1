use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forecast_engine::{EngineConfig, ForecastEngine, HistoricalSeries};

fn sample_series(len: usize) -> HistoricalSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let closes: Vec<f64> = (0..len)
        .map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0 + i as f64 * 0.1)
        .collect();
    HistoricalSeries::from_closes(start, &closes).unwrap()
}

fn bench_forecast(c: &mut Criterion) {
    let series = sample_series(365);
    let request_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let sequential = ForecastEngine::new(EngineConfig::default().with_seed(7)).unwrap();
    c.bench_function("forecast_365_points_30_days", |b| {
        b.iter(|| {
            sequential
                .forecast_on(
                    "BENCH",
                    black_box(&series),
                    30,
                    request_date,
                    &Default::default(),
                )
                .unwrap()
        })
    });

    let mut config = EngineConfig::default().with_seed(7);
    config.parallel_models = true;
    let parallel = ForecastEngine::new(config).unwrap();
    c.bench_function("forecast_365_points_30_days_parallel", |b| {
        b.iter(|| {
            parallel
                .forecast_on(
                    "BENCH",
                    black_box(&series),
                    30,
                    request_date,
                    &Default::default(),
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_forecast);
criterion_main!(benches);
