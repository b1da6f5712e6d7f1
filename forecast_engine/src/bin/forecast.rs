//! Forecast closing prices from a CSV history file
//!
//! ```text
//! forecast --csv data/AAPL.csv --ticker AAPL --days 10 --seed 42
//! ```

use clap::Parser;
use forecast_engine::logging::{init_tracing, DEFAULT_FILTER};
use forecast_engine::source::DEFAULT_LOOKBACK;
use forecast_engine::{DataLoader, EngineConfig, ForecastEngine, JsonLinesSink};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Short-horizon closing price forecasts")]
struct Args {
    /// CSV file with `date` and `close` columns
    #[arg(long)]
    csv: PathBuf,

    /// Ticker symbol the history belongs to
    #[arg(long)]
    ticker: String,

    /// Number of days to forecast
    #[arg(long, default_value_t = 30)]
    days: usize,

    /// Fixed seed for reproducible LSTM output
    #[arg(long)]
    seed: Option<u64>,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append predictions to this JSON lines file
    #[arg(long)]
    store: Option<PathBuf>,

    /// Run both models concurrently
    #[arg(long)]
    parallel: bool,

    /// Most recent points to use from the file
    #[arg(long, default_value_t = DEFAULT_LOOKBACK)]
    lookback: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(DEFAULT_FILTER)?;
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.parallel_models |= args.parallel;

    let mut engine = ForecastEngine::new(config)?;
    if let Some(path) = &args.store {
        engine = engine.with_sink(Arc::new(JsonLinesSink::new(path)));
    }

    let series = DataLoader::from_csv(&args.csv)?.tail(args.lookback);
    let result = engine.forecast(&args.ticker, &series, args.days)?;

    println!("{}", result.to_json()?);
    Ok(())
}
