//! Sources of historical closing prices

use crate::data::{DataLoader, HistoricalSeries};
use crate::error::{ForecastError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Most recent points a source returns by default
pub const DEFAULT_LOOKBACK: usize = 365;

/// Supplier of ascending, date-unique closing prices for a ticker
pub trait HistoricalDataSource: Send + Sync {
    /// Fetch the history of `ticker`
    fn fetch(&self, ticker: &str) -> Result<HistoricalSeries>;
}

/// Source backed by series held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    series: HashMap<String, HistoricalSeries>,
}

impl InMemoryDataSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the history of a ticker (case-insensitive)
    pub fn insert(&mut self, ticker: &str, series: HistoricalSeries) {
        self.series.insert(ticker.trim().to_uppercase(), series);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_series(mut self, ticker: &str, series: HistoricalSeries) -> Self {
        self.insert(ticker, series);
        self
    }
}

impl HistoricalDataSource for InMemoryDataSource {
    fn fetch(&self, ticker: &str) -> Result<HistoricalSeries> {
        self.series
            .get(&ticker.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| ForecastError::UnknownTicker(ticker.to_string()))
    }
}

/// Source reading `<TICKER>.csv` files from a directory
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    dir: PathBuf,
    lookback: usize,
}

impl CsvDataSource {
    /// Read files from `dir`, keeping the last [`DEFAULT_LOOKBACK`] points
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            lookback: DEFAULT_LOOKBACK,
        }
    }

    /// Change how many trailing points are returned
    pub fn with_lookback(mut self, lookback: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be positive".to_string(),
            ));
        }
        self.lookback = lookback;
        Ok(self)
    }

    fn path_for(&self, ticker: &str) -> Result<PathBuf> {
        let ticker = ticker.trim().to_uppercase();
        // Keep lookups inside the data directory
        if ticker.is_empty() || ticker.contains(['/', '\\']) || ticker.contains("..") {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid ticker: {:?}",
                ticker
            )));
        }
        Ok(self.dir.join(format!("{}.csv", ticker)))
    }
}

impl HistoricalDataSource for CsvDataSource {
    fn fetch(&self, ticker: &str) -> Result<HistoricalSeries> {
        let path = self.path_for(ticker)?;
        if !path.is_file() {
            return Err(ForecastError::UnknownTicker(ticker.to_string()));
        }

        let series = DataLoader::from_csv(&path)?;
        debug!(path = %path.display(), points = series.len(), "Loaded price history");
        Ok(series.tail(self.lookback))
    }
}
