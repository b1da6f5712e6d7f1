//! Historical price data handling

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single closing price for a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices ordered by ascending, unique dates
///
/// The constructor enforces ordering and rejects negative or non-finite
/// prices; once built the series is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct HistoricalSeries {
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    /// Create a validated series
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (idx, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close < 0.0 {
                return Err(ForecastError::DataError(format!(
                    "Invalid closing price {} on {}",
                    point.close, point.date
                )));
            }
            if idx > 0 && points[idx - 1].date >= point.date {
                return Err(ForecastError::DataError(format!(
                    "Dates must be strictly ascending: {} follows {}",
                    point.date,
                    points[idx - 1].date
                )));
            }
        }

        Ok(Self { points })
    }

    /// Create a series of consecutive calendar days starting at `start`
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(offset, &close)| {
                start
                    .checked_add_days(Days::new(offset as u64))
                    .map(|date| PricePoint::new(date, close))
                    .ok_or_else(|| {
                        ForecastError::DataError(format!("Date overflow after {}", start))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }

    /// Get the underlying points
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Get the close prices as a vector
    pub fn close_prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Most recent closing price
    pub fn last_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Most recent date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent `n` points
    pub fn tail(&self, n: usize) -> Self {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }
}

impl TryFrom<Vec<PricePoint>> for HistoricalSeries {
    type Error = ForecastError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<HistoricalSeries> for Vec<PricePoint> {
    fn from(series: HistoricalSeries) -> Self {
        series.points
    }
}

/// Row of a history CSV file
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "timestamp")]
    date: NaiveDate,
    #[serde(alias = "Close", alias = "price", alias = "Price", alias = "adj_close")]
    close: f64,
}

/// Data loader for price history files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series from a CSV file with `date` and `close` columns
    ///
    /// Rows may appear in any order; they are sorted by date before the
    /// series is validated. Extra columns are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<HistoricalSeries> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_reader(reader)
    }

    /// Load a series from CSV text
    pub fn from_csv_str(contents: &str) -> Result<HistoricalSeries> {
        Self::from_reader(csv::Reader::from_reader(contents.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<HistoricalSeries> {
        let mut points = reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(|r| PricePoint::new(r.date, r.close)))
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        points.sort_by_key(|p| p.date);
        HistoricalSeries::new(points)
    }
}
