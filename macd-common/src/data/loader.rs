// =================================================================
// data/loader.rs - CSV Price Loader
// =================================================================

use super::{DataError, PricePoint};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Column layout and sampling applied while reading a price file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Zero-based column holding the date
    pub date_column: usize,
    /// Zero-based column holding the daily high
    pub high_column: usize,
    /// Zero-based column holding the daily low
    pub low_column: usize,
    /// chrono format string for the date column
    pub date_format: String,
    /// Keep every n-th row, counted in file order
    pub stride: usize,
    /// Maximum number of rows kept after striding
    pub max_rows: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            date_column: 0,
            high_column: 3,
            low_column: 4,
            date_format: "%Y-%m-%d".to_string(),
            stride: 3,
            max_rows: Some(1000),
        }
    }
}

impl LoaderConfig {
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_columns(mut self, date: usize, high: usize, low: usize) -> Self {
        self.date_column = date;
        self.high_column = high;
        self.low_column = low;
        self
    }
}

/// Reads daily price rows into an ascending `PricePoint` series
#[derive(Debug, Clone, Default)]
pub struct PriceLoader {
    config: LoaderConfig,
}

impl PriceLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a CSV file with a header row
    pub fn load_file(&self, path: &Path) -> Result<Vec<PricePoint>, DataError> {
        let file = File::open(path)?;
        let points = self.load_from_reader(BufReader::new(file))?;
        info!("Loaded {} price rows from {}", points.len(), path.display());
        Ok(points)
    }

    /// Stride and cap are applied in file order, then rows are sorted by date.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Vec<PricePoint>, DataError> {
        if self.config.stride == 0 {
            return Err(DataError::InvalidSampling("stride must be at least 1".to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let cap = self.config.max_rows.unwrap_or(usize::MAX);
        let mut points = Vec::new();

        for (row, record) in reader.records().enumerate() {
            if points.len() >= cap {
                break;
            }
            let record = record?;
            if row % self.config.stride != 0 {
                continue;
            }
            points.push(self.parse_record(row, &record)?);
        }

        if points.is_empty() {
            return Err(DataError::Empty);
        }

        // Exchange exports are usually newest first
        points.sort_by_key(|p| p.date);
        debug!(
            "Sampled {} rows (stride {}, cap {:?})",
            points.len(),
            self.config.stride,
            self.config.max_rows
        );

        Ok(points)
    }

    fn parse_record(&self, row: usize, record: &csv::StringRecord) -> Result<PricePoint, DataError> {
        let field = |column: usize| {
            record
                .get(column)
                .map(str::trim)
                .ok_or(DataError::MissingColumn { row, column })
        };

        let raw_date = field(self.config.date_column)?;
        let date = NaiveDate::parse_from_str(raw_date, &self.config.date_format).map_err(|e| {
            DataError::InvalidDate {
                row,
                value: raw_date.to_string(),
                reason: e.to_string(),
            }
        })?;

        let high = parse_price(row, field(self.config.high_column)?)?;
        let low = parse_price(row, field(self.config.low_column)?)?;

        Ok(PricePoint::new(date, high, low))
    }
}

fn parse_price(row: usize, raw: &str) -> Result<Decimal, DataError> {
    let price = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| DataError::InvalidPrice {
            row,
            value: raw.to_string(),
            reason: e.to_string(),
        })?;

    if price.is_sign_negative() {
        return Err(DataError::InvalidPrice {
            row,
            value: raw.to_string(),
            reason: "price must not be negative".to_string(),
        });
    }

    Ok(price)
}
