use config::{Config, ConfigError, Environment, File};
use macd_common::data::LoaderConfig;
use serde::Deserialize;
use std::path::PathBuf;

use crate::backtest::BacktestConfig;
use crate::indicator::MacdParams;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sampling {
    pub stride: usize,
    pub max_rows: Option<usize>,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            stride: 3,
            max_rows: Some(1000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Csv {
    pub date_column: usize,
    pub high_column: usize,
    pub low_column: usize,
    pub date_format: String,
}

impl Default for Csv {
    fn default() -> Self {
        let loader = LoaderConfig::default();
        Self {
            date_column: loader.date_column,
            high_column: loader.high_column,
            low_column: loader.low_column,
            date_format: loader.date_format,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub indicator: MacdParams,
    pub sampling: Sampling,
    pub csv: Csv,
    pub backtest: BacktestConfig,
    pub inputs: Vec<PathBuf>,
    pub chart_dir: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("MACD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(chart_dir) = std::env::var("CHART_DIR") {
            builder = builder.set_override("chart_dir", chart_dir)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            date_column: self.csv.date_column,
            high_column: self.csv.high_column,
            low_column: self.csv.low_column,
            date_format: self.csv.date_format.clone(),
            stride: self.sampling.stride,
            max_rows: self.sampling.max_rows,
        }
    }
}
