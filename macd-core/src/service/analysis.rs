use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::ServiceError;
use crate::backtest::{BacktestConfig, BacktestEngine, BacktestSummary};
use crate::chart::ChartData;
use crate::config::Settings;
use crate::indicator::{self, MacdParams};
use crate::signal;
use macd_common::data::{CrossoverEvent, IndicatorSeries, LoaderConfig, PriceLoader, PricePoint};

/// Result of running the whole pipeline on one price series
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Instrument name, taken from the file stem
    pub name: String,
    pub series: IndicatorSeries,
    pub events: Vec<CrossoverEvent>,
    pub summary: BacktestSummary,
    /// Where the chart payload was written, if anywhere
    pub chart_path: Option<PathBuf>,
}

/// Runs load → midpoints → MACD → crossovers → backtest for one series
pub struct AnalysisService {
    loader: PriceLoader,
    params: MacdParams,
    engine: BacktestEngine,
    chart_dir: Option<PathBuf>,
}

impl AnalysisService {
    pub fn new(loader: LoaderConfig, params: MacdParams, backtest: BacktestConfig) -> Self {
        Self {
            loader: PriceLoader::new(loader),
            params,
            engine: BacktestEngine::new(backtest),
            chart_dir: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let service = Self::new(
            settings.loader_config(),
            settings.indicator,
            settings.backtest.clone(),
        );
        match &settings.chart_dir {
            Some(dir) => service.with_chart_dir(dir.clone()),
            None => service,
        }
    }

    pub fn with_chart_dir(mut self, dir: PathBuf) -> Self {
        self.chart_dir = Some(dir);
        self
    }

    /// Load a price file and run the pipeline on it
    pub fn analyze_file(&self, path: &Path) -> Result<Analysis, ServiceError> {
        let name = series_name(path);
        let prices = self.loader.load_file(path)?;
        let mut analysis = self.analyze_prices(&name, &prices)?;

        if let Some(dir) = &self.chart_dir {
            analysis.chart_path = Some(write_chart(dir, &analysis)?);
        }

        Ok(analysis)
    }

    /// Run the pipeline on prices that are already loaded and ordered
    pub fn analyze_prices(&self, name: &str, prices: &[PricePoint]) -> Result<Analysis, ServiceError> {
        let midpoints = indicator::midpoints(prices);
        let series = signal::annotate(&indicator::transform(&midpoints, &self.params)?);
        let events = signal::events(&series);
        debug!("{}: {} points, {} crossovers", name, series.len(), events.len());

        let summary = self.engine.run(&series)?;
        info!("{}: net income {}", name, summary.net_income);

        Ok(Analysis {
            name: name.to_string(),
            series,
            events,
            summary,
            chart_path: None,
        })
    }
}

fn series_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_chart(dir: &Path, analysis: &Analysis) -> Result<PathBuf, ServiceError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", analysis.name));
    let chart = ChartData::from_series(&analysis.name, &analysis.series);
    fs::write(&path, chart.to_json()?)?;
    info!("Chart data written to {}", path.display());
    Ok(path)
}
