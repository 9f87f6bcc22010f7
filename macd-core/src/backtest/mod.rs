pub mod engine;
pub mod metrics;
pub mod types;

pub use engine::BacktestEngine;
pub use metrics::MetricsCalculator;
pub use types::{BacktestConfig, BacktestError, BacktestSummary, Metrics, SimulationState, Snapshot, Trade};
