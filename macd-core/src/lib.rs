pub mod backtest;
pub mod chart;
pub mod config;
pub mod indicator;
pub mod service;
pub mod signal;
