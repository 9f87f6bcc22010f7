// =================================================================
// chart.rs - Chart Payload
// =================================================================

use chrono::NaiveDate;
use macd_common::data::{Direction, IndicatorPoint};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One value of a plotted line; `None` leaves a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<LinePoint>,
}

/// Vertical line drawn at a crossover date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub date: NaiveDate,
    pub direction: Direction,
    pub color: String,
    pub line_width: f64,
}

impl Marker {
    fn new(date: NaiveDate, direction: Direction) -> Self {
        let color = match direction {
            Direction::Buy => "green",
            Direction::Sell => "red",
        };
        Self {
            date,
            direction,
            color: color.to_string(),
            line_width: 0.2,
        }
    }
}

/// Everything a plotting frontend needs to draw MACD, SIGNAL and value lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<LineSeries>,
    pub markers: Vec<Marker>,
}

impl ChartData {
    pub fn from_series(name: &str, series: &[IndicatorPoint]) -> Self {
        Self {
            title: format!("{}: MACD, SIGNAL and action value in time", name),
            x_label: "Date".to_string(),
            y_label: "Value".to_string(),
            lines: vec![
                line("MACD", series, |p| p.macd),
                line("SIGNAL", series, |p| p.signal),
                line("value", series, |p| p.value.to_f64()),
            ],
            markers: series
                .iter()
                .filter_map(|p| p.crossover.map(|direction| Marker::new(p.date, direction)))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn line<F>(label: &str, series: &[IndicatorPoint], pick: F) -> LineSeries
where
    F: Fn(&IndicatorPoint) -> Option<f64>,
{
    LineSeries {
        label: label.to_string(),
        points: series
            .iter()
            .map(|point| LinePoint {
                date: point.date,
                value: pick(point),
            })
            .collect(),
    }
}
