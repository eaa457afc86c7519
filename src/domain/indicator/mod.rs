//! Indicator calculations over one asset partition at a time.
//!
//! - `IndicatorPoint`: one dated value, `None` where history is insufficient
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorColumn`: a dated series for one indicator over one partition
//! - [`engine::IndicatorEngine`]: assembles the columns into per-row output

pub mod engine;
pub mod returns;
pub mod sma;

pub use engine::{IndicatorEngine, IndicatorRow, IndicatorSeries};

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    DailyReturnPct,
    CumulativeReturn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumn {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "MA{}", period),
            IndicatorType::DailyReturnPct => write!(f, "Daily Return %"),
            IndicatorType::CumulativeReturn => write!(f, "Cumulative Return"),
        }
    }
}

/// Divides and discards non-finite results (zero or NaN divisors).
pub(crate) fn finite_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}
