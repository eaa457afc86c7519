//! Simple Moving Average over closing prices.
//!
//! SMA(n)[i] = (C[i-n+1] + ... + C[i]) / n
//! Warmup: first (n-1) rows are undefined. Period 0 is undefined everywhere,
//! as is any window holding a non-finite close.

use crate::domain::indicator::{IndicatorColumn, IndicatorPoint, IndicatorType};
use crate::domain::price_record::PriceRecord;

/// `records` must be one date-ascending asset partition.
pub fn calculate_sma(records: &[PriceRecord], period: usize) -> IndicatorColumn {
    let values = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let value = if period > 0 && i + 1 >= period {
                // Summed per window, no running total.
                let window = &records[i + 1 - period..=i];
                let mean = window.iter().map(|r| r.close).sum::<f64>() / period as f64;
                mean.is_finite().then_some(mean)
            } else {
                None
            };
            IndicatorPoint {
                date: record.date,
                value,
            }
        })
        .collect();

    IndicatorColumn {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
