//! Percentage daily return and rebased cumulative return.
//!
//! DAILY[i] = ((C[i] / C[i-1]) - 1) * 100, undefined at i == 0
//! CUM[i]   = (C[i] / C[0]) - 1, where C[0] is the first visible row
//! A zero or non-finite divisor leaves the value undefined.

use crate::domain::indicator::{finite_ratio, IndicatorColumn, IndicatorPoint, IndicatorType};
use crate::domain::price_record::PriceRecord;

pub fn calculate_daily_return_pct(records: &[PriceRecord]) -> IndicatorColumn {
    let values = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let value = match i.checked_sub(1) {
                Some(prev) => {
                    finite_ratio(record.close, records[prev].close).map(|r| (r - 1.0) * 100.0)
                }
                None => None,
            };
            IndicatorPoint {
                date: record.date,
                value,
            }
        })
        .collect();

    IndicatorColumn {
        indicator_type: IndicatorType::DailyReturnPct,
        values,
    }
}

/// Rebased on `records[0]`: a narrower window moves the baseline.
pub fn calculate_cumulative_return(records: &[PriceRecord]) -> IndicatorColumn {
    let values = match records.first() {
        Some(base) => records
            .iter()
            .map(|record| IndicatorPoint {
                date: record.date,
                value: finite_ratio(record.close, base.close).map(|r| r - 1.0),
            })
            .collect(),
        None => Vec::new(),
    };

    IndicatorColumn {
        indicator_type: IndicatorType::CumulativeReturn,
        values,
    }
}
