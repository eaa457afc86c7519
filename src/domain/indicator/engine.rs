//! Per-row indicator output for a [`FilteredView`].
//!
//! Every indicator is computed independently inside each asset partition of the
//! view. Nothing is cached: the same view always yields the same rows, and a
//! different view (other assets or dates) is recomputed from scratch.

use crate::domain::filter::{AssetSlice, FilteredView};
use crate::domain::indicator::returns::{calculate_cumulative_return, calculate_daily_return_pct};
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price_record::PriceRecord;
use chrono::NaiveDate;
use tracing::debug;

pub const MA_FAST_PERIOD: usize = 20;
pub const MA_SLOW_PERIOD: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow<'a> {
    pub record: &'a PriceRecord,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub daily_return_pct: Option<f64>,
    pub cumulative_return: Option<f64>,
}

impl<'a> IndicatorRow<'a> {
    pub fn asset_id(&self) -> &'a str {
        &self.record.asset_id
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn close(&self) -> f64 {
        self.record.close
    }
}

/// Rows aligned 1:1 with the view they were computed from, in view order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSeries<'a> {
    rows: Vec<IndicatorRow<'a>>,
}

impl<'a> IndicatorSeries<'a> {
    pub fn rows(&self) -> &[IndicatorRow<'a>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One asset's rows, date-ascending.
    pub fn rows_for<'s>(&'s self, asset_id: &'s str) -> impl Iterator<Item = &'s IndicatorRow<'a>> {
        self.rows.iter().filter(move |r| r.asset_id() == asset_id)
    }

    /// Distinct asset ids in row order.
    pub fn asset_ids(&self) -> Vec<&'a str> {
        let mut ids: Vec<&'a str> = Vec::new();
        for row in &self.rows {
            if ids.last() != Some(&row.asset_id()) {
                ids.push(row.asset_id());
            }
        }
        ids
    }

    /// Pass-through column names across all rows in first-seen order. Names
    /// differing only in ASCII case count once.
    pub fn extra_columns(&self) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = Vec::new();
        for row in &self.rows {
            let record: &'a PriceRecord = row.record;
            for (name, _) in &record.extra {
                if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    /// Latest date first; ties keep ascending asset order.
    pub fn newest_first(&self) -> Vec<&IndicatorRow<'a>> {
        let mut rows: Vec<&IndicatorRow<'a>> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.asset_id().cmp(b.asset_id())));
        rows
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn compute<'a>(view: &FilteredView<'a>) -> IndicatorSeries<'a> {
        let mut rows = Vec::with_capacity(view.len());
        for partition in view.partitions() {
            rows.extend(Self::compute_partition(partition));
        }
        debug!(rows = rows.len(), "indicators computed");
        IndicatorSeries { rows }
    }

    fn compute_partition<'a>(partition: &AssetSlice<'a>) -> Vec<IndicatorRow<'a>> {
        let records = partition.records;
        let ma20 = calculate_sma(records, MA_FAST_PERIOD);
        let ma50 = calculate_sma(records, MA_SLOW_PERIOD);
        let daily = calculate_daily_return_pct(records);
        let cumulative = calculate_cumulative_return(records);

        records
            .iter()
            .enumerate()
            .map(|(i, record)| IndicatorRow {
                record,
                ma20: ma20.values[i].value,
                ma50: ma50.values[i].value,
                daily_return_pct: daily.values[i].value,
                cumulative_return: cumulative.values[i].value,
            })
            .collect()
    }
}
