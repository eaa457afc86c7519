//! Cross-asset comparisons derived from an [`IndicatorSeries`]: the per-date
//! "growth race" ranking by cumulative return, and per-asset summaries.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::series_table::build_unified_timeline;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RaceEntry {
    pub asset_id: String,
    pub cumulative_return: f64,
}

/// Ranking of every asset with a defined cumulative return on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceFrame {
    pub date: NaiveDate,
    pub entries: Vec<RaceEntry>,
}

fn rank(entries: &mut [RaceEntry]) {
    entries.sort_by(|a, b| {
        b.cumulative_return
            .partial_cmp(&a.cumulative_return)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.asset_id.cmp(&b.asset_id))
    });
}

/// One frame per date in the series' unified timeline. Assets with no row on
/// a date are absent from that frame rather than carried forward.
pub fn race_frames(series: &IndicatorSeries<'_>) -> Vec<RaceFrame> {
    let mut by_date: BTreeMap<NaiveDate, Vec<RaceEntry>> = BTreeMap::new();
    for row in series.rows() {
        if let Some(cumulative_return) = row.cumulative_return {
            by_date.entry(row.date()).or_default().push(RaceEntry {
                asset_id: row.asset_id().to_string(),
                cumulative_return,
            });
        }
    }

    build_unified_timeline(series.rows().iter().map(|r| r.date()))
        .into_iter()
        .map(|date| {
            let mut entries = by_date.remove(&date).unwrap_or_default();
            rank(&mut entries);
            RaceFrame { date, entries }
        })
        .collect()
}

/// Each asset's latest defined cumulative return, best first.
pub fn final_standings(series: &IndicatorSeries<'_>) -> Vec<RaceEntry> {
    let mut latest: BTreeMap<&str, f64> = BTreeMap::new();
    for row in series.rows() {
        if let Some(value) = row.cumulative_return {
            latest.insert(row.asset_id(), value);
        }
    }

    let mut entries: Vec<RaceEntry> = latest
        .into_iter()
        .map(|(asset_id, cumulative_return)| RaceEntry {
            asset_id: asset_id.to_string(),
            cumulative_return,
        })
        .collect();
    rank(&mut entries);
    entries
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub asset_id: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub rows: usize,
    pub first_close: f64,
    pub last_close: f64,
    pub cumulative_return: Option<f64>,
    pub latest_ma20: Option<f64>,
    pub latest_ma50: Option<f64>,
    pub mean_daily_return_pct: Option<f64>,
    pub best_daily_return_pct: Option<f64>,
    pub worst_daily_return_pct: Option<f64>,
}

impl AssetSummary {
    pub fn compute_per_asset(series: &IndicatorSeries<'_>) -> Vec<AssetSummary> {
        series
            .asset_ids()
            .into_iter()
            .filter_map(|asset_id| {
                let rows: Vec<_> = series.rows_for(asset_id).collect();
                let first = rows.first()?;
                let last = rows.last()?;

                let daily: Vec<f64> = rows.iter().filter_map(|r| r.daily_return_pct).collect();
                let mean_daily_return_pct = if daily.is_empty() {
                    None
                } else {
                    Some(daily.iter().sum::<f64>() / daily.len() as f64)
                };

                Some(AssetSummary {
                    asset_id: asset_id.to_string(),
                    first_date: first.date(),
                    last_date: last.date(),
                    rows: rows.len(),
                    first_close: first.close(),
                    last_close: last.close(),
                    cumulative_return: last.cumulative_return,
                    latest_ma20: last.ma20,
                    latest_ma50: last.ma50,
                    mean_daily_return_pct,
                    best_daily_return_pct: daily.iter().copied().reduce(f64::max),
                    worst_daily_return_pct: daily.iter().copied().reduce(f64::min),
                })
            })
            .collect()
    }
}
