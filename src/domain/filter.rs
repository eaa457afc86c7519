//! Asset-subset and date-window filtering over a [`SeriesTable`].
//!
//! A [`FilteredView`] borrows contiguous, date-sorted slices straight out of
//! the table, so building one never copies records and never touches the table.

use crate::domain::error::StockscopeError;
use crate::domain::price_record::PriceRecord;
use crate::domain::series_table::{AssetSeries, SeriesTable};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Inclusive `[start, end]` calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StockscopeError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// The table's min..=max date, or `None` for an empty table.
    pub fn full(table: &SeriesTable) -> Option<Self> {
        table
            .date_bounds()
            .map(|(start, end)| Self { start, end })
    }

    pub fn validate(&self) -> Result<(), StockscopeError> {
        if self.start > self.end {
            return Err(StockscopeError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl From<(NaiveDate, NaiveDate)> for DateRange {
    fn from((start, end): (NaiveDate, NaiveDate)) -> Self {
        Self { start, end }
    }
}

/// The visible rows of one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSlice<'a> {
    pub asset_id: &'a str,
    pub records: &'a [PriceRecord],
}

impl<'a> AssetSlice<'a> {
    fn clip(series: &'a AssetSeries, range: DateRange) -> Self {
        let records = series.records();
        let lo = records.partition_point(|r| r.date < range.start);
        let hi = records.partition_point(|r| r.date <= range.end);
        Self {
            asset_id: series.asset_id(),
            records: &records[lo..hi],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only projection of a table. Partitions are in ascending asset order
/// and never empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredView<'a> {
    partitions: Vec<AssetSlice<'a>>,
}

impl<'a> FilteredView<'a> {
    pub fn partitions(&self) -> &[AssetSlice<'a>] {
        &self.partitions
    }

    pub fn partition(&self, asset_id: &str) -> Option<&AssetSlice<'a>> {
        self.partitions.iter().find(|p| p.asset_id == asset_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &'a PriceRecord> + '_ {
        self.partitions.iter().flat_map(|p| p.records.iter())
    }

    pub fn asset_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.partitions.iter().map(|p| p.asset_id)
    }

    pub fn len(&self) -> usize {
        self.partitions.iter().map(AssetSlice::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Restricts `table` to `selected_assets` and the inclusive `range`.
///
/// An empty selection, ids the table does not hold, and windows outside the
/// table's dates all give an empty or truncated view. Only `start > end` fails.
pub fn apply<'a>(
    table: &'a SeriesTable,
    selected_assets: &BTreeSet<String>,
    range: impl Into<DateRange>,
) -> Result<FilteredView<'a>, StockscopeError> {
    let range = range.into();
    range.validate()?;

    let partitions: Vec<AssetSlice<'a>> = selected_assets
        .iter()
        .filter_map(|id| table.asset(id))
        .map(|series| AssetSlice::clip(series, range))
        .filter(|slice| !slice.is_empty())
        .collect();

    debug!(
        assets = partitions.len(),
        start = %range.start,
        end = %range.end,
        "filtered view built"
    );

    Ok(FilteredView { partitions })
}
