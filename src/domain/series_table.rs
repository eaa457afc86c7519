//! SeriesTable: the immutable, per-asset date-sorted union of all loaded records.

use crate::domain::error::StockscopeError;
use crate::domain::price_record::PriceRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// One asset partition. Records are strictly ascending by date.
#[derive(Debug, Clone)]
pub struct AssetSeries {
    asset_id: String,
    records: Vec<PriceRecord>,
}

impl AssetSeries {
    /// Sorts `records` by date and tags each with `asset_id`.
    ///
    /// Fails if two records share a date.
    pub fn new(
        asset_id: impl Into<String>,
        mut records: Vec<PriceRecord>,
    ) -> Result<Self, StockscopeError> {
        let asset_id = asset_id.into();
        records.sort_by_key(|r| r.date);

        if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(StockscopeError::data_load(
                asset_id.as_str(),
                format!("duplicate date {}", pair[1].date),
            ));
        }
        for record in records.iter_mut().filter(|r| r.asset_id != asset_id) {
            record.asset_id.clone_from(&asset_id);
        }

        Ok(Self { asset_id, records })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (first date, last date, row count), or `None` for an empty partition.
    pub fn data_range(&self) -> Option<(NaiveDate, NaiveDate, usize)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date, last.date, self.records.len()))
    }
}

/// Read-only after construction; a reload builds a new table.
#[derive(Debug, Clone, Default)]
pub struct SeriesTable {
    assets: BTreeMap<String, AssetSeries>,
}

impl SeriesTable {
    /// Groups arbitrary records by asset and sorts every partition.
    pub fn from_records(records: Vec<PriceRecord>) -> Result<Self, StockscopeError> {
        let mut grouped: BTreeMap<String, Vec<PriceRecord>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.asset_id.clone())
                .or_default()
                .push(record);
        }

        let series = grouped
            .into_iter()
            .map(|(asset_id, records)| AssetSeries::new(asset_id, records))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_series(series)
    }

    /// Concatenates already-built partitions. Asset ids must be unique.
    pub fn from_series<I>(series: I) -> Result<Self, StockscopeError>
    where
        I: IntoIterator<Item = AssetSeries>,
    {
        let mut assets = BTreeMap::new();
        for s in series {
            if assets.contains_key(&s.asset_id) {
                return Err(StockscopeError::data_load(
                    s.asset_id.as_str(),
                    "asset loaded more than once",
                ));
            }
            assets.insert(s.asset_id.clone(), s);
        }
        Ok(Self { assets })
    }

    /// Asset ids in ascending order.
    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn contains_asset(&self, asset_id: &str) -> bool {
        self.assets.contains_key(asset_id)
    }

    pub fn asset(&self, asset_id: &str) -> Option<&AssetSeries> {
        self.assets.get(asset_id)
    }

    pub fn partitions(&self) -> impl Iterator<Item = &AssetSeries> {
        self.assets.values()
    }

    /// All records, grouped by asset (ascending id), date-ascending within each.
    pub fn records(&self) -> impl Iterator<Item = &PriceRecord> {
        self.assets.values().flat_map(|s| s.records.iter())
    }

    pub fn len(&self) -> usize {
        self.assets.values().map(AssetSeries::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest and latest date over every asset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.assets
            .values()
            .filter_map(AssetSeries::data_range)
            .fold(None, |acc, (first, last, _)| match acc {
                None => Some((first, last)),
                Some((min, max)) => Some((min.min(first), max.max(last))),
            })
    }

    pub fn data_range(&self, asset_id: &str) -> Option<(NaiveDate, NaiveDate, usize)> {
        self.assets.get(asset_id).and_then(AssetSeries::data_range)
    }
}

/// Sorted, de-duplicated union of the given dates.
pub fn build_unified_timeline<I>(dates: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let unique_dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
    unique_dates.into_iter().collect()
}
