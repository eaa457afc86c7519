#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use stockscope::domain::error::StockscopeError;
pub use stockscope::domain::price_record::PriceRecord;
use stockscope::domain::series_table::SeriesTable;
use stockscope::ports::data_port::DataPort;
use stockscope::ports::report_port::{ReportContext, ReportPort};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceRecord>>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            error: None,
        }
    }

    pub fn with_closes(mut self, asset: &str, start: &str, closes: &[f64]) -> Self {
        self.data.insert(asset.to_string(), make_series(asset, start, closes));
        self
    }

    pub fn with_records(mut self, asset: &str, records: Vec<PriceRecord>) -> Self {
        self.data.insert(asset.to_string(), records);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_table(&self) -> Result<SeriesTable, StockscopeError> {
        if let Some(reason) = &self.error {
            return Err(StockscopeError::data_load("mock", reason.clone()));
        }
        SeriesTable::from_records(self.data.values().flatten().cloned().collect())
    }

    fn list_assets(&self) -> Result<Vec<String>, StockscopeError> {
        let mut ids: Vec<String> = self.data.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// What a report port was asked to write.
#[derive(Debug, Clone)]
pub struct ReportCall {
    pub title: String,
    pub focus_asset: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: usize,
    pub assets: Vec<String>,
    pub output_path: String,
}

pub struct MockReportPort {
    pub calls: RefCell<Vec<ReportCall>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, ctx: &ReportContext<'_, '_>, output_path: &Path) -> Result<(), StockscopeError> {
        self.calls.borrow_mut().push(ReportCall {
            title: ctx.title.to_string(),
            focus_asset: ctx.focus_asset.map(str::to_string),
            start: ctx.range.start,
            end: ctx.range.end,
            rows: ctx.series.len(),
            assets: ctx.series.asset_ids().into_iter().map(str::to_string).collect(),
            output_path: output_path.display().to_string(),
        });
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn parse(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

pub fn make_record(asset: &str, date: &str, close: f64) -> PriceRecord {
    PriceRecord::new(asset, parse(date), close - 1.0, close + 1.0, close - 2.0, close)
}

/// Consecutive calendar days starting at `start`.
pub fn make_series(asset: &str, start: &str, closes: &[f64]) -> Vec<PriceRecord> {
    let first = parse(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            PriceRecord::new(
                asset,
                first + chrono::Duration::days(i as i64),
                close - 1.0,
                close + 1.0,
                close - 2.0,
                close,
            )
        })
        .collect()
}

pub fn make_table(assets: &[(&str, &[f64])]) -> SeriesTable {
    let records = assets
        .iter()
        .flat_map(|(asset, closes)| make_series(asset, "2024-01-01", closes))
        .collect();
    SeriesTable::from_records(records).unwrap()
}

pub fn all_assets(table: &SeriesTable) -> BTreeSet<String> {
    table.asset_ids().map(str::to_string).collect()
}

pub fn assets(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Writes `<asset>.csv` with a `Date,Open,High,Low,Close` header.
pub fn write_csv(dir: &Path, asset: &str, rows: &[(&str, f64)]) {
    let mut content = String::from("Date,Open,High,Low,Close\n");
    for (date, close) in rows {
        content.push_str(&format!(
            "{},{},{},{},{}\n",
            date,
            close - 1.0,
            close + 1.0,
            close - 2.0,
            close
        ));
    }
    fs::write(dir.join(format!("{asset}.csv")), content).unwrap();
}
