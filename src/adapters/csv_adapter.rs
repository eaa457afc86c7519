//! CSV directory data adapter: one `<ASSET>.csv` per asset.

use crate::domain::error::StockscopeError;
use crate::domain::price_record::PriceRecord;
use crate::domain::series_table::{AssetSeries, SeriesTable};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%Y%m%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_HEADERS: &[&str] = &["date", "datetime", "timestamp", "time"];

#[derive(Debug, Clone)]
pub struct CsvDirectoryAdapter {
    base_path: PathBuf,
    date_format: Option<String>,
}

/// Header positions resolved once per file.
struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord, origin: &str) -> Result<Self, StockscopeError> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| names.iter().position(|n| n == c))
        };
        let require = |candidates: &[&str], label: &str| {
            find(candidates).ok_or_else(|| {
                StockscopeError::data_load(origin, format!("missing {} column", label))
            })
        };

        let date = require(DATE_HEADERS, "date")?;
        let open = require(&["open"], "open")?;
        let high = require(&["high"], "high")?;
        let low = require(&["low"], "low")?;
        let close = require(&["close", "adj close", "adj_close"], "close")?;

        let used = [date, open, high, low, close];
        let extras = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(i, name)| (i, name.trim().to_string()))
            .collect();

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            extras,
        })
    }
}

impl CsvDirectoryAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            date_format: None,
        }
    }

    /// Restricts date parsing to a single chrono format string.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn origin(&self) -> String {
        self.base_path.display().to_string()
    }

    /// `*.csv` files in the directory, sorted by path.
    fn csv_files(&self) -> Result<Vec<PathBuf>, StockscopeError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            StockscopeError::data_load(self.origin(), format!("failed to read directory: {}", e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StockscopeError::data_load(self.origin(), format!("directory entry error: {}", e))
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-csv entry");
            }
        }

        files.sort();
        Ok(files)
    }

    fn asset_id(path: &Path) -> Option<String> {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
    }

    pub fn load_file(&self, path: &Path) -> Result<AssetSeries, StockscopeError> {
        let origin = path.display().to_string();
        let asset_id = Self::asset_id(path)
            .ok_or_else(|| StockscopeError::data_load(origin.as_str(), "empty file name"))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| StockscopeError::data_load(origin.as_str(), format!("failed to open: {}", e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| StockscopeError::data_load(origin.as_str(), format!("CSV header error: {}", e)))?
            .clone();
        let columns = ColumnMap::from_headers(&headers, &origin)?;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| {
                StockscopeError::data_load(origin.as_str(), format!("CSV parse error: {}", e))
            })?;
            // Header is line 1.
            let line = row + 2;
            records.push(self.parse_row(&record, &columns, &asset_id, &origin, line)?);
        }

        if records.is_empty() {
            warn!(asset = %asset_id, file = %origin, "file has no data rows");
        }

        let series = AssetSeries::new(asset_id, records).map_err(|e| match e {
            StockscopeError::DataLoad { reason, .. } => StockscopeError::data_load(origin.as_str(), reason),
            other => other,
        })?;
        debug!(asset = series.asset_id(), rows = series.len(), "asset loaded");
        Ok(series)
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        columns: &ColumnMap,
        asset_id: &str,
        origin: &str,
        line: usize,
    ) -> Result<PriceRecord, StockscopeError> {
        let field = |index: usize, label: &str| {
            record.get(index).ok_or_else(|| {
                StockscopeError::data_load(origin, format!("line {}: missing {} value", line, label))
            })
        };
        let price = |index: usize, label: &str| -> Result<f64, StockscopeError> {
            let raw = field(index, label)?;
            let value = raw.parse::<f64>().map_err(|e| {
                StockscopeError::data_load(
                    origin,
                    format!("line {}: invalid {} value {:?}: {}", line, label, raw, e),
                )
            })?;
            if !value.is_finite() {
                return Err(StockscopeError::data_load(
                    origin,
                    format!("line {}: non-finite {} value {:?}", line, label, raw),
                ));
            }
            Ok(value)
        };

        let raw_date = field(columns.date, "date")?;
        let date = parse_date(raw_date, self.date_format.as_deref()).ok_or_else(|| {
            StockscopeError::data_load(origin, format!("line {}: invalid date {:?}", line, raw_date))
        })?;

        let mut price_record = PriceRecord::new(
            asset_id,
            date,
            price(columns.open, "open")?,
            price(columns.high, "high")?,
            price(columns.low, "low")?,
            price(columns.close, "close")?,
        );
        for (index, name) in &columns.extras {
            let value = record.get(*index).unwrap_or_default();
            price_record = price_record.with_extra(name.as_str(), value);
        }
        Ok(price_record)
    }
}

/// Parses a calendar date, dropping any time component.
///
/// With an explicit `format` only that format is tried.
pub fn parse_date(raw: &str, format: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(fmt) = format {
        return NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, fmt).ok().map(|dt| dt.date()));
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

impl DataPort for CsvDirectoryAdapter {
    fn load_table(&self) -> Result<SeriesTable, StockscopeError> {
        let files = self.csv_files()?;
        if files.is_empty() {
            return Err(StockscopeError::data_load(
                self.origin(),
                "no .csv files found",
            ));
        }

        let series = files
            .iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>, _>>()?;
        let table = SeriesTable::from_series(series)?;

        info!(
            assets = table.asset_count(),
            rows = table.len(),
            dir = %self.base_path.display(),
            "price data loaded"
        );
        Ok(table)
    }

    fn list_assets(&self) -> Result<Vec<String>, StockscopeError> {
        let mut assets: Vec<String> = self
            .csv_files()?
            .iter()
            .filter_map(|path| Self::asset_id(path))
            .collect();
        assets.sort();
        assets.dedup();
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let aapl = "Date,Open,High,Low,Close,Volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        let msft = "Date,Open,High,Low,Close\n\
            2024-01-15,300.0,310.0,295.0,305.0\n";

        fs::write(path.join("AAPL.csv"), aapl).unwrap();
        fs::write(path.join("MSFT.csv"), msft).unwrap();
        fs::write(path.join("notes.txt"), "not price data").unwrap();

        (dir, path)
    }

    #[test]
    fn load_table_reads_all_assets() {
        let (_dir, path) = setup_test_data();
        let table = CsvDirectoryAdapter::new(path).load_table().unwrap();

        assert_eq!(table.asset_ids().collect::<Vec<_>>(), vec!["AAPL", "MSFT"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn load_table_sorts_by_date() {
        let (_dir, path) = setup_test_data();
        let table = CsvDirectoryAdapter::new(path).load_table().unwrap();

        let records = table.asset("AAPL").unwrap().records();
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2024-01-15"), d("2024-01-16"), d("2024-01-17")]);
        assert_eq!(records[0].open, 100.0);
        assert_eq!(records[0].high, 110.0);
        assert_eq!(records[0].low, 90.0);
        assert_eq!(records[0].close, 105.0);
    }

    #[test]
    fn extra_columns_pass_through() {
        let (_dir, path) = setup_test_data();
        let table = CsvDirectoryAdapter::new(path).load_table().unwrap();

        let first = &table.asset("AAPL").unwrap().records()[0];
        assert_eq!(first.asset_id, "AAPL");
        assert_eq!(first.extra_field("Volume"), Some("50000"));
        assert!(table.asset("MSFT").unwrap().records()[0].extra.is_empty());
    }

    #[test]
    fn list_assets_uses_file_stems() {
        let (_dir, path) = setup_test_data();
        let assets = CsvDirectoryAdapter::new(path).list_assets().unwrap();
        assert_eq!(assets, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn missing_directory_fails() {
        let adapter = CsvDirectoryAdapter::new(PathBuf::from("/nonexistent/stockscope/data"));
        assert!(matches!(adapter.load_table(), Err(StockscopeError::DataLoad { .. })));
    }

    #[test]
    fn empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table();
        assert!(matches!(result, Err(StockscopeError::DataLoad { reason, .. }) if reason.contains("no .csv")));
    }

    #[test]
    fn missing_close_column_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "Date,Open,High,Low\n2024-01-15,1,2,0.5\n",
        )
        .unwrap();
        let result = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table();
        assert!(matches!(result, Err(StockscopeError::DataLoad { reason, .. }) if reason.contains("close")));
    }

    #[test]
    fn malformed_row_fails_whole_load() {
        let (dir, path) = setup_test_data();
        fs::write(
            dir.path().join("TSLA.csv"),
            "Date,Open,High,Low,Close\n2024-01-15,1,2,0.5,1.5\n2024-01-16,1,2,abc,1.5\n",
        )
        .unwrap();
        let result = CsvDirectoryAdapter::new(path).load_table();
        assert!(matches!(result, Err(StockscopeError::DataLoad { reason, .. }) if reason.contains("line 3")));
    }

    #[test]
    fn non_finite_price_fails_with_line() {
        for raw in ["NaN", "inf", "-Infinity"] {
            let dir = TempDir::new().unwrap();
            fs::write(
                dir.path().join("AAA.csv"),
                format!("Date,Open,High,Low,Close\n2024-01-15,1,2,0.5,1.5\n2024-01-16,1,2,0.5,{raw}\n"),
            )
            .unwrap();
            let result = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table();
            assert!(
                matches!(result, Err(StockscopeError::DataLoad { ref reason, .. }) if reason.contains("line 3") && reason.contains("close")),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn bad_date_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "Date,Open,High,Low,Close\nyesterday,1,2,0.5,1.5\n",
        )
        .unwrap();
        let result = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table();
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_date_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("DUP.csv"),
            "Date,Open,High,Low,Close\n2024-01-15,1,2,0.5,1.5\n2024-01-15,1,2,0.5,1.6\n",
        )
        .unwrap();
        let result = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table();
        assert!(matches!(result, Err(StockscopeError::DataLoad { origin, .. }) if origin.ends_with("DUP.csv")));
    }

    #[test]
    fn short_record_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("S.csv"),
            "Date,Open,High,Low,Close\n2024-01-15,1,2\n",
        )
        .unwrap();
        assert!(CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table().is_err());
    }

    #[test]
    fn header_only_file_is_empty_asset() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("NEW.csv"), "Date,Open,High,Low,Close\n").unwrap();
        let table = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table().unwrap();
        assert!(table.contains_asset("NEW"));
        assert!(table.is_empty());
    }

    #[test]
    fn headers_are_case_insensitive_and_adj_close_accepted() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            " DATE , open ,HIGH,Low,Adj Close\n2024-01-15,1,2,0.5,1.5\n",
        )
        .unwrap();
        let table = CsvDirectoryAdapter::new(dir.path().to_path_buf()).load_table().unwrap();
        assert_eq!(table.asset("X").unwrap().records()[0].close, 1.5);
    }

    #[test]
    fn explicit_date_format() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "Date,Open,High,Low,Close\n15.01.2024,1,2,0.5,1.5\n",
        )
        .unwrap();
        let table = CsvDirectoryAdapter::new(dir.path().to_path_buf())
            .with_date_format("%d.%m.%Y")
            .load_table()
            .unwrap();
        assert_eq!(table.asset("X").unwrap().records()[0].date, d("2024-01-15"));
    }

    #[test]
    fn parse_date_accepts_common_forms() {
        let expected = d("2024-01-15");
        assert_eq!(parse_date("2024-01-15", None), Some(expected));
        assert_eq!(parse_date("2024/01/15", None), Some(expected));
        assert_eq!(parse_date("01/15/2024", None), Some(expected));
        assert_eq!(parse_date("15-01-2024", None), Some(expected));
        assert_eq!(parse_date("20240115", None), Some(expected));
        assert_eq!(parse_date("2024-01-15 16:00:00", None), Some(expected));
        assert_eq!(parse_date("2024-01-15T16:00:00", None), Some(expected));
        assert_eq!(parse_date("2024-01-15T09:30:00-05:00", None), Some(expected));
        assert_eq!(parse_date("not a date", None), None);
    }

    #[test]
    fn parse_date_explicit_format_is_exclusive() {
        assert_eq!(parse_date("2024-01-15", Some("%d.%m.%Y")), None);
        assert_eq!(
            parse_date("15.01.2024 10:00", Some("%d.%m.%Y %H:%M")),
            Some(d("2024-01-15"))
        );
    }
}
