//! Daily price record for one asset.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub asset_id: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Columns beyond date/OHLC, kept verbatim in file order.
    pub extra: Vec<(String, String)>,
}

impl PriceRecord {
    pub fn new(
        asset_id: impl Into<String>,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            date,
            open,
            high,
            low,
            close,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((column.into(), value.into()));
        self
    }

    /// Looks up a pass-through column, ignoring ASCII case.
    pub fn extra_field(&self, column: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
    }
}
