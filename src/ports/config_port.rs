//! Configuration access port.

use chrono::NaiveDate;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Trimmed value, `None` when the key is missing or blank.
    fn get_value(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// `Some(Err(raw))` when the key is present but not an integer.
    fn get_int(&self, section: &str, key: &str) -> Option<Result<i64, String>> {
        let raw = self.get_value(section, key)?;
        Some(raw.parse::<i64>().map_err(|_| raw))
    }

    /// `Some(Err(raw))` when the key is present but not a `YYYY-MM-DD` date.
    fn get_date(&self, section: &str, key: &str) -> Option<Result<NaiveDate, String>> {
        let raw = self.get_value(section, key)?;
        Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| raw))
    }
}
