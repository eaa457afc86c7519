//! Report generation port.

use crate::domain::error::StockscopeError;
use crate::domain::filter::DateRange;
use crate::domain::indicator::IndicatorSeries;
use std::path::Path;

/// Everything a presenter needs for one filter pass.
pub struct ReportContext<'r, 'a> {
    pub title: &'r str,
    pub series: &'r IndicatorSeries<'a>,
    pub range: DateRange,
    /// Asset shown in the single-asset moving average chart.
    pub focus_asset: Option<&'r str>,
}

pub trait ReportPort {
    fn write(&self, ctx: &ReportContext<'_, '_>, output_path: &Path) -> Result<(), StockscopeError>;
}
