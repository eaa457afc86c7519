//! Price data source port.

use crate::domain::error::StockscopeError;
use crate::domain::series_table::SeriesTable;

pub trait DataPort {
    /// Loads every asset into one table. Any bad input fails the whole load.
    fn load_table(&self) -> Result<SeriesTable, StockscopeError>;

    /// Asset ids the source can provide, sorted, without loading their rows.
    fn list_assets(&self) -> Result<Vec<String>, StockscopeError>;
}
