//! Core domain types and logic.

pub mod price_record;
pub mod series_table;
pub mod selection;
pub mod filter;
pub mod indicator;
pub mod race;
pub mod error;
