//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod dashboard;
pub mod file_config_adapter;
