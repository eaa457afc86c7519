//! Port traits: the boundary between domain logic and adapters.

pub mod config_port;
pub mod data_port;
pub mod report_port;
