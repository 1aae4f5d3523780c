//! Port traits the domain depends on; adapters implement them.

pub mod config_port;
pub mod instrument_port;
pub mod market_data_port;
pub mod result_sink_port;
