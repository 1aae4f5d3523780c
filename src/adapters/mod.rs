//! Concrete adapter implementations for ports.

pub mod csv_instrument_adapter;
pub mod csv_market_data_adapter;
pub mod csv_result_sink;
pub mod file_config_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
