//! Configuration validation.
//!
//! Validates every config field a run reads before any data is fetched.

use crate::domain::error::StockpickError;
use crate::ports::config_port::ConfigPort;

pub const SOURCES: [&str; 2] = ["csv", "sqlite"];
pub const SINKS: [&str; 2] = ["csv", "sqlite"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    validate_total_investment(config)?;
    validate_n_stocks(config)?;
    validate_fetch_delay(config)?;
    validate_instruments(config)?;
    validate_source(config)?;
    validate_sink(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> StockpickError {
    StockpickError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), StockpickError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StockpickError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_total_investment(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    // a present but unparsable value falls back to the default in get_double
    if let Some(raw) = config.get_string("allocation", "total_investment") {
        if raw.trim().parse::<f64>().is_err() {
            return Err(invalid(
                "allocation",
                "total_investment",
                "total_investment must be a number",
            ));
        }
    }
    let value = config.get_double("allocation", "total_investment", 2000.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "allocation",
            "total_investment",
            "total_investment must be positive",
        ));
    }
    Ok(())
}

fn validate_n_stocks(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    if let Some(raw) = config.get_string("allocation", "n_stocks") {
        if raw.trim().parse::<i64>().is_err() {
            return Err(invalid(
                "allocation",
                "n_stocks",
                "n_stocks must be a whole number",
            ));
        }
    }
    if config.get_int("allocation", "n_stocks", 20) < 0 {
        return Err(invalid(
            "allocation",
            "n_stocks",
            "n_stocks must be non-negative",
        ));
    }
    Ok(())
}

fn validate_fetch_delay(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    if config.get_int("data", "fetch_delay_ms", 0) < 0 {
        return Err(invalid(
            "data",
            "fetch_delay_ms",
            "fetch_delay_ms must be non-negative",
        ));
    }
    Ok(())
}

fn validate_instruments(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    require(config, "data", "instruments")
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    match config.get_choice("data", "source", "csv").as_str() {
        "csv" => {
            require(config, "data", "history_dir")?;
            require(config, "data", "fundamentals")
        }
        "sqlite" => require(config, "sqlite", "path"),
        _ => Err(invalid(
            "data",
            "source",
            &format!("source must be one of {}", SOURCES.join(", ")),
        )),
    }
}

fn validate_sink(config: &dyn ConfigPort) -> Result<(), StockpickError> {
    match config.get_choice("output", "sink", "csv").as_str() {
        "csv" => require(config, "output", "dir"),
        "sqlite" => require(config, "sqlite", "path"),
        _ => Err(invalid(
            "output",
            "sink",
            &format!("sink must be one of {}", SINKS.join(", ")),
        )),
    }
}
