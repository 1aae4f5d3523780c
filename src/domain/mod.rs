//! Core domain types and logic: signals, scoring, allocation.

pub mod price_history;
pub mod indicator;
pub mod technical;
pub mod fundamentals;
pub mod scoring;
pub mod instrument;
pub mod allocation;
pub mod pipeline;
pub mod config_validation;
pub mod error;
