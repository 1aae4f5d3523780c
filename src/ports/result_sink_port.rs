//! Result persistence port trait.

use crate::domain::allocation::Allocation;
use crate::domain::error::StockpickError;
use chrono::NaiveDate;

/// Persists one run's allocation keyed by its run date. Writing a date that
/// already exists replaces that date's results and leaves other dates alone.
pub trait ResultSinkPort {
    fn write(&self, run_date: NaiveDate, allocation: &Allocation) -> Result<(), StockpickError>;
}
