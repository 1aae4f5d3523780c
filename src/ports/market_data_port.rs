//! Market data access port trait.

use crate::domain::error::StockpickError;
use crate::domain::fundamentals::FundamentalMetrics;
use crate::domain::price_history::PriceHistory;

/// Per-ticker price history and fundamentals. Either call may fail for a
/// single ticker; callers skip that instrument and carry on.
pub trait MarketDataPort {
    fn fetch_history(&self, ticker: &str) -> Result<PriceHistory, StockpickError>;

    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalMetrics, StockpickError>;
}
