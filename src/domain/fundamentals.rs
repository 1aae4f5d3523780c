//! Fundamental metrics supplied by the market data source.
//!
//! Every field is optional; an absent field simply earns no points.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalMetrics {
    /// Trailing price/earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Decimal fraction, 0.15 = 15%.
    pub profit_margin: Option<f64>,
    /// Decimal fraction, year over year.
    pub revenue_growth: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub analyst_rating: Option<f64>,
}

impl FundamentalMetrics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
