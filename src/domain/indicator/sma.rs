//! SMA (Simple Moving Average) evaluated at the latest bar.
//!
//! SMA(n) = (C[last-n+1] + ... + C[last]) / n
//! Undefined until n values exist.

use super::mean;

pub fn sma_at_latest(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    mean(&values[values.len() - period..])
}
