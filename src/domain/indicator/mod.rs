//! Window calculations over daily series.
//!
//! Each function evaluates at the most recent value of the series and returns
//! `None` when the series is too short for the requested window:
//! - [`sma::sma_at_latest`]: simple moving average of the trailing window
//! - [`roc::percent_change`]: percent change against the value `offset` bars back
//! - [`volume::volume_trend`]: trailing-window mean over whole-series mean

pub mod roc;
pub mod sma;
pub mod volume;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }
}
