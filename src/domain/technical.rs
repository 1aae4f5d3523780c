//! Technical signals derived from one instrument's price history.

use crate::domain::indicator::{roc::percent_change, sma::sma_at_latest, volume::volume_trend};
use crate::domain::price_history::PriceHistory;

pub const MA_PERIOD: usize = 200;
pub const ONE_YEAR_BARS: usize = 252;
pub const THREE_YEAR_BARS: usize = 756;

/// Bars needed for every signal: the 3-year lookback plus the latest bar.
pub const MIN_HISTORY_BARS: usize = THREE_YEAR_BARS + 1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("price history is empty")]
    EmptyHistory,

    #[error("insufficient history: have {bars} bars, need {required}")]
    InsufficientHistory { bars: usize, required: usize },
}

/// Where the latest close sits relative to the 200-bar average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Above,
    AtOrBelow,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalSignals {
    pub price_above_ma200: bool,
    pub ma200: f64,
    /// Percent change over the trailing 252 bars.
    pub momentum_1y: f64,
    /// Percent change over the trailing 756 bars.
    pub momentum_3y: f64,
    pub volume_trend: f64,
    pub current_price: f64,
}

impl TechnicalSignals {
    pub fn trend(&self) -> Trend {
        if self.price_above_ma200 {
            Trend::Above
        } else {
            Trend::AtOrBelow
        }
    }
}

/// Trend of optional signals; missing signals are `Trend::Unavailable`.
pub fn trend_of(signals: Option<&TechnicalSignals>) -> Trend {
    signals.map_or(Trend::Unavailable, TechnicalSignals::trend)
}

/// Compute the fixed signal set at the most recent bar.
///
/// Fails fast when the history cannot support the 3-year lookback rather than
/// returning partial signals.
pub fn compute_signals(history: &PriceHistory) -> Result<TechnicalSignals, SignalError> {
    if history.is_empty() {
        return Err(SignalError::EmptyHistory);
    }
    let insufficient = || SignalError::InsufficientHistory {
        bars: history.len(),
        required: MIN_HISTORY_BARS,
    };
    if history.len() < MIN_HISTORY_BARS {
        return Err(insufficient());
    }

    let closes = history.closes();
    let volumes = history.volumes();
    let current_price = closes[closes.len() - 1];

    let ma200 = sma_at_latest(&closes, MA_PERIOD).ok_or_else(insufficient)?;
    let momentum_1y = percent_change(&closes, ONE_YEAR_BARS).ok_or_else(insufficient)?;
    let momentum_3y = percent_change(&closes, THREE_YEAR_BARS).ok_or_else(insufficient)?;
    let volume_trend = volume_trend(&volumes, ONE_YEAR_BARS).ok_or_else(insufficient)?;

    Ok(TechnicalSignals {
        price_above_ma200: current_price > ma200,
        ma200,
        momentum_1y,
        momentum_3y,
        volume_trend,
        current_price,
    })
}
