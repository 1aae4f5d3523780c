//! Domain error types.

use crate::domain::technical::SignalError;

/// Top-level error type for stockpick.
#[derive(Debug, thiserror::Error)]
pub enum StockpickError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("insufficient history for {ticker}: have {bars} bars, need {required}")]
    InsufficientHistory {
        ticker: String,
        bars: usize,
        required: usize,
    },

    #[error("instrument source error: {reason}")]
    Source { reason: String },

    #[error("result sink error: {reason}")]
    Sink { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockpickError {
    pub fn from_signal(ticker: &str, err: SignalError) -> Self {
        match err {
            SignalError::EmptyHistory => StockpickError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: err.to_string(),
            },
            SignalError::InsufficientHistory { bars, required } => {
                StockpickError::InsufficientHistory {
                    ticker: ticker.to_string(),
                    bars,
                    required,
                }
            }
        }
    }

    /// Errors scoped to a single instrument; the run continues past them.
    pub fn is_per_instrument(&self) -> bool {
        matches!(
            self,
            StockpickError::DataUnavailable { .. } | StockpickError::InsufficientHistory { .. }
        )
    }
}

impl From<&StockpickError> for std::process::ExitCode {
    fn from(err: &StockpickError) -> Self {
        let code: u8 = match err {
            StockpickError::Io(_) => 1,
            StockpickError::ConfigParse { .. }
            | StockpickError::ConfigMissing { .. }
            | StockpickError::ConfigInvalid { .. } => 2,
            StockpickError::Database { .. } => 3,
            StockpickError::Source { .. } | StockpickError::Sink { .. } => 4,
            StockpickError::DataUnavailable { .. }
            | StockpickError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
