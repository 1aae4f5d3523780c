//! Per-instrument scoring over an instrument list.
//!
//! Each eligible instrument is fetched, turned into technical signals and
//! scored on its own. Failures are recorded against that instrument and the
//! run moves on; the scored rows come back in source order for the allocator.

use crate::domain::error::StockpickError;
use crate::domain::instrument::{Instrument, ScoredInstrument};
use crate::domain::scoring::ScoreBreakdown;
use crate::domain::technical::compute_signals;
use crate::ports::market_data_port::MarketDataPort;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    DataUnavailable { reason: String },
    InsufficientHistory { bars: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInstrument {
    pub ticker: String,
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringRun {
    pub scored: Vec<ScoredInstrument>,
    pub skipped: Vec<SkippedInstrument>,
}

/// Fetch history and fundamentals for one instrument and score it.
pub fn score_instrument(
    data_port: &dyn MarketDataPort,
    instrument: &Instrument,
) -> Result<ScoredInstrument, StockpickError> {
    let ticker = instrument.ticker.as_str();
    let history = data_port.fetch_history(ticker)?;
    let signals =
        compute_signals(&history).map_err(|e| StockpickError::from_signal(ticker, e))?;
    let fundamentals = data_port.fetch_fundamentals(ticker)?;

    log::debug!(
        "{}: {:?}",
        ticker,
        ScoreBreakdown::compute(Some(&signals), &fundamentals)
    );

    Ok(ScoredInstrument::score(instrument, Some(signals), fundamentals))
}

fn skip_reason(err: StockpickError) -> SkipReason {
    match err {
        StockpickError::InsufficientHistory { bars, required, .. } => {
            SkipReason::InsufficientHistory { bars, required }
        }
        other => SkipReason::DataUnavailable {
            reason: other.to_string(),
        },
    }
}

/// Score every eligible instrument, sleeping `fetch_delay` between fetches.
///
/// Per-instrument failures are recorded in `skipped`. Any other error, such
/// as the data source itself being unreachable, aborts the run.
pub fn score_universe(
    data_port: &dyn MarketDataPort,
    instruments: &[Instrument],
    fetch_delay: Duration,
) -> Result<ScoringRun, StockpickError> {
    let eligible: Vec<&Instrument> = instruments.iter().filter(|i| i.is_eligible()).collect();
    log::info!(
        "Scoring {} of {} instruments (excluded, ignored and out-of-scope rows dropped)",
        eligible.len(),
        instruments.len()
    );

    let mut run = ScoringRun::default();
    let total = eligible.len();

    for (n, instrument) in eligible.into_iter().enumerate() {
        if n > 0 && !fetch_delay.is_zero() {
            thread::sleep(fetch_delay);
        }
        log::info!("Processing {} ({}/{})", instrument.name, n + 1, total);

        match score_instrument(data_port, instrument) {
            Ok(scored) => {
                log::debug!("  {}: score {}", scored.ticker, scored.sentiment_score);
                run.scored.push(scored);
            }
            Err(e) if !e.is_per_instrument() => {
                log::error!("aborting run at {}: {}", instrument.ticker, e);
                return Err(e);
            }
            Err(e) => {
                log::warn!("skipping {} ({}): {}", instrument.name, instrument.ticker, e);
                run.skipped.push(SkippedInstrument {
                    ticker: instrument.ticker.clone(),
                    name: instrument.name.clone(),
                    reason: skip_reason(e),
                });
            }
        }
    }

    if !run.skipped.is_empty() {
        log::info!(
            "Scored {} of {} instruments, skipped {}",
            run.scored.len(),
            total,
            run.skipped.len()
        );
    }

    Ok(run)
}
