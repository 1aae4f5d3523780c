#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stockpick::domain::error::StockpickError;
use stockpick::domain::fundamentals::FundamentalMetrics;
use stockpick::domain::instrument::{Instrument, ScoredInstrument};
pub use stockpick::domain::price_history::{PriceBar, PriceHistory};
use stockpick::domain::technical::TechnicalSignals;
use stockpick::ports::instrument_port::InstrumentPort;
use stockpick::ports::market_data_port::MarketDataPort;

pub struct MockMarketData {
    pub history: HashMap<String, Vec<PriceBar>>,
    pub fundamentals: HashMap<String, FundamentalMetrics>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            history: HashMap::new(),
            fundamentals: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.history.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_fundamentals(mut self, ticker: &str, metrics: FundamentalMetrics) -> Self {
        self.fundamentals.insert(ticker.to_string(), metrics);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_history(&self, ticker: &str) -> Result<PriceHistory, StockpickError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockpickError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(PriceHistory::new(
            self.history.get(ticker).cloned().unwrap_or_default(),
        ))
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalMetrics, StockpickError> {
        Ok(self.fundamentals.get(ticker).cloned().unwrap_or_default())
    }
}

pub struct MockInstruments {
    pub instruments: Vec<Instrument>,
    pub error: Option<String>,
}

impl MockInstruments {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            instruments: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl InstrumentPort for MockInstruments {
    fn load_instruments(&self) -> Result<Vec<Instrument>, StockpickError> {
        match &self.error {
            Some(reason) => Err(StockpickError::Source {
                reason: reason.clone(),
            }),
            None => Ok(self.instruments.clone()),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` daily bars closing at `start_price + i * step`, constant volume.
pub fn generate_bars(count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let start = date(2019, 1, 1);
    (0..count)
        .map(|i| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            close: start_price + i as f64 * step,
            volume: 1_000,
        })
        .collect()
}

/// Rising series with the final `recent` bars trading `multiplier` times the
/// base volume.
pub fn generate_bars_with_volume_spike(
    count: usize,
    start_price: f64,
    step: f64,
    recent: usize,
    multiplier: i64,
) -> Vec<PriceBar> {
    let mut bars = generate_bars(count, start_price, step);
    let from = count.saturating_sub(recent);
    for bar in &mut bars[from..] {
        bar.volume *= multiplier;
    }
    bars
}

pub fn strong_fundamentals() -> FundamentalMetrics {
    FundamentalMetrics {
        pe_ratio: Some(18.0),
        profit_margin: Some(0.25),
        revenue_growth: Some(0.15),
        debt_to_equity: Some(0.4),
        market_cap: Some(2.0e9),
        dividend_yield: Some(0.02),
        analyst_rating: Some(2.0),
    }
}

pub fn signals(
    price: f64,
    momentum_1y: f64,
    momentum_3y: f64,
    volume_trend: f64,
) -> TechnicalSignals {
    TechnicalSignals {
        price_above_ma200: true,
        ma200: price * 0.9,
        momentum_1y,
        momentum_3y,
        volume_trend,
        current_price: price,
    }
}

/// A complete scored row with the given score and price.
pub fn scored(ticker: &str, score: i32, price: f64) -> ScoredInstrument {
    ScoredInstrument {
        name: format!("{ticker} Ltd"),
        ticker: ticker.to_string(),
        domain: "Test".to_string(),
        technical: Some(signals(price, 12.0, 35.0, 1.1)),
        fundamentals: strong_fundamentals(),
        sentiment_score: score,
    }
}
