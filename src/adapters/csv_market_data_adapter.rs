//! CSV file market data adapter.
//!
//! Price history lives in `<history_dir>/<TICKER>.csv` with header
//! `date,close,volume`. Fundamentals live in one CSV keyed by ticker:
//! `ticker,pe_ratio,profit_margin,revenue_growth,debt_to_equity,market_cap,`
//! `dividend_yield,analyst_rating`.
//! Blank and `nan` cells are absent values.

use crate::domain::error::StockpickError;
use crate::domain::fundamentals::FundamentalMetrics;
use crate::domain::price_history::{PriceBar, PriceHistory};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvMarketDataAdapter {
    history_dir: PathBuf,
    fundamentals_path: PathBuf,
}

const FUNDAMENTAL_COLUMNS: [&str; 7] = [
    "pe_ratio",
    "profit_margin",
    "revenue_growth",
    "debt_to_equity",
    "market_cap",
    "dividend_yield",
    "analyst_rating",
];

fn parse_optional(value: &str) -> Result<Option<f64>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|e| format!("invalid number '{}': {}", trimmed, e))
}

impl CsvMarketDataAdapter {
    pub fn new(history_dir: PathBuf, fundamentals_path: PathBuf) -> Self {
        Self {
            history_dir,
            fundamentals_path,
        }
    }

    fn history_path(&self, ticker: &str) -> PathBuf {
        self.history_dir.join(format!("{}.csv", ticker))
    }
}

fn unavailable(ticker: &str, reason: String) -> StockpickError {
    StockpickError::DataUnavailable {
        ticker: ticker.to_string(),
        reason,
    }
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn fetch_history(&self, ticker: &str) -> Result<PriceHistory, StockpickError> {
        let path = self.history_path(ticker);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(ticker, format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| unavailable(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| unavailable(ticker, "missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| unavailable(ticker, format!("invalid date format: {}", e)))?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| unavailable(ticker, "missing close column".into()))?
                .trim()
                .parse()
                .map_err(|e| unavailable(ticker, format!("invalid close value: {}", e)))?;

            let volume: i64 = record
                .get(2)
                .ok_or_else(|| unavailable(ticker, "missing volume column".into()))?
                .trim()
                .parse()
                .map_err(|e| unavailable(ticker, format!("invalid volume value: {}", e)))?;

            bars.push(PriceBar {
                date,
                close,
                volume,
            });
        }

        Ok(PriceHistory::new(bars))
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalMetrics, StockpickError> {
        let path = &self.fundamentals_path;
        let mut rdr = csv::Reader::from_path(path)
            .map_err(|e| unavailable(ticker, format!("failed to read {}: {}", path.display(), e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| unavailable(ticker, format!("CSV parse error: {}", e)))?
            .clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let ticker_col =
            column("ticker").ok_or_else(|| unavailable(ticker, "missing ticker column".into()))?;
        let value_cols: Vec<Option<usize>> =
            FUNDAMENTAL_COLUMNS.iter().map(|&c| column(c)).collect();

        for result in rdr.records() {
            let record =
                result.map_err(|e| unavailable(ticker, format!("CSV parse error: {}", e)))?;
            if record.get(ticker_col).map(str::trim) != Some(ticker) {
                continue;
            }

            let mut values = [None; 7];
            for (slot, col) in values.iter_mut().zip(&value_cols) {
                if let Some(raw) = col.and_then(|c| record.get(c)) {
                    *slot = parse_optional(raw).map_err(|e| unavailable(ticker, e))?;
                }
            }
            let [
                pe_ratio,
                profit_margin,
                revenue_growth,
                debt_to_equity,
                market_cap,
                dividend_yield,
                analyst_rating,
            ] = values;

            return Ok(FundamentalMetrics {
                pe_ratio,
                profit_margin,
                revenue_growth,
                debt_to_equity,
                market_cap,
                dividend_yield,
                analyst_rating,
            });
        }

        log::debug!("{}: no fundamentals row, scoring on technicals only", ticker);
        Ok(FundamentalMetrics::default())
    }
}
