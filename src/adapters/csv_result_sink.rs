//! CSV result sink: one human-readable file per run date.
//!
//! Writes `<dir>/<YYYY-MM-DD>.csv`, rows sorted by sentiment score. The file
//! is written to a temporary name and renamed into place so a failed write
//! never leaves a partial result behind.

use crate::domain::allocation::{Allocation, AllocationResult};
use crate::domain::error::StockpickError;
use crate::ports::result_sink_port::ResultSinkPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

pub struct CsvResultSink {
    dir: PathBuf,
}

/// Column order of [`ResultRow`]; written even when there are no rows.
const HEADER: [&str; 22] = [
    "name",
    "ticker",
    "domain",
    "sentiment_score",
    "current_price",
    "momentum_1y",
    "momentum_3y",
    "volume_trend",
    "market_cap",
    "pe_ratio",
    "profit_margin",
    "revenue_growth",
    "debt_to_equity",
    "dividend_yield",
    "analyst_rating",
    "status",
    "rank",
    "weight",
    "planned_investment",
    "shares",
    "actual_investment",
    "portfolio_percentage",
];

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    name: &'a str,
    ticker: &'a str,
    domain: &'a str,
    sentiment_score: i32,
    current_price: Option<f64>,
    momentum_1y: Option<f64>,
    momentum_3y: Option<f64>,
    volume_trend: Option<f64>,
    market_cap: Option<f64>,
    pe_ratio: Option<f64>,
    profit_margin: Option<f64>,
    revenue_growth: Option<f64>,
    debt_to_equity: Option<f64>,
    dividend_yield: Option<f64>,
    analyst_rating: Option<f64>,
    status: &'static str,
    rank: Option<usize>,
    weight: f64,
    planned_investment: f64,
    shares: f64,
    actual_investment: f64,
    portfolio_percentage: f64,
}

impl<'a> From<&'a AllocationResult> for ResultRow<'a> {
    fn from(r: &'a AllocationResult) -> Self {
        let inst = &r.instrument;
        let t = inst.technical.as_ref();
        let f = &inst.fundamentals;
        ResultRow {
            name: &inst.name,
            ticker: &inst.ticker,
            domain: &inst.domain,
            sentiment_score: inst.sentiment_score,
            current_price: t.map(|t| t.current_price),
            momentum_1y: t.map(|t| t.momentum_1y),
            momentum_3y: t.map(|t| t.momentum_3y),
            volume_trend: t.map(|t| t.volume_trend),
            market_cap: f.market_cap,
            pe_ratio: f.pe_ratio,
            profit_margin: f.profit_margin,
            revenue_growth: f.revenue_growth,
            debt_to_equity: f.debt_to_equity,
            dividend_yield: f.dividend_yield,
            analyst_rating: f.analyst_rating,
            status: r.status.label(),
            rank: r.rank().map(|rank| rank + 1),
            weight: r.weight,
            planned_investment: r.planned_investment,
            shares: r.shares,
            actual_investment: r.actual_investment,
            portfolio_percentage: r.portfolio_percentage,
        }
    }
}

impl CsvResultSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, run_date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.csv", run_date.format("%Y-%m-%d")))
    }

    fn sink_error(reason: impl std::fmt::Display) -> StockpickError {
        StockpickError::Sink {
            reason: reason.to_string(),
        }
    }
}

impl ResultSinkPort for CsvResultSink {
    fn write(&self, run_date: NaiveDate, allocation: &Allocation) -> Result<(), StockpickError> {
        if !self.dir.exists() {
            log::warn!(
                "result directory {} not found, creating it",
                self.dir.display()
            );
            fs::create_dir_all(&self.dir).map_err(|e| {
                Self::sink_error(format!("failed to create {}: {}", self.dir.display(), e))
            })?;
        }

        let path = self.path_for(run_date);
        let tmp = path.with_extension("csv.tmp");

        let written = (|| -> Result<(), StockpickError> {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)
                .map_err(Self::sink_error)?;
            wtr.write_record(HEADER).map_err(Self::sink_error)?;
            for row in allocation.sorted_by_score() {
                wtr.serialize(ResultRow::from(row)).map_err(Self::sink_error)?;
            }
            wtr.flush()?;
            Ok(())
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        fs::rename(&tmp, &path).map_err(|e| {
            Self::sink_error(format!("failed to move result into {}: {}", path.display(), e))
        })?;
        log::info!("Results written to {}", path.display());
        Ok(())
    }
}
