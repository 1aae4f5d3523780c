//! SQLite adapter: market data source and dated result sink.

use crate::domain::allocation::Allocation;
use crate::domain::error::StockpickError;
use crate::domain::fundamentals::FundamentalMetrics;
use crate::domain::price_history::{PriceBar, PriceHistory};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::result_sink_port::ResultSinkPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn db_error(e: impl std::fmt::Display) -> StockpickError {
    StockpickError::Database {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn open(db_path: &str, pool_size: u32) -> Result<Self, StockpickError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, StockpickError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(db_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockpickError> {
        self.pool.get().map_err(db_error)
    }

    pub fn initialize_schema(&self) -> Result<(), StockpickError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS price_history (
                    ticker TEXT NOT NULL,
                    date TEXT NOT NULL,
                    close REAL NOT NULL,
                    volume INTEGER NOT NULL,
                    PRIMARY KEY (ticker, date)
                );
                CREATE TABLE IF NOT EXISTS fundamentals (
                    ticker TEXT PRIMARY KEY,
                    pe_ratio REAL,
                    profit_margin REAL,
                    revenue_growth REAL,
                    debt_to_equity REAL,
                    market_cap REAL,
                    dividend_yield REAL,
                    analyst_rating REAL
                );
                CREATE TABLE IF NOT EXISTS allocation_results (
                    run_date TEXT NOT NULL,
                    position INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    ticker TEXT NOT NULL,
                    domain TEXT NOT NULL,
                    sentiment_score INTEGER NOT NULL,
                    current_price REAL,
                    momentum_1y REAL,
                    momentum_3y REAL,
                    volume_trend REAL,
                    market_cap REAL,
                    pe_ratio REAL,
                    profit_margin REAL,
                    revenue_growth REAL,
                    debt_to_equity REAL,
                    dividend_yield REAL,
                    analyst_rating REAL,
                    status TEXT NOT NULL,
                    rank INTEGER,
                    weight REAL NOT NULL,
                    planned_investment REAL NOT NULL,
                    shares REAL NOT NULL,
                    actual_investment REAL NOT NULL,
                    portfolio_percentage REAL NOT NULL,
                    PRIMARY KEY (run_date, position)
                );
                CREATE INDEX IF NOT EXISTS idx_results_ticker ON allocation_results(ticker);",
            )
            .map_err(db_error)
    }

    pub fn insert_history(&self, ticker: &str, bars: &[PriceBar]) -> Result<(), StockpickError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_error)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO price_history (ticker, date, close, volume)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    ticker,
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(db_error)?;
        }

        tx.commit().map_err(db_error)
    }

    pub fn upsert_fundamentals(
        &self,
        ticker: &str,
        f: &FundamentalMetrics,
    ) -> Result<(), StockpickError> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO fundamentals
                 (ticker, pe_ratio, profit_margin, revenue_growth, debt_to_equity,
                  market_cap, dividend_yield, analyst_rating)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    ticker,
                    f.pe_ratio,
                    f.profit_margin,
                    f.revenue_growth,
                    f.debt_to_equity,
                    f.market_cap,
                    f.dividend_yield,
                    f.analyst_rating
                ],
            )
            .map_err(db_error)?;
        Ok(())
    }
}

impl MarketDataPort for SqliteAdapter {
    fn fetch_history(&self, ticker: &str) -> Result<PriceHistory, StockpickError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, close, volume FROM price_history
                 WHERE ticker = ?1 ORDER BY date ASC",
            )
            .map_err(db_error)?;

        let rows = stmt
            .query_map(params![ticker], |row| {
                let date_str: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(PriceBar {
                    date,
                    close: row.get(1)?,
                    volume: row.get(2)?,
                })
            })
            .map_err(db_error)?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row.map_err(|e| StockpickError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?);
        }

        Ok(PriceHistory::new(bars))
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalMetrics, StockpickError> {
        let conn = self.conn()?;
        let metrics = conn
            .query_row(
                "SELECT pe_ratio, profit_margin, revenue_growth, debt_to_equity,
                        market_cap, dividend_yield, analyst_rating
                 FROM fundamentals WHERE ticker = ?1",
                params![ticker],
                |row| {
                    Ok(FundamentalMetrics {
                        pe_ratio: row.get(0)?,
                        profit_margin: row.get(1)?,
                        revenue_growth: row.get(2)?,
                        debt_to_equity: row.get(3)?,
                        market_cap: row.get(4)?,
                        dividend_yield: row.get(5)?,
                        analyst_rating: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(db_error)?;

        Ok(metrics.unwrap_or_default())
    }
}

impl ResultSinkPort for SqliteAdapter {
    fn write(&self, run_date: NaiveDate, allocation: &Allocation) -> Result<(), StockpickError> {
        let run_date = run_date.format("%Y-%m-%d").to_string();
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_error)?;

        tx.execute(
            "DELETE FROM allocation_results WHERE run_date = ?1",
            params![run_date],
        )
        .map_err(db_error)?;

        for (position, r) in allocation.sorted_by_score().into_iter().enumerate() {
            let inst = &r.instrument;
            let t = inst.technical.as_ref();
            let f = &inst.fundamentals;
            tx.execute(
                "INSERT INTO allocation_results (
                    run_date, position, name, ticker, domain, sentiment_score,
                    current_price, momentum_1y, momentum_3y, volume_trend,
                    market_cap, pe_ratio, profit_margin, revenue_growth, debt_to_equity,
                    dividend_yield, analyst_rating, status, rank, weight,
                    planned_investment, shares, actual_investment, portfolio_percentage
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                           ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
                params![
                    run_date,
                    position as i64,
                    inst.name,
                    inst.ticker,
                    inst.domain,
                    inst.sentiment_score,
                    t.map(|t| t.current_price),
                    t.map(|t| t.momentum_1y),
                    t.map(|t| t.momentum_3y),
                    t.map(|t| t.volume_trend),
                    f.market_cap,
                    f.pe_ratio,
                    f.profit_margin,
                    f.revenue_growth,
                    f.debt_to_equity,
                    f.dividend_yield,
                    f.analyst_rating,
                    r.status.label(),
                    r.rank().map(|rank| rank as i64 + 1),
                    r.weight,
                    r.planned_investment,
                    r.shares,
                    r.actual_investment,
                    r.portfolio_percentage
                ],
            )
            .map_err(db_error)?;
        }

        tx.commit().map_err(db_error)?;
        log::info!("Results stored for run {}", run_date);
        Ok(())
    }
}
