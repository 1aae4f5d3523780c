//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_instrument_adapter::CsvInstrumentAdapter;
use crate::adapters::csv_market_data_adapter::CsvMarketDataAdapter;
use crate::adapters::csv_result_sink::CsvResultSink;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocation::{
    allocate, Allocation, AllocationConfig, DEFAULT_N_STOCKS, DEFAULT_TOTAL_INVESTMENT,
};
use crate::domain::config_validation::validate_config;
use crate::domain::error::StockpickError;
use crate::domain::instrument::{eligible, Instrument};
use crate::domain::pipeline::{score_universe, SkipReason};
use crate::domain::scoring::ScoreBreakdown;
use crate::domain::technical::compute_signals;
use crate::ports::config_port::ConfigPort;
use crate::ports::instrument_port::InstrumentPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::result_sink_port::ResultSinkPort;

#[derive(Parser, Debug)]
#[command(
    name = "stockpick",
    about = "Score equities on technical and fundamental signals and split a budget across the best"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every eligible instrument, allocate the budget and store the result
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        total_investment: Option<f64>,
        #[arg(long)]
        n_stocks: Option<usize>,
        /// Run date used to key stored results (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the allocation without writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show signals and the score breakdown for one ticker
    Score {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments that will be scored
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            total_investment,
            n_stocks,
            date,
            dry_run,
        } => run_allocation(&config, total_investment, n_stocks, date, dry_run),
        Command::Score { config, ticker } => run_score(&config, &ticker),
        Command::Validate { config } => run_validate(&config),
        Command::List { config } => run_list(&config),
    }
}

fn fail(err: &StockpickError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        fail(&StockpickError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}

fn load_valid_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

pub fn build_allocation_config(
    config: &dyn ConfigPort,
    total_override: Option<f64>,
    n_override: Option<usize>,
) -> Result<AllocationConfig, StockpickError> {
    let total_investment = total_override.unwrap_or_else(|| {
        config.get_double("allocation", "total_investment", DEFAULT_TOTAL_INVESTMENT)
    });
    if !total_investment.is_finite() || total_investment <= 0.0 {
        return Err(StockpickError::ConfigInvalid {
            section: "allocation".into(),
            key: "total_investment".into(),
            reason: "total_investment must be positive".into(),
        });
    }

    let n_stocks = match n_override {
        Some(n) => n,
        None => {
            let n = config.get_int("allocation", "n_stocks", DEFAULT_N_STOCKS as i64);
            usize::try_from(n).map_err(|_| StockpickError::ConfigInvalid {
                section: "allocation".into(),
                key: "n_stocks".into(),
                reason: "n_stocks must be non-negative".into(),
            })?
        }
    };

    Ok(AllocationConfig {
        total_investment,
        n_stocks,
    })
}

pub fn fetch_delay(config: &dyn ConfigPort) -> Duration {
    Duration::from_millis(config.get_int("data", "fetch_delay_ms", 0).max(0) as u64)
}

fn required_path(
    config: &FileConfigAdapter,
    section: &str,
    key: &str,
) -> Result<PathBuf, StockpickError> {
    config
        .get_path(section, key)
        .ok_or_else(|| StockpickError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

pub fn build_instrument_source(
    config: &FileConfigAdapter,
) -> Result<CsvInstrumentAdapter, StockpickError> {
    Ok(CsvInstrumentAdapter::new(required_path(
        config,
        "data",
        "instruments",
    )?))
}

#[cfg(feature = "sqlite")]
fn open_sqlite(
    config: &FileConfigAdapter,
) -> Result<crate::adapters::sqlite_adapter::SqliteAdapter, StockpickError> {
    let path = required_path(config, "sqlite", "path")?;
    let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;
    crate::adapters::sqlite_adapter::SqliteAdapter::open(&path.to_string_lossy(), pool_size)
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_disabled(section: &str, key: &str) -> StockpickError {
    StockpickError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: "sqlite feature is required".into(),
    }
}

pub fn build_market_data(
    config: &FileConfigAdapter,
) -> Result<Box<dyn MarketDataPort>, StockpickError> {
    match config.get_choice("data", "source", "csv").as_str() {
        "csv" => Ok(Box::new(CsvMarketDataAdapter::new(
            required_path(config, "data", "history_dir")?,
            required_path(config, "data", "fundamentals")?,
        ))),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(open_sqlite(config)?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(sqlite_disabled("data", "source")),
        other => Err(StockpickError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{other}'"),
        }),
    }
}

pub fn build_result_sink(
    config: &FileConfigAdapter,
) -> Result<Box<dyn ResultSinkPort>, StockpickError> {
    match config.get_choice("output", "sink", "csv").as_str() {
        "csv" => Ok(Box::new(CsvResultSink::new(required_path(
            config, "output", "dir",
        )?))),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(open_sqlite(config)?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(sqlite_disabled("output", "sink")),
        other => Err(StockpickError::ConfigInvalid {
            section: "output".into(),
            key: "sink".into(),
            reason: format!("unknown sink '{other}'"),
        }),
    }
}

fn run_allocation(
    config_path: &PathBuf,
    total_override: Option<f64>,
    n_override: Option<usize>,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> ExitCode {
    let adapter = match load_valid_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let wiring = (|| -> Result<_, StockpickError> {
        let alloc_config = build_allocation_config(&adapter, total_override, n_override)?;
        let source = build_instrument_source(&adapter)?;
        let data_port = build_market_data(&adapter)?;
        let sink = if dry_run {
            None
        } else {
            Some(build_result_sink(&adapter)?)
        };
        Ok((alloc_config, source, data_port, sink))
    })();
    let (alloc_config, source, data_port, sink) = match wiring {
        Ok(w) => w,
        Err(e) => return fail(&e),
    };

    let run_date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    match run_pipeline(
        &source,
        &*data_port,
        sink.as_deref(),
        &alloc_config,
        run_date,
        fetch_delay(&adapter),
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Load instruments, score them, allocate the budget, print the summary and
/// hand the allocation to `sink` when one is given.
pub fn run_pipeline(
    source: &dyn InstrumentPort,
    data_port: &dyn MarketDataPort,
    sink: Option<&dyn ResultSinkPort>,
    alloc_config: &AllocationConfig,
    run_date: NaiveDate,
    fetch_delay: Duration,
) -> Result<Allocation, StockpickError> {
    let instruments = source.load_instruments()?;
    eprintln!(
        "Loaded {} instruments ({} eligible)",
        instruments.len(),
        instruments.iter().filter(|i| i.is_eligible()).count()
    );

    let scoring = score_universe(data_port, &instruments, fetch_delay)?;
    for skipped in &scoring.skipped {
        let reason = match &skipped.reason {
            SkipReason::DataUnavailable { reason } => reason.clone(),
            SkipReason::InsufficientHistory { bars, required } => {
                format!("only {bars} bars, {required} required")
            }
        };
        eprintln!("warning: skipped {} ({}): {}", skipped.name, skipped.ticker, reason);
    }

    eprintln!("\nCalculating investment allocations...");
    let allocation = allocate(scoring.scored, alloc_config);
    print_summary(&allocation, alloc_config);

    match sink {
        Some(sink) => {
            sink.write(run_date, &allocation)?;
            eprintln!("\nResults saved for {}", run_date.format("%Y-%m-%d"));
        }
        None => eprintln!("\nDry run: results not saved"),
    }

    Ok(allocation)
}

fn fmt_opt(value: Option<f64>, scale: f64) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v * scale))
}

fn print_summary(allocation: &Allocation, alloc_config: &AllocationConfig) {
    if allocation.rows.is_empty() {
        eprintln!("No instruments were scored");
        return;
    }

    eprintln!("\n=== Top 5 by Sentiment Score ===");
    for r in allocation.sorted_by_score().into_iter().take(5) {
        let inst = &r.instrument;
        eprintln!(
            concat!(
                "  {:<8} {:<30} score {:>3}  margin {:>6}%  growth {:>6}%",
                "  d/e {:>6}  price {:>10}  invested ${:.2}"
            ),
            inst.ticker,
            inst.name,
            inst.sentiment_score,
            fmt_opt(inst.fundamentals.profit_margin, 100.0),
            fmt_opt(inst.fundamentals.revenue_growth, 100.0),
            fmt_opt(inst.fundamentals.debt_to_equity, 1.0),
            fmt_opt(inst.current_price(), 1.0),
            r.actual_investment,
        );
    }

    eprintln!("\nTotal Investment: ${:.2}", allocation.total_invested());
    eprintln!("Remaining Cash:   ${:.2}", allocation.remaining_cash());

    let selected = allocation.selected();
    eprintln!(
        "\n=== Portfolio Allocation (Top {}) ===",
        alloc_config.n_stocks
    );
    if selected.is_empty() {
        eprintln!("  no instrument had complete data; nothing allocated");
        return;
    }
    for r in selected {
        let inst = &r.instrument;
        eprintln!(
            "  {:<8} {:<30} score {:>3}  shares {:>10.4}  ${:>9.2}  {:>6.2}%",
            inst.ticker,
            inst.name,
            inst.sentiment_score,
            r.shares,
            r.actual_investment,
            r.portfolio_percentage,
        );
    }
}

fn run_score(config_path: &PathBuf, ticker: &str) -> ExitCode {
    let adapter = match load_valid_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), StockpickError> {
        let instruments = build_instrument_source(&adapter)?.load_instruments()?;
        let name = instruments
            .iter()
            .find(|i| i.ticker.eq_ignore_ascii_case(ticker))
            .map_or_else(|| ticker.to_string(), |i| i.name.clone());

        let data_port = build_market_data(&adapter)?;
        let history = data_port.fetch_history(ticker)?;
        let signals =
            compute_signals(&history).map_err(|e| StockpickError::from_signal(ticker, e))?;
        let fundamentals = data_port.fetch_fundamentals(ticker)?;
        let breakdown = ScoreBreakdown::compute(Some(&signals), &fundamentals);

        println!("{} ({})", name, ticker);
        println!("  bars:           {}", history.len());
        println!("  current price:  {:.2}", signals.current_price);
        println!("  MA200:          {:.2} ({:?})", signals.ma200, signals.trend());
        println!("  momentum 1y:    {:.2}%", signals.momentum_1y);
        println!("  momentum 3y:    {:.2}%", signals.momentum_3y);
        println!("  volume trend:   {:.3}", signals.volume_trend);
        println!("  points:");
        println!("    trend          +{}", breakdown.trend);
        println!("    momentum       +{}", breakdown.momentum);
        println!("    volume         +{}", breakdown.volume);
        for (factor, points) in &breakdown.fundamentals {
            println!("    {:<14} +{}", factor, points);
        }
        println!("  sentiment score: {}", breakdown.score());
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_valid_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match build_allocation_config(&adapter, None, None) {
        Ok(c) => {
            eprintln!("  total_investment: {:.2}", c.total_investment);
            eprintln!("  n_stocks:         {}", c.n_stocks);
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_valid_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let instruments: Vec<Instrument> =
        match build_instrument_source(&adapter).and_then(|s| s.load_instruments()) {
            Ok(list) => list,
            Err(e) => return fail(&e),
        };

    let total = instruments.len();
    let eligible = eligible(instruments);
    for inst in &eligible {
        println!("{}\t{}\t{}", inst.ticker, inst.name, inst.domain);
    }
    eprintln!("{} of {} instruments eligible", eligible.len(), total);
    ExitCode::SUCCESS
}
