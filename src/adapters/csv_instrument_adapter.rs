//! CSV instrument list adapter.
//!
//! Expected header: `name,ticker,domain,in_scope,exclude,ignore`. The flag
//! columns are optional. Flags read yes/no/true/false/1/0; a blank `in_scope`
//! counts as in scope and blank `exclude`/`ignore` count as not set.

use crate::domain::error::StockpickError;
use crate::domain::instrument::Instrument;
use crate::ports::instrument_port::InstrumentPort;
use serde::Deserialize;
use std::path::PathBuf;

pub struct CsvInstrumentAdapter {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct InstrumentRow {
    name: String,
    ticker: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    in_scope: Option<String>,
    #[serde(default)]
    exclude: Option<String>,
    #[serde(default)]
    ignore: Option<String>,
}

fn parse_flag(value: Option<&str>, default: bool) -> Result<bool, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!("invalid flag value '{raw}'")),
    }
}

impl CsvInstrumentAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn source_error(&self, reason: impl std::fmt::Display) -> StockpickError {
        StockpickError::Source {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

impl InstrumentPort for CsvInstrumentAdapter {
    fn load_instruments(&self) -> Result<Vec<Instrument>, StockpickError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.source_error(e))?;

        let mut instruments = Vec::new();
        for (line, result) in rdr.deserialize::<InstrumentRow>().enumerate() {
            let row = result.map_err(|e| self.source_error(e))?;
            // header is line 1
            let line = line + 2;
            if row.ticker.is_empty() {
                return Err(self.source_error(format!("line {line}: empty ticker")));
            }
            let flag = |value: &Option<String>, default: bool| {
                parse_flag(value.as_deref(), default)
                    .map_err(|e| self.source_error(format!("line {line}: {e}")))
            };
            instruments.push(Instrument {
                in_scope: flag(&row.in_scope, true)?,
                exclude: flag(&row.exclude, false)?,
                ignore: flag(&row.ignore, false)?,
                name: row.name,
                ticker: row.ticker,
                domain: row.domain,
            });
        }
        Ok(instruments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_list(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stocks.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_rows_with_flags() {
        let (_dir, path) = write_list(
            "name,ticker,domain,in_scope,exclude,ignore\n\
             Acme Corp,ACME,Industrials,Yes,No,No\n\
             Globex,GLBX,Energy,No,,\n\
             Initech,INTC,Software,,yes,\n\
             Umbrella,UMB,Pharma,,,TRUE\n",
        );
        let instruments = CsvInstrumentAdapter::new(path).load_instruments().unwrap();
        assert_eq!(instruments.len(), 4);
        assert_eq!(instruments[0].name, "Acme Corp");
        assert!(instruments[0].is_eligible());
        assert!(!instruments[1].in_scope);
        assert!(instruments[2].exclude);
        assert!(instruments[3].ignore);
    }

    #[test]
    fn flag_columns_are_optional() {
        let (_dir, path) = write_list("name,ticker,domain\nAcme,ACME,Industrials\n");
        let instruments = CsvInstrumentAdapter::new(path).load_instruments().unwrap();
        assert!(instruments[0].is_eligible());
    }

    #[test]
    fn whitespace_is_trimmed() {
        let (_dir, path) = write_list("name,ticker,domain\n Acme , ACME ,Tech\n");
        let instruments = CsvInstrumentAdapter::new(path).load_instruments().unwrap();
        assert_eq!(instruments[0].ticker, "ACME");
        assert_eq!(instruments[0].name, "Acme");
    }

    #[test]
    fn empty_ticker_is_rejected() {
        let (_dir, path) = write_list("name,ticker,domain\nAcme,,Tech\n");
        let err = CsvInstrumentAdapter::new(path).load_instruments().unwrap_err();
        assert!(matches!(err, StockpickError::Source { reason } if reason.contains("line 2")));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let (_dir, path) = write_list("name,ticker,domain,exclude\nAcme,ACME,Tech,perhaps\n");
        let err = CsvInstrumentAdapter::new(path).load_instruments().unwrap_err();
        assert!(matches!(err, StockpickError::Source { reason } if reason.contains("perhaps")));
    }

    #[test]
    fn missing_file_is_source_error() {
        let err = CsvInstrumentAdapter::new(PathBuf::from("/nonexistent/stocks.csv"))
            .load_instruments()
            .unwrap_err();
        assert!(matches!(err, StockpickError::Source { .. }));
    }
}
