//! Instrument identity and the per-instrument scored record.

use crate::domain::fundamentals::FundamentalMetrics;
use crate::domain::scoring::ScoreBreakdown;
use crate::domain::technical::TechnicalSignals;

/// One row of the instrument list.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub name: String,
    pub ticker: String,
    pub domain: String,
    pub in_scope: bool,
    pub exclude: bool,
    pub ignore: bool,
}

impl Instrument {
    pub fn new(name: &str, ticker: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            ticker: ticker.to_string(),
            domain: domain.to_string(),
            in_scope: true,
            exclude: false,
            ignore: false,
        }
    }

    /// Only in-scope, non-excluded, non-ignored instruments are scored.
    pub fn is_eligible(&self) -> bool {
        self.in_scope && !self.exclude && !self.ignore
    }
}

pub fn eligible(instruments: Vec<Instrument>) -> Vec<Instrument> {
    instruments.into_iter().filter(Instrument::is_eligible).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredInstrument {
    pub name: String,
    pub ticker: String,
    pub domain: String,
    pub technical: Option<TechnicalSignals>,
    pub fundamentals: FundamentalMetrics,
    pub sentiment_score: i32,
}

impl ScoredInstrument {
    pub fn score(
        instrument: &Instrument,
        technical: Option<TechnicalSignals>,
        fundamentals: FundamentalMetrics,
    ) -> Self {
        let sentiment_score = ScoreBreakdown::compute(technical.as_ref(), &fundamentals).score();
        Self {
            name: instrument.name.clone(),
            ticker: instrument.ticker.clone(),
            domain: instrument.domain.clone(),
            technical,
            fundamentals,
            sentiment_score,
        }
    }

    pub fn current_price(&self) -> Option<f64> {
        self.technical.as_ref().map(|t| t.current_price)
    }

    /// All fields the allocator ranks and sizes on are present and not NaN,
    /// and the price is positive.
    pub fn is_complete(&self) -> bool {
        let Some(t) = &self.technical else {
            return false;
        };
        let f = &self.fundamentals;
        let required = [
            Some(t.current_price),
            Some(t.momentum_1y),
            Some(t.momentum_3y),
            Some(t.volume_trend),
            f.pe_ratio,
            f.profit_margin,
            f.revenue_growth,
            f.debt_to_equity,
        ];
        required.iter().all(|v| matches!(v, Some(x) if !x.is_nan())) && t.current_price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> TechnicalSignals {
        TechnicalSignals {
            price_above_ma200: true,
            ma200: 90.0,
            momentum_1y: 12.0,
            momentum_3y: 35.0,
            volume_trend: 1.6,
            current_price: 100.0,
        }
    }

    fn full_fundamentals() -> FundamentalMetrics {
        FundamentalMetrics {
            pe_ratio: Some(15.0),
            profit_margin: Some(0.25),
            revenue_growth: Some(0.15),
            debt_to_equity: Some(0.4),
            ..Default::default()
        }
    }

    #[test]
    fn eligibility_flags() {
        let base = Instrument::new("Acme", "ACME", "Industrials");
        assert!(base.is_eligible());
        assert!(!Instrument { in_scope: false, ..base.clone() }.is_eligible());
        assert!(!Instrument { exclude: true, ..base.clone() }.is_eligible());
        assert!(!Instrument { ignore: true, ..base }.is_eligible());
    }

    #[test]
    fn eligible_keeps_order() {
        let list = vec![
            Instrument::new("A", "A", "x"),
            Instrument { ignore: true, ..Instrument::new("B", "B", "x") },
            Instrument::new("C", "C", "x"),
        ];
        let tickers: Vec<_> = eligible(list).into_iter().map(|i| i.ticker).collect();
        assert_eq!(tickers, vec!["A", "C"]);
    }

    #[test]
    fn score_copies_identity() {
        let instrument = Instrument::new("Acme", "ACME", "Industrials");
        let scored = ScoredInstrument::score(&instrument, Some(signals()), full_fundamentals());
        assert_eq!(scored.ticker, "ACME");
        assert_eq!(scored.domain, "Industrials");
        // 50 + 10 + 10 + 10 + 10 + 10 + 7 + 10, clamped
        assert_eq!(scored.sentiment_score, 100);
        assert_eq!(scored.current_price(), Some(100.0));
    }

    #[test]
    fn completeness_requires_every_field() {
        let instrument = Instrument::new("Acme", "ACME", "Industrials");
        let complete = ScoredInstrument::score(&instrument, Some(signals()), full_fundamentals());
        assert!(complete.is_complete());

        let no_pe = ScoredInstrument {
            fundamentals: FundamentalMetrics {
                pe_ratio: None,
                ..full_fundamentals()
            },
            ..complete.clone()
        };
        assert!(!no_pe.is_complete());

        let no_technical = ScoredInstrument {
            technical: None,
            ..complete.clone()
        };
        assert!(!no_technical.is_complete());

        let nan_volume = ScoredInstrument {
            technical: Some(TechnicalSignals {
                volume_trend: f64::NAN,
                ..signals()
            }),
            ..complete.clone()
        };
        assert!(!nan_volume.is_complete());

        let zero_price = ScoredInstrument {
            technical: Some(TechnicalSignals {
                current_price: 0.0,
                ..signals()
            }),
            ..complete
        };
        assert!(!zero_price.is_complete());
    }

    #[test]
    fn optional_extras_are_not_required() {
        let instrument = Instrument::new("Acme", "ACME", "Industrials");
        let scored = ScoredInstrument::score(&instrument, Some(signals()), full_fundamentals());
        assert!(scored.fundamentals.market_cap.is_none());
        assert!(scored.is_complete());
    }
}
