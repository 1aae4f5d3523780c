//! Budget allocation across the top-ranked scored instruments.
//!
//! 1. Instruments missing any ranking/sizing field are set aside.
//! 2. The rest are stably sorted by (score desc, profit margin desc).
//! 3. The first `n_stocks` are selected and weighted by score.
//! 4. planned = round2(weight * budget), shares = round4(planned / price),
//!    actual = round2(shares * price), percentage = round2(actual / sum * 100).
//!
//! Every input row comes back exactly once, in input order; rows outside the
//! selection carry zeros.

use crate::domain::instrument::ScoredInstrument;
use std::cmp::Ordering;

pub const DEFAULT_TOTAL_INVESTMENT: f64 = 2000.0;
pub const DEFAULT_N_STOCKS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationConfig {
    pub total_investment: f64,
    pub n_stocks: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            total_investment: DEFAULT_TOTAL_INVESTMENT,
            n_stocks: DEFAULT_N_STOCKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStatus {
    /// Ranked within the top `n_stocks`; `rank` is zero-based.
    Selected { rank: usize },
    /// Ranked but outside the top `n_stocks`.
    Unselected { rank: usize },
    /// Missing data; never ranked.
    Incomplete,
}

impl AllocationStatus {
    pub fn label(self) -> &'static str {
        match self {
            AllocationStatus::Selected { .. } => "selected",
            AllocationStatus::Unselected { .. } => "unselected",
            AllocationStatus::Incomplete => "incomplete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    pub instrument: ScoredInstrument,
    pub status: AllocationStatus,
    pub weight: f64,
    pub planned_investment: f64,
    pub shares: f64,
    pub actual_investment: f64,
    pub portfolio_percentage: f64,
}

impl AllocationResult {
    fn unfunded(instrument: ScoredInstrument, status: AllocationStatus) -> Self {
        Self {
            instrument,
            status,
            weight: 0.0,
            planned_investment: 0.0,
            shares: 0.0,
            actual_investment: 0.0,
            portfolio_percentage: 0.0,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.status, AllocationStatus::Selected { .. })
    }

    pub fn rank(&self) -> Option<usize> {
        match self.status {
            AllocationStatus::Selected { rank } | AllocationStatus::Unselected { rank } => {
                Some(rank)
            }
            AllocationStatus::Incomplete => None,
        }
    }
}

/// The immutable result of one allocation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub rows: Vec<AllocationResult>,
    pub total_investment: f64,
}

impl Allocation {
    /// Selected rows in rank order.
    pub fn selected(&self) -> Vec<&AllocationResult> {
        let mut selected: Vec<_> = self.rows.iter().filter(|r| r.is_selected()).collect();
        selected.sort_by_key(|r| r.rank());
        selected
    }

    pub fn total_invested(&self) -> f64 {
        self.rows.iter().map(|r| r.actual_investment).sum()
    }

    pub fn remaining_cash(&self) -> f64 {
        self.total_investment - self.total_invested()
    }

    /// All rows, stably sorted by sentiment score descending.
    pub fn sorted_by_score(&self) -> Vec<&AllocationResult> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.instrument.sentiment_score.cmp(&a.instrument.sentiment_score));
        rows
    }
}

/// Round half to even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

fn ranking_order(a: &ScoredInstrument, b: &ScoredInstrument) -> Ordering {
    let margin = |s: &ScoredInstrument| s.fundamentals.profit_margin.unwrap_or(f64::NEG_INFINITY);
    b.sentiment_score
        .cmp(&a.sentiment_score)
        .then_with(|| margin(b).total_cmp(&margin(a)))
}

/// Indices of complete instruments in rank order. Ties keep input order.
pub fn rank(instruments: &[ScoredInstrument]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..instruments.len())
        .filter(|&i| instruments[i].is_complete())
        .collect();
    ranked.sort_by(|&a, &b| ranking_order(&instruments[a], &instruments[b]));
    ranked
}

struct Sizing {
    weight: f64,
    planned: f64,
    shares: f64,
    actual: f64,
}

pub fn allocate(instruments: Vec<ScoredInstrument>, config: &AllocationConfig) -> Allocation {
    let ranked = rank(&instruments);
    let selected_count = config.n_stocks.min(ranked.len());

    let mut statuses = vec![AllocationStatus::Incomplete; instruments.len()];
    for (rank, &idx) in ranked.iter().enumerate() {
        statuses[idx] = if rank < selected_count {
            AllocationStatus::Selected { rank }
        } else {
            AllocationStatus::Unselected { rank }
        };
    }

    let selected = &ranked[..selected_count];
    let score_sum: i64 = selected
        .iter()
        .map(|&i| i64::from(instruments[i].sentiment_score))
        .sum();

    if selected.is_empty() || score_sum == 0 {
        log::warn!(
            "empty selection: {} of {} instruments complete, n_stocks = {}",
            ranked.len(),
            instruments.len(),
            config.n_stocks
        );
        let rows = instruments
            .into_iter()
            .zip(statuses)
            .map(|(inst, status)| {
                let status = match status {
                    AllocationStatus::Selected { rank } => AllocationStatus::Unselected { rank },
                    other => other,
                };
                AllocationResult::unfunded(inst, status)
            })
            .collect();
        return Allocation {
            rows,
            total_investment: config.total_investment,
        };
    }

    let mut sizing: Vec<Option<Sizing>> = (0..instruments.len()).map(|_| None).collect();
    for &idx in selected {
        let inst = &instruments[idx];
        // is_complete guarantees a price
        let price = inst.current_price().unwrap_or(f64::NAN);
        let weight = f64::from(inst.sentiment_score) / score_sum as f64;
        let planned = round_to(weight * config.total_investment, 2);
        let shares = round_to(planned / price, 4);
        let actual = round_to(shares * price, 2);
        sizing[idx] = Some(Sizing {
            weight,
            planned,
            shares,
            actual,
        });
    }

    let actual_sum: f64 = sizing.iter().flatten().map(|s| s.actual).sum();

    let rows = instruments
        .into_iter()
        .zip(statuses)
        .zip(sizing)
        .map(|((inst, status), sizing)| match sizing {
            Some(s) => AllocationResult {
                instrument: inst,
                status,
                weight: s.weight,
                planned_investment: s.planned,
                shares: s.shares,
                actual_investment: s.actual,
                portfolio_percentage: if actual_sum > 0.0 {
                    round_to(s.actual / actual_sum * 100.0, 2)
                } else {
                    0.0
                },
            },
            None => AllocationResult::unfunded(inst, status),
        })
        .collect();

    Allocation {
        rows,
        total_investment: config.total_investment,
    }
}
