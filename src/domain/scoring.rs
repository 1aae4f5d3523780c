//! Sentiment scoring: additive tier tables on top of a neutral base.
//!
//! Each factor owns an ordered tier table. Tiers are tested top to bottom and
//! the first tier whose conditions all hold awards its points; a factor with
//! no matching tier or a missing input awards nothing. The sum is clamped to
//! `[MIN_SCORE, MAX_SCORE]`.
//!
//! | factor          | tiers (first match)                              |
//! |-----------------|--------------------------------------------------|
//! | trend           | above MA200 +10, at/below +5, unavailable +0     |
//! | momentum        | 1y>10 & 3y>30 +10, 1y>5 & 3y>15 +7, both >0 +5   |
//! | volume trend    | >1.5 +10, >1.2 +7, >1.0 +5                       |
//! | P/E             | 10..=25 +10, 5..=30 +7, anything else +3         |
//! | profit margin   | >0.2 +10, >0.1 +7, >0 +5                         |
//! | revenue growth  | >0.2 +10, >0.1 +7, >0 +5                         |
//! | debt/equity     | <0.5 +10, <1.0 +7, <2.0 +5                       |

use crate::domain::fundamentals::FundamentalMetrics;
use crate::domain::technical::{trend_of, TechnicalSignals, Trend};

pub const BASE_SCORE: i32 = 50;
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    Above(f64),
    Below(f64),
    /// Inclusive on both ends.
    Between(f64, f64),
    Any,
}

impl Condition {
    pub fn holds(self, value: f64) -> bool {
        match self {
            Condition::Above(t) => value > t,
            Condition::Below(t) => value < t,
            Condition::Between(lo, hi) => lo <= value && value <= hi,
            Condition::Any => true,
        }
    }
}

/// One row of a tier table; condition `i` applies to input `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier<const N: usize> {
    pub when: [Condition; N],
    pub points: i32,
}

impl<const N: usize> Tier<N> {
    pub const fn new(when: [Condition; N], points: i32) -> Self {
        Self { when, points }
    }
}

/// Points of the first tier whose conditions all hold, else 0.
pub fn tier_points<const N: usize>(tiers: &[Tier<N>], inputs: [f64; N]) -> i32 {
    tiers
        .iter()
        .find(|tier| tier.when.iter().zip(inputs).all(|(c, v)| c.holds(v)))
        .map_or(0, |tier| tier.points)
}

pub const MOMENTUM_TIERS: [Tier<2>; 3] = [
    Tier::new([Condition::Above(10.0), Condition::Above(30.0)], 10),
    Tier::new([Condition::Above(5.0), Condition::Above(15.0)], 7),
    Tier::new([Condition::Above(0.0), Condition::Above(0.0)], 5),
];

pub const VOLUME_TIERS: [Tier<1>; 3] = [
    Tier::new([Condition::Above(1.5)], 10),
    Tier::new([Condition::Above(1.2)], 7),
    Tier::new([Condition::Above(1.0)], 5),
];

pub const PE_TIERS: [Tier<1>; 3] = [
    Tier::new([Condition::Between(10.0, 25.0)], 10),
    Tier::new([Condition::Between(5.0, 30.0)], 7),
    Tier::new([Condition::Any], 3),
];

/// Shared by profit margin and revenue growth.
pub const GROWTH_TIERS: [Tier<1>; 3] = [
    Tier::new([Condition::Above(0.2)], 10),
    Tier::new([Condition::Above(0.1)], 7),
    Tier::new([Condition::Above(0.0)], 5),
];

pub const DEBT_TIERS: [Tier<1>; 3] = [
    Tier::new([Condition::Below(0.5)], 10),
    Tier::new([Condition::Below(1.0)], 7),
    Tier::new([Condition::Below(2.0)], 5),
];

pub struct FundamentalFactor {
    pub name: &'static str,
    pub value: fn(&FundamentalMetrics) -> Option<f64>,
    pub tiers: &'static [Tier<1>],
}

/// Scored fundamental factors, in display order. Append to add a factor.
pub const FUNDAMENTAL_FACTORS: [FundamentalFactor; 4] = [
    FundamentalFactor {
        name: "pe_ratio",
        value: |f: &FundamentalMetrics| f.pe_ratio,
        tiers: &PE_TIERS,
    },
    FundamentalFactor {
        name: "profit_margin",
        value: |f: &FundamentalMetrics| f.profit_margin,
        tiers: &GROWTH_TIERS,
    },
    FundamentalFactor {
        name: "revenue_growth",
        value: |f: &FundamentalMetrics| f.revenue_growth,
        tiers: &GROWTH_TIERS,
    },
    FundamentalFactor {
        name: "debt_to_equity",
        value: |f: &FundamentalMetrics| f.debt_to_equity,
        tiers: &DEBT_TIERS,
    },
];

pub fn trend_points(trend: Trend) -> i32 {
    match trend {
        Trend::Above => 10,
        Trend::AtOrBelow => 5,
        Trend::Unavailable => 0,
    }
}

/// Points awarded per factor before clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub trend: i32,
    pub momentum: i32,
    pub volume: i32,
    /// `(factor name, points)` for every fundamental factor, present or not.
    pub fundamentals: Vec<(&'static str, i32)>,
}

impl ScoreBreakdown {
    pub fn compute(
        technical: Option<&TechnicalSignals>,
        fundamentals: &FundamentalMetrics,
    ) -> Self {
        let (momentum, volume) = match technical {
            Some(t) => (
                tier_points(&MOMENTUM_TIERS, [t.momentum_1y, t.momentum_3y]),
                tier_points(&VOLUME_TIERS, [t.volume_trend]),
            ),
            None => (0, 0),
        };

        let fundamentals = FUNDAMENTAL_FACTORS
            .iter()
            .map(|factor| {
                let points = (factor.value)(fundamentals)
                    .map_or(0, |v| tier_points(factor.tiers, [v]));
                (factor.name, points)
            })
            .collect();

        ScoreBreakdown {
            trend: trend_points(trend_of(technical)),
            momentum,
            volume,
            fundamentals,
        }
    }

    /// Unclamped sum including the base.
    pub fn raw_total(&self) -> i32 {
        BASE_SCORE
            + self.trend
            + self.momentum
            + self.volume
            + self.fundamentals.iter().map(|(_, p)| p).sum::<i32>()
    }

    pub fn score(&self) -> i32 {
        self.raw_total().clamp(MIN_SCORE, MAX_SCORE)
    }

    pub fn points(&self, name: &str) -> Option<i32> {
        match name {
            "trend" => Some(self.trend),
            "momentum" => Some(self.momentum),
            "volume" => Some(self.volume),
            _ => self
                .fundamentals
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, p)| *p),
        }
    }
}

/// Sentiment score in `[0, 100]`.
pub fn sentiment_score(
    technical: Option<&TechnicalSignals>,
    fundamentals: &FundamentalMetrics,
) -> i32 {
    ScoreBreakdown::compute(technical, fundamentals).score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(above: bool, m1: f64, m3: f64, volume: f64) -> TechnicalSignals {
        TechnicalSignals {
            price_above_ma200: above,
            ma200: 100.0,
            momentum_1y: m1,
            momentum_3y: m3,
            volume_trend: volume,
            current_price: 100.0,
        }
    }

    fn fundamentals(pe: f64, margin: f64, growth: f64, debt: f64) -> FundamentalMetrics {
        FundamentalMetrics {
            pe_ratio: Some(pe),
            profit_margin: Some(margin),
            revenue_growth: Some(growth),
            debt_to_equity: Some(debt),
            ..Default::default()
        }
    }

    #[test]
    fn strong_technicals_without_fundamentals() {
        let t = signals(true, 12.0, 35.0, 1.6);
        assert_eq!(sentiment_score(Some(&t), &FundamentalMetrics::default()), 80);
    }

    #[test]
    fn weak_technicals_without_fundamentals() {
        let t = signals(false, -2.0, -5.0, 0.9);
        assert_eq!(sentiment_score(Some(&t), &FundamentalMetrics::default()), 55);
    }

    #[test]
    fn unavailable_technicals_score_base_only() {
        assert_eq!(sentiment_score(None, &FundamentalMetrics::default()), 50);
    }

    #[test]
    fn everything_maxed_clamps_to_100() {
        let t = signals(true, 50.0, 100.0, 2.0);
        let f = fundamentals(15.0, 0.3, 0.3, 0.1);
        let breakdown = ScoreBreakdown::compute(Some(&t), &f);
        assert_eq!(breakdown.raw_total(), 120);
        assert_eq!(breakdown.score(), 100);
    }

    #[test]
    fn momentum_first_match_wins() {
        assert_eq!(tier_points(&MOMENTUM_TIERS, [11.0, 31.0]), 10);
        assert_eq!(tier_points(&MOMENTUM_TIERS, [11.0, 20.0]), 7);
        assert_eq!(tier_points(&MOMENTUM_TIERS, [6.0, 1.0]), 5);
        assert_eq!(tier_points(&MOMENTUM_TIERS, [6.0, -1.0]), 0);
        assert_eq!(tier_points(&MOMENTUM_TIERS, [10.0, 30.0]), 7);
    }

    #[test]
    fn volume_tiers() {
        assert_eq!(tier_points(&VOLUME_TIERS, [1.51]), 10);
        assert_eq!(tier_points(&VOLUME_TIERS, [1.5]), 7);
        assert_eq!(tier_points(&VOLUME_TIERS, [1.1]), 5);
        assert_eq!(tier_points(&VOLUME_TIERS, [1.0]), 0);
    }

    #[test]
    fn pe_tiers_are_inclusive() {
        assert_eq!(tier_points(&PE_TIERS, [10.0]), 10);
        assert_eq!(tier_points(&PE_TIERS, [25.0]), 10);
        assert_eq!(tier_points(&PE_TIERS, [5.0]), 7);
        assert_eq!(tier_points(&PE_TIERS, [30.0]), 7);
        assert_eq!(tier_points(&PE_TIERS, [30.5]), 3);
        assert_eq!(tier_points(&PE_TIERS, [-4.0]), 3);
    }

    #[test]
    fn growth_and_debt_tiers() {
        assert_eq!(tier_points(&GROWTH_TIERS, [0.21]), 10);
        assert_eq!(tier_points(&GROWTH_TIERS, [0.2]), 7);
        assert_eq!(tier_points(&GROWTH_TIERS, [0.05]), 5);
        assert_eq!(tier_points(&GROWTH_TIERS, [0.0]), 0);
        assert_eq!(tier_points(&DEBT_TIERS, [0.4]), 10);
        assert_eq!(tier_points(&DEBT_TIERS, [0.5]), 7);
        assert_eq!(tier_points(&DEBT_TIERS, [1.9]), 5);
        assert_eq!(tier_points(&DEBT_TIERS, [2.0]), 0);
    }

    #[test]
    fn missing_fundamental_contributes_nothing() {
        let t = signals(false, -1.0, -1.0, 0.5);
        let f = FundamentalMetrics {
            profit_margin: Some(0.25),
            ..Default::default()
        };
        let breakdown = ScoreBreakdown::compute(Some(&t), &f);
        assert_eq!(breakdown.points("profit_margin"), Some(10));
        assert_eq!(breakdown.points("pe_ratio"), Some(0));
        assert_eq!(breakdown.points("debt_to_equity"), Some(0));
        assert_eq!(breakdown.score(), 50 + 5 + 10);
    }

    #[test]
    fn nan_inputs_fall_through() {
        let t = signals(true, f64::NAN, f64::NAN, f64::NAN);
        let f = FundamentalMetrics {
            pe_ratio: Some(f64::NAN),
            profit_margin: Some(f64::NAN),
            ..Default::default()
        };
        let breakdown = ScoreBreakdown::compute(Some(&t), &f);
        assert_eq!(breakdown.momentum, 0);
        assert_eq!(breakdown.volume, 0);
        assert_eq!(breakdown.points("pe_ratio"), Some(3));
        assert_eq!(breakdown.points("profit_margin"), Some(0));
    }

    #[test]
    fn breakdown_unknown_factor() {
        let breakdown = ScoreBreakdown::compute(None, &FundamentalMetrics::default());
        assert_eq!(breakdown.points("nonexistent"), None);
        assert_eq!(breakdown.fundamentals.len(), FUNDAMENTAL_FACTORS.len());
    }
}
