//! Financial health score
//!
//! `clamp((1 − expense_ratio)·35 + (1 − emi_ratio)·25 + savings_rate·40, 0, 100)`,
//! rounded to one decimal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::RawFinancialInput;

const EXPENSE_WEIGHT: f64 = 35.0;
const EMI_WEIGHT: f64 = 25.0;
const SAVINGS_WEIGHT: f64 = 40.0;

/// Scores below this are high risk.
pub const HIGH_RISK_BELOW: f64 = 40.0;
/// Scores at or above this are low risk.
pub const LOW_RISK_FROM: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < HIGH_RISK_BELOW {
            RiskLevel::High
        } else if score < LOW_RISK_FROM {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::Low => "Low Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthScore {
    pub score: f64,
    pub risk: RiskLevel,
    pub risk_label: &'static str,
}

/// Pure score function over three ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScoreCalculator;

impl HealthScoreCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, expense_ratio: f64, emi_ratio: f64, savings_rate: f64) -> HealthScore {
        let raw = (1.0 - expense_ratio) * EXPENSE_WEIGHT
            + (1.0 - emi_ratio) * EMI_WEIGHT
            + savings_rate * SAVINGS_WEIGHT;
        // NaN only arises from opposing infinities; treat it as the worst score
        let raw = if raw.is_nan() { 0.0 } else { raw };
        let score = round1(raw.clamp(0.0, 100.0));
        let risk = RiskLevel::from_score(score);
        HealthScore {
            score,
            risk,
            risk_label: risk.label(),
        }
    }
}

/// Score recomputed from four figures with the ratios as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIfScore {
    pub score: f64,
    pub risk: RiskLevel,
    pub risk_label: &'static str,
    pub expense_ratio_pct: f64,
    pub emi_ratio_pct: f64,
    pub savings_rate_pct: f64,
}

/// What-if scoring for adjusted figures; needs no model artifacts.
pub fn what_if(income: f64, expense: f64, emi: f64, savings: f64) -> Result<WhatIfScore> {
    RawFinancialInput::new(income, expense, emi, savings).validate()?;

    let expense_ratio = expense / income;
    let emi_ratio = emi / income;
    let savings_rate = savings / income;
    let health = HealthScoreCalculator::new().compute(expense_ratio, emi_ratio, savings_rate);

    Ok(WhatIfScore {
        score: health.score,
        risk: health.risk,
        risk_label: health.risk_label,
        expense_ratio_pct: round1(expense_ratio * 100.0),
        emi_ratio_pct: round1(emi_ratio * 100.0),
        savings_rate_pct: round1(savings_rate * 100.0),
    })
}

/// Round half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
