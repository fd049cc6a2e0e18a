//! Rule-based spender persona
//!
//! A ratio cascade independent of the trained models. The first matching
//! rule wins.

use crate::types::{RawFinancialInput, SpenderPersona};

const DEBT_RISK_EMI_RATIO: f64 = 0.40;
const DEBT_RISK_EMI_RATIO_WITH_THIN_SAVINGS: f64 = 0.30;
const THIN_SAVINGS_RATE: f64 = 0.10;
const OVERSPENDER_DISCRETIONARY_RATIO: f64 = 0.30;
const OVERSPENDER_SAVINGS_RATE: f64 = 0.15;
const BEGINNER_SAVINGS_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedPersonaClassifier;

impl RuleBasedPersonaClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify from raw monthly figures.
    ///
    /// Without positive income and expenses there is nothing to go on, so the
    /// household is a beginner. The savings rate here is the clamped net
    /// balance over income, not the declared savings figure.
    pub fn classify(
        &self,
        monthly_income: f64,
        total_expense: f64,
        discretionary_expense: f64,
        total_emi: f64,
    ) -> SpenderPersona {
        if monthly_income <= 0.0 || total_expense <= 0.0 {
            return SpenderPersona::Beginner;
        }

        let discretionary_ratio = discretionary_expense / total_expense;
        let savings = (monthly_income - total_expense - total_emi).max(0.0);
        let savings_rate = savings / monthly_income;
        let emi_ratio = total_emi / monthly_income;

        if emi_ratio >= DEBT_RISK_EMI_RATIO
            || (emi_ratio >= DEBT_RISK_EMI_RATIO_WITH_THIN_SAVINGS && savings_rate < THIN_SAVINGS_RATE)
        {
            return SpenderPersona::DebtRisk;
        }

        if discretionary_ratio >= OVERSPENDER_DISCRETIONARY_RATIO
            && savings_rate < OVERSPENDER_SAVINGS_RATE
        {
            return SpenderPersona::Overspender;
        }

        if savings_rate < BEGINNER_SAVINGS_RATE {
            return SpenderPersona::Beginner;
        }

        SpenderPersona::Balanced
    }

    pub fn classify_input(&self, input: &RawFinancialInput) -> SpenderPersona {
        self.classify(
            input.monthly_income,
            input.total_expense,
            input.discretionary_expense,
            input.total_emi,
        )
    }
}
