//! Raw input to feature vector.

use tracing::trace;

use super::thresholds::{emi_status_flag, savings_behaviour_flag, spending_behaviour_flag};
use super::vector::FeatureVector;
use crate::error::Result;
use crate::types::RawFinancialInput;

/// Turns validated raw figures into the model feature vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the feature vector, rejecting input the ratios are undefined for.
    ///
    /// `savings_rate` here is the declared savings over income and is not
    /// clamped; the rule-based classifier uses a clamped net-balance rate instead.
    pub fn build(&self, input: &RawFinancialInput) -> Result<FeatureVector> {
        input.validate()?;

        let income = input.monthly_income;
        let expense_ratio = input.total_expense / income;
        let emi_ratio = input.total_emi / income;
        let savings_rate = input.savings / income;

        let features = FeatureVector {
            monthly_income: income,
            total_expense: input.total_expense,
            total_emi: input.total_emi,
            emi_ratio,
            expense_ratio,
            savings_behaviour_flag: savings_behaviour_flag(savings_rate),
            emi_status_flag: emi_status_flag(emi_ratio),
            spending_behaviour_flag: spending_behaviour_flag(expense_ratio),
            net_balance: input.net_balance(),
            savings_rate,
        };

        trace!(?features, "Built feature vector");
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_household() {
        let input = RawFinancialInput::new(50000.0, 20000.0, 5000.0, 15000.0);
        let fv = FeatureBuilder::new().build(&input).unwrap();

        assert_eq!(fv.expense_ratio, 20000.0 / 50000.0);
        assert_eq!(fv.emi_ratio, 5000.0 / 50000.0);
        assert_eq!(fv.savings_rate, 15000.0 / 50000.0);
        assert_eq!(fv.net_balance, 25000.0);
        assert_eq!(fv.savings_behaviour_flag, 0);
        assert_eq!(fv.spending_behaviour_flag, 0);
        assert_eq!(fv.emi_status_flag, 1);
    }

    #[test]
    fn test_savings_rate_not_clamped() {
        // Declared savings can exceed what the month leaves over.
        let input = RawFinancialInput::new(10000.0, 9000.0, 2000.0, 3000.0);
        let fv = FeatureBuilder::new().build(&input).unwrap();
        assert_eq!(fv.net_balance, -1000.0);
        assert_eq!(fv.savings_rate, 0.3);
    }

    #[test]
    fn test_high_burden_flags() {
        let input = RawFinancialInput::new(10000.0, 7000.0, 4500.0, 500.0);
        let fv = FeatureBuilder::new().build(&input).unwrap();
        assert_eq!(fv.savings_behaviour_flag, 1);
        assert_eq!(fv.spending_behaviour_flag, 1);
        assert_eq!(fv.emi_status_flag, 0);
        assert_eq!(fv.behaviour_labels().emi_status, "High EMI Burden");
    }

    #[test]
    fn test_zero_income_rejected() {
        let input = RawFinancialInput::new(0.0, 100.0, 0.0, 0.0);
        let err = FeatureBuilder::new().build(&input).unwrap_err();
        assert!(err.is_input_error());
    }
}
