//! Feature vector layout shared with the trained artifacts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::thresholds::BehaviourLabels;

/// Number of features the artifacts expect.
pub const FEATURE_COUNT: usize = 10;

/// Feature names in vector order. Artifacts must list exactly these.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "monthly_income",
    "total_expense",
    "total_emi",
    "emi_ratio",
    "expense_ratio",
    "savings_behaviour",
    "emi_status",
    "spending_behaviour",
    "net_balance",
    "savings_rate",
];

/// Unscaled features for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub monthly_income: f64,
    pub total_expense: f64,
    pub total_emi: f64,
    pub emi_ratio: f64,
    pub expense_ratio: f64,
    pub savings_behaviour_flag: u8,
    pub emi_status_flag: u8,
    pub spending_behaviour_flag: u8,
    pub net_balance: f64,
    pub savings_rate: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.monthly_income,
            self.total_expense,
            self.total_emi,
            self.emi_ratio,
            self.expense_ratio,
            f64::from(self.savings_behaviour_flag),
            f64::from(self.emi_status_flag),
            f64::from(self.spending_behaviour_flag),
            self.net_balance,
            self.savings_rate,
        ]
    }

    pub fn behaviour_labels(&self) -> BehaviourLabels {
        BehaviourLabels::from_flags(
            self.savings_behaviour_flag,
            self.spending_behaviour_flag,
            self.emi_status_flag,
        )
    }
}

/// Feature vector after standardization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledVector(pub [f64; FEATURE_COUNT]);

impl ScaledVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    /// Name-keyed view for the structured classifier.
    pub fn to_named_map(&self) -> BTreeMap<&'static str, f64> {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_map_follows_order() {
        let scaled = ScaledVector([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let map = scaled.to_named_map();
        assert_eq!(map.len(), FEATURE_COUNT);
        assert_eq!(map["monthly_income"], 0.0);
        assert_eq!(map["savings_rate"], 9.0);
        assert_eq!(scaled.get("net_balance"), Some(8.0));
        assert_eq!(scaled.get("unknown"), None);
    }
}
