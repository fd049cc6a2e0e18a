//! Behaviour flag thresholds.
//!
//! Every encoder derives the three flags through these functions so the
//! boundaries stay identical to the ones the artifacts were trained with.

use serde::{Deserialize, Serialize};

/// `savings_rate` at or above this is a good saver.
pub const GOOD_SAVER_MIN_SAVINGS_RATE: f64 = 0.20;

/// `expense_ratio` below this is a moderate spender.
pub const MODERATE_SPENDER_MAX_EXPENSE_RATIO: f64 = 0.60;

/// `emi_ratio` below this is a normal EMI load.
pub const NORMAL_EMI_MAX_EMI_RATIO: f64 = 0.40;

/// 0 for a good saver, 1 for a low saver.
pub fn savings_behaviour_flag(savings_rate: f64) -> u8 {
    if savings_rate >= GOOD_SAVER_MIN_SAVINGS_RATE {
        0
    } else {
        1
    }
}

/// 0 for a moderate spender, 1 for a high spender.
pub fn spending_behaviour_flag(expense_ratio: f64) -> u8 {
    if expense_ratio < MODERATE_SPENDER_MAX_EXPENSE_RATIO {
        0
    } else {
        1
    }
}

/// 1 for a normal EMI load, 0 for a high EMI burden. Note the inverted sense.
pub fn emi_status_flag(emi_ratio: f64) -> u8 {
    if emi_ratio < NORMAL_EMI_MAX_EMI_RATIO {
        1
    } else {
        0
    }
}

/// Display strings for the three flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourLabels {
    pub savings_behaviour: String,
    pub spending_behaviour: String,
    pub emi_status: String,
}

impl BehaviourLabels {
    pub fn from_flags(savings_flag: u8, spending_flag: u8, emi_flag: u8) -> Self {
        Self {
            savings_behaviour: if savings_flag == 0 { "Good Saver" } else { "Low Saver" }.to_string(),
            spending_behaviour: if spending_flag == 0 {
                "Moderate Spender"
            } else {
                "High Spender"
            }
            .to_string(),
            emi_status: if emi_flag == 1 { "Normal EMI" } else { "High EMI Burden" }.to_string(),
        }
    }
}
