//! Action plan generator
//!
//! Independent threshold gates over percentages. Every gate that matches
//! contributes one item, always in the same order.

use serde::{Deserialize, Serialize};

const TARGET_SAVINGS_PCT: f64 = 20.0;
const MAX_EMI_PCT: f64 = 35.0;
const MAX_EXPENSE_PCT: f64 = 60.0;
const INVEST_MIN_SAVINGS_PCT: f64 = 40.0;
const INVEST_MAX_EMI_PCT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionItem {
    IncreaseSavings,
    ReduceEmi,
    OptimizeSpending,
    ConsiderInvesting,
}

impl ActionItem {
    pub fn message(&self) -> &'static str {
        match self {
            ActionItem::IncreaseSavings => "Increase savings rate to at least 20% of income.",
            ActionItem::ReduceEmi => "Reduce EMI burden below 35% of income.",
            ActionItem::OptimizeSpending => "Optimize discretionary spending to reduce expense ratio.",
            ActionItem::ConsiderInvesting => "Consider long-term investments for wealth growth.",
        }
    }
}

/// Inputs to the plan; the ratios are percentages (0-100 scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanInputs {
    pub score: f64,
    pub savings_rate_pct: f64,
    pub emi_ratio_pct: f64,
    pub expense_ratio_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub items: Vec<ActionItem>,
    pub messages: Vec<String>,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionPlanGenerator;

impl ActionPlanGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The score is carried for context; no gate reads it.
    pub fn generate(&self, inputs: &PlanInputs) -> ActionPlan {
        let mut items = Vec::new();

        if inputs.savings_rate_pct < TARGET_SAVINGS_PCT {
            items.push(ActionItem::IncreaseSavings);
        }
        if inputs.emi_ratio_pct > MAX_EMI_PCT {
            items.push(ActionItem::ReduceEmi);
        }
        if inputs.expense_ratio_pct > MAX_EXPENSE_PCT {
            items.push(ActionItem::OptimizeSpending);
        }
        if inputs.savings_rate_pct >= INVEST_MIN_SAVINGS_PCT && inputs.emi_ratio_pct < INVEST_MAX_EMI_PCT {
            items.push(ActionItem::ConsiderInvesting);
        }

        let messages = items.iter().map(|i| i.message().to_string()).collect();
        ActionPlan { items, messages }
    }
}
