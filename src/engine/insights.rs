//! Spending and savings insights derived from the same monthly figures.

use serde::{Deserialize, Serialize};

use super::health::round1;
use crate::types::{sum_of_kind, ExpenseCategory, ExpenseKind, RawFinancialInput};

const STRONG_SAVINGS_PCT: f64 = 30.0;
const MODERATE_SAVINGS_PCT: f64 = 15.0;

// ─────────────────────────────────────────────────────────────────
// Spending
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub amount: f64,
    /// Share of total expense, one decimal
    pub percent: f64,
    pub kind: ExpenseKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCategory {
    pub name: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingInsights {
    pub expense_income_ratio_pct: f64,
    pub categories: Vec<CategoryShare>,
    /// Largest category by amount; the first one listed wins a tie
    pub top_category: Option<TopCategory>,
    pub essentials_pct: f64,
    pub discretionary_pct: f64,
}

impl SpendingInsights {
    pub fn compute(input: &RawFinancialInput) -> Self {
        let categories = &input.categories;
        let total: f64 = categories.iter().map(|c| c.amount).sum();
        let share = |amount: f64| if total > 0.0 { round1(amount / total * 100.0) } else { 0.0 };

        let shares: Vec<CategoryShare> = categories
            .iter()
            .map(|c| CategoryShare {
                name: c.name.clone(),
                amount: c.amount,
                percent: share(c.amount),
                kind: c.kind,
            })
            .collect();

        let top_category = top_by_amount(categories).map(|c| TopCategory {
            name: c.name.clone(),
            percent: share(c.amount),
        });

        let expense_income_ratio_pct = if input.monthly_income > 0.0 {
            round1(input.total_expense / input.monthly_income * 100.0)
        } else {
            0.0
        };

        Self {
            expense_income_ratio_pct,
            categories: shares,
            top_category,
            essentials_pct: share(sum_of_kind(categories, ExpenseKind::Essential)),
            discretionary_pct: share(sum_of_kind(categories, ExpenseKind::Discretionary)),
        }
    }
}

fn top_by_amount(categories: &[ExpenseCategory]) -> Option<&ExpenseCategory> {
    let mut top: Option<&ExpenseCategory> = None;
    for category in categories {
        if top.map_or(true, |t| category.amount > t.amount) {
            top = Some(category);
        }
    }
    top
}

// ─────────────────────────────────────────────────────────────────
// Savings
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsHealth {
    Strong,
    Moderate,
    NeedsImprovement,
}

impl SavingsHealth {
    pub fn from_rate_pct(savings_rate_pct: f64) -> Self {
        if savings_rate_pct >= STRONG_SAVINGS_PCT {
            SavingsHealth::Strong
        } else if savings_rate_pct >= MODERATE_SAVINGS_PCT {
            SavingsHealth::Moderate
        } else {
            SavingsHealth::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SavingsHealth::Strong => "Strong",
            SavingsHealth::Moderate => "Moderate",
            SavingsHealth::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInsights {
    /// Net balance left each month
    pub monthly_savings: f64,
    pub savings_rate_pct: f64,
    pub savings_health: SavingsHealth,
    pub savings_health_label: String,
    /// Months of expenses one month's net balance covers
    pub coverage_months: f64,
}

impl SavingsInsights {
    /// `savings_rate_pct` is the rate reported alongside the score.
    pub fn compute(input: &RawFinancialInput, savings_rate_pct: f64) -> Self {
        let monthly_savings = input.net_balance();
        let coverage_months = if input.total_expense > 0.0 {
            round1(monthly_savings / input.total_expense)
        } else {
            0.0
        };
        let savings_health = SavingsHealth::from_rate_pct(savings_rate_pct);

        Self {
            monthly_savings,
            savings_rate_pct: round1(savings_rate_pct),
            savings_health,
            savings_health_label: savings_health.label().to_string(),
            coverage_months,
        }
    }
}
