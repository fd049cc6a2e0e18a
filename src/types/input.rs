//! Raw financial input accepted by the engine.
//!
//! The request layer hands over already-parsed numbers; this module only
//! checks the numeric invariants (finite, non-negative, income > 0) and
//! reconciles itemized categories with the declared totals.

use serde::{Deserialize, Serialize};

use crate::engine::goals::SavingsGoal;
use crate::error::{Error, Result};

/// Relative tolerance when itemized categories are checked against a declared total.
const CATEGORY_SUM_TOLERANCE: f64 = 1e-6;

// ─────────────────────────────────────────────────────────────────
// Expense Categories
// ─────────────────────────────────────────────────────────────────

/// How an expense category counts towards discretionary spending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    /// Needs: rent, groceries, utilities...
    Essential,
    /// Wants: dining out, shopping, entertainment...
    Discretionary,
    /// Counted in the total but in neither subset.
    Mixed,
}

/// Standard categories collected by the input form, with their kind.
pub const STANDARD_CATEGORIES: &[(&str, ExpenseKind)] = &[
    ("Rent", ExpenseKind::Essential),
    ("Groceries", ExpenseKind::Essential),
    ("Transport", ExpenseKind::Essential),
    ("Utilities", ExpenseKind::Essential),
    ("Healthcare", ExpenseKind::Essential),
    ("Education", ExpenseKind::Essential),
    ("Dining Out", ExpenseKind::Discretionary),
    ("Shopping", ExpenseKind::Discretionary),
    ("Entertainment", ExpenseKind::Discretionary),
];

impl ExpenseKind {
    /// Kind of a standard category, matched case-insensitively with `_` as space.
    pub fn for_standard_category(name: &str) -> Option<Self> {
        let normalized = name.trim().replace('_', " ");
        STANDARD_CATEGORIES
            .iter()
            .find(|(std_name, _)| std_name.eq_ignore_ascii_case(&normalized))
            .map(|(_, kind)| *kind)
    }
}

/// One itemized monthly expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub name: String,
    pub amount: f64,
    pub kind: ExpenseKind,
}

impl ExpenseCategory {
    pub fn new(name: impl Into<String>, amount: f64, kind: ExpenseKind) -> Self {
        Self {
            name: name.into(),
            amount,
            kind,
        }
    }

    /// Build a category whose kind comes from the standard table (`Mixed` if unknown).
    pub fn standard(name: impl Into<String>, amount: f64) -> Self {
        let name = name.into();
        let kind = ExpenseKind::for_standard_category(&name).unwrap_or(ExpenseKind::Mixed);
        Self { name, amount, kind }
    }
}

// ─────────────────────────────────────────────────────────────────
// Raw Financial Input
// ─────────────────────────────────────────────────────────────────

/// Monthly figures for one household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinancialInput {
    pub monthly_income: f64,
    pub total_expense: f64,
    pub total_emi: f64,
    /// Savings figure declared by the user.
    pub savings: f64,
    /// Discretionary subset of `total_expense`.
    #[serde(default)]
    pub discretionary_expense: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<ExpenseCategory>,
}

impl RawFinancialInput {
    pub fn new(monthly_income: f64, total_expense: f64, total_emi: f64, savings: f64) -> Self {
        Self {
            monthly_income,
            total_expense,
            total_emi,
            savings,
            discretionary_expense: 0.0,
            categories: Vec::new(),
        }
    }

    pub fn with_discretionary(mut self, discretionary_expense: f64) -> Self {
        self.discretionary_expense = discretionary_expense;
        self
    }

    /// Build from itemized categories; total and discretionary subset are derived.
    pub fn from_categories(
        monthly_income: f64,
        total_emi: f64,
        savings: f64,
        categories: Vec<ExpenseCategory>,
    ) -> Self {
        let total_expense = categories.iter().map(|c| c.amount).sum();
        let discretionary_expense = sum_of_kind(&categories, ExpenseKind::Discretionary);
        Self {
            monthly_income,
            total_expense,
            total_emi,
            savings,
            discretionary_expense,
            categories,
        }
    }

    /// `income − expense − emi`; may be negative.
    pub fn net_balance(&self) -> f64 {
        self.monthly_income - self.total_expense - self.total_emi
    }

    /// Check the numeric invariants every downstream component relies on.
    pub fn validate(&self) -> Result<()> {
        check_amount("monthly_income", self.monthly_income)?;
        check_amount("total_expense", self.total_expense)?;
        check_amount("total_emi", self.total_emi)?;
        check_amount("savings", self.savings)?;
        check_amount("discretionary_expense", self.discretionary_expense)?;

        if self.monthly_income <= 0.0 {
            return Err(Error::invalid_input(
                "monthly_income",
                "Income must be greater than zero.",
            ));
        }

        for (field, amount) in [
            ("total_expense", self.total_expense),
            ("total_emi", self.total_emi),
            ("savings", self.savings),
        ] {
            // ratios are later scaled to percentages
            if !(amount / self.monthly_income * 100.0).is_finite() {
                return Err(Error::invalid_input(
                    field,
                    format!("{} is out of range for the declared income.", field),
                ));
            }
        }

        if self.discretionary_expense > self.total_expense * (1.0 + CATEGORY_SUM_TOLERANCE) {
            return Err(Error::invalid_input(
                "discretionary_expense",
                format!(
                    "Discretionary expense {} exceeds total expense {}.",
                    self.discretionary_expense, self.total_expense
                ),
            ));
        }

        for category in &self.categories {
            check_amount(&format!("categories.{}", category.name), category.amount)?;
        }

        if !self.categories.is_empty() {
            let sum: f64 = self.categories.iter().map(|c| c.amount).sum();
            if !approx_eq(sum, self.total_expense) {
                return Err(Error::invalid_input(
                    "categories",
                    format!(
                        "Expense categories sum to {} but total expense is {}.",
                        sum, self.total_expense
                    ),
                ));
            }
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Financial Profile (request document)
// ─────────────────────────────────────────────────────────────────

/// Category entry in a request document; `kind` may be omitted for standard names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCategory {
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ExpenseKind>,
}

/// A request document as read from JSON by the CLI and batch runner.
///
/// Either `total_expense` or `categories` (or both, if they agree) must describe
/// the monthly spending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub monthly_income: f64,
    #[serde(default)]
    pub total_expense: Option<f64>,
    #[serde(default)]
    pub discretionary_expense: Option<f64>,
    #[serde(default)]
    pub total_emi: f64,
    pub savings: f64,
    #[serde(default)]
    pub categories: Vec<ProfileCategory>,
    #[serde(default)]
    pub goals: Vec<SavingsGoal>,
}

impl TryFrom<&FinancialProfile> for RawFinancialInput {
    type Error = Error;

    fn try_from(profile: &FinancialProfile) -> Result<Self> {
        let categories: Vec<ExpenseCategory> = profile
            .categories
            .iter()
            .map(|c| match c.kind {
                Some(kind) => ExpenseCategory::new(c.name.clone(), c.amount, kind),
                None => ExpenseCategory::standard(c.name.clone(), c.amount),
            })
            .collect();

        let mut input = if categories.is_empty() {
            RawFinancialInput::new(
                profile.monthly_income,
                profile.total_expense.unwrap_or(0.0),
                profile.total_emi,
                profile.savings,
            )
        } else {
            let input = RawFinancialInput::from_categories(
                profile.monthly_income,
                profile.total_emi,
                profile.savings,
                categories,
            );
            if let Some(declared) = profile.total_expense {
                if !approx_eq(declared, input.total_expense) {
                    return Err(Error::invalid_input(
                        "total_expense",
                        format!(
                            "Declared total expense {} does not match category sum {}.",
                            declared, input.total_expense
                        ),
                    ));
                }
            }
            input
        };

        if let Some(discretionary) = profile.discretionary_expense {
            input.discretionary_expense = discretionary;
        }

        input.validate()?;
        Ok(input)
    }
}

fn check_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid_input(field, format!("{} must be a finite number.", field)));
    }
    if value < 0.0 {
        return Err(Error::invalid_input(field, format!("{} must be non-negative.", field)));
    }
    Ok(())
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= CATEGORY_SUM_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Sum of the amounts of one expense kind.
pub fn sum_of_kind(categories: &[ExpenseCategory], kind: ExpenseKind) -> f64 {
    categories
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.amount)
        .sum()
}
