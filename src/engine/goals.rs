//! Savings goal progress and projections.

use serde::{Deserialize, Serialize};

use super::health::round1;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub saved_amount: f64,
    /// Share of monthly savings put towards this goal, 0-100
    #[serde(default)]
    pub allocation_percent: f64,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            name: name.into(),
            target_amount,
            saved_amount: 0.0,
            allocation_percent: 0.0,
        }
    }

    pub fn with_saved(mut self, saved_amount: f64) -> Self {
        self.saved_amount = saved_amount;
        self
    }

    pub fn with_allocation(mut self, allocation_percent: f64) -> Self {
        self.allocation_percent = allocation_percent;
        self
    }

    /// Amounts must be finite and non-negative; the allocation a percentage.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("target_amount", self.target_amount),
            ("saved_amount", self.saved_amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_input(
                    format!("goals.{}.{}", self.name, field),
                    format!("Goal '{}': {} must be a non-negative number.", self.name, field),
                ));
            }
        }

        if !(0.0..=100.0).contains(&self.allocation_percent) {
            return Err(Error::invalid_input(
                format!("goals.{}.allocation_percent", self.name),
                format!(
                    "Goal '{}': allocation_percent must be between 0 and 100.",
                    self.name
                ),
            ));
        }

        Ok(())
    }

    /// Whole percent saved so far, capped at 100. Zero for a non-positive target.
    pub fn progress_percent(&self) -> u32 {
        if self.target_amount > 0.0 {
            let pct = (self.saved_amount / self.target_amount * 100.0).trunc();
            pct.clamp(0.0, 100.0) as u32
        } else {
            0
        }
    }

    /// Months until the target at the current allocation; `None` if nothing is allocated.
    pub fn estimated_months_to_reach(&self, monthly_savings: f64) -> Option<f64> {
        let allocated = self.allocation_percent / 100.0 * monthly_savings;
        if allocated > 0.0 {
            let remaining = (self.target_amount - self.saved_amount).max(0.0);
            Some(round1(remaining / allocated))
        } else {
            None
        }
    }

    pub fn project(&self, monthly_savings: f64) -> GoalProjection {
        GoalProjection {
            name: self.name.clone(),
            target_amount: self.target_amount,
            saved_amount: self.saved_amount,
            allocation_percent: self.allocation_percent,
            progress_percent: self.progress_percent(),
            estimated_months_to_reach: self.estimated_months_to_reach(monthly_savings),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProjection {
    pub name: String,
    pub target_amount: f64,
    pub saved_amount: f64,
    pub allocation_percent: f64,
    pub progress_percent: u32,
    pub estimated_months_to_reach: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        assert_eq!(SavingsGoal::new("Car", 100000.0).with_saved(33333.0).progress_percent(), 33);
        assert_eq!(SavingsGoal::new("Trip", 1000.0).with_saved(5000.0).progress_percent(), 100);
        assert_eq!(SavingsGoal::new("Nothing", 0.0).with_saved(10.0).progress_percent(), 0);
    }

    #[test]
    fn test_months_to_reach() {
        let goal = SavingsGoal::new("Emergency fund", 60000.0)
            .with_saved(10000.0)
            .with_allocation(50.0);
        assert_eq!(goal.estimated_months_to_reach(20000.0), Some(5.0));
        assert_eq!(goal.estimated_months_to_reach(0.0), None);
        assert_eq!(goal.estimated_months_to_reach(-500.0), None);
    }

    #[test]
    fn test_reached_goal_needs_zero_months() {
        let goal = SavingsGoal::new("Laptop", 1000.0)
            .with_saved(1500.0)
            .with_allocation(10.0);
        assert_eq!(goal.estimated_months_to_reach(3000.0), Some(0.0));
    }

    #[test]
    fn test_unallocated_goal() {
        let projection = SavingsGoal::new("House", 500000.0).project(20000.0);
        assert_eq!(projection.estimated_months_to_reach, None);
        assert_eq!(projection.progress_percent, 0);
    }

    #[test]
    fn test_validate_accepts_boundaries() {
        assert!(SavingsGoal::new("Car", 0.0).validate().is_ok());
        assert!(SavingsGoal::new("Car", 100.0).with_allocation(100.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let negative = SavingsGoal::new("Trip", -5000.0).with_saved(-100.0).with_allocation(250.0);
        let err = negative.validate().unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(
            err.client_message(),
            "Goal 'Trip': target_amount must be a non-negative number."
        );

        assert!(SavingsGoal::new("Trip", 100.0).with_saved(-1.0).validate().is_err());
        assert!(SavingsGoal::new("Trip", f64::NAN).validate().is_err());

        let err = SavingsGoal::new("Trip", 100.0).with_allocation(250.0).validate().unwrap_err();
        assert_eq!(
            err.client_message(),
            "Goal 'Trip': allocation_percent must be between 0 and 100."
        );
        assert!(SavingsGoal::new("Trip", 100.0).with_allocation(-1.0).validate().is_err());
        assert!(SavingsGoal::new("Trip", 100.0).with_allocation(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let goal: SavingsGoal = serde_json::from_str(r#"{"name": "Bike", "target_amount": 900}"#).unwrap();
        assert_eq!(goal.saved_amount, 0.0);
        assert_eq!(goal.allocation_percent, 0.0);
    }
}
