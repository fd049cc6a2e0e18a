//! Financial decision engine
//!
//! Combines the ensemble label with the closed-form score, the rule-based
//! spender persona, the action plan and the insights.

pub mod action_plan;
pub mod combiner;
pub mod goals;
pub mod health;
pub mod insights;
mod pipeline;
pub mod spender;

pub use action_plan::{ActionItem, ActionPlan, ActionPlanGenerator, PlanInputs};
pub use combiner::{EnsembleCombiner, EnsembleDecision, OverrideRatios, SelectionReason};
pub use goals::{GoalProjection, SavingsGoal};
pub use health::{what_if, HealthScore, HealthScoreCalculator, RiskLevel, WhatIfScore};
pub use insights::{SavingsHealth, SavingsInsights, SpendingInsights};
pub use pipeline::{DecisionEngine, DecisionReport};
pub use spender::RuleBasedPersonaClassifier;
