//! Ensemble vote reconciliation
//!
//! Majority first; when no label has two votes, a fixed override cascade on
//! the household ratios decides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::{Ballot, ClassifierKind, ModelVote};
use crate::features::FeatureVector;
use crate::types::EnsemblePersona;

/// `savings_rate` at or above this can trigger the consistency override.
pub const CONSISTENCY_MIN_SAVINGS_RATE: f64 = 0.40;
/// `emi_ratio` at or below this can trigger the consistency override.
pub const CONSISTENCY_MAX_EMI_RATIO: f64 = 0.10;
/// `expense_ratio` at or below this can trigger the consistency override.
pub const CONSISTENCY_MAX_EXPENSE_RATIO: f64 = 0.50;
/// `savings_rate` at or below this triggers the stress override.
pub const STRESS_MAX_SAVINGS_RATE: f64 = 0.10;
/// `emi_ratio` at or above this triggers the stress override.
pub const STRESS_MIN_EMI_RATIO: f64 = 0.50;

/// Why the final label was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SelectionReason {
    /// Two or more classifiers agreed
    Majority { agreeing: Vec<ClassifierKind> },
    /// No majority; strong savings with light obligations
    ConsistencyOverride,
    /// No majority; thin savings or heavy EMI
    StressOverride,
    /// No majority and no override applied
    PrimaryFallback { classifier: ClassifierKind },
    /// Only one classifier is active
    SoleModel { classifier: ClassifierKind },
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionReason::Majority { agreeing } => {
                let names: Vec<&str> = agreeing.iter().map(|k| k.display_name()).collect();
                write!(
                    f,
                    "Selected based on majority agreement between {}.",
                    names.join(" and ")
                )
            }
            SelectionReason::ConsistencyOverride => {
                write!(f, "Selected based on financial consistency override.")
            }
            SelectionReason::StressOverride => {
                write!(f, "Selected based on financial stress override.")
            }
            SelectionReason::PrimaryFallback { classifier } => {
                write!(f, "Selected based on primary model ({}).", classifier.display_name())
            }
            SelectionReason::SoleModel { classifier } => write!(
                f,
                "Selected based on the only active model ({}).",
                classifier.display_name()
            ),
        }
    }
}

/// Final ensemble label with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleDecision {
    pub label: EnsemblePersona,
    pub persona: String,
    pub reason: SelectionReason,
    pub selection_reason: String,
    pub votes: Vec<ModelVote>,
}

/// Ratios the override cascade looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideRatios {
    pub savings_rate: f64,
    pub emi_ratio: f64,
    pub expense_ratio: f64,
}

impl From<&FeatureVector> for OverrideRatios {
    fn from(features: &FeatureVector) -> Self {
        Self {
            savings_rate: features.savings_rate,
            emi_ratio: features.emi_ratio,
            expense_ratio: features.expense_ratio,
        }
    }
}

/// Reconciles a ballot into one label. Total and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsembleCombiner;

impl EnsembleCombiner {
    pub fn new() -> Self {
        Self
    }

    pub fn combine(&self, ballot: &Ballot, ratios: OverrideRatios) -> EnsembleDecision {
        let (label, reason) = self.select(ballot, ratios);
        EnsembleDecision {
            label,
            persona: label.display_name().to_string(),
            selection_reason: reason.to_string(),
            reason,
            votes: ballot.votes().to_vec(),
        }
    }

    fn select(&self, ballot: &Ballot, ratios: OverrideRatios) -> (EnsemblePersona, SelectionReason) {
        let primary = ballot.primary();

        if ballot.len() == 1 {
            return (
                primary.label,
                SelectionReason::SoleModel {
                    classifier: primary.classifier,
                },
            );
        }

        if let Some((label, agreeing)) = majority(ballot) {
            return (label, SelectionReason::Majority { agreeing });
        }

        if ratios.savings_rate >= CONSISTENCY_MIN_SAVINGS_RATE
            && ratios.emi_ratio <= CONSISTENCY_MAX_EMI_RATIO
            && ratios.expense_ratio <= CONSISTENCY_MAX_EXPENSE_RATIO
        {
            return (EnsemblePersona::Stable, SelectionReason::ConsistencyOverride);
        }

        if ratios.savings_rate <= STRESS_MAX_SAVINGS_RATE || ratios.emi_ratio >= STRESS_MIN_EMI_RATIO {
            return (EnsemblePersona::Stressed, SelectionReason::StressOverride);
        }

        (
            primary.label,
            SelectionReason::PrimaryFallback {
                classifier: primary.classifier,
            },
        )
    }
}

/// Most frequent label if it has at least two votes. Ties go to the label
/// first cast in priority order.
fn majority(ballot: &Ballot) -> Option<(EnsemblePersona, Vec<ClassifierKind>)> {
    let votes = ballot.votes();
    let mut best: Option<(EnsemblePersona, usize)> = None;

    for vote in votes {
        let count = votes.iter().filter(|v| v.label == vote.label).count();
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((vote.label, count)),
        }
    }

    let (label, count) = best?;
    if count < 2 {
        return None;
    }

    let agreeing = votes
        .iter()
        .filter(|v| v.label == label)
        .map(|v| v.classifier)
        .collect();
    Some((label, agreeing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use EnsemblePersona::{Moderate, Stable, Stressed};

    fn ratios(savings_rate: f64, emi_ratio: f64, expense_ratio: f64) -> OverrideRatios {
        OverrideRatios {
            savings_rate,
            emi_ratio,
            expense_ratio,
        }
    }

    fn neutral() -> OverrideRatios {
        ratios(0.25, 0.2, 0.55)
    }

    #[test]
    fn test_unanimous() {
        let decision = EnsembleCombiner::new().combine(&Ballot::of(Stable, Stable, Stable), neutral());
        assert_eq!(decision.label, Stable);
        assert_eq!(
            decision.selection_reason,
            "Selected based on majority agreement between SVM and CRF and HMM."
        );
    }

    #[test]
    fn test_two_of_three_names_agreeing_models() {
        let decision = EnsembleCombiner::new().combine(&Ballot::of(Moderate, Stressed, Moderate), neutral());
        assert_eq!(decision.label, Moderate);
        assert_eq!(
            decision.reason,
            SelectionReason::Majority {
                agreeing: vec![ClassifierKind::Svm, ClassifierKind::Hmm]
            }
        );
        assert_eq!(
            decision.selection_reason,
            "Selected based on majority agreement between SVM and HMM."
        );
    }

    #[test]
    fn test_majority_ignores_override_ratios() {
        // Ratios would trigger the stress override, but two models agree
        let decision = EnsembleCombiner::new().combine(&Ballot::of(Stable, Stable, Stressed), ratios(0.0, 0.9, 1.2));
        assert_eq!(decision.label, Stable);
    }

    #[test]
    fn test_consistency_override() {
        let decision = EnsembleCombiner::new().combine(&Ballot::of(Moderate, Stable, Stressed), ratios(0.5, 0.05, 0.4));
        assert_eq!(decision.label, Stable);
        assert_eq!(decision.reason, SelectionReason::ConsistencyOverride);
        assert_eq!(decision.selection_reason, "Selected based on financial consistency override.");
    }

    #[test]
    fn test_consistency_boundaries_inclusive() {
        let decision = EnsembleCombiner::new().combine(&Ballot::of(Moderate, Stable, Stressed), ratios(0.40, 0.10, 0.50));
        assert_eq!(decision.reason, SelectionReason::ConsistencyOverride);
    }

    #[test]
    fn test_stress_override() {
        let combiner = EnsembleCombiner::new();
        let split = Ballot::of(Stable, Moderate, Stressed);

        let thin_savings = combiner.combine(&split, ratios(0.10, 0.2, 0.5));
        assert_eq!(thin_savings.label, Stressed);
        assert_eq!(thin_savings.reason, SelectionReason::StressOverride);

        let heavy_emi = combiner.combine(&split, ratios(0.3, 0.5, 0.2));
        assert_eq!(heavy_emi.label, Stressed);
    }

    #[test]
    fn test_primary_fallback() {
        let decision = EnsembleCombiner::new().combine(&Ballot::of(Moderate, Stable, Stressed), neutral());
        assert_eq!(decision.label, Moderate);
        assert_eq!(decision.selection_reason, "Selected based on primary model (SVM).");
    }

    #[test]
    fn test_degraded_fallback_uses_highest_priority_present() {
        let ballot = Ballot::new(vec![
            ModelVote::new(ClassifierKind::Hmm, Stressed),
            ModelVote::new(ClassifierKind::Crf, Stable),
        ])
        .unwrap();
        let decision = EnsembleCombiner::new().combine(&ballot, neutral());
        assert_eq!(decision.label, Stable);
        assert_eq!(
            decision.reason,
            SelectionReason::PrimaryFallback {
                classifier: ClassifierKind::Crf
            }
        );
    }

    #[test]
    fn test_sole_model() {
        let ballot = Ballot::new(vec![ModelVote::new(ClassifierKind::Crf, Moderate)]).unwrap();
        let decision = EnsembleCombiner::new().combine(&ballot, ratios(0.0, 0.9, 1.0));
        assert_eq!(decision.label, Moderate);
        assert_eq!(decision.selection_reason, "Selected based on the only active model (CRF).");
    }

    #[test]
    fn test_reason_serializes_with_rule_tag() {
        let json = serde_json::to_value(SelectionReason::PrimaryFallback {
            classifier: ClassifierKind::Svm,
        })
        .unwrap();
        assert_eq!(json["rule"], "primary_fallback");
        assert_eq!(json["classifier"], "svm");
    }
}
