//! Decision pipeline
//!
//! raw input → features → scaler → ensemble → combiner, with the score,
//! spender persona, action plan and insights computed from the same ratios.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::action_plan::{ActionPlan, ActionPlanGenerator, PlanInputs};
use super::combiner::{EnsembleCombiner, EnsembleDecision, OverrideRatios};
use super::goals::{GoalProjection, SavingsGoal};
use super::health::{HealthScore, HealthScoreCalculator};
use super::insights::{SavingsInsights, SpendingInsights};
use super::spender::RuleBasedPersonaClassifier;
use crate::artifacts::{ArtifactStore, StandardScaler};
use crate::classifier::ClassifierEnsemble;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::features::{BehaviourLabels, FeatureBuilder, FeatureVector};
use crate::types::{FinancialProfile, RawFinancialInput, SpenderProfile};

/// Everything the engine says about one household.
///
/// Carries no identifiers or timestamps, so equal inputs give equal reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReport {
    pub features: FeatureVector,
    pub behaviour: BehaviourLabels,
    pub ensemble: EnsembleDecision,
    pub health: HealthScore,
    pub spender: SpenderProfile,
    pub action_plan: ActionPlan,
    pub spending: SpendingInsights,
    pub savings: SavingsInsights,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<GoalProjection>,
}

/// Holds the loaded scaler and ensemble; immutable and shareable across threads.
pub struct DecisionEngine {
    builder: FeatureBuilder,
    scaler: StandardScaler,
    ensemble: ClassifierEnsemble,
    combiner: EnsembleCombiner,
    health: HealthScoreCalculator,
    spender: RuleBasedPersonaClassifier,
    planner: ActionPlanGenerator,
}

impl DecisionEngine {
    /// Assemble from a scaler and a populated ensemble.
    pub fn new(scaler: StandardScaler, ensemble: ClassifierEnsemble) -> Result<Self> {
        ensemble.ensure_ready()?;
        Ok(Self {
            builder: FeatureBuilder::new(),
            scaler,
            ensemble,
            combiner: EnsembleCombiner::new(),
            health: HealthScoreCalculator::new(),
            spender: RuleBasedPersonaClassifier::new(),
            planner: ActionPlanGenerator::new(),
        })
    }

    /// Build from an artifact store, loading it if this is the first use.
    pub fn from_store(store: &ArtifactStore, config: &EngineConfig) -> Result<Self> {
        let artifacts = store.get_or_load()?;
        let ensemble = ClassifierEnsemble::new(config.ensemble.clone())?;
        for classifier in artifacts.classifiers() {
            ensemble.register(classifier);
        }

        info!(
            classifiers = ?ensemble.registered(),
            policy = ?config.ensemble.degrade_policy,
            "Decision engine ready"
        );
        Self::new(artifacts.scaler.clone(), ensemble)
    }

    /// Load the configured artifact directory and build the engine.
    pub fn from_config(config: &EngineConfig) -> Result<Arc<Self>> {
        let store = ArtifactStore::new(&config.artifacts, &config.ensemble);
        Self::from_store(&store, config).map(Arc::new)
    }

    pub fn ensemble(&self) -> &ClassifierEnsemble {
        &self.ensemble
    }

    /// Evaluate one household.
    pub fn evaluate(&self, input: &RawFinancialInput) -> Result<DecisionReport> {
        let features = self.builder.build(input)?;
        let scaled = self.scaler.transform(&features);

        let ballot = self.ensemble.predict(&scaled)?;
        let ensemble = self.combiner.combine(&ballot, OverrideRatios::from(&features));
        debug!(
            label = %ensemble.label,
            reason = %ensemble.selection_reason,
            votes = ?ensemble.votes,
            "Ensemble decision"
        );

        let health = self
            .health
            .compute(features.expense_ratio, features.emi_ratio, features.savings_rate);

        let savings_rate_pct = features.savings_rate * 100.0;
        let action_plan = self.planner.generate(&PlanInputs {
            score: health.score,
            savings_rate_pct,
            emi_ratio_pct: features.emi_ratio * 100.0,
            expense_ratio_pct: features.expense_ratio * 100.0,
        });

        let spender = self.spender.classify_input(input).profile();
        debug!(
            score = health.score,
            risk = %health.risk,
            spender = spender.key.key(),
            actions = action_plan.items.len(),
            "Household evaluated"
        );

        Ok(DecisionReport {
            behaviour: features.behaviour_labels(),
            features,
            ensemble,
            health,
            spender,
            action_plan,
            spending: SpendingInsights::compute(input),
            savings: SavingsInsights::compute(input, savings_rate_pct),
            goals: Vec::new(),
        })
    }

    /// Evaluate a request document, projecting its savings goals from the net balance.
    pub fn evaluate_profile(&self, profile: &FinancialProfile) -> Result<DecisionReport> {
        let input = RawFinancialInput::try_from(profile)?;
        for goal in &profile.goals {
            goal.validate()?;
        }
        let mut report = self.evaluate(&input)?;
        report.goals = project_goals(&profile.goals, input.net_balance());
        Ok(report)
    }
}

fn project_goals(goals: &[SavingsGoal], monthly_savings: f64) -> Vec<GoalProjection> {
    goals.iter().map(|g| g.project(monthly_savings)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierKind, MockClassifier};
    use crate::config::EnsembleSettings;
    use crate::features::FEATURE_COUNT;
    use crate::types::{EnsemblePersona, SpenderPersona};

    fn identity_scaler() -> StandardScaler {
        StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap()
    }

    fn engine_with(svm: EnsemblePersona, crf: EnsemblePersona, hmm: EnsemblePersona) -> DecisionEngine {
        let ensemble = ClassifierEnsemble::new(EnsembleSettings::default()).unwrap();
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Svm, svm)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Crf, crf)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Hmm, hmm)));
        DecisionEngine::new(identity_scaler(), ensemble).unwrap()
    }

    #[test]
    fn test_requires_all_enabled_classifiers() {
        let ensemble = ClassifierEnsemble::new(EnsembleSettings::default()).unwrap();
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Svm, EnsemblePersona::Stable)));
        assert!(DecisionEngine::new(identity_scaler(), ensemble).is_err());
    }

    #[test]
    fn test_reference_household() {
        use EnsemblePersona::*;
        let engine = engine_with(Stable, Stable, Moderate);
        let input = RawFinancialInput::new(50000.0, 20000.0, 5000.0, 15000.0).with_discretionary(6000.0);
        let report = engine.evaluate(&input).unwrap();

        assert_eq!(report.ensemble.label, Stable);
        assert_eq!(report.health.score, 55.5);
        assert_eq!(report.health.risk_label, "Moderate Risk");
        assert_eq!(report.spender.key, SpenderPersona::Balanced);
        assert!(report.action_plan.is_empty());
        assert_eq!(report.behaviour.savings_behaviour, "Good Saver");
        assert_eq!(report.savings.savings_health_label, "Strong");
    }

    #[test]
    fn test_invalid_input_never_reaches_models() {
        let engine = engine_with(EnsemblePersona::Stable, EnsemblePersona::Stable, EnsemblePersona::Stable);
        let err = engine.evaluate(&RawFinancialInput::new(-1.0, 0.0, 0.0, 0.0)).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_profile_goals_projected() {
        use EnsemblePersona::*;
        let engine = engine_with(Moderate, Moderate, Moderate);
        let profile: FinancialProfile = serde_json::from_str(
            r#"{
                "monthly_income": 40000,
                "total_expense": 20000,
                "total_emi": 0,
                "savings": 20000,
                "goals": [{"name": "Car", "target_amount": 100000, "saved_amount": 20000, "allocation_percent": 40}]
            }"#,
        )
        .unwrap();

        let report = engine.evaluate_profile(&profile).unwrap();
        assert_eq!(report.goals.len(), 1);
        assert_eq!(report.goals[0].progress_percent, 20);
        // 40% of a 20000 net balance is 8000 per month towards 80000 remaining
        assert_eq!(report.goals[0].estimated_months_to_reach, Some(10.0));
    }
}
