//! Classifier ensemble
//!
//! Holds the active classifiers and collects one vote from each of them.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DegradePolicy, EnsembleSettings};
use crate::error::{Error, Result};
use crate::features::ScaledVector;
use crate::types::EnsemblePersona;

use super::traits::{ClassifierKind, SharedClassifier};

// ─────────────────────────────────────────────────────────────────
// Votes
// ─────────────────────────────────────────────────────────────────

/// One classifier's raw label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVote {
    pub classifier: ClassifierKind,
    pub label: EnsemblePersona,
}

impl ModelVote {
    pub fn new(classifier: ClassifierKind, label: EnsemblePersona) -> Self {
        Self { classifier, label }
    }
}

/// Votes from the active classifiers, one per kind, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ballot(Vec<ModelVote>);

impl Ballot {
    /// Sort into priority order. `None` for an empty ballot or a repeated classifier.
    pub fn new(mut votes: Vec<ModelVote>) -> Option<Self> {
        if votes.is_empty() {
            return None;
        }
        votes.sort_by_key(|v| v.classifier.priority());
        if votes.windows(2).any(|w| w[0].classifier == w[1].classifier) {
            return None;
        }
        Some(Self(votes))
    }

    /// Full three-way ballot
    pub fn of(svm: EnsemblePersona, crf: EnsemblePersona, hmm: EnsemblePersona) -> Self {
        Self(vec![
            ModelVote::new(ClassifierKind::Svm, svm),
            ModelVote::new(ClassifierKind::Crf, crf),
            ModelVote::new(ClassifierKind::Hmm, hmm),
        ])
    }

    pub fn votes(&self) -> &[ModelVote] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Vote of the highest-priority classifier present
    pub fn primary(&self) -> ModelVote {
        self.0[0]
    }

    pub fn label_of(&self, kind: ClassifierKind) -> Option<EnsemblePersona> {
        self.0.iter().find(|v| v.classifier == kind).map(|v| v.label)
    }
}

// ─────────────────────────────────────────────────────────────────
// Classifier Ensemble
// ─────────────────────────────────────────────────────────────────

/// The enabled classifiers, keyed by kind.
pub struct ClassifierEnsemble {
    settings: EnsembleSettings,
    classifiers: RwLock<HashMap<ClassifierKind, SharedClassifier>>,
}

impl ClassifierEnsemble {
    /// Create an empty ensemble. Rejects settings the degrade policy forbids.
    pub fn new(settings: EnsembleSettings) -> Result<Self> {
        let enabled = settings.enabled_kinds();
        if enabled.is_empty() {
            return Err(Error::model_unavailable(
                "ensemble",
                "no classifier is enabled",
            ));
        }
        if settings.degrade_policy == DegradePolicy::Fail {
            if let Some(missing) = ClassifierKind::all().iter().find(|k| !settings.is_enabled(**k)) {
                return Err(Error::model_unavailable(
                    missing.name(),
                    "disabled while degrade_policy is \"fail\"",
                ));
            }
        }

        Ok(Self {
            settings,
            classifiers: RwLock::new(HashMap::new()),
        })
    }

    pub fn settings(&self) -> &EnsembleSettings {
        &self.settings
    }

    /// Add a classifier. Classifiers whose kind is disabled are skipped.
    pub fn register(&self, classifier: SharedClassifier) {
        let kind = classifier.kind();
        if !self.settings.is_enabled(kind) {
            debug!(classifier = %kind, "Classifier disabled, not registered");
            return;
        }

        self.classifiers.write().insert(kind, classifier);
        info!(classifier = %kind, "Classifier registered");
    }

    /// Kinds that have a registered classifier, in priority order
    pub fn registered(&self) -> Vec<ClassifierKind> {
        let classifiers = self.classifiers.read();
        ClassifierKind::all()
            .iter()
            .copied()
            .filter(|k| classifiers.contains_key(k))
            .collect()
    }

    /// Every enabled classifier must be registered.
    pub fn ensure_ready(&self) -> Result<()> {
        let classifiers = self.classifiers.read();
        for kind in self.settings.enabled_kinds() {
            if !classifiers.contains_key(&kind) {
                return Err(Error::model_unavailable(kind.name(), "classifier not loaded"));
            }
        }
        Ok(())
    }

    /// Collect one vote per enabled classifier. Any failure aborts the request.
    pub fn predict(&self, input: &ScaledVector) -> Result<Ballot> {
        let classifiers = self.classifiers.read();
        let mut votes = Vec::with_capacity(ClassifierKind::all().len());

        for kind in self.settings.enabled_kinds() {
            let classifier = classifiers
                .get(&kind)
                .ok_or_else(|| Error::model_unavailable(kind.name(), "classifier not loaded"))?;

            let label = classifier.predict(input).map_err(|e| match e {
                Error::ModelUnavailable { .. } => e,
                other => Error::model_unavailable(kind.name(), other.to_string()),
            })?;

            debug!(classifier = %kind, label = %label, "Classifier vote");
            votes.push(ModelVote::new(kind, label));
        }

        Ballot::new(votes).ok_or_else(|| Error::model_unavailable("ensemble", "no votes collected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MockClassifier;
    use crate::features::FEATURE_COUNT;
    use std::sync::Arc;

    fn all_enabled() -> EnsembleSettings {
        EnsembleSettings::default()
    }

    fn degraded(svm: bool, crf: bool, hmm: bool) -> EnsembleSettings {
        EnsembleSettings {
            svm,
            crf,
            hmm,
            degrade_policy: DegradePolicy::MajorityOfAvailable,
        }
    }

    fn zeros() -> ScaledVector {
        ScaledVector([0.0; FEATURE_COUNT])
    }

    #[test]
    fn test_ballot_sorted_and_unique() {
        let ballot = Ballot::new(vec![
            ModelVote::new(ClassifierKind::Hmm, EnsemblePersona::Stressed),
            ModelVote::new(ClassifierKind::Svm, EnsemblePersona::Stable),
        ])
        .unwrap();
        assert_eq!(ballot.primary().classifier, ClassifierKind::Svm);
        assert_eq!(ballot.label_of(ClassifierKind::Hmm), Some(EnsemblePersona::Stressed));
        assert_eq!(ballot.label_of(ClassifierKind::Crf), None);

        assert!(Ballot::new(vec![]).is_none());
        assert!(Ballot::new(vec![
            ModelVote::new(ClassifierKind::Crf, EnsemblePersona::Stable),
            ModelVote::new(ClassifierKind::Crf, EnsemblePersona::Moderate),
        ])
        .is_none());
    }

    #[test]
    fn test_fail_policy_rejects_disabled_classifier() {
        let mut settings = all_enabled();
        settings.hmm = false;
        let err = ClassifierEnsemble::new(settings).err().unwrap();
        assert!(err.to_string().contains("hmm"));
    }

    #[test]
    fn test_no_classifier_enabled() {
        assert!(ClassifierEnsemble::new(degraded(false, false, false)).is_err());
    }

    #[test]
    fn test_predict_collects_votes_in_priority_order() {
        let ensemble = ClassifierEnsemble::new(all_enabled()).unwrap();
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Hmm, EnsemblePersona::Stressed)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Svm, EnsemblePersona::Stable)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Crf, EnsemblePersona::Moderate)));
        assert!(ensemble.ensure_ready().is_ok());

        let ballot = ensemble.predict(&zeros()).unwrap();
        assert_eq!(ballot, Ballot::of(EnsemblePersona::Stable, EnsemblePersona::Moderate, EnsemblePersona::Stressed));
    }

    #[test]
    fn test_missing_classifier_is_unavailable() {
        let ensemble = ClassifierEnsemble::new(all_enabled()).unwrap();
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Svm, EnsemblePersona::Stable)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Hmm, EnsemblePersona::Stable)));

        let err = ensemble.predict(&zeros()).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { ref classifier, .. } if classifier == "crf"));
        assert!(ensemble.ensure_ready().is_err());
    }

    #[test]
    fn test_failing_classifier_is_fatal() {
        let ensemble = ClassifierEnsemble::new(all_enabled()).unwrap();
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Svm, EnsemblePersona::Stable)));
        ensemble.register(Arc::new(MockClassifier::failing(ClassifierKind::Crf)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Hmm, EnsemblePersona::Stable)));

        assert!(ensemble.predict(&zeros()).is_err());
    }

    #[test]
    fn test_degraded_ensemble_skips_disabled() {
        let ensemble = ClassifierEnsemble::new(degraded(false, true, true)).unwrap();
        let svm = Arc::new(MockClassifier::fixed(ClassifierKind::Svm, EnsemblePersona::Stable));
        ensemble.register(svm.clone());
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Crf, EnsemblePersona::Moderate)));
        ensemble.register(Arc::new(MockClassifier::fixed(ClassifierKind::Hmm, EnsemblePersona::Moderate)));

        assert_eq!(ensemble.registered(), vec![ClassifierKind::Crf, ClassifierKind::Hmm]);
        let ballot = ensemble.predict(&zeros()).unwrap();
        assert_eq!(ballot.len(), 2);
        assert_eq!(ballot.primary().classifier, ClassifierKind::Crf);
        assert_eq!(svm.call_count(), 0);
    }
}
