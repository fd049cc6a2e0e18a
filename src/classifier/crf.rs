//! Structured classifier: linear-chain CRF applied to one-element sequences.
//!
//! With a single observation the transition weights never fire, so the most
//! likely label is the one with the highest sum of state-feature weights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::traits::{ClassifierKind, PersonaClassifier};
use crate::artifacts::schema::{parse_artifact, ArtifactHeader};
use crate::error::{Error, Result};
use crate::features::{ScaledVector, FEATURE_NAMES};
use crate::types::EnsemblePersona;

const ARTIFACT: &str = "crf";

/// Weight of a numeric attribute for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFeature {
    pub attribute: String,
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrfModel {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    /// Label strings as trained ("0", "1", "2"); order breaks ties
    pub labels: Vec<String>,
    pub state_features: Vec<StateFeature>,
    /// Per-label bias, absent labels have none
    #[serde(default)]
    pub bias: BTreeMap<String, f64>,
    #[serde(skip)]
    personas: Vec<EnsemblePersona>,
}

impl CrfModel {
    pub fn new(labels: Vec<String>, state_features: Vec<StateFeature>) -> Result<Self> {
        let mut model = Self {
            header: ArtifactHeader::default(),
            labels,
            state_features,
            bias: BTreeMap::new(),
            personas: Vec::new(),
        };
        model.prepare()?;
        Ok(model)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut model: CrfModel = parse_artifact(ARTIFACT, bytes)?;
        model.prepare()?;
        Ok(model)
    }

    fn prepare(&mut self) -> Result<()> {
        self.header.check(ARTIFACT)?;

        if self.labels.is_empty() {
            return Err(Error::artifact_load(ARTIFACT, "no labels"));
        }

        self.personas = self
            .labels
            .iter()
            .map(|label| {
                label
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(EnsemblePersona::from_code)
                    .ok_or_else(|| {
                        Error::artifact_load(ARTIFACT, format!("label '{}' is not a persona", label))
                    })
            })
            .collect::<Result<_>>()?;

        for feature in &self.state_features {
            if !FEATURE_NAMES.contains(&feature.attribute.as_str()) {
                return Err(Error::artifact_load(
                    ARTIFACT,
                    format!("unknown attribute '{}'", feature.attribute),
                ));
            }
            if !self.labels.contains(&feature.label) {
                return Err(Error::artifact_load(
                    ARTIFACT,
                    format!("state feature refers to unknown label '{}'", feature.label),
                ));
            }
            if !feature.weight.is_finite() {
                return Err(Error::artifact_load(
                    ARTIFACT,
                    format!("weight for {}/{} is not finite", feature.attribute, feature.label),
                ));
            }
        }

        Ok(())
    }

    /// Unnormalized score per label, in `labels` order.
    pub fn scores(&self, input: &ScaledVector) -> Vec<f64> {
        let attributes = input.to_named_map();
        self.labels
            .iter()
            .map(|label| {
                let bias = self.bias.get(label).copied().unwrap_or(0.0);
                self.state_features
                    .iter()
                    .filter(|f| &f.label == label)
                    .map(|f| f.weight * attributes.get(f.attribute.as_str()).copied().unwrap_or(0.0))
                    .sum::<f64>()
                    + bias
            })
            .collect()
    }
}

impl PersonaClassifier for CrfModel {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Crf
    }

    fn predict(&self, input: &ScaledVector) -> Result<EnsemblePersona> {
        let scores = self.scores(input);
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        self.personas
            .get(best)
            .copied()
            .ok_or_else(|| Error::model_unavailable(self.name(), "model has no labels"))
    }
}
