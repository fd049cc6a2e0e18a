//! Latent-state classifier: Gaussian HMM with diagonal covariance.
//!
//! For a single observation the Viterbi path is one state, the argmax of
//! `ln π_s + ln N(x | μ_s, diag σ²_s)`. The state is then mapped to a label.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::traits::{ClassifierKind, PersonaClassifier};
use crate::artifacts::schema::{check_finite, check_len, parse_artifact, ArtifactHeader};
use crate::error::{Error, Result};
use crate::features::{ScaledVector, FEATURE_COUNT};
use crate::types::EnsemblePersona;

const ARTIFACT: &str = "hmm";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmmModel {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    pub start_probabilities: Vec<f64>,
    /// One row per hidden state
    pub means: Vec<Vec<f64>>,
    /// Diagonal covariance per hidden state; every entry > 0
    pub variances: Vec<Vec<f64>>,
    /// Persona code for each hidden state
    pub state_labels: Vec<u8>,
    #[serde(skip)]
    personas: Vec<EnsemblePersona>,
}

impl HmmModel {
    pub fn new(
        start_probabilities: Vec<f64>,
        means: Vec<Vec<f64>>,
        variances: Vec<Vec<f64>>,
        state_labels: Vec<u8>,
    ) -> Result<Self> {
        let mut model = Self {
            header: ArtifactHeader::default(),
            start_probabilities,
            means,
            variances,
            state_labels,
            personas: Vec::new(),
        };
        model.prepare()?;
        Ok(model)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut model: HmmModel = parse_artifact(ARTIFACT, bytes)?;
        model.prepare()?;
        Ok(model)
    }

    fn prepare(&mut self) -> Result<()> {
        self.header.check(ARTIFACT)?;

        let n_states = self.start_probabilities.len();
        if n_states == 0 {
            return Err(Error::artifact_load(ARTIFACT, "no hidden states"));
        }
        check_len(ARTIFACT, "means", self.means.len(), n_states)?;
        check_len(ARTIFACT, "variances", self.variances.len(), n_states)?;
        check_len(ARTIFACT, "state_labels", self.state_labels.len(), n_states)?;
        check_finite(ARTIFACT, "start_probabilities", &self.start_probabilities)?;

        if self.start_probabilities.iter().any(|p| *p < 0.0)
            || self.start_probabilities.iter().all(|p| *p == 0.0)
        {
            return Err(Error::artifact_load(
                ARTIFACT,
                "start_probabilities must be non-negative with at least one positive entry",
            ));
        }

        for state in 0..n_states {
            let means = format!("means[{}]", state);
            check_len(ARTIFACT, &means, self.means[state].len(), FEATURE_COUNT)?;
            check_finite(ARTIFACT, &means, &self.means[state])?;

            let variances = format!("variances[{}]", state);
            check_len(ARTIFACT, &variances, self.variances[state].len(), FEATURE_COUNT)?;
            check_finite(ARTIFACT, &variances, &self.variances[state])?;
            if self.variances[state].iter().any(|v| *v <= 0.0) {
                return Err(Error::artifact_load(
                    ARTIFACT,
                    format!("{} must be strictly positive", variances),
                ));
            }
        }

        self.personas = self
            .state_labels
            .iter()
            .map(|code| {
                EnsemblePersona::from_code(*code).ok_or_else(|| {
                    Error::artifact_load(ARTIFACT, format!("state label {} is not a persona", code))
                })
            })
            .collect::<Result<_>>()?;

        Ok(())
    }

    /// Joint log-likelihood of starting in each state and emitting `input`.
    pub fn log_scores(&self, input: &ScaledVector) -> Vec<f64> {
        let x = input.values();
        (0..self.start_probabilities.len())
            .map(|s| {
                let emission: f64 = x
                    .iter()
                    .zip(&self.means[s])
                    .zip(&self.variances[s])
                    .map(|((xi, mu), var)| {
                        let d = xi - mu;
                        -0.5 * ((2.0 * PI * var).ln() + d * d / var)
                    })
                    .sum();
                self.start_probabilities[s].ln() + emission
            })
            .collect()
    }

    /// Index of the most likely hidden state.
    pub fn most_likely_state(&self, input: &ScaledVector) -> usize {
        let scores = self.log_scores(input);
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        best
    }
}

impl PersonaClassifier for HmmModel {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Hmm
    }

    fn predict(&self, input: &ScaledVector) -> Result<EnsemblePersona> {
        let state = self.most_likely_state(input);
        self.personas.get(state).copied().ok_or_else(|| {
            Error::model_unavailable(self.name(), format!("state {} has no label", state))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_states(labels: Vec<u8>) -> HmmModel {
        let mut means = vec![vec![0.0; FEATURE_COUNT]; 3];
        means[1][9] = 1.5;
        means[2][9] = -1.5;
        HmmModel::new(
            vec![1.0 / 3.0; 3],
            means,
            vec![vec![1.0; FEATURE_COUNT]; 3],
            labels,
        )
        .unwrap()
    }

    fn savings(value: f64) -> ScaledVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[9] = value;
        ScaledVector(values)
    }

    #[test]
    fn test_nearest_state_wins() {
        let model = three_states(vec![0, 1, 2]);
        assert_eq!(model.predict(&savings(0.1)).unwrap(), EnsemblePersona::Moderate);
        assert_eq!(model.predict(&savings(2.0)).unwrap(), EnsemblePersona::Stable);
        assert_eq!(model.predict(&savings(-2.0)).unwrap(), EnsemblePersona::Stressed);
    }

    #[test]
    fn test_state_table_mapping() {
        // Hidden states carry no intrinsic meaning; the table decides the label
        let model = three_states(vec![2, 0, 1]);
        assert_eq!(model.most_likely_state(&savings(2.0)), 1);
        assert_eq!(model.predict(&savings(2.0)).unwrap(), EnsemblePersona::Moderate);
    }

    #[test]
    fn test_start_probability_shifts_choice() {
        let mut means = vec![vec![0.0; FEATURE_COUNT]; 2];
        means[1][9] = 1.0;
        let model = HmmModel::new(
            vec![0.99, 0.01],
            means,
            vec![vec![1.0; FEATURE_COUNT]; 2],
            vec![0, 1],
        )
        .unwrap();
        // Equidistant-ish observation goes to the far more likely start state
        assert_eq!(model.predict(&savings(0.6)).unwrap(), EnsemblePersona::Moderate);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let zero_var = HmmModel::new(
            vec![1.0],
            vec![vec![0.0; FEATURE_COUNT]],
            vec![vec![0.0; FEATURE_COUNT]],
            vec![0],
        );
        assert!(zero_var.is_err());

        let bad_label = HmmModel::new(
            vec![1.0],
            vec![vec![0.0; FEATURE_COUNT]],
            vec![vec![1.0; FEATURE_COUNT]],
            vec![4],
        );
        assert!(bad_label.is_err());

        let short_means = HmmModel::new(
            vec![0.5, 0.5],
            vec![vec![0.0; FEATURE_COUNT]],
            vec![vec![1.0; FEATURE_COUNT]; 2],
            vec![0, 1],
        );
        assert!(short_means.is_err());
    }
}
