//! Margin-based classifier: one-vs-rest support vector machine.

use serde::{Deserialize, Serialize};

use super::traits::{ClassifierKind, PersonaClassifier};
use crate::artifacts::schema::{check_finite, check_len, parse_artifact, ArtifactHeader};
use crate::error::{Error, Result};
use crate::features::{ScaledVector, FEATURE_COUNT};
use crate::types::EnsemblePersona;

const ARTIFACT: &str = "svm";

/// Kernel used by the decision functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SvmKernel {
    Linear,
    Rbf { gamma: f64 },
}

impl SvmKernel {
    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            SvmKernel::Linear => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            SvmKernel::Rbf { gamma } => {
                let dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-gamma * dist).exp()
            }
        }
    }
}

/// Fitted one-vs-rest SVM.
///
/// Class `c` scores `Σ_j coefficients[c][j] · K(support_vectors[j], x) + intercepts[c]`;
/// the highest score wins and the first class wins a tie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmModel {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    pub kernel: SvmKernel,
    /// Class code for each decision function
    pub classes: Vec<u8>,
    pub support_vectors: Vec<Vec<f64>>,
    /// One row per class, one column per support vector
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(skip)]
    labels: Vec<EnsemblePersona>,
}

impl SvmModel {
    pub fn new(
        kernel: SvmKernel,
        classes: Vec<u8>,
        support_vectors: Vec<Vec<f64>>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self> {
        let mut model = Self {
            header: ArtifactHeader::default(),
            kernel,
            classes,
            support_vectors,
            coefficients,
            intercepts,
            labels: Vec::new(),
        };
        model.prepare()?;
        Ok(model)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut model: SvmModel = parse_artifact(ARTIFACT, bytes)?;
        model.prepare()?;
        Ok(model)
    }

    fn prepare(&mut self) -> Result<()> {
        self.header.check(ARTIFACT)?;

        if self.classes.is_empty() {
            return Err(Error::artifact_load(ARTIFACT, "no classes"));
        }
        if let SvmKernel::Rbf { gamma } = self.kernel {
            if !gamma.is_finite() || gamma <= 0.0 {
                return Err(Error::artifact_load(ARTIFACT, "rbf gamma must be positive"));
            }
        }

        let n_classes = self.classes.len();
        let n_vectors = self.support_vectors.len();
        check_len(ARTIFACT, "coefficients", self.coefficients.len(), n_classes)?;
        check_len(ARTIFACT, "intercepts", self.intercepts.len(), n_classes)?;
        check_finite(ARTIFACT, "intercepts", &self.intercepts)?;

        for (i, sv) in self.support_vectors.iter().enumerate() {
            let field = format!("support_vectors[{}]", i);
            check_len(ARTIFACT, &field, sv.len(), FEATURE_COUNT)?;
            check_finite(ARTIFACT, &field, sv)?;
        }
        for (i, row) in self.coefficients.iter().enumerate() {
            let field = format!("coefficients[{}]", i);
            check_len(ARTIFACT, &field, row.len(), n_vectors)?;
            check_finite(ARTIFACT, &field, row)?;
        }

        self.labels = self
            .classes
            .iter()
            .map(|code| {
                EnsemblePersona::from_code(*code).ok_or_else(|| {
                    Error::artifact_load(ARTIFACT, format!("class code {} is not a persona", code))
                })
            })
            .collect::<Result<_>>()?;

        Ok(())
    }

    /// Decision value per class, in `classes` order.
    pub fn decision_function(&self, input: &ScaledVector) -> Vec<f64> {
        let kernel_values: Vec<f64> = self
            .support_vectors
            .iter()
            .map(|sv| self.kernel.apply(sv, input.values()))
            .collect();

        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                row.iter()
                    .zip(&kernel_values)
                    .map(|(c, k)| c * k)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

impl PersonaClassifier for SvmModel {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Svm
    }

    fn predict(&self, input: &ScaledVector) -> Result<EnsemblePersona> {
        let scores = self.decision_function(input);
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        self.labels
            .get(best)
            .copied()
            .ok_or_else(|| Error::model_unavailable(self.name(), "model has no classes"))
    }
}
