//! Classifier trait definitions
//!
//! Every trained model sits behind [`PersonaClassifier`], so the ensemble
//! never depends on a concrete algorithm.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::ScaledVector;
use crate::types::EnsemblePersona;

// ─────────────────────────────────────────────────────────────────
// Classifier Kind
// ─────────────────────────────────────────────────────────────────

/// The three ensemble members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Margin-based (support vector machine)
    Svm,
    /// Structured (conditional random field)
    Crf,
    /// Latent-state (Gaussian hidden Markov model)
    Hmm,
}

impl ClassifierKind {
    /// All kinds in tie-break priority order.
    pub fn all() -> &'static [ClassifierKind] {
        &[ClassifierKind::Svm, ClassifierKind::Crf, ClassifierKind::Hmm]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassifierKind::Svm => "svm",
            ClassifierKind::Crf => "crf",
            ClassifierKind::Hmm => "hmm",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClassifierKind::Svm => "SVM",
            ClassifierKind::Crf => "CRF",
            ClassifierKind::Hmm => "HMM",
        }
    }

    /// Artifact file name inside the artifact directory
    pub fn artifact_file(&self) -> &'static str {
        match self {
            ClassifierKind::Svm => "svm.json",
            ClassifierKind::Crf => "crf.json",
            ClassifierKind::Hmm => "hmm.json",
        }
    }

    /// Position in the priority order (0 = highest)
    pub fn priority(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svm" => Ok(ClassifierKind::Svm),
            "crf" => Ok(ClassifierKind::Crf),
            "hmm" => Ok(ClassifierKind::Hmm),
            _ => Err(format!("Unknown classifier '{}'. Valid: svm, crf, hmm", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// PersonaClassifier Trait
// ─────────────────────────────────────────────────────────────────

/// A fitted model that maps one scaled vector to one ensemble label.
///
/// Implementations are immutable after loading and must be safe to call from
/// many threads at once.
pub trait PersonaClassifier: Send + Sync {
    /// Which ensemble slot this classifier fills
    fn kind(&self) -> ClassifierKind;

    /// Name used in logs
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// Predict a label for one observation
    fn predict(&self, input: &ScaledVector) -> Result<EnsemblePersona>;
}

/// Shared classifier reference
pub type SharedClassifier = Arc<dyn PersonaClassifier>;
