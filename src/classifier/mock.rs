//! Mock classifier for testing
//!
//! Stands in for a trained artifact so ensemble and combiner behaviour can be
//! exercised with chosen votes.

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::features::ScaledVector;
use crate::types::EnsemblePersona;

use super::traits::{ClassifierKind, PersonaClassifier};

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Always the same label
    Fixed(EnsemblePersona),
    /// Label derived from the sign of one scaled feature: > 0 stable, < 0 stressed, else moderate
    SignOf(usize),
    /// Prediction fails with the given message
    Fail(String),
}

/// Mock implementation of PersonaClassifier for testing
pub struct MockClassifier {
    kind: ClassifierKind,
    behaviour: RwLock<MockBehaviour>,
    calls: RwLock<u32>,
}

impl MockClassifier {
    pub fn new(kind: ClassifierKind, behaviour: MockBehaviour) -> Self {
        Self {
            kind,
            behaviour: RwLock::new(behaviour),
            calls: RwLock::new(0),
        }
    }

    /// Mock that always votes `label`
    pub fn fixed(kind: ClassifierKind, label: EnsemblePersona) -> Self {
        Self::new(kind, MockBehaviour::Fixed(label))
    }

    /// Mock whose prediction always errors
    pub fn failing(kind: ClassifierKind) -> Self {
        Self::new(kind, MockBehaviour::Fail("Mock failure".to_string()))
    }

    /// Swap the behaviour between calls
    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour.write() = behaviour;
    }

    /// Number of predictions served
    pub fn call_count(&self) -> u32 {
        *self.calls.read()
    }
}

impl PersonaClassifier for MockClassifier {
    fn kind(&self) -> ClassifierKind {
        self.kind
    }

    fn predict(&self, input: &ScaledVector) -> Result<EnsemblePersona> {
        *self.calls.write() += 1;

        match &*self.behaviour.read() {
            MockBehaviour::Fixed(label) => Ok(*label),
            MockBehaviour::SignOf(idx) => {
                let value = input.values().get(*idx).copied().unwrap_or(0.0);
                Ok(if value > 0.0 {
                    EnsemblePersona::Stable
                } else if value < 0.0 {
                    EnsemblePersona::Stressed
                } else {
                    EnsemblePersona::Moderate
                })
            }
            MockBehaviour::Fail(message) => Err(Error::model_unavailable(self.name(), message.clone())),
        }
    }
}
