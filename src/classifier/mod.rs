//! Persona classifiers
//!
//! The three trained ensemble members behind one trait, plus the ensemble
//! that collects their votes.

mod crf;
mod hmm;
mod mock;
mod registry;
mod svm;
mod traits;

pub use crf::{CrfModel, StateFeature};
pub use hmm::HmmModel;
pub use mock::{MockBehaviour, MockClassifier};
pub use registry::{Ballot, ClassifierEnsemble, ModelVote};
pub use svm::{SvmKernel, SvmModel};
pub use traits::{ClassifierKind, PersonaClassifier, SharedClassifier};
