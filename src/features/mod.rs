//! Feature engineering for the classifier ensemble

mod builder;
pub mod thresholds;
mod vector;

pub use builder::FeatureBuilder;
pub use thresholds::BehaviourLabels;
pub use vector::{FeatureVector, ScaledVector, FEATURE_COUNT, FEATURE_NAMES};
