//! Common header carried by every artifact document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FEATURE_NAMES;

/// Artifact schema this build understands.
pub const SCHEMA_VERSION: u32 = 1;

/// Leading fields shared by `scaler.json`, `svm.json`, `crf.json` and `hmm.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub schema_version: u32,

    /// Feature names in the order the artifact was fitted on
    pub features: Vec<String>,
}

impl Default for ArtifactHeader {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ArtifactHeader {
    /// Reject artifacts from another schema or fitted on a different feature layout.
    pub fn check(&self, artifact: &str) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(Error::artifact_load(
                artifact,
                format!(
                    "schema_version {} is not supported (expected {})",
                    self.schema_version, SCHEMA_VERSION
                ),
            ));
        }

        let matches = self.features.len() == FEATURE_NAMES.len()
            && self
                .features
                .iter()
                .zip(FEATURE_NAMES.iter())
                .all(|(a, b)| a == b);
        if !matches {
            return Err(Error::artifact_load(
                artifact,
                format!(
                    "feature layout [{}] does not match [{}]",
                    self.features.join(", "),
                    FEATURE_NAMES.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

/// Parse an artifact document, mapping JSON errors to `ArtifactLoad`.
pub fn parse_artifact<T: DeserializeOwned>(artifact: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| Error::artifact_load(artifact, format!("invalid JSON: {}", e)))
}

/// Require a vector to have exactly `expected` entries.
pub fn check_len(artifact: &str, field: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::artifact_load(
            artifact,
            format!("{} has {} entries, expected {}", field, actual, expected),
        ));
    }
    Ok(())
}

/// Require every value to be finite.
pub fn check_finite(artifact: &str, field: &str, values: &[f64]) -> Result<()> {
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::artifact_load(
            artifact,
            format!("{}[{}] is not a finite number", field, idx),
        ));
    }
    Ok(())
}
