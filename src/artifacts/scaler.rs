//! Pre-fitted standardization.

use serde::{Deserialize, Serialize};

use super::schema::{check_finite, check_len, parse_artifact, ArtifactHeader};
use crate::error::Result;
use crate::features::{FeatureVector, ScaledVector, FEATURE_COUNT};

pub const SCALER_FILE: &str = "scaler.json";

/// Per-feature `(x - mean) / scale`, fitted offline and never refit here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Build and validate from fitted parameters.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            header: ArtifactHeader::default(),
            mean,
            scale,
        };
        scaler.check()?;
        Ok(scaler)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let scaler: StandardScaler = parse_artifact("scaler", bytes)?;
        scaler.check()?;
        Ok(scaler)
    }

    fn check(&self) -> Result<()> {
        self.header.check("scaler")?;
        check_len("scaler", "mean", self.mean.len(), FEATURE_COUNT)?;
        check_len("scaler", "scale", self.scale.len(), FEATURE_COUNT)?;
        check_finite("scaler", "mean", &self.mean)?;
        check_finite("scaler", "scale", &self.scale)?;
        Ok(())
    }

    /// Standardize one vector. A zero scale means a constant feature and divides by 1.
    pub fn transform(&self, features: &FeatureVector) -> ScaledVector {
        let raw = features.to_array();
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in raw.iter().enumerate() {
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            out[i] = (value - self.mean[i]) / scale;
        }
        ScaledVector(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureBuilder;
    use crate::types::RawFinancialInput;

    #[test]
    fn test_transform() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[0] = 10000.0;
        scale[5] = 0.0;
        let mut mean = vec![0.0; FEATURE_COUNT];
        mean[0] = 40000.0;
        let scaler = StandardScaler::new(mean, scale).unwrap();

        let fv = FeatureBuilder::new()
            .build(&RawFinancialInput::new(50000.0, 20000.0, 5000.0, 5000.0))
            .unwrap();
        let scaled = scaler.transform(&fv);

        assert_eq!(scaled.0[0], 1.0);
        // Zero scale leaves the centred value untouched
        assert_eq!(scaled.0[5], f64::from(fv.savings_behaviour_flag));
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(StandardScaler::new(vec![0.0; 9], vec![1.0; FEATURE_COUNT]).is_err());
        assert!(StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; 11]).is_err());
    }

    #[test]
    fn test_from_json_missing_scale() {
        let json = serde_json::json!({
            "schema_version": 1,
            "features": crate::features::FEATURE_NAMES,
            "mean": vec![0.0; FEATURE_COUNT],
        });
        let bytes = serde_json::to_vec(&json).unwrap();
        assert!(StandardScaler::from_json(&bytes).is_err());
    }

    #[test]
    fn test_from_json_round_trip() {
        let scaler = StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![2.0; FEATURE_COUNT]).unwrap();
        let bytes = serde_json::to_vec(&scaler).unwrap();
        let loaded = StandardScaler::from_json(&bytes).unwrap();
        assert_eq!(loaded.scale, scaler.scale);
    }
}
