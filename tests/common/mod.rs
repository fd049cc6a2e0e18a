//! Common test utilities and fixtures
//!
//! Writes a small, fully deterministic artifact set into a temp directory.
//! All three classifiers look only at the scaled `savings_rate`: above the
//! fitted mean they vote stable, below it stressed.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use finmentor_engine::artifacts::sha256_hex;
use finmentor_engine::config::{ArtifactSettings, DegradePolicy, EngineConfig, EnsembleSettings};
use finmentor_engine::features::{FEATURE_COUNT, FEATURE_NAMES};
use finmentor_engine::RawFinancialInput;

pub const SAVINGS_RATE_INDEX: usize = 9;

pub const SCALER_MEAN: [f64; FEATURE_COUNT] =
    [50000.0, 25000.0, 5000.0, 0.1, 0.5, 0.5, 0.5, 0.5, 20000.0, 0.2];
pub const SCALER_SCALE: [f64; FEATURE_COUNT] =
    [20000.0, 10000.0, 5000.0, 0.1, 0.2, 0.5, 0.5, 0.5, 15000.0, 0.1];

/// 50000 income, 20000 expense, 5000 EMI, 15000 declared savings
pub fn reference_household() -> RawFinancialInput {
    RawFinancialInput::new(50000.0, 20000.0, 5000.0, 15000.0)
}

/// Savings rate 4%: every fixture classifier votes stressed
pub fn stressed_household() -> RawFinancialInput {
    RawFinancialInput::new(50000.0, 40000.0, 8000.0, 2000.0)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn unit(idx: usize) -> Vec<f64> {
    let mut v = vec![0.0; FEATURE_COUNT];
    v[idx] = 1.0;
    v
}

pub fn scaler_json() -> Value {
    json!({
        "schema_version": 1,
        "features": FEATURE_NAMES,
        "mean": SCALER_MEAN,
        "scale": SCALER_SCALE,
    })
}

pub fn svm_json() -> Value {
    json!({
        "schema_version": 1,
        "features": FEATURE_NAMES,
        "kernel": {"type": "linear"},
        "classes": [0, 1, 2],
        "support_vectors": [unit(SAVINGS_RATE_INDEX)],
        "coefficients": [[0.0], [1.0], [-1.0]],
        "intercepts": [0.0, 0.0, 0.0],
    })
}

pub fn crf_json() -> Value {
    json!({
        "schema_version": 1,
        "features": FEATURE_NAMES,
        "labels": ["0", "1", "2"],
        "state_features": [
            {"attribute": "savings_rate", "label": "1", "weight": 1.0},
            {"attribute": "savings_rate", "label": "2", "weight": -1.0},
        ],
    })
}

pub fn hmm_json() -> Value {
    let mut means = vec![vec![0.0; FEATURE_COUNT]; 3];
    means[1][SAVINGS_RATE_INDEX] = 1.5;
    means[2][SAVINGS_RATE_INDEX] = -1.5;
    json!({
        "schema_version": 1,
        "features": FEATURE_NAMES,
        "start_probabilities": [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
        "means": means,
        "variances": vec![vec![1.0; FEATURE_COUNT]; 3],
        "state_labels": [0, 1, 2],
    })
}

/// Artifact directory with scaler, three classifiers and a manifest
pub struct ArtifactFixture {
    temp_dir: TempDir,
}

impl ArtifactFixture {
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fixture.write("scaler.json", &scaler_json());
        fixture.write("svm.json", &svm_json());
        fixture.write("crf.json", &crf_json());
        fixture.write("hmm.json", &hmm_json());
        fixture.write_manifest();
        fixture
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn dir_str(&self) -> &str {
        self.temp_dir.path().to_str().unwrap()
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir().join(file)
    }

    pub fn write(&self, file: &str, doc: &Value) {
        fs::write(self.path(file), serde_json::to_vec_pretty(doc).unwrap()).unwrap();
    }

    /// Record checksums for whatever artifact files are present now
    pub fn write_manifest(&self) {
        let mut checksums = serde_json::Map::new();
        for file in ["scaler.json", "svm.json", "crf.json", "hmm.json"] {
            if let Ok(bytes) = fs::read(self.path(file)) {
                checksums.insert(file.to_string(), Value::String(sha256_hex(&bytes)));
            }
        }
        let manifest = json!({"schema_version": 1, "checksums": checksums});
        fs::write(
            self.path("manifest.json"),
            serde_json::to_vec_pretty(&manifest).unwrap(),
        )
        .unwrap();
    }

    pub fn remove(&self, file: &str) {
        fs::remove_file(self.path(file)).unwrap();
    }

    /// Change a file after the manifest was written
    pub fn tamper(&self, file: &str) {
        let mut bytes = fs::read(self.path(file)).unwrap();
        bytes.extend_from_slice(b"\n");
        fs::write(self.path(file), bytes).unwrap();
    }

    pub fn write_input(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            artifacts: ArtifactSettings {
                dir: self.dir_str().to_string(),
                verify_checksums: true,
            },
            ..Default::default()
        }
    }

    pub fn degraded_config(&self, svm: bool, crf: bool, hmm: bool) -> EngineConfig {
        EngineConfig {
            ensemble: EnsembleSettings {
                svm,
                crf,
                hmm,
                degrade_policy: DegradePolicy::MajorityOfAvailable,
            },
            ..self.config()
        }
    }
}
