//! `manifest.json`: SHA-256 checksum per artifact file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::schema::{parse_artifact, SCHEMA_VERSION};
use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,

    /// File name to lowercase hex SHA-256
    pub checksums: BTreeMap<String, String>,
}

impl Manifest {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let manifest: Manifest = parse_artifact("manifest", bytes)?;
        if manifest.schema_version != SCHEMA_VERSION {
            return Err(Error::artifact_load(
                "manifest",
                format!(
                    "schema_version {} is not supported (expected {})",
                    manifest.schema_version, SCHEMA_VERSION
                ),
            ));
        }
        Ok(manifest)
    }

    /// Check `bytes` against the recorded checksum for `file`.
    pub fn verify(&self, file: &str, bytes: &[u8]) -> Result<()> {
        let expected = self.checksums.get(file).ok_or_else(|| {
            Error::artifact_load(file, "no checksum recorded in manifest.json")
        })?;
        let actual = sha256_hex(bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(Error::ArtifactChecksumMismatch {
                artifact: file.to_string(),
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_for(file: &str, bytes: &[u8]) -> Manifest {
        let mut checksums = BTreeMap::new();
        checksums.insert(file.to_string(), sha256_hex(bytes));
        Manifest {
            schema_version: SCHEMA_VERSION,
            checksums,
        }
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_ok_and_mismatch() {
        let manifest = manifest_for("svm.json", b"{}");
        assert!(manifest.verify("svm.json", b"{}").is_ok());

        let err = manifest.verify("svm.json", b"{ }").unwrap_err();
        assert!(matches!(err, Error::ArtifactChecksumMismatch { .. }));
    }

    #[test]
    fn test_verify_missing_entry() {
        let manifest = manifest_for("svm.json", b"{}");
        assert!(manifest.verify("crf.json", b"{}").is_err());
    }

    #[test]
    fn test_parse_rejects_other_version() {
        let json = br#"{"schema_version": 9, "checksums": {}}"#;
        assert!(Manifest::parse(json).is_err());
    }
}
