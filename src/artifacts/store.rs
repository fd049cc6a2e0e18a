//! Artifact directory loader
//!
//! Reads the scaler and the enabled classifiers once, on first use, and
//! hands out the same immutable set afterwards.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, info};

use super::manifest::{sha256_hex, Manifest, MANIFEST_FILE};
use super::scaler::{StandardScaler, SCALER_FILE};
use crate::classifier::{ClassifierKind, CrfModel, HmmModel, SharedClassifier, SvmModel};
use crate::config::{ArtifactSettings, EnsembleSettings};
use crate::error::{Error, Result};

/// A file that was read from the artifact directory.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactFile {
    pub file: String,
    pub sha256: String,
    pub size_bytes: usize,
    /// Whether the manifest checksum was checked
    pub verified: bool,
}

/// Everything the decision engine needs from disk.
pub struct LoadedArtifacts {
    pub scaler: StandardScaler,
    pub svm: Option<Arc<SvmModel>>,
    pub crf: Option<Arc<CrfModel>>,
    pub hmm: Option<Arc<HmmModel>>,
    pub files: Vec<ArtifactFile>,
}

impl LoadedArtifacts {
    /// Loaded classifiers in priority order
    pub fn classifiers(&self) -> Vec<SharedClassifier> {
        let mut out: Vec<SharedClassifier> = Vec::new();
        if let Some(svm) = &self.svm {
            out.push(svm.clone());
        }
        if let Some(crf) = &self.crf {
            out.push(crf.clone());
        }
        if let Some(hmm) = &self.hmm {
            out.push(hmm.clone());
        }
        out
    }
}

/// Single-flight loader for one artifact directory.
pub struct ArtifactStore {
    dir: PathBuf,
    verify_checksums: bool,
    ensemble: EnsembleSettings,
    loaded: OnceCell<Arc<LoadedArtifacts>>,
    loads: AtomicUsize,
}

impl ArtifactStore {
    pub fn new(artifacts: &ArtifactSettings, ensemble: &EnsembleSettings) -> Self {
        Self {
            dir: PathBuf::from(&artifacts.dir),
            verify_checksums: artifacts.verify_checksums,
            ensemble: ensemble.clone(),
            loaded: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load on first call; concurrent first callers wait for the same load.
    ///
    /// A failed load is not cached, so the next call reads the directory again.
    pub fn get_or_load(&self) -> Result<Arc<LoadedArtifacts>> {
        self.loaded
            .get_or_try_init(|| self.load().map(Arc::new))
            .map(Arc::clone)
    }

    /// Number of times the directory has been read
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn load(&self) -> Result<LoadedArtifacts> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        info!(dir = %self.dir.display(), verify = self.verify_checksums, "Loading artifacts");

        let manifest = if self.verify_checksums {
            Some(Manifest::parse(&self.read(MANIFEST_FILE)?)?)
        } else {
            None
        };

        let mut files = Vec::new();

        let bytes = self.read_checked(SCALER_FILE, manifest.as_ref(), &mut files)?;
        let scaler = StandardScaler::from_json(&bytes)?;

        let mut svm = None;
        let mut crf = None;
        let mut hmm = None;
        for kind in self.ensemble.enabled_kinds() {
            let bytes = self.read_checked(kind.artifact_file(), manifest.as_ref(), &mut files)?;
            match kind {
                ClassifierKind::Svm => svm = Some(Arc::new(SvmModel::from_json(&bytes)?)),
                ClassifierKind::Crf => crf = Some(Arc::new(CrfModel::from_json(&bytes)?)),
                ClassifierKind::Hmm => hmm = Some(Arc::new(HmmModel::from_json(&bytes)?)),
            }
            debug!(classifier = %kind, "Classifier artifact loaded");
        }

        info!(files = files.len(), "Artifacts loaded");

        Ok(LoadedArtifacts {
            scaler,
            svm,
            crf,
            hmm,
            files,
        })
    }

    fn read_checked(
        &self,
        file: &str,
        manifest: Option<&Manifest>,
        files: &mut Vec<ArtifactFile>,
    ) -> Result<Vec<u8>> {
        let bytes = self.read(file)?;
        if let Some(manifest) = manifest {
            manifest.verify(file, &bytes)?;
        }
        files.push(ArtifactFile {
            file: file.to_string(),
            sha256: sha256_hex(&bytes),
            size_bytes: bytes.len(),
            verified: manifest.is_some(),
        });
        Ok(bytes)
    }

    fn read(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(file);
        fs::read(&path).map_err(|e| {
            let message = match e.kind() {
                ErrorKind::NotFound => format!("{} not found", path.display()),
                _ => format!("{}: {}", path.display(), e),
            };
            Error::artifact_load(file, message)
        })
    }
}
