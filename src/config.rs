//! Configuration system for the FinMentor engine
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (FINMENTOR_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::ClassifierKind;
use crate::error::{Error, Result};

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the fitted scaler and classifier artifacts live
    pub artifacts: ArtifactSettings,

    /// Which classifiers take part in the ensemble
    pub ensemble: EnsembleSettings,

    /// Logging configuration
    pub logging: LoggingSettings,

    /// Batch classification settings
    pub batch: BatchSettings,
}

/// Artifact location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Directory holding scaler.json, svm.json, crf.json, hmm.json and manifest.json
    pub dir: String,

    /// Require manifest.json and verify every artifact against its SHA-256 entry
    pub verify_checksums: bool,
}

/// What the ensemble does when a classifier is switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradePolicy {
    /// Every classifier must be active; anything less is a configuration error
    Fail,
    /// Vote among whichever classifiers are active
    MajorityOfAvailable,
}

/// Ensemble membership
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleSettings {
    /// Margin-based classifier (support vector machine)
    pub svm: bool,

    /// Structured classifier (conditional random field)
    pub crf: bool,

    /// Latent-state classifier (Gaussian hidden Markov model)
    pub hmm: bool,

    /// Behaviour when fewer than three classifiers are active
    pub degrade_policy: DegradePolicy,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

/// Batch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Worker threads for batch classification (0 = one per CPU)
    pub max_threads: u32,
}

// Default implementations

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            dir: "~/.finmentor/artifacts".to_string(),
            verify_checksums: true,
        }
    }
}

impl Default for EnsembleSettings {
    fn default() -> Self {
        Self {
            svm: true,
            crf: true,
            hmm: true,
            degrade_policy: DegradePolicy::Fail,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { max_threads: 0 }
    }
}

impl EnsembleSettings {
    /// Whether the given classifier is switched on
    pub fn is_enabled(&self, kind: ClassifierKind) -> bool {
        match kind {
            ClassifierKind::Svm => self.svm,
            ClassifierKind::Crf => self.crf,
            ClassifierKind::Hmm => self.hmm,
        }
    }

    /// Active classifiers in tie-break priority order
    pub fn enabled_kinds(&self) -> Vec<ClassifierKind> {
        ClassifierKind::all()
            .iter()
            .copied()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }
}

impl BatchSettings {
    /// Effective thread count
    pub fn threads(&self) -> usize {
        if self.max_threads > 0 {
            self.max_threads as usize
        } else {
            num_cpus::get().max(1)
        }
    }
}

impl EngineConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides()?;
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            PathBuf::from("finmentor.toml"),
            dirs::config_dir()
                .map(|p| p.join("finmentor").join("engine.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".finmentor").join("engine.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("FINMENTOR_ARTIFACT_DIR") {
            self.artifacts.dir = val;
        }
        if let Ok(val) = std::env::var("FINMENTOR_VERIFY_CHECKSUMS") {
            self.artifacts.verify_checksums = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("FINMENTOR_ENABLE_SVM") {
            self.ensemble.svm = parse_bool(&val);
        }
        if let Ok(val) = std::env::var("FINMENTOR_ENABLE_CRF") {
            self.ensemble.crf = parse_bool(&val);
        }
        if let Ok(val) = std::env::var("FINMENTOR_ENABLE_HMM") {
            self.ensemble.hmm = parse_bool(&val);
        }
        if let Ok(val) = std::env::var("FINMENTOR_DEGRADE_POLICY") {
            match val.to_lowercase().as_str() {
                "fail" => self.ensemble.degrade_policy = DegradePolicy::Fail,
                "majority_of_available" => {
                    self.ensemble.degrade_policy = DegradePolicy::MajorityOfAvailable
                }
                other => {
                    return Err(Error::config_field_invalid(
                        "FINMENTOR_DEGRADE_POLICY",
                        format!(
                            "FINMENTOR_DEGRADE_POLICY '{}' is not 'fail' or 'majority_of_available'",
                            other
                        ),
                    ))
                }
            }
        }

        if let Ok(val) = std::env::var("FINMENTOR_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("FINMENTOR_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("FINMENTOR_LOG_JSON") {
            self.logging.json_format = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("FINMENTOR_BATCH_THREADS") {
            if let Ok(n) = val.parse() {
                self.batch.max_threads = n;
            }
        }

        Ok(())
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.artifacts.dir = expand_path(&self.artifacts.dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.artifacts.dir.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "artifacts.dir",
                "Artifact directory cannot be empty",
            ));
        }

        let enabled = self.ensemble.enabled_kinds();
        if enabled.is_empty() {
            return Err(Error::config_field_invalid(
                "ensemble",
                "At least one of svm, crf, hmm must be enabled",
            ));
        }
        if self.ensemble.degrade_policy == DegradePolicy::Fail
            && enabled.len() < ClassifierKind::all().len()
        {
            return Err(Error::config_field_invalid(
                "ensemble.degrade_policy",
                "degrade_policy = \"fail\" requires svm, crf and hmm to be enabled",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Get the artifact directory as a PathBuf
    pub fn artifact_dir(&self) -> PathBuf {
        PathBuf::from(&self.artifacts.dir)
    }

    /// Override the artifact directory (from the CLI)
    pub fn set_artifact_dir(&mut self, dir: &str) {
        self.artifacts.dir = expand_path(dir);
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".finmentor")
                .join("engine.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::config_field_invalid(
            "path",
            format!(
                "Configuration file already exists: {}. Use --force to overwrite.",
                config_path.display()
            ),
        ));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# FinMentor Decision Engine Configuration

[artifacts]
# Directory with scaler.json, svm.json, crf.json, hmm.json and manifest.json
dir = "~/.finmentor/artifacts"

# Verify artifacts against the SHA-256 entries in manifest.json
verify_checksums = true

[ensemble]
# Margin-based classifier
svm = true

# Structured classifier
crf = true

# Latent-state classifier
hmm = true

# "fail" requires all three classifiers; "majority_of_available" votes
# among the enabled ones
degrade_policy = "fail"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.finmentor/logs/engine.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false

[batch]
# Worker threads for batch classification (0 = one per CPU)
max_threads = 0
"#
    .to_string()
}
