//! Error types for the FinMentor decision engine
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - A sanitized message for the request boundary
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message reported to callers for any failure that is not an input problem.
pub const GENERIC_CLIENT_MESSAGE: &str = "Invalid input data.";

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Input errors (3xx)
    InvalidInput = 300,
    MalformedInput = 301,

    // Artifact errors (4xx)
    ArtifactLoadFailed = 400,
    ArtifactChecksumMismatch = 401,

    // Model errors (5xx)
    ModelUnavailable = 500,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E300")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON error while reading or writing request documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────

    /// Rejected financial input (income <= 0, negative or non-finite values)
    #[error("Invalid input: {message}")]
    InvalidInput { field: Option<String>, message: String },

    // ─────────────────────────────────────────────────────────────
    // Artifact Errors
    // ─────────────────────────────────────────────────────────────

    /// Missing, corrupt or schema-mismatched model/scaler artifact
    #[error("Failed to load artifact {artifact}: {message}")]
    ArtifactLoad { artifact: String, message: String },

    /// Artifact contents do not match the manifest
    #[error("Artifact checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ArtifactChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Model Errors
    // ─────────────────────────────────────────────────────────────

    /// A classifier is missing, disabled, or failed to predict
    #[error("Classifier {classifier} unavailable: {message}")]
    ModelUnavailable { classifier: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::MalformedInput,

            Error::InvalidInput { .. } => ErrorCode::InvalidInput,

            Error::ArtifactLoad { .. } => ErrorCode::ArtifactLoadFailed,
            Error::ArtifactChecksumMismatch { .. } => ErrorCode::ArtifactChecksumMismatch,

            Error::ModelUnavailable { .. } => ErrorCode::ModelUnavailable,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the failure was caused by the caller's data
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::InvalidInput { .. } | Error::Json(_))
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'finmentor config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'finmentor config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::InvalidInput { .. } => Some(
                "Monthly income must be greater than zero and all amounts must be non-negative."
            ),
            Error::Json(_) => Some(
                "Input documents must be JSON objects with monthly_income, total_emi and savings fields."
            ),

            Error::ArtifactLoad { .. } => Some(
                "Check [artifacts].dir and run 'finmentor artifacts verify' to inspect the model files."
            ),
            Error::ArtifactChecksumMismatch { .. } => Some(
                "The artifact differs from its manifest entry. Re-export the models or regenerate manifest.json."
            ),

            Error::ModelUnavailable { .. } => Some(
                "Enable all classifiers in [ensemble] or set degrade_policy = \"majority_of_available\"."
            ),

            _ => None,
        }
    }

    /// Message safe to hand to an external caller.
    ///
    /// Input problems are reported as-is; everything else collapses to a
    /// generic message so that model and filesystem internals never leak.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidInput { message, .. } => message.clone(),
            _ => GENERIC_CLIENT_MESSAGE.to_string(),
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid input error for a specific field
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Create an artifact load error
    pub fn artifact_load(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ArtifactLoad {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a model unavailable error naming the classifier
    pub fn model_unavailable(classifier: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ModelUnavailable {
            classifier: classifier.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::InvalidInput.as_str(), "E300");
        assert_eq!(ErrorCode::ArtifactLoadFailed.as_str(), "E400");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::InvalidInput.exit_code(), 30);
        assert_eq!(ErrorCode::ArtifactChecksumMismatch.exit_code(), 40);
        assert_eq!(ErrorCode::ModelUnavailable.exit_code(), 50);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_codes() {
        let err = Error::invalid_input("monthly_income", "must be greater than zero");
        assert_eq!(err.code(), ErrorCode::InvalidInput);

        let err = Error::artifact_load("svm.json", "missing");
        assert_eq!(err.code(), ErrorCode::ArtifactLoadFailed);

        let err = Error::model_unavailable("crf", "disabled");
        assert_eq!(err.code(), ErrorCode::ModelUnavailable);
    }

    #[test]
    fn test_model_unavailable_names_classifier() {
        let err = Error::model_unavailable("hmm", "state out of range");
        assert!(err.to_string().contains("hmm"));
    }

    #[test]
    fn test_client_message_hides_internals() {
        let err = Error::invalid_input("monthly_income", "Income must be greater than zero.");
        assert_eq!(err.client_message(), "Income must be greater than zero.");

        let err = Error::artifact_load("/srv/models/svm.json", "permission denied");
        assert_eq!(err.client_message(), GENERIC_CLIENT_MESSAGE);
        assert!(!err.client_message().contains("/srv"));

        let err = Error::model_unavailable("svm", "panic in kernel");
        assert_eq!(err.client_message(), GENERIC_CLIENT_MESSAGE);
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().unwrap().contains("config init"));

        let err = Error::model_unavailable("crf", "disabled");
        assert!(err.suggestion().unwrap().contains("degrade_policy"));
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::config_not_found("/test/config.toml");
        let formatted = err.format_for_terminal();

        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::invalid_input("savings", "must be non-negative");
        let formatted = err.format_for_log();

        assert!(formatted.contains("[E300]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }

    #[test]
    fn test_error_from_json_is_input_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();

        assert_eq!(err.code(), ErrorCode::MalformedInput);
        assert!(err.is_input_error());
    }
}
