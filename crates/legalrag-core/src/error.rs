//! Error types for legalrag

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using LegalRagError
pub type Result<T> = std::result::Result<T, LegalRagError>;

/// Error type alias for convenience
pub type Error = LegalRagError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const MODEL_UNAVAILABLE: i32 = 4;
}

/// Main error type for legalrag
#[derive(Debug, Error)]
pub enum LegalRagError {
    #[error("Empty query received")]
    EmptyInput,

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("External call failed: {0}")]
    ExternalCall(String),

    #[error("Directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("File {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LegalRagError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound(_) | Self::DirectoryNotFound(_) => exit_codes::NOT_FOUND,
            Self::EmptyInput | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::ModelUnavailable(_) => exit_codes::MODEL_UNAVAILABLE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether the failure came from a model, search or storage backend
    /// rather than from the caller's input.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalCall(_)
                | Self::ModelUnavailable(_)
                | Self::Http(_)
                | Self::Database(_)
                | Self::Serialization(_)
        )
    }
}
