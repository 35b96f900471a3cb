//! Recipe error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while evaluating a recipe.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The requested settings/options cannot produce a valid build.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("command failed: {cmd} (exit code: {code:?})")]
    CommandFailed { cmd: String, code: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("sha256 verification failed: expected {expected}, got {actual}")]
    Sha256Mismatch { expected: String, actual: String },

    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("no source entry for version {0}")]
    MissingSource(String),

    #[error("manifest error in {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("invalid dependency reference: {0}")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, RecipeError>;
