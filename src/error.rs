//! Error types for codemod runs.

use std::path::PathBuf;
use thiserror::Error;

use crate::git::GitError;

/// The main error type for codemod operations.
#[derive(Error, Debug)]
pub enum CodemodError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree-sitter parse error for {language}: {message}")]
    Parse { language: String, message: String },

    #[error("Tree-sitter query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Transform failed for {path}: {message}")]
    TransformFailed { path: PathBuf, message: String },

    #[error("Hook '{hook}' failed: {message}")]
    HookFailed { hook: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("GitHub API error: {message}")]
    GitHub { message: String },
}

impl CodemodError {
    /// Builds a [`CodemodError::TransformFailed`] from any displayable error.
    pub fn transform(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::TransformFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// A specialized Result type for codemod operations.
pub type Result<T> = std::result::Result<T, CodemodError>;
