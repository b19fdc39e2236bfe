//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::application::ports::GenerationError;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Target files exist and overwriting was not requested.
    #[error("Output already exists: {}", display_paths(paths))]
    OutputConflict { paths: Vec<PathBuf> },

    /// The generation service could not produce an artifact.
    #[error("Generation service failed after {attempts} attempt(s): {error}")]
    ServiceFailed { attempts: u32, error: GenerationError },

    /// Filesystem operation failed.
    #[error("Filesystem error at {}: {reason}", path.display())]
    Filesystem { path: PathBuf, reason: String },

    /// Request rejected before any work was done.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Filesystem {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::OutputConflict { .. } => vec![
                "Use --force to overwrite the existing files".into(),
                "Or choose another output directory with --output".into(),
            ],
            Self::ServiceFailed { error, .. } => match error {
                GenerationError::RateLimited { .. } => vec![
                    "The generation API kept rate limiting the request".into(),
                    "Wait a moment, or raise retry.max_retries in the config".into(),
                ],
                GenerationError::Timeout { .. } => vec![
                    "The generation API did not answer in time".into(),
                    "Raise generation.timeout_secs in the config".into(),
                ],
                GenerationError::Authentication { .. } => vec![
                    "The API rejected the key".into(),
                    "Check the value of the API key environment variable".into(),
                ],
                GenerationError::Transport { .. } => vec![
                    "Check your network connection".into(),
                    "Check generation.base_url in the config".into(),
                ],
                GenerationError::Api { .. } | GenerationError::InvalidResponse { .. } => vec![
                    "The generation API returned an unexpected answer".into(),
                    "Re-run with -vv to log the exchange".into(),
                ],
            },
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::InvalidRequest(_) => vec!["Run 'dockgen --help' for usage".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::OutputConflict { .. } => ErrorCategory::Conflict,
            Self::ServiceFailed { .. } => ErrorCategory::Service,
            Self::Filesystem { .. } => ErrorCategory::Internal,
            Self::InvalidRequest(_) => ErrorCategory::Validation,
        }
    }
}
