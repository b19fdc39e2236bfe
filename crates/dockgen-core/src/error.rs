//! Unified error handling for dockgen core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with user-actionable suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for dockgen core operations.
#[derive(Debug, Error, Clone)]
pub enum DockgenError {
    /// Errors from the domain layer (detection, parsing, rule table).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (generation, output conflicts, I/O).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl DockgenError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run 'dockgen config show' to inspect the effective configuration".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in dockgen".into(),
                "Re-run with -vv and include the log file when reporting it".into(),
            ],
        }
    }

    /// Get error category for display and exit-code purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad user input.
    Validation,
    /// Output files already exist.
    Conflict,
    /// Nothing recognizable to work on.
    NotFound,
    Configuration,
    /// The generation service failed after retries.
    Service,
    Internal,
}

/// Convenient result type alias.
pub type DockgenResult<T> = Result<T, DockgenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn domain_categories_carry_through() {
        let err: DockgenError = DomainError::NoSignatureMatched {
            path: PathBuf::from("/tmp/x"),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn application_conflict_category() {
        let err: DockgenError = ApplicationError::OutputConflict {
            paths: vec![PathBuf::from("out/Dockerfile")],
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert!(err.to_string().contains("out/Dockerfile"));
    }
}
