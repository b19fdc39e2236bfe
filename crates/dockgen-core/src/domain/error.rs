// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (cheap to carry through reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Detection Errors (404-level equivalent)
    // ========================================================================
    #[error("No recognizable project signature found under {}", path.display())]
    NoSignatureMatched { path: PathBuf },

    #[error("Project directory does not exist: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    // ========================================================================
    // Parsing Errors
    // ========================================================================
    #[error("Failed to parse manifest {}: {reason}", path.display())]
    ManifestParse { path: PathBuf, reason: String },

    #[error("Unknown stack: {0}")]
    UnknownStack(String),

    // ========================================================================
    // Rule Table Errors
    // ========================================================================
    #[error("Unknown validation rule: {id}")]
    UnknownRule { id: String },

    // ========================================================================
    // Output Errors
    // ========================================================================
    #[error("Invalid artifact set: {0}")]
    InvalidArtifactSet(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NoSignatureMatched { path } => vec![
                format!("Nothing under '{}' looks like a supported project", path.display()),
                "Supported manifests: package.json, requirements.txt, pyproject.toml, Pipfile,".into(),
                "  pom.xml, build.gradle, go.mod, *.csproj, Gemfile, Cargo.toml, composer.json".into(),
                "Check that you pointed dockgen at the project root".into(),
            ],
            Self::ProjectNotFound { path } => vec![
                format!("The path '{}' does not exist or is not a directory", path.display()),
                "Pass the project root as the first argument".into(),
            ],
            Self::ManifestParse { path, .. } => vec![
                format!("Check the syntax of {}", path.display()),
            ],
            Self::UnknownRule { id } => vec![
                format!("'{}' is not a known rule identifier", id),
                "Run 'dockgen validate --help' to see how rules are reported".into(),
            ],
            Self::UnknownStack(_) => vec!["See documentation for supported stacks".into()],
            Self::InvalidArtifactSet(_) => vec![
                "This is likely a bug in dockgen".into(),
                "Re-run with -vv and include the log when reporting it".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoSignatureMatched { .. } | Self::ProjectNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::ManifestParse { .. } | Self::UnknownStack(_) => ErrorCategory::Validation,
            Self::UnknownRule { .. } => ErrorCategory::Configuration,
            Self::InvalidArtifactSet(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}
