//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `dockgen-adapters` crate provides implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::{DEFAULT_IGNORE_DIRS, DEFAULT_MAX_DEPTH, GenerationRequest};
use crate::error::DockgenResult;

/// Bounds for a project tree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum directory depth below the root (the root's own files are depth 1).
    pub max_depth: usize,
    /// Directory names never descended into.
    pub ignore_dirs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| (*d).to_owned()).collect(),
        }
    }
}

impl WalkOptions {
    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == dir_name)
    }
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `dockgen_adapters::filesystem::LocalFilesystem` (production)
/// - `dockgen_adapters::filesystem::MemoryFilesystem` (tests, embedding)
pub trait Filesystem: Send + Sync {
    /// Files under `root`, as paths relative to `root`, sorted.
    fn list_files(&self, root: &Path, options: &WalkOptions) -> DockgenResult<Vec<PathBuf>>;

    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> DockgenResult<String>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> DockgenResult<()>;

    /// Replace the content of a file atomically.
    fn write_file(&self, path: &Path, content: &str) -> DockgenResult<()>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> DockgenResult<()>;

    /// Move a file, replacing `to` if it exists. Both paths share a directory.
    fn rename(&self, from: &Path, to: &Path) -> DockgenResult<()>;

    /// Absolute form of `path` with `.`, `..` and symlinks resolved.
    fn canonicalize(&self, path: &Path) -> DockgenResult<PathBuf>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Failure modes of a single generation call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("rate limited by the generation API")]
    RateLimited {
        /// Server-provided hint from the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("authentication rejected (HTTP {status})")]
    Authentication { status: u16 },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl GenerationError {
    /// Only rate limits and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Port for the external text generation service.
///
/// Implemented by:
/// - `dockgen_adapters::generation::OpenAiClient` (chat-completions API)
#[cfg_attr(test, mockall::automock)]
pub trait GenerationClient: Send + Sync {
    /// Send one prompt and return the raw response text.
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
