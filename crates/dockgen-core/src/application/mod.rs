//! Application layer for dockgen.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ProjectClassifier, GenerationService, DockerizeService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. Detection tables, prompts and rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    DockerizeOutcome, DockerizeRequest, DockerizeService, GenerationService, ProjectClassifier,
    RetryPolicy,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, GenerationClient, GenerationError, WalkOptions};

pub use error::ApplicationError;
