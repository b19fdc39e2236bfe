//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "classify a project" or "dockerize a project".

pub mod classifier;
pub mod dockerize;
pub mod generation;

pub use classifier::ProjectClassifier;
pub use dockerize::{DockerizeOutcome, DockerizeRequest, DockerizeService};
pub use generation::{GenerationService, RetryPolicy};
