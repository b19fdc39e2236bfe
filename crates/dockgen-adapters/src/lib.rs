//! Infrastructure adapters for dockgen.
//!
//! This crate implements the ports defined in `dockgen-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod generation;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use generation::{OpenAiClient, OpenAiSettings};
