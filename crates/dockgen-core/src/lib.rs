//! dockgen Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for dockgen, a tool
//! that detects a project's stack and drafts container artifacts for it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           dockgen-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (Classifier, Generation, Dockerize)     │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Driven: Filesystem, Generation)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    dockgen-adapters (Infrastructure)    │
//! │ (LocalFilesystem, OpenAiClient, etc)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Signatures, Manifests, Prompts, Rules) │
//! │         No I/O                          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dockgen_core::application::{
//!     DockerizeRequest, DockerizeService, GenerationService, ProjectClassifier, RetryPolicy,
//!     WalkOptions,
//! };
//! use dockgen_core::domain::ArtifactValidator;
//! # fn demo(
//! #     filesystem: Arc<dyn dockgen_core::application::Filesystem>,
//! #     client: Arc<dyn dockgen_core::application::GenerationClient>,
//! # ) -> dockgen_core::error::DockgenResult<()> {
//!
//! let service = DockerizeService::new(
//!     ProjectClassifier::new(Arc::clone(&filesystem), WalkOptions::default()),
//!     GenerationService::new(client, RetryPolicy::default()),
//!     ArtifactValidator::default(),
//!     filesystem,
//! );
//! let outcome = service.run(&DockerizeRequest::new("./my-app", "./my-app"))?;
//! println!("{} file(s) written", outcome.written.len());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        DockerizeOutcome, DockerizeRequest, DockerizeService, GenerationService,
        ProjectClassifier, RetryPolicy,
        ports::{Filesystem, GenerationClient, GenerationError, WalkOptions},
    };
    pub use crate::domain::{
        Artifact, ArtifactKind, ArtifactSet, ArtifactValidator, DetectionResult, Framework,
        GenerationRequest, Layout, ProjectAnalysis, Severity, Stack, ValidationReport,
    };
    pub use crate::error::{DockgenError, DockgenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
