//! Core domain layer for dockgen.
//!
//! Pure logic only: signature tables, manifest parsers, detection records,
//! the checklist rule table, the validator and prompt templates. Anything
//! that touches the filesystem or the network goes through the ports defined
//! in `crate::application`.
//!
//! ## Rules of the Layer
//!
//! - **No I/O**: functions take text and return values
//! - **Static tables**: signatures, frameworks and rules are `static` slices
//! - **Serializable records**: results can be printed as JSON by the CLI
pub mod entities;
pub mod error;
pub mod insights;
pub mod manifest;
pub mod prompt;
pub mod rules;
pub mod signatures;
pub mod validation;
pub mod value_objects;

pub use entities::{
    Artifact, ArtifactSet, Dependency, DetectionResult, PlannedArtifact, ProjectAnalysis,
    RuleOutcome, RuleStatus, ServicePattern, ValidationReport,
};

pub use error::{DomainError, ErrorCategory};

pub use prompt::{GenerationRequest, normalize_response};
pub use rules::{RULES, RuleDef, RuleTarget};
pub use signatures::{
    DEFAULT_IGNORE_DIRS, DEFAULT_MAX_DEPTH, FRAMEWORK_REGISTRY, ManifestFormat, ProjectSignature,
    SIGNATURES,
};
pub use validation::ArtifactValidator;
pub use value_objects::{ArtifactKind, Framework, Layout, Severity, Stack};
