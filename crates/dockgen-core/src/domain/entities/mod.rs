pub mod artifact;
pub mod detection;
pub mod report;

pub use crate::domain::DomainError;
pub use artifact::{Artifact, ArtifactSet, PlannedArtifact};
pub use detection::{Dependency, DetectionResult, ProjectAnalysis, ServicePattern};
pub use report::{RuleOutcome, RuleStatus, ValidationReport};
