use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::error::DomainError;
use crate::domain::value_objects::ArtifactKind;

/// One generated document and where it belongs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// Component the artifact was generated for, `None` for project-wide ones.
    pub component: Option<String>,
    pub content: String,
}

/// Where an artifact will be written, decided before any text exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub component: Option<String>,
}

impl PlannedArtifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, component: Option<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            component,
        }
    }

    pub fn fill(self, content: String) -> Artifact {
        Artifact {
            kind: self.kind,
            path: self.path,
            component: self.component,
            content,
        }
    }
}

/// The complete set of artifacts for one run, rooted at the output directory.
///
/// Contains no behaviour beyond bookkeeping; writing is done through the
/// filesystem port.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactSet {
    pub(crate) root: PathBuf,
    pub(crate) artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// The single project-wide compose file, if one was generated.
    pub fn compose(&self) -> Option<&Artifact> {
        self.of_kind(ArtifactKind::Compose).next()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Absolute (root-joined) target paths in insertion order.
    pub fn target_paths(&self) -> Vec<PathBuf> {
        self.artifacts.iter().map(|a| self.root.join(&a.path)).collect()
    }

    /// Reject empty sets, duplicate targets and absolute artifact paths.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.artifacts.is_empty() {
            return Err(DomainError::InvalidArtifactSet(
                "no artifacts were produced".into(),
            ));
        }

        let mut seen = HashSet::new();
        for artifact in &self.artifacts {
            if artifact.path.is_absolute() {
                return Err(DomainError::InvalidArtifactSet(format!(
                    "artifact path must be relative: {}",
                    artifact.path.display()
                )));
            }
            if !seen.insert(&artifact.path) {
                return Err(DomainError::InvalidArtifactSet(format!(
                    "duplicate artifact path: {}",
                    artifact.path.display()
                )));
            }
        }

        Ok(())
    }
}
