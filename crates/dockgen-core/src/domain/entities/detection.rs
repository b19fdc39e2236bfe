use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::{Framework, Layout, Stack};

/// A dependency declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    /// Version requirement as written in the manifest, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        if !version.trim().is_empty() {
            self.version = Some(version.trim().to_owned());
        }
        self
    }
}

/// What the classifier learned about one deployable component.
///
/// Paths are relative to the project root; the root component itself has an
/// empty `path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub path: PathBuf,
    pub name: String,
    pub stack: Stack,
    pub manifests: Vec<PathBuf>,
    pub dependencies: Vec<Dependency>,
    pub frameworks: Vec<Framework>,
    pub entry_points: Vec<String>,
    pub ports: Vec<u16>,
    /// `.env` variable names. Values are never captured.
    pub env_vars: Vec<String>,
}

impl DetectionResult {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, stack: Stack) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            stack,
            manifests: Vec::new(),
            dependencies: Vec::new(),
            frameworks: Vec::new(),
            entry_points: Vec::new(),
            ports: Vec::new(),
            env_vars: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// Dependency names in declaration order, without duplicates.
    pub fn dependency_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.dependencies.len());
        for dep in &self.dependencies {
            if !names.contains(&dep.name.as_str()) {
                names.push(&dep.name);
            }
        }
        names
    }

    pub fn uses_framework(&self, framework: Framework) -> bool {
        self.frameworks.contains(&framework)
    }
}

/// Architecture hints picked up while walking the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServicePattern {
    /// More than one Dockerfile already exists in the tree.
    MultipleDockerfiles,
    /// A conventional `services/` or `apps/` directory holds code.
    ServiceDirectory,
}

/// Classification of a whole project tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAnalysis {
    pub root: PathBuf,
    pub layout: Layout,
    pub components: Vec<DetectionResult>,
    pub existing_dockerfiles: Vec<PathBuf>,
    pub service_patterns: Vec<ServicePattern>,
}

impl ProjectAnalysis {
    /// Display name of the project, taken from the root directory.
    pub fn project_name(&self) -> String {
        project_name(&self.root)
    }

    /// Stack of the first component.
    pub fn primary_stack(&self) -> Option<Stack> {
        self.components.first().map(|c| c.stack)
    }

    pub fn is_microservices(&self) -> bool {
        self.layout == Layout::Microservices
    }

    /// All ports across components, sorted and de-duplicated.
    pub fn all_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self
            .components
            .iter()
            .flat_map(|c| c.ports.iter().copied())
            .collect();
        ports.sort_unstable();
        ports.dedup();
        ports
    }

    /// All `.env` variable names across components, sorted and de-duplicated.
    pub fn all_env_vars(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = self
            .components
            .iter()
            .flat_map(|c| c.env_vars.iter().map(String::as_str))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }
}

/// Last path segment, or `app` when the path has none (e.g. `/`).
pub fn project_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("app")
        .to_owned()
}
