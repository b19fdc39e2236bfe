//! Project Classifier - turns a directory tree into a [`ProjectAnalysis`].
//!
//! 1. Walk the tree through the filesystem port (bounded depth, noise skipped)
//! 2. Match manifest markers per directory, first signature in table order wins
//! 3. Keep top-level matches only and decide the layout
//! 4. Fall back to source-file extensions when no manifest matched at all
//! 5. Enrich every component with dependencies, frameworks, entry points,
//!    ports and `.env` variable names

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::ports::{Filesystem, WalkOptions},
    domain::{
        DetectionResult, DomainError, Layout, ProjectAnalysis, ProjectSignature, SIGNATURES,
        ServicePattern, Stack,
        entities::detection::project_name,
        insights, manifest,
        signatures::{self, find_signature, manifest_format},
    },
    error::DockgenResult,
};

/// Directory names that conventionally hold several services.
const SERVICE_DIRS: &[&str] = &["services", "apps"];

/// A directory whose files matched a signature's manifest markers.
#[derive(Debug, Clone)]
struct ManifestDir {
    dir: PathBuf,
    signature: &'static ProjectSignature,
    manifests: Vec<PathBuf>,
}

pub struct ProjectClassifier {
    filesystem: Arc<dyn Filesystem>,
    options: WalkOptions,
}

impl ProjectClassifier {
    pub fn new(filesystem: Arc<dyn Filesystem>, options: WalkOptions) -> Self {
        Self {
            filesystem,
            options,
        }
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Classify the project rooted at `root`.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn classify(&self, root: &Path) -> DockgenResult<ProjectAnalysis> {
        if !self.filesystem.is_dir(root) {
            return Err(DomainError::ProjectNotFound {
                path: root.to_path_buf(),
            }
            .into());
        }

        // `.` has no file name; the project is named after the resolved directory.
        let resolved = self
            .filesystem
            .canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf());
        let root = resolved.as_path();

        let files = self.filesystem.list_files(root, &self.options)?;
        debug!(files = files.len(), "Walked project tree");

        let by_dir = group_by_dir(&files);
        let matched = match_manifest_dirs(&by_dir);
        let top_level = top_level(matched);

        let (layout, groups) = if top_level.is_empty() {
            let stack = dominant_extension_stack(&files).ok_or_else(|| {
                DomainError::NoSignatureMatched {
                    path: root.to_path_buf(),
                }
            })?;
            info!(%stack, "No manifest found, stack inferred from source files");
            (Layout::Single, vec![(PathBuf::new(), stack, Vec::new())])
        } else {
            decide_layout(top_level)
        };

        let mut components = Vec::with_capacity(groups.len());
        for (dir, stack, manifest_dirs) in groups {
            let component = self.describe(root, &files, &dir, stack, &manifest_dirs);
            info!(
                component = %component.name,
                stack = %component.stack,
                manifests = component.manifests.len(),
                dependencies = component.dependencies.len(),
                "Component detected"
            );
            components.push(component);
        }

        let existing_dockerfiles: Vec<PathBuf> = files
            .iter()
            .filter(|f| f.file_name().is_some_and(|n| n == "Dockerfile"))
            .cloned()
            .collect();
        let service_patterns = service_patterns(&files, existing_dockerfiles.len());

        info!(%layout, components = components.len(), "Project classified");

        Ok(ProjectAnalysis {
            root: root.to_path_buf(),
            layout,
            components,
            existing_dockerfiles,
            service_patterns,
        })
    }

    // -------------------------------------------------------------------------
    // Component enrichment
    // -------------------------------------------------------------------------

    fn read(&self, root: &Path, rel: &Path) -> Option<String> {
        match self.filesystem.read_to_string(&root.join(rel)) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path = %rel.display(), error = %e, "Skipping unreadable file");
                None
            }
        }
    }

    fn describe(
        &self,
        root: &Path,
        files: &[PathBuf],
        dir: &Path,
        stack: Stack,
        manifest_dirs: &[ManifestDir],
    ) -> DetectionResult {
        let name = if dir.as_os_str().is_empty() {
            project_name(root)
        } else {
            component_name(dir)
        };
        let mut result = DetectionResult::new(dir, name, stack);

        // Manifests and dependencies.
        for md in manifest_dirs {
            for rel in &md.manifests {
                result.manifests.push(rel.clone());
                let Some(format) = rel
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| manifest_format(md.signature, n))
                else {
                    continue;
                };
                let Some(content) = self.read(root, rel) else {
                    continue;
                };
                match manifest::parse_dependencies(format, rel, &content) {
                    Ok(deps) => result.dependencies.extend(deps),
                    Err(e) => warn!(error = %e, "Ignoring malformed manifest"),
                }
                if format == signatures::ManifestFormat::PackageJson {
                    result.entry_points.extend(insights::node_entry_points(&content));
                }
            }
        }

        result.frameworks =
            signatures::frameworks_for(stack, result.dependency_names().into_iter());

        // Everything below only looks at files inside the component.
        let scoped: Vec<&PathBuf> = files.iter().filter(|f| f.starts_with(dir)).collect();
        let signature = find_signature(stack);
        let mut ports = Vec::new();

        for rel in &scoped {
            let Some(file_name) = rel.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if signature.is_some_and(|sig| insights::is_entry_file(sig, file_name)) {
                let shown = rel.strip_prefix(dir).unwrap_or(rel.as_path()).display().to_string();
                if !result.entry_points.contains(&shown) {
                    result.entry_points.push(shown);
                }
            }

            if insights::ENV_FILES.contains(&file_name) {
                if let Some(content) = self.read(root, rel) {
                    for var in insights::env_names(&content) {
                        if !result.env_vars.contains(&var) {
                            result.env_vars.push(var);
                        }
                    }
                    ports.extend(insights::env_port(&content));
                }
                continue;
            }

            if file_name == "Dockerfile" {
                if let Some(content) = self.read(root, rel) {
                    ports.extend(insights::exposed_ports(&content));
                }
                continue;
            }

            let scan = rel
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| insights::PORT_SCAN_EXTENSIONS.contains(&ext));
            if scan {
                if let Some(content) = self.read(root, rel) {
                    ports.extend(insights::source_ports(&content));
                }
            }
        }

        for fw in &result.frameworks {
            if let Some(port) = signatures::find_framework(*fw).and_then(|def| def.default_port) {
                ports.push(port);
            }
        }

        result.ports = insights::normalize_ports(ports);
        result
    }
}

// -----------------------------------------------------------------------------
// Pure helpers
// -----------------------------------------------------------------------------

/// Files grouped by their parent directory (root files under the empty path).
fn group_by_dir(files: &[PathBuf]) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
        by_dir.entry(parent).or_default().push(file.clone());
    }
    by_dir
}

/// For each directory, the first signature in table order with a manifest there.
fn match_manifest_dirs(by_dir: &BTreeMap<PathBuf, Vec<PathBuf>>) -> Vec<ManifestDir> {
    by_dir
        .iter()
        .filter_map(|(dir, files)| {
            SIGNATURES.iter().find_map(|sig| {
                let manifests: Vec<PathBuf> = files
                    .iter()
                    .filter(|f| {
                        f.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| manifest_format(sig, n).is_some())
                    })
                    .cloned()
                    .collect();
                (!manifests.is_empty()).then(|| ManifestDir {
                    dir: dir.clone(),
                    signature: sig,
                    manifests,
                })
            })
        })
        .collect()
}

/// Drop matches nested under another match. Input must be sorted by path.
fn top_level(matched: Vec<ManifestDir>) -> Vec<ManifestDir> {
    let mut kept: Vec<ManifestDir> = Vec::new();
    for candidate in matched {
        if !kept.iter().any(|k| candidate.dir.starts_with(&k.dir)) {
            kept.push(candidate);
        }
    }
    kept
}

type ComponentGroup = (PathBuf, Stack, Vec<ManifestDir>);

fn decide_layout(top_level: Vec<ManifestDir>) -> (Layout, Vec<ComponentGroup>) {
    let root_matched = top_level.iter().any(|m| m.dir.as_os_str().is_empty());
    let mut stacks: Vec<Stack> = top_level.iter().map(|m| m.signature.stack).collect();
    stacks.sort();
    stacks.dedup();

    if !root_matched && top_level.len() >= 2 && stacks.len() >= 2 {
        let groups = top_level
            .into_iter()
            .map(|m| (m.dir.clone(), m.signature.stack, vec![m]))
            .collect();
        return (Layout::Microservices, groups);
    }

    let stack = top_level[0].signature.stack;
    (Layout::Single, vec![(PathBuf::new(), stack, top_level)])
}

/// Stack with the most source files; ties go to the earlier signature.
fn dominant_extension_stack(files: &[PathBuf]) -> Option<Stack> {
    let mut counts: BTreeMap<Stack, usize> = BTreeMap::new();
    for ext in files.iter().filter_map(|f| f.extension().and_then(|e| e.to_str())) {
        if let Some(stack) = signatures::stack_for_extension(ext) {
            *counts.entry(stack).or_default() += 1;
        }
    }

    let mut best: Option<(Stack, usize)> = None;
    for sig in SIGNATURES {
        let count = counts.get(&sig.stack).copied().unwrap_or(0);
        if count > 0 && best.is_none_or(|(_, n)| count > n) {
            best = Some((sig.stack, count));
        }
    }
    best.map(|(stack, _)| stack)
}

fn component_name(dir: &Path) -> String {
    dir.components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("-")
}

fn service_patterns(files: &[PathBuf], dockerfiles: usize) -> Vec<ServicePattern> {
    let mut patterns = Vec::new();
    if dockerfiles > 1 {
        patterns.push(ServicePattern::MultipleDockerfiles);
    }
    let in_service_dir = files.iter().any(|f| {
        f.parent().is_some_and(|p| {
            p.components()
                .any(|c| c.as_os_str().to_str().is_some_and(|s| SERVICE_DIRS.contains(&s)))
        })
    });
    if in_service_dir {
        patterns.push(ServicePattern::ServiceDirectory);
    }
    patterns
}
