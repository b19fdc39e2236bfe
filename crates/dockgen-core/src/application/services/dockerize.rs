//! Dockerize Service - main application orchestrator.
//!
//! This service coordinates the entire workflow:
//! 1. Classify the project
//! 2. Plan output paths and refuse to overwrite unless forced
//! 3. Generate every artifact (nothing is written if one fails)
//! 4. Validate each Dockerfile together with the compose file
//! 5. Stage every file, then move them all into place

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::Filesystem,
        services::{ProjectClassifier, generation::GenerationService},
    },
    domain::{
        ArtifactKind, ArtifactSet, ArtifactValidator, GenerationRequest, Layout, PlannedArtifact,
        ProjectAnalysis, ValidationReport, prompt,
    },
    error::{DockgenError, DockgenResult},
};

/// Input of one dockerize run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerizeRequest {
    pub project_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Overwrite existing output files.
    pub force: bool,
    /// Generate and validate, but write nothing.
    pub dry_run: bool,
    /// Also generate `dockerreadme.md`.
    pub readme: bool,
}

impl DockerizeRequest {
    pub fn new(project_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            output_dir: output_dir.into(),
            force: false,
            dry_run: false,
            readme: false,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct DockerizeOutcome {
    pub analysis: ProjectAnalysis,
    pub artifacts: ArtifactSet,
    pub reports: Vec<ValidationReport>,
    /// Files actually written; empty on a dry run.
    pub written: Vec<PathBuf>,
}

impl DockerizeOutcome {
    /// Total failed rules across all reports.
    pub fn failure_count(&self) -> usize {
        self.reports.iter().map(|r| r.failures().count()).sum()
    }
}

pub struct DockerizeService {
    classifier: ProjectClassifier,
    generator: GenerationService,
    validator: ArtifactValidator,
    filesystem: Arc<dyn Filesystem>,
}

impl DockerizeService {
    pub fn new(
        classifier: ProjectClassifier,
        generator: GenerationService,
        validator: ArtifactValidator,
        filesystem: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            classifier,
            generator,
            validator,
            filesystem,
        }
    }

    /// Run the whole pipeline for one project.
    #[instrument(
        skip_all,
        fields(
            project = %request.project_dir.display(),
            output = %request.output_dir.display(),
            force = request.force,
            dry_run = request.dry_run
        )
    )]
    pub fn run(&self, request: &DockerizeRequest) -> DockgenResult<DockerizeOutcome> {
        if self.filesystem.exists(&request.output_dir) && !self.filesystem.is_dir(&request.output_dir)
        {
            return Err(ApplicationError::InvalidRequest(format!(
                "output path {} is a file, not a directory",
                request.output_dir.display()
            ))
            .into());
        }

        // 1. Classify
        let analysis = self.classifier.classify(&request.project_dir)?;

        // 2. Plan and check for conflicts before spending any API calls
        let plan = plan(&analysis, request.readme);
        if !request.force {
            self.ensure_no_conflicts(&request.output_dir, &plan)?;
        }

        // 3. Generate
        let mut artifacts = ArtifactSet::new(&request.output_dir);
        for (planned, generation) in plan {
            let content = self.generator.generate(&generation)?;
            artifacts.push(planned.fill(content));
        }
        artifacts.validate().map_err(DockgenError::Domain)?;
        info!(artifacts = artifacts.len(), "All artifacts generated");

        // 4. Validate
        let reports = self.validate(&artifacts);

        // 5. Write
        let written = if request.dry_run {
            info!("Dry run, nothing written");
            Vec::new()
        } else {
            if !request.force {
                let planned: Vec<PathBuf> = artifacts.target_paths();
                self.ensure_paths_free(&planned)?;
            }
            self.write_artifacts(&artifacts)?
        };

        Ok(DockerizeOutcome {
            analysis,
            artifacts,
            reports,
            written,
        })
    }

    /// Validate every generated Dockerfile against the compose text.
    pub fn validate(&self, artifacts: &ArtifactSet) -> Vec<ValidationReport> {
        let compose = artifacts.compose().map(|a| a.content.as_str());

        artifacts
            .of_kind(ArtifactKind::Dockerfile)
            .map(|dockerfile| {
                let subject = dockerfile.path.display().to_string();
                let report = self.validator.validate(&subject, &dockerfile.content, compose);
                for failure in report.failures() {
                    warn!(
                        subject = %subject,
                        rule = failure.rule_id,
                        severity = %failure.severity,
                        "{}",
                        failure.message
                    );
                }
                info!(
                    subject = %subject,
                    passed = report.passed_count(),
                    total = report.len(),
                    "Validation finished"
                );
                report
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn ensure_no_conflicts(
        &self,
        output_dir: &Path,
        plan: &[(PlannedArtifact, GenerationRequest)],
    ) -> DockgenResult<()> {
        let targets: Vec<PathBuf> = plan.iter().map(|(p, _)| output_dir.join(&p.path)).collect();
        self.ensure_paths_free(&targets)
    }

    fn ensure_paths_free(&self, targets: &[PathBuf]) -> DockgenResult<()> {
        let existing: Vec<PathBuf> = targets
            .iter()
            .filter(|p| self.filesystem.exists(p))
            .cloned()
            .collect();

        if existing.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::OutputConflict { paths: existing }.into())
        }
    }

    /// Write all artifacts or none of them.
    ///
    /// Every artifact is staged next to its target first. Targets are only
    /// replaced once all staging writes succeeded; replaced files are kept as
    /// backups until the last move lands.
    fn write_artifacts(&self, artifacts: &ArtifactSet) -> DockgenResult<Vec<PathBuf>> {
        let targets = artifacts.target_paths();
        let mut staged: Vec<PathBuf> = Vec::new();

        for (artifact, target) in artifacts.iter().zip(&targets) {
            let staging = sibling(target, STAGED_SUFFIX);
            let result = target
                .parent()
                .map_or(Ok(()), |parent| self.filesystem.create_dir_all(parent))
                .and_then(|()| self.filesystem.write_file(&staging, &artifact.content));

            if let Err(e) = result {
                warn!(path = %target.display(), "Staging failed, no target touched");
                self.discard(&staged);
                return Err(e);
            }
            staged.push(staging);
        }

        let mut committed: Vec<PathBuf> = Vec::new();
        let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();

        for ((artifact, staging), target) in artifacts.iter().zip(&staged).zip(&targets) {
            if let Err(e) = self.commit(staging, target, &mut backups) {
                warn!(path = %target.display(), "Replace failed, restoring previous files");
                self.restore(&committed, &backups);
                self.discard(&staged[committed.len()..]);
                return Err(e);
            }
            info!(path = %target.display(), kind = artifact.kind.as_str(), "Wrote artifact");
            committed.push(target.clone());
        }

        let leftovers: Vec<PathBuf> = backups.into_iter().map(|(backup, _)| backup).collect();
        self.discard(&leftovers);
        Ok(committed)
    }

    /// Move one staged file into place, parking an existing target first.
    fn commit(
        &self,
        staging: &Path,
        target: &Path,
        backups: &mut Vec<(PathBuf, PathBuf)>,
    ) -> DockgenResult<()> {
        if self.filesystem.exists(target) {
            let backup = sibling(target, BACKUP_SUFFIX);
            self.filesystem.rename(target, &backup)?;
            backups.push((backup, target.to_path_buf()));
        }
        self.filesystem.rename(staging, target)
    }

    /// Best-effort undo of a partial commit.
    fn restore(&self, committed: &[PathBuf], backups: &[(PathBuf, PathBuf)]) {
        for path in committed {
            if let Err(e) = self.filesystem.remove_file(path) {
                warn!(error = %e, path = %path.display(), "Rollback failed");
            }
        }
        for (backup, target) in backups {
            if let Err(e) = self.filesystem.rename(backup, target) {
                warn!(error = %e, path = %target.display(), "Restoring previous file failed");
            }
        }
    }

    /// Best-effort removal of scratch files.
    fn discard(&self, paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = self.filesystem.remove_file(path) {
                warn!(error = %e, path = %path.display(), "Cleanup failed");
            }
        }
    }
}

const STAGED_SUFFIX: &str = "dockgen-staged";
const BACKUP_SUFFIX: &str = "dockgen-backup";

/// Hidden file next to `target`, e.g. `.Dockerfile.dockgen-staged`.
fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{suffix}"))
}

/// Decide output paths and build the prompt for each artifact.
fn plan(analysis: &ProjectAnalysis, readme: bool) -> Vec<(PlannedArtifact, GenerationRequest)> {
    let mut plan = Vec::new();

    for component in &analysis.components {
        let path = match analysis.layout {
            Layout::Single => PathBuf::from(ArtifactKind::Dockerfile.file_name()),
            Layout::Microservices => component.path.join(ArtifactKind::Dockerfile.file_name()),
        };
        plan.push((
            PlannedArtifact::new(ArtifactKind::Dockerfile, path, Some(component.name.clone())),
            prompt::dockerfile_request(component),
        ));
    }

    plan.push((
        PlannedArtifact::new(ArtifactKind::Compose, ArtifactKind::Compose.file_name(), None),
        prompt::compose_request(analysis),
    ));

    if readme {
        plan.push((
            PlannedArtifact::new(ArtifactKind::Readme, ArtifactKind::Readme.file_name(), None),
            prompt::readme_request(analysis),
        ));
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DetectionResult, Stack};

    fn analysis(layout: Layout, components: Vec<DetectionResult>) -> ProjectAnalysis {
        ProjectAnalysis {
            root: PathBuf::from("/work/shop"),
            layout,
            components,
            existing_dockerfiles: Vec::new(),
            service_patterns: Vec::new(),
        }
    }

    #[test]
    fn single_layout_plan() {
        let a = analysis(
            Layout::Single,
            vec![DetectionResult::new("", "shop", Stack::Node)],
        );
        let paths: Vec<_> = plan(&a, false).into_iter().map(|(p, _)| p.path).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("Dockerfile"), PathBuf::from("docker-compose.yml")]
        );
    }

    #[test]
    fn microservices_plan_with_readme() {
        let a = analysis(
            Layout::Microservices,
            vec![
                DetectionResult::new("api", "api", Stack::Node),
                DetectionResult::new("worker", "worker", Stack::Go),
            ],
        );
        let planned = plan(&a, true);
        let paths: Vec<_> = planned.iter().map(|(p, _)| p.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("api/Dockerfile"),
                PathBuf::from("worker/Dockerfile"),
                PathBuf::from("docker-compose.yml"),
                PathBuf::from("dockerreadme.md"),
            ]
        );
        assert_eq!(planned[1].1.component.as_deref(), Some("worker"));
        assert_eq!(planned[3].1.artifact, ArtifactKind::Readme);
    }

    #[test]
    fn scratch_files_are_hidden_siblings() {
        assert_eq!(
            sibling(Path::new("/out/api/Dockerfile"), STAGED_SUFFIX),
            PathBuf::from("/out/api/.Dockerfile.dockgen-staged")
        );
    }
}
