//! `dockgen detect`: classify a project without generating anything.

use std::sync::Arc;

use tracing::{info, instrument};

use dockgen_adapters::LocalFilesystem;
use dockgen_core::application::ProjectClassifier;

use crate::{cli::DetectArgs, config::AppConfig, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(project = %args.project_dir.display()))]
pub fn execute(args: DetectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let classifier = ProjectClassifier::new(Arc::new(LocalFilesystem::new()), config.walk_options());
    let analysis = classifier.classify(&args.project_dir)?;

    info!(
        layout = %analysis.layout,
        components = analysis.components.len(),
        "Detection finished"
    );

    if output.is_json() {
        output.json(&analysis)?;
    } else {
        output.analysis(&analysis)?;
    }
    Ok(())
}
