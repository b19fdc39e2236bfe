//! `dockgen <PROJECT_DIR>`: detect, generate, validate and write.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use dockgen_adapters::{LocalFilesystem, OpenAiClient};
use dockgen_core::{
    application::{
        DockerizeOutcome, DockerizeRequest, DockerizeService, GenerationService,
        ProjectClassifier, ports::Filesystem,
    },
    domain::Severity,
};

use crate::{
    cli::{GenerateArgs, GlobalArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    progress::SpinnerClient,
};

pub fn execute(
    args: GenerateArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let project_dir = args.project_dir.clone().ok_or_else(|| CliError::InvalidInput {
        message: "no project directory given".into(),
        source: None,
    })?;

    let run_id = Uuid::new_v4();
    let _span = info_span!("generate", %run_id, project = %project_dir.display()).entered();
    let started = Utc::now();

    // Checked before detection so a missing key never costs a tree walk.
    let api_key = api_key(&config.generation.api_key_env)?;
    let validator = config.validator().map_err(|e| CliError::ConfigError {
        message: e.to_string(),
        source: Some(Box::new(e)),
    })?;

    let client = OpenAiClient::new(config.openai_settings(api_key))?;
    let show_spinner = output.format() == OutputFormat::Human && !global.quiet;
    let client = Arc::new(SpinnerClient::new(Arc::new(client), show_spinner));

    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let service = DockerizeService::new(
        ProjectClassifier::new(Arc::clone(&filesystem), config.walk_options()),
        GenerationService::new(client, config.retry_policy()),
        validator,
        filesystem,
    );

    let mut request = DockerizeRequest::new(&project_dir, &args.output);
    request.force = args.force;
    request.dry_run = args.dry_run;
    request.readme = args.readme;
    debug!(?request, "Starting run");

    let outcome = service.run(&request)?;

    info!(
        artifacts = outcome.artifacts.len(),
        written = outcome.written.len(),
        failures = outcome.failure_count(),
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "Run finished"
    );

    render(&outcome, args.dry_run, &output)
}

/// Read the API key from `var`; unset and empty are the same failure.
fn api_key(var: &str) -> CliResult<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(CliError::MissingApiKey {
            var: var.to_owned(),
        }),
    }
}

fn render(outcome: &DockerizeOutcome, dry_run: bool, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(outcome)?;
        return Ok(());
    }

    output.analysis(&outcome.analysis)?;
    for report in &outcome.reports {
        output.print("")?;
        output.report(report)?;
    }
    output.print("")?;

    if dry_run {
        for artifact in outcome.artifacts.iter() {
            output.header(&format!("# {}", artifact.path.display()))?;
            output.raw(&artifact.content)?;
            if !artifact.content.ends_with('\n') {
                output.raw("\n")?;
            }
        }
        output.info("Dry run: nothing was written")?;
    } else {
        for path in &outcome.written {
            output.success(&format!("Wrote {}", path.display()))?;
        }
    }

    let worst = outcome.reports.iter().filter_map(|r| r.worst_failure()).max();
    match worst {
        None => output.success("All checks passed")?,
        Some(Severity::Error) => output.error(&format!(
            "{} check(s) failed; review the findings above",
            outcome.failure_count()
        ))?,
        Some(_) => output.warning(&format!(
            "{} check(s) failed; review the findings above",
            outcome.failure_count()
        ))?,
    }
    Ok(())
}
