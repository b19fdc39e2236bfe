//! `dockgen validate`: run the checklist over files already on disk.
//!
//! Failed rules are findings, not errors: the command exits 0 as long as
//! the files could be read.

use tracing::{info, instrument};

use crate::{
    cli::ValidateArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(dockerfile = %args.dockerfile.display()))]
pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let validator = config.validator().map_err(|e| CliError::ConfigError {
        message: e.to_string(),
        source: Some(Box::new(e)),
    })?;

    let dockerfile = std::fs::read_to_string(&args.dockerfile)
        .with_cli_context(|| format!("reading {}", args.dockerfile.display()))?;
    let compose = args
        .compose
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path).with_cli_context(|| format!("reading {}", path.display()))
        })
        .transpose()?;

    let subject = args.dockerfile.display().to_string();
    let report = validator.validate(&subject, &dockerfile, compose.as_deref());
    info!(
        passed = report.passed_count(),
        failed = report.failures().count(),
        "Validation finished"
    );

    if output.is_json() {
        output.json(&report)?;
    } else {
        output.report(&report)?;
    }
    Ok(())
}
