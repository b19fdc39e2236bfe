//! `dockgen config`: inspect and initialise configuration.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
///
/// `config_file` is the `--config` path, which replaces the default location.
pub fn execute(
    cmd: ConfigCommands,
    config: AppConfig,
    config_file: Option<PathBuf>,
    output: OutputManager,
) -> CliResult<()> {
    let path = config_file.unwrap_or_else(AppConfig::config_path);

    match cmd {
        ConfigCommands::Show => {
            if output.is_json() {
                output.json(&config)?;
            } else {
                output.raw(&render(&config)?)?;
            }
        }

        ConfigCommands::Path => {
            output.raw(&format!("{}\n", path.display()))?;
        }

        ConfigCommands::Init { force } => {
            init(&path, force)?;
            info!(path = %path.display(), "Configuration file written");
            output.success(&format!("Wrote {}", path.display()))?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn render(config: &AppConfig) -> CliResult<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })
}

fn init(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("creating {}", parent.display()))?;
    }
    let body = render(&AppConfig::default())?;
    std::fs::write(path, body).with_cli_context(|| format!("writing {}", path.display()))
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_defaults_have_every_section() {
        let text = render(&AppConfig::default()).unwrap();
        for section in ["[generation]", "[retry]", "[detection]", "[validation]", "[logging]", "[output]"] {
            assert!(text.contains(section), "missing {section}");
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("conf/config.toml");

        init(&path, false).unwrap();
        assert!(matches!(init(&path, false), Err(CliError::ConfigExists { .. })));
        init(&path, true).unwrap();

        let reloaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(reloaded, AppConfig::default());
    }
}
