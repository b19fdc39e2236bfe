//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the values derived from
//! it (walk options, retry policy, validator, client settings).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `DOCKGEN_` prefix, `__` between nested keys,
//!    e.g. `DOCKGEN_RETRY__MAX_RETRIES=1`
//! 3. Config file (`--config`, else the platform config dir if present)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use dockgen_adapters::OpenAiSettings;
use dockgen_core::{
    application::{RetryPolicy, WalkOptions},
    domain::{ArtifactValidator, DEFAULT_IGNORE_DIRS, DEFAULT_MAX_DEPTH, DomainError},
};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation API settings.
    pub generation: GenerationConfig,
    /// Backoff for rate limits and timeouts.
    pub retry: RetryConfig,
    /// Project tree walk.
    pub detection: DetectionConfig,
    /// Checklist rules.
    pub validation: ValidationConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub max_depth: usize,
    pub ignore_dirs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub disabled_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a rotating log file next to console output.
    pub file: bool,
    /// Log directory; the platform cache dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    pub max_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig {
                base_url: "https://api.openai.com/v1".into(),
                model: "gpt-4".into(),
                max_tokens: 2000,
                temperature: 0.2,
                timeout_secs: 120,
                api_key_env: "OPENAI_API_KEY".into(),
            },
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 1000,
                max_backoff_ms: 30_000,
            },
            detection: DetectionConfig {
                max_depth: DEFAULT_MAX_DEPTH,
                ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| (*d).to_owned()).collect(),
            },
            validation: ValidationConfig {
                disabled_rules: Vec::new(),
            },
            logging: LoggingConfig {
                file: true,
                directory: None,
                max_files: 5,
            },
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then `DOCKGEN_*`.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to serialise default config")?;

        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::config_path()).required(false),
        };

        Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix("DOCKGEN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("detection.ignore_dirs")
                    .with_list_parse_key("validation.disabled_rules"),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.dockgen.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "dockgen", "dockgen")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".dockgen.toml"))
    }

    /// Default log directory: the platform cache dir, else `./logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.logging.directory.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("dev", "dockgen", "dockgen")
                .map(|d| d.cache_dir().join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }

    // ── Bridges into core / adapters ──────────────────────────────────────

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_depth: self.detection.max_depth,
            ignore_dirs: self.detection.ignore_dirs.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
        }
    }

    /// Validator with `validation.disabled_rules` removed.
    pub fn validator(&self) -> Result<ArtifactValidator, DomainError> {
        ArtifactValidator::without(&self.validation.disabled_rules)
    }

    pub fn openai_settings(&self, api_key: String) -> OpenAiSettings {
        OpenAiSettings {
            base_url: self.generation.base_url.clone(),
            model: self.generation.model.clone(),
            api_key,
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
            timeout: Duration::from_secs(self.generation.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_match_documentation() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.generation.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.retry.max_retries, 3);
        assert_eq!(cfg.detection.max_depth, 4);
        assert!(cfg.logging.file);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[retry]\nmax_retries = 1\n\n[validation]\ndisabled_rules = [\"dockerfile.multi-stage\"]"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.retry.max_retries, 1);
        assert_eq!(cfg.retry.initial_backoff_ms, 1000);
        assert_eq!(cfg.validator().unwrap().rule_count(), 12);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }

    #[test]
    fn unknown_disabled_rule_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.validation.disabled_rules = vec!["no-such-rule".into()];
        assert!(cfg.validator().is_err());
    }

    #[test]
    fn retry_policy_from_millis() {
        let policy = AppConfig::default().retry_policy();
        assert_eq!(policy.initial_backoff, Duration::from_millis(1000));
        assert_eq!(policy.max_backoff, Duration::from_secs(30));
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
