//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.
//!
//! The generate form takes the project directory directly
//! (`dockgen ./my-app`); the remaining tools are subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "dockgen",
    bin_name = "dockgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f433} Draft a Dockerfile and compose file for any project",
    long_about = "dockgen detects a project's technology stack, asks a text generation \
                  service for a Dockerfile and docker-compose.yml, checks them against a \
                  best-practice checklist and writes them next to your code.",
    after_help = "EXAMPLES:\n\
        \x20 dockgen ./my-app\n\
        \x20 dockgen ./monorepo --output ./docker --readme\n\
        \x20 dockgen detect ./my-app\n\
        \x20 dockgen validate ./Dockerfile --compose ./docker-compose.yml\n\
        \x20 dockgen completions bash > /usr/share/bash-completion/completions/dockgen",
    arg_required_else_help = true,
    args_conflicts_with_subcommands = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Arguments of the default (generate) action.
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Subcommand to execute instead of generating.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify a project without calling the generation service.
    #[command(
        about = "Detect stack, frameworks and ports",
        after_help = "EXAMPLES:\n\
            \x20 dockgen detect .\n\
            \x20 dockgen detect ./services --output-format json"
    )]
    Detect(DetectArgs),

    /// Check an existing Dockerfile against the checklist.
    #[command(
        about = "Validate a Dockerfile (and compose file)",
        after_help = "EXAMPLES:\n\
            \x20 dockgen validate Dockerfile\n\
            \x20 dockgen validate Dockerfile --compose docker-compose.yml"
    )]
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 dockgen completions bash > ~/.local/share/bash-completion/completions/dockgen\n\
            \x20 dockgen completions zsh  > ~/.zfunc/_dockgen\n\
            \x20 dockgen completions fish > ~/.config/fish/completions/dockgen.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect or initialise the configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 dockgen config show\n\
            \x20 dockgen config path\n\
            \x20 dockgen config init"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for the default `dockgen <PROJECT_DIR>` form.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Root of the project to containerise.
    #[arg(value_name = "PROJECT_DIR", help = "Project directory to containerise")]
    pub project_dir: Option<PathBuf>,

    /// Where the artifacts are written, relative to the working directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = ".",
        help = "Output directory"
    )]
    pub output: PathBuf,

    /// Overwrite existing artifacts.
    #[arg(short = 'f', long = "force", help = "Overwrite existing files")]
    pub force: bool,

    /// Also generate `dockerreadme.md`.
    #[arg(long = "readme", help = "Also generate dockerreadme.md")]
    pub readme: bool,

    /// Print the artifacts instead of writing them.
    #[arg(long = "dry-run", help = "Generate and validate, but write nothing")]
    pub dry_run: bool,
}

// ── detect ────────────────────────────────────────────────────────────────────

/// Arguments for `dockgen detect`.
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Project directory.
    #[arg(value_name = "PROJECT_DIR", default_value = ".", help = "Project directory")]
    pub project_dir: PathBuf,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `dockgen validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Dockerfile to check.
    #[arg(value_name = "DOCKERFILE", help = "Dockerfile to check")]
    pub dockerfile: PathBuf,

    /// Compose file checked alongside the Dockerfile.
    #[arg(
        long = "compose",
        value_name = "FILE",
        help = "Compose file to check as well"
    )]
    pub compose: Option<PathBuf>,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `dockgen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `dockgen config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML.
    Show,
    /// Print the path of the configuration file.
    Path,
    /// Write a configuration file with the built-in defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────
