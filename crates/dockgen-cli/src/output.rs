//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use dockgen_core::domain::{ProjectAnalysis, RuleStatus, Severity, ValidationReport};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Flag beats config; Auto resolves to Human (TTY) or Plain (piped).
        let requested = if args.output_format == OutputFormat::Auto {
            parse_format(&config.output.format)
        } else {
            args.output_format
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Raw text that is the command's result (artifact bodies); never suppressed.
    pub fn raw(&self, text: &str) -> io::Result<()> {
        self.term.write_str(text)
    }

    /// Pretty JSON document; never suppressed.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        self.term.write_line(&text)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Error indicator: `✗ <msg>`.  *Not* suppressed in quiet mode; errors
    /// must always be visible.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("\u{2717} {msg}") // ✗
        } else {
            format!("{} {}", "\u{2717}".red().bold(), msg.red())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    // ── Domain renderers ──────────────────────────────────────────────────

    /// Human summary of a classification.
    pub fn analysis(&self, analysis: &ProjectAnalysis) -> io::Result<()> {
        self.header(&format!(
            "{} ({} layout, {} component(s))",
            analysis.project_name(),
            analysis.layout,
            analysis.components.len()
        ))?;
        for c in &analysis.components {
            let location = if c.is_root() {
                ".".to_owned()
            } else {
                c.path.display().to_string()
            };
            self.info(&format!("{} [{}] {}", c.name, location, c.stack))?;
            if !c.frameworks.is_empty() {
                self.print(&format!("    frameworks:   {}", join(&c.frameworks)))?;
            }
            if !c.entry_points.is_empty() {
                self.print(&format!("    entry points: {}", c.entry_points.join(", ")))?;
            }
            if !c.ports.is_empty() {
                self.print(&format!("    ports:        {}", join(&c.ports)))?;
            }
            if !c.env_vars.is_empty() {
                self.print(&format!("    env vars:     {}", c.env_vars.join(", ")))?;
            }
            self.print(&format!("    dependencies: {}", c.dependencies.len()))?;
        }
        if !analysis.existing_dockerfiles.is_empty() {
            self.warning(&format!(
                "{} Dockerfile(s) already present",
                analysis.existing_dockerfiles.len()
            ))?;
        }
        Ok(())
    }

    /// One line per rule, then a pass count.
    pub fn report(&self, report: &ValidationReport) -> io::Result<()> {
        self.header(&format!("Checklist for {}", report.subject))?;
        for outcome in &report.outcomes {
            let line = format!("{:<32} {}", outcome.rule_id, outcome.message);
            match (outcome.status, outcome.severity) {
                (RuleStatus::Pass, _) => self.success(&line)?,
                (RuleStatus::Skip, _) => self.print(&format!("- {line}"))?,
                (RuleStatus::Fail, Severity::Error) => self.error(&line)?,
                (RuleStatus::Fail, _) => self.warning(&line)?,
            }
        }
        self.print(&format!(
            "{}/{} checks passed",
            report.passed_count(),
            report.len()
        ))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` if quiet mode suppresses most output.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }

    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

fn parse_format(value: &str) -> OutputFormat {
    match value.to_ascii_lowercase().as_str() {
        "human" => OutputFormat::Human,
        "plain" => OutputFormat::Plain,
        "json" => OutputFormat::Json,
        _ => OutputFormat::Auto,
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── tests ─────────────────────────────────────────────────────────────────────
