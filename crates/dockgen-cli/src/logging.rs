//! Tracing subscriber initialisation.
//!
//! Only the CLI crate is allowed to call [`init_logging`]; `dockgen-core`
//! and `dockgen-adapters` only *emit* spans and events.
//!
//! # Verbosity mapping
//!
//! | Flag(s)  | Console level | Log file level |
//! |----------|---------------|----------------|
//! | (none)   | WARN          | INFO           |
//! | `-v`     | INFO          | INFO           |
//! | `-vv`    | DEBUG         | DEBUG          |
//! | `-vvv`   | TRACE         | DEBUG          |
//! | `--quiet`| ERROR         | INFO           |
//!
//! `RUST_LOG` overrides the console level if set.

use std::io::IsTerminal as _;
use std::path::Path;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;
use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "dockgen";
const CRATES: &[&str] = &["dockgen", "dockgen_core", "dockgen_adapters"];

/// Initialise the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros fire. The returned
/// guard flushes the log file on drop and must live until the process exits.
/// A log directory that cannot be created only disables the file layer.
pub fn init_logging(
    args: &GlobalArgs,
    logging: &LoggingConfig,
    log_dir: &Path,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level = derive_level(args);

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));
    let use_ansi = !args.no_color && std::io::stderr().is_terminal();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file_layer, guard, file_error) = if logging.file {
        match file_appender(log_dir, logging.max_files) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer)
                    .with_filter(EnvFilter::new(directives(file_level(args))));
                (Some(layer), Some(guard), None)
            }
            Err(e) => (None, None, Some(e)),
        }
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    if let Some(e) = file_error {
        tracing::warn!(dir = %log_dir.display(), error = %e, "File logging disabled");
    }

    Ok(guard)
}

fn file_appender(dir: &Path, max_files: usize) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(max_files.max(1))
        .build(dir)?;
    Ok(appender)
}

fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Translate the verbosity counter + quiet flag to a level string.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn file_level(args: &GlobalArgs) -> &'static str {
    if args.verbose >= 2 { "debug" } else { "info" }
}
