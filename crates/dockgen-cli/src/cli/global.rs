//! Flags shared by the generate form and every subcommand.
//!
//! Flattened into [`super::Cli`]; `global = true` lets them follow a
//! subcommand as well (`dockgen detect . -vv`).

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Console log level; the log file keeps its own level from config.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "More console logging (-v info, -vv debug, -vvv trace)",
        long_help = "Raise the console log level on stderr:
    (none)  - warnings and errors
    -v      - detection, generation and validation steps
    -vv     - request plans, retries, rule details
    -vvv    - everything, including walked files
The rolling log file is controlled by [logging] in the config file."
    )]
    pub verbose: u8,

    /// Only errors reach the terminal.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Only print errors",
        long_help = "Only print errors. Also hides the generation spinner and status \
                     lines; error-level findings and the exit code still report failure."
    )]
    pub quiet: bool,

    /// Plain, uncoloured status lines and error reports.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Disable colored output (also via NO_COLOR)",
        long_help = "Disable ANSI colours on stdout and stderr, including error reports. \
                     Set NO_COLOR or output.no_color = true in the config file for the \
                     same effect."
    )]
    pub no_color: bool,

    /// Config file replacing `~/.config/dockgen/config.toml`.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Use this config file instead of the default location",
        long_help = "Use this config file instead of the default location \
                     (`dockgen config path` prints it). The file must exist, except \
                     for `dockgen config init`, which creates it. DOCKGEN_* environment \
                     variables still override its values."
    )]
    pub config: Option<PathBuf>,

    /// How results are printed on stdout.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Result format on stdout",
        long_help = "Result format on stdout. `auto` uses output.format from the config \
                     file when set, otherwise `human` on a terminal and `plain` when piped."
    )]
    pub output_format: OutputFormat,
}

/// Rendering of detection results, reports and status lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Config `output.format`, else human on a TTY and plain when piped.
    #[default]
    Auto,
    /// Coloured symbols and a spinner during generation.
    Human,
    /// Same lines without colour or spinner.
    Plain,
    /// One JSON document per command.
    Json,
}
