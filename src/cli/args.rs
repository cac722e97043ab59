//! CLI argument definitions
//!
//! All Clap derive structs for `swipesim` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::asset::DOWNLOAD_FILE_NAME;
use crate::delivery::DEFAULT_BIND_ADDR;
use crate::error::ExitCode;

// ============================================================================
// Root CLI
// ============================================================================

/// Swipe simulator page server and headless cycle driver.
#[derive(Parser, Debug)]
#[command(name = "swipesim", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SWIPESIM_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true, env = "SWIPESIM_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Exit code for a failed parse.
    ///
    /// `--help` and `--version` surface as parse errors but are successful
    /// runs; everything else is a usage error.
    #[must_use]
    pub fn parse_exit_code(err: &clap::Error) -> i32 {
        if err.use_stderr() {
            ExitCode::USAGE_ERROR
        } else {
            ExitCode::SUCCESS
        }
    }
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the swipe simulator page and its download.
    Serve(ServeArgs),

    /// Drive the swipe cycle from the terminal.
    Simulate(SimulateArgs),

    /// Write the page to a local file.
    Export(ExportArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind on `[host:]port`.
    #[arg(short, long, default_value = DEFAULT_BIND_ADDR, env = "SWIPESIM_BIND")]
    pub bind: String,

    /// Expose Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "SWIPESIM_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Write JSONL events to this file.
    #[arg(long, env = "SWIPESIM_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Forward phase duration (e.g. `2500ms`, `2.5s`).
    #[arg(long, default_value = "2500ms", value_parser = humantime::parse_duration)]
    pub forward: Duration,

    /// Lateral phase duration.
    #[arg(long, default_value = "500ms", value_parser = humantime::parse_duration)]
    pub lateral: Duration,

    /// Press the swipe area immediately instead of waiting for input.
    #[arg(long)]
    pub auto_start: bool,

    /// Exit after this long (otherwise run until `quit`, EOF or Ctrl+C).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Status line format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write JSONL events to this file.
    #[arg(long, env = "SWIPESIM_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Expose Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "SWIPESIM_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file.
    #[arg(default_value = DOWNLOAD_FILE_NAME)]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Output format for command output on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
