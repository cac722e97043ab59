//! Logging initialization for `swipesim`.
//!
//! Structured logging via `tracing` with human-readable and JSON output
//! formats, configurable verbosity, and environment-based override via
//! `SWIPESIM_LOG_LEVEL`. Logs always go to stderr so stdout stays free for
//! status lines and exports.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, ColorChoice, LogFormat};

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "SWIPESIM_LOG_LEVEL";

/// HTTP stack crates held at `info` once verbosity reaches `debug`, so
/// connection chatter does not bury controller transitions.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "tower_http"];

/// Logging options taken from the global CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSettings {
    /// Line format.
    pub format: LogFormat,
    /// `-v` count.
    pub verbosity: u8,
    /// `-q`: nothing is logged, regardless of `SWIPESIM_LOG_LEVEL`.
    pub quiet: bool,
    /// ANSI color choice.
    pub color: ColorChoice,
}

impl LogSettings {
    /// Settings for a parsed command line.
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.log_format,
            verbosity: cli.verbose,
            quiet: cli.quiet,
            color: cli.color,
        }
    }

    /// Filter directive used when `SWIPESIM_LOG_LEVEL` is unset.
    ///
    /// - quiet → `"off"`
    /// - 0 → `"warn"`, 1 → `"info"`
    /// - 2 → `"debug"`, 3+ → `"trace"`, both with the HTTP stack at `info`
    #[must_use]
    pub fn default_directive(&self) -> String {
        if self.quiet {
            return "off".to_string();
        }
        let level = match self.verbosity {
            0 => return "warn".to_string(),
            1 => return "info".to_string(),
            2 => "debug",
            _ => "trace",
        };
        QUIET_DEPENDENCIES
            .iter()
            .fold(level.to_string(), |acc, krate| format!("{acc},{krate}=info"))
    }

    /// Whether to emit ANSI escapes, given whether stderr is a terminal and
    /// whether `NO_COLOR` is set.
    #[must_use]
    pub const fn use_ansi(&self, stderr_is_terminal: bool, no_color: bool) -> bool {
        match self.color {
            ColorChoice::Auto => stderr_is_terminal && !no_color,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }

    fn filter(&self) -> EnvFilter {
        if self.quiet {
            return EnvFilter::new("off");
        }
        EnvFilter::try_from_env(LOG_LEVEL_ENV)
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Initializes the global tracing subscriber.
///
/// Uses `try_init()` so calling this more than once (e.g. in tests) is safe.
pub fn init_logging(settings: &LogSettings) {
    let filter = settings.filter();
    let show_target = settings.verbosity >= 2;

    match settings.format {
        LogFormat::Human => {
            let use_ansi = settings.use_ansi(
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            );
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
