//! Error types for `swipesim`
//!
//! The cycle controller itself is infallible; everything here covers the
//! process around it: binding the page server, driving a simulation from
//! the terminal, and writing exports or event logs.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `swipesim` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// I/O error (export target exists, events file not writable)
    pub const IO_ERROR: i32 = 3;

    /// Delivery error (invalid bind address, bind failed)
    pub const DELIVERY_ERROR: i32 = 4;

    /// Simulation error (invalid timing, controller task gone)
    pub const SIMULATE_ERROR: i32 = 5;

    /// Usage error (invalid arguments)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `swipesim` operations.
#[derive(Debug, Error)]
pub enum SwipeSimError {
    /// Page delivery error
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Terminal simulation error
    #[error(transparent)]
    Simulate(#[from] SimulateError),

    /// Page export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Metrics recorder could not be installed
    #[error("metrics error: {0}")]
    Metrics(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwipeSimError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Delivery(_) => ExitCode::DELIVERY_ERROR,
            Self::Simulate(_) => ExitCode::SIMULATE_ERROR,
            Self::Metrics(_) => ExitCode::ERROR,
            Self::Export(_) | Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Delivery Errors
// ============================================================================

/// Errors raised while standing up the page server.
///
/// Request handling itself never fails: unmatched paths are answered by the
/// router's default not-found response.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The `--bind` value is not a usable socket address
    #[error("invalid bind address \"{input}\": {reason}")]
    InvalidBindAddr {
        /// Raw value supplied on the command line
        input: String,
        /// Parser message
        reason: String,
    },

    /// The TCP listener could not be bound
    #[error("bind failed on {addr}: {source}")]
    Bind {
        /// Address we tried to bind
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// The server loop terminated with an I/O error
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ============================================================================
// Simulation Errors
// ============================================================================

/// Errors raised while driving a cycle from the terminal.
#[derive(Debug, Error)]
pub enum SimulateError {
    /// A phase duration was zero
    #[error("invalid {phase} duration {duration:?}: must be greater than zero")]
    InvalidTiming {
        /// Which phase the duration belongs to
        phase: &'static str,
        /// The rejected duration
        duration: Duration,
    },

    /// A line read from stdin did not name a known input
    #[error("unknown input \"{0}\" (expected press, stop, hide, show, quit or a single key)")]
    UnknownInput(String),

    /// The controller task exited while inputs were still being sent
    #[error("cycle controller is no longer running")]
    ControllerGone,
}

// ============================================================================
// Export Errors
// ============================================================================

/// Errors raised by the `export` command.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Target already exists and `--force` was not given
    #[error("refusing to overwrite {} (use --force)", path.display())]
    Exists {
        /// Existing file
        path: PathBuf,
    },
}

// ============================================================================
// Tests
// ============================================================================
