//! Cycle state representation
//!
//! Plain value types owned by a single [`CycleController`]. Nothing here is
//! shared between controllers, so independent instances never interfere.
//!
//! [`CycleController`]: super::CycleController

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Whether the swipe loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No loop is advancing.
    #[default]
    Stopped,
    /// A loop is active and will re-check this flag at its next wake.
    Running,
}

impl RunState {
    /// Returns `true` for [`RunState::Running`].
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Records whether the loop was running when the page lost visibility.
///
/// Only meaningful while the page is hidden. Reading it on visibility
/// regain consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuspendedFlag(bool);

impl SuspendedFlag {
    /// Overwrites the flag with the current run state.
    pub const fn snapshot(&mut self, state: RunState) {
        self.0 = state.is_running();
    }

    /// Returns the flag and clears it.
    pub const fn take(&mut self) -> bool {
        let was_running = self.0;
        self.0 = false;
        was_running
    }

    /// Clears the flag without reading it.
    pub const fn clear(&mut self) {
        self.0 = false;
    }

    /// Returns the flag without consuming it.
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0
    }
}

/// One of the two timed sub-steps of a cycle iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Long forward swipe.
    Forward,
    /// Short sideways swipe.
    Lateral,
}

impl Phase {
    /// The phase that follows this one in an uninterrupted loop.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Forward => Self::Lateral,
            Self::Lateral => Self::Forward,
        }
    }

    /// The status reported when this phase begins.
    #[must_use]
    pub const fn status(self) -> Status {
        match self {
            Self::Forward => Status::SwipingForward,
            Self::Lateral => Status::SwipingLeft,
        }
    }

    /// Lowercase name used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Lateral => "lateral",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-visible status line.
///
/// The [`Display`](fmt::Display) form is the exact text shown on the page
/// after the `Status: ` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Page loaded, nothing started yet.
    #[default]
    Ready,
    /// A press started the loop.
    Started,
    /// Forward phase in progress.
    SwipingForward,
    /// Lateral phase in progress.
    SwipingLeft,
    /// Stopped by the user, or the loop observed a stop and exited.
    Stopped,
    /// Stopped because the page became visible again after running hidden.
    StoppedTabReturn,
}

impl Status {
    /// Every status, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Ready,
        Self::Started,
        Self::SwipingForward,
        Self::SwipingLeft,
        Self::Stopped,
        Self::StoppedTabReturn,
    ];

    /// Text shown to the user.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Started => "Started",
            Self::SwipingForward => "Swiping forward",
            Self::SwipingLeft => "Swiping left",
            Self::Stopped => "Stopped",
            Self::StoppedTabReturn => "Stopped (tab return)",
        }
    }

    /// Snake-case identifier used as a metrics label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Started => "started",
            Self::SwipingForward => "swiping_forward",
            Self::SwipingLeft => "swiping_left",
            Self::Stopped => "stopped",
            Self::StoppedTabReturn => "stopped_tab_return",
        }
    }

    /// The phase this status announces, if any.
    #[must_use]
    pub const fn phase(self) -> Option<Phase> {
        match self {
            Self::SwipingForward => Some(Phase::Forward),
            Self::SwipingLeft => Some(Phase::Lateral),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A status together with the scheduler time at which it was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Time since the scheduler's origin.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub at: Duration,
    /// The reported status.
    pub status: Status,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(
    at: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(at.as_millis()).unwrap_or(u64::MAX))
}
