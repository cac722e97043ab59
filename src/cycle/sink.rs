//! Destinations for status reports.

use tokio::sync::mpsc;

use super::state::{Status, StatusReport};

/// Receives every status the controller reports, in order.
pub trait StatusSink {
    /// Accepts one report.
    fn report(&mut self, report: StatusReport);
}

/// Forwards reports to an async consumer. A closed receiver drops them.
impl StatusSink for mpsc::UnboundedSender<StatusReport> {
    fn report(&mut self, report: StatusReport) {
        let _ = self.send(report);
    }
}

/// Keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Vec<StatusReport>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports received so far.
    #[must_use]
    pub fn reports(&self) -> &[StatusReport] {
        &self.reports
    }

    /// Just the statuses, without timestamps.
    #[must_use]
    pub fn statuses(&self) -> Vec<Status> {
        self.reports.iter().map(|r| r.status).collect()
    }

    /// Most recent report.
    #[must_use]
    pub fn last(&self) -> Option<&StatusReport> {
        self.reports.last()
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl StatusSink for RecordingSink {
    fn report(&mut self, report: StatusReport) {
        self.reports.push(report);
    }
}
