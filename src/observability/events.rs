//! Structured event stream for `swipesim`.
//!
//! Discrete, typed events emitted while serving pages or running a
//! simulation. Events are serialized as newline-delimited JSON (JSONL) and
//! carry a monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cycle::{Status, StatusReport};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during `swipesim` operation.
///
/// Each variant is tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The page server is listening.
    ServerStarted {
        /// When the server started.
        timestamp: DateTime<Utc>,
        /// Address actually bound.
        bind_addr: String,
    },

    /// The page server has stopped.
    ServerStopped {
        /// When the server stopped.
        timestamp: DateTime<Utc>,
        /// Human-readable stop reason.
        reason: String,
    },

    /// A route returned the page.
    AssetServed {
        /// When the response was produced.
        timestamp: DateTime<Utc>,
        /// Route path (`/` or `/download`).
        route: String,
        /// Payload size in bytes.
        bytes: u64,
    },

    /// The cycle controller reported a status.
    StatusChanged {
        /// Wall-clock time the report was observed.
        timestamp: DateTime<Utc>,
        /// Reported status.
        status: Status,
        /// Milliseconds since the controller's scheduler origin.
        elapsed_ms: u64,
    },
}

impl Event {
    /// Builds a [`Event::StatusChanged`] stamped with the current time.
    #[must_use]
    pub fn status_changed(report: &StatusReport) -> Self {
        Self::StatusChanged {
            timestamp: Utc::now(),
            status: report.status,
            elapsed_ms: u64::try_from(report.at.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are silently dropped; the event stream
/// must never take the server down.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug.
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Creates a file emitter when `path` is given, a no-op emitter otherwise.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_optional_file(path: Option<&Path>) -> std::io::Result<Self> {
        path.map_or_else(|| Ok(Self::noop()), Self::from_file)
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::ServerStarted {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            bind_addr: "0.0.0.0:5000".to_owned(),
        }
    }

    #[test]
    fn test_emitter_writes_flattened_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());

        let parsed: serde_json::Value = serde_json::from_str(tw.contents().trim()).unwrap();
        assert_eq!(parsed["type"], "ServerStarted");
        assert_eq!(parsed["bind_addr"], "0.0.0.0:5000");
        assert_eq!(parsed["sequence"], 0);
        assert!(parsed.get("event").is_none());
    }

    #[test]
    fn test_emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::AssetServed {
            timestamp: Utc::now(),
            route: "/download".to_owned(),
            bytes: 42,
        });

        assert_eq!(emitter.event_count(), 2);

        let lines: Vec<serde_json::Value> = tw
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["route"], "/download");
    }

    #[test]
    fn test_status_changed_carries_elapsed_millis() {
        let event = Event::status_changed(&StatusReport {
            at: Duration::from_millis(3000),
            status: Status::StoppedTabReturn,
        });
        let parsed = serde_json::to_value(&event).unwrap();
        assert_eq!(parsed["type"], "StatusChanged");
        assert_eq!(parsed["status"], "stopped_tab_return");
        assert_eq!(parsed["elapsed_ms"], 3000);
    }

    #[test]
    fn test_noop_emitter_counts_but_discards() {
        let emitter = EventEmitter::noop();
        emitter.emit(Event::ServerStopped {
            timestamp: Utc::now(),
            reason: "shutdown".to_owned(),
        });
        assert_eq!(emitter.event_count(), 1);
    }

    #[test]
    fn test_from_file_writes_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let emitter = EventEmitter::from_optional_file(Some(&path)).unwrap();
        emitter.emit(sample_event());
        drop(emitter);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("ServerStarted"));
    }
}
