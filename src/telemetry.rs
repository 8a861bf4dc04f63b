//! Workflow telemetry events and sinks.
//!
//! Telemetry complements `tracing` logs with a small set of structured events
//! marking phase outcomes, so a session can be audited from stderr without
//! parsing log text.

use std::io;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by the review workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current database schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20251001000000`).
        schema_version: String,
    },
    /// A roster was loaded from the backing store.
    RosterLoaded {
        /// Number of rows read from the store.
        rows: usize,
        /// Number of distinct residents after merging audit rows.
        residents: usize,
    },
    /// The annotate phase finished.
    AnnotationCompleted {
        /// Residents whose advisor calls all succeeded.
        annotated: usize,
        /// Advisor calls that failed.
        failed: usize,
    },
    /// A review row was appended to the store.
    ReviewAppended {
        /// Reviewed resident.
        resident: String,
        /// Risk level chosen by the reviewer.
        risk_level: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local auditing and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Sink that keeps events in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingTelemetrySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetrySink {
    /// Drains and returns every recorded event.
    #[must_use]
    pub fn take(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .map(|mut events| events.drain(..).collect())
            .unwrap_or_default()
    }
}

impl TelemetrySink for RecordingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
