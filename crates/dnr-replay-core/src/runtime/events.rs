// crates/dnr-replay-core/src/runtime/events.rs
// ============================================================================
// Module: Replay Events
// Description: Structured JSON-line events emitted by the replay pipeline.
// Purpose: Record discovery and transfer decisions without hard log deps.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each pipeline step reports a [`ReplayEvent`] to a [`ReplayEventSink`].
//! Sinks serialize events as one JSON object per line with an `event` tag and
//! a `timestamp_ms` field. Sink failures are swallowed; observability never
//! fails a run.
//!
//! The solver's new correlation id is reported here (`solver_responded`), not
//! through the orchestrator's return value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::FileRole;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How a search prefix was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeSource {
    /// Caller supplied the prefix.
    Explicit,
    /// Derived from the sentinel's last-modified date.
    Sentinel,
    /// Derived from the current time at the hinted granularity.
    Hint,
    /// No scoping information; full bucket scan.
    Unscoped,
}

/// Replay pipeline event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// A search prefix was chosen.
    ScopeResolved {
        /// Correlation id of the run.
        correlation_id: String,
        /// Chosen prefix (empty for a full scan).
        prefix: String,
        /// Origin of the prefix.
        source: ScopeSource,
    },
    /// The sentinel object was not found in the source bucket.
    SentinelMissing {
        /// Correlation id of the run.
        correlation_id: String,
        /// Source bucket.
        bucket: String,
    },
    /// A listed key was assigned to a role.
    FileMatched {
        /// Correlation id of the run.
        correlation_id: String,
        /// Assigned role.
        role: FileRole,
        /// Object key.
        key: String,
    },
    /// A later key replaced an earlier match for the same role.
    DuplicateRoleMatch {
        /// Correlation id of the run.
        correlation_id: String,
        /// Contested role.
        role: FileRole,
        /// Key that was replaced.
        replaced: String,
        /// Key that was kept.
        kept: String,
    },
    /// The local run directory is ready.
    RunDirectoryPrepared {
        /// Directory path.
        path: String,
        /// True when the directory was created by this call.
        created: bool,
    },
    /// An object was fetched, decompressed, and written locally.
    ObjectDownloaded {
        /// Role of the object.
        role: FileRole,
        /// Object key.
        key: String,
        /// Compressed size in bytes.
        compressed_bytes: usize,
        /// Decompressed size in bytes.
        bytes: usize,
        /// Local file path.
        path: String,
    },
    /// The request payload was sent to the solver.
    SolverSubmitted {
        /// Correlation id of the input run.
        correlation_id: String,
        /// Solver endpoint.
        endpoint: String,
    },
    /// The solver accepted the request.
    SolverResponded {
        /// Correlation id of the input run.
        correlation_id: String,
        /// Correlation id of the newly produced run.
        new_correlation_id: String,
    },
    /// The raw screen usage was uploaded under the new correlation id.
    ScreenUsageRepublished {
        /// Destination bucket.
        bucket: String,
        /// Destination key (the new correlation id).
        key: String,
        /// Compressed size in bytes.
        bytes: usize,
    },
    /// No local raw screen usage exists; nothing was uploaded.
    ScreenUsageSkipped {
        /// Correlation id of the input run.
        correlation_id: String,
    },
}

/// Serialized event line.
#[derive(Serialize)]
struct EventRecord<'a> {
    /// Event timestamp (milliseconds since epoch).
    timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    event: &'a ReplayEvent,
}

/// Serializes an event as a single JSON line.
fn event_line(event: &ReplayEvent) -> Option<String> {
    let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    serde_json::to_string(&EventRecord {
        timestamp_ms,
        event,
    })
    .ok()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for replay events.
pub trait ReplayEventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &ReplayEvent);
}

/// Event sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl ReplayEventSink for StderrEventSink {
    fn record(&self, event: &ReplayEvent) {
        if let Some(line) = event_line(event) {
            let _ = writeln!(io::stderr(), "{line}");
        }
    }
}

/// Event sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ReplayEventSink for FileEventSink {
    fn record(&self, event: &ReplayEvent) {
        if let Some(line) = event_line(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

/// No-op event sink.
pub struct NoopEventSink;

impl ReplayEventSink for NoopEventSink {
    fn record(&self, _event: &ReplayEvent) {}
}

/// Event sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in emission order.
    events: Mutex<Vec<ReplayEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ReplayEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl ReplayEventSink for MemoryEventSink {
    fn record(&self, event: &ReplayEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
