// crates/dnr-replay-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Fixtures
// Description: Object store, solver, and clock fixtures for replay tests.
// Purpose: Build in-memory replay environments without network access.
// Dependencies: dnr-replay-core, serde_json, tempfile, time
// ============================================================================

#![allow(dead_code, reason = "Fixtures are shared across test binaries.")]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only fixtures favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use dnr_replay_core::CorrelationId;
use dnr_replay_core::InMemoryObjectStore;
use dnr_replay_core::ReplayOptions;
use dnr_replay_core::ReplayRunner;
use dnr_replay_core::ReplayRunnerConfig;
use dnr_replay_core::SolveResponse;
use dnr_replay_core::SolvedRunId;
use dnr_replay_core::SolverClient;
use dnr_replay_core::SolverError;
use dnr_replay_core::runtime::FixedClock;
use dnr_replay_core::runtime::MemoryEventSink;
use dnr_replay_core::runtime::gzip_compress;
use serde_json::Value;
use tempfile::TempDir;
use time::OffsetDateTime;
use time::macros::datetime;

/// Instant used as "now" by hint-based scoping.
pub const NOW: OffsetDateTime = datetime!(2024-07-15 09:30:00 UTC);
/// Last-modified timestamp of the sentinel in the standard fixture.
pub const SENTINEL_MODIFIED: OffsetDateTime = datetime!(2024-03-02 17:45:12 UTC);

pub fn id(value: &str) -> CorrelationId {
    CorrelationId::parse(value).unwrap()
}

pub fn gz(text: &str) -> Vec<u8> {
    gzip_compress(text.as_bytes()).unwrap()
}

/// Solver fake that records submissions and answers with a fixed id.
pub struct RecordingSolver {
    pub new_correlation_id: String,
    pub submissions: Mutex<Vec<Value>>,
    pub fail: bool,
}

impl RecordingSolver {
    pub fn answering(new_correlation_id: &str) -> Self {
        Self {
            new_correlation_id: new_correlation_id.to_string(),
            submissions: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            new_correlation_id: String::new(),
            submissions: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.submissions.lock().unwrap().clone()
    }
}

impl SolverClient for RecordingSolver {
    fn endpoint(&self) -> &str {
        "memory://solver"
    }

    fn submit(&self, payload: &Value) -> Result<SolveResponse, SolverError> {
        self.submissions.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(SolverError::Status {
                status: 500,
                body: "solver unavailable".to_string(),
            });
        }
        Ok(SolveResponse {
            correlation_id: SolvedRunId::parse(self.new_correlation_id.as_str()).unwrap(),
            extra: BTreeMap::new(),
        })
    }
}

/// In-memory replay environment.
pub struct Harness {
    pub source: Arc<InMemoryObjectStore>,
    pub destination: Arc<InMemoryObjectStore>,
    pub solver: Arc<RecordingSolver>,
    pub events: Arc<MemoryEventSink>,
    pub root: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_solver(RecordingSolver::answering("new-run-1"))
    }

    pub fn with_solver(solver: RecordingSolver) -> Self {
        Self {
            source: Arc::new(InMemoryObjectStore::new("prod-bucket").with_page_size(2)),
            destination: Arc::new(InMemoryObjectStore::new("staging-bucket")),
            solver: Arc::new(solver),
            events: Arc::new(MemoryEventSink::new()),
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn runner(&self) -> ReplayRunner {
        self.runner_with(ReplayOptions::default())
    }

    pub fn runner_with(&self, options: ReplayOptions) -> ReplayRunner {
        ReplayRunner::new(ReplayRunnerConfig {
            source: self.source.clone(),
            destination: self.destination.clone(),
            solver: self.solver.clone(),
            local_root: self.root.path().to_path_buf(),
            options,
            clock: Some(Arc::new(FixedClock(NOW))),
            events: self.events.clone(),
        })
    }

    /// Seeds the standard `abc` run: three dated artifacts plus the sentinel.
    pub fn seed_abc(&self) {
        self.seed_abc_artifacts("2024-03-02/");
        self.source.insert("abc", gz("screen,plays\ns1,3\n"), SENTINEL_MODIFIED).unwrap();
    }

    /// Seeds the three mandatory artifacts under `prefix`.
    pub fn seed_abc_artifacts(&self, prefix: &str) {
        self.source
            .insert(
                format!("{prefix}abc-request.json"),
                gz(r#"{"campaign": 7, "screens": ["s1", "s2"]}"#),
                SENTINEL_MODIFIED,
            )
            .unwrap();
        self.source
            .insert(format!("{prefix}abc-response.json"), gz("var,value\nx,1\n"), SENTINEL_MODIFIED)
            .unwrap();
        self.source
            .insert(format!("{prefix}abc-model.mps"), gz("NAME abc\nROWS\nENDATA\n"), SENTINEL_MODIFIED)
            .unwrap();
    }
}
