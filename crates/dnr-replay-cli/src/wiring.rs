// crates/dnr-replay-cli/src/wiring.rs
// ============================================================================
// Module: CLI Wiring
// Description: Builds replay collaborators from validated configuration.
// Purpose: Keep construction logic out of the command dispatcher.
// Dependencies: dnr-replay-{core, config, store-s3, solver}, thiserror
// ============================================================================

//! ## Overview
//! [`build_runner`] turns a [`ReplayConfig`] into a [`ReplayRunner`] backed by
//! two S3 stores and the HTTP solver. Events flow through a
//! [`SummaryEventSink`], which forwards to the configured sink and remembers
//! the solver's new correlation id for the command summary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use dnr_replay_config::EventSinkKind;
use dnr_replay_config::EventsConfig;
use dnr_replay_config::ReplayConfig;
use dnr_replay_core::ReplayEvent;
use dnr_replay_core::ReplayEventSink;
use dnr_replay_core::ReplayOptions;
use dnr_replay_core::ReplayRunner;
use dnr_replay_core::ReplayRunnerConfig;
use dnr_replay_core::SolverError;
use dnr_replay_core::StoreError;
use dnr_replay_core::runtime::FileEventSink;
use dnr_replay_core::runtime::NoopEventSink;
use dnr_replay_core::runtime::StderrEventSink;
use dnr_replay_solver::HttpSolverClient;
use dnr_replay_store_s3::S3ObjectStore;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while wiring collaborators.
#[derive(Debug, Error)]
pub enum WiringError {
    /// A bucket store could not be built.
    #[error("{role} store: {source}")]
    Store {
        /// `source` or `destination`.
        role: &'static str,
        /// Underlying store error.
        source: StoreError,
    },
    /// The solver client could not be built.
    #[error("solver client: {0}")]
    Solver(#[from] SolverError),
    /// The event log could not be opened.
    #[error("event log {path}: {message}")]
    Events {
        /// Event log path.
        path: String,
        /// I/O error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Event Sinks
// ============================================================================

/// Builds the event sink selected by configuration.
///
/// # Errors
///
/// Returns [`WiringError::Events`] when the file sink cannot be opened.
pub fn build_event_sink(config: &EventsConfig) -> Result<Arc<dyn ReplayEventSink>, WiringError> {
    match (config.sink, &config.path) {
        (EventSinkKind::Stderr, _) => Ok(Arc::new(StderrEventSink)),
        (EventSinkKind::None, _) => Ok(Arc::new(NoopEventSink)),
        (EventSinkKind::File, Some(path)) => {
            let sink = FileEventSink::new(path).map_err(|err| WiringError::Events {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            Ok(Arc::new(sink))
        }
        (EventSinkKind::File, None) => Err(WiringError::Events {
            path: String::new(),
            message: "file sink requires a path".to_string(),
        }),
    }
}

/// Forwarding sink that remembers the solver's new correlation id.
pub struct SummaryEventSink {
    /// Configured sink.
    inner: Arc<dyn ReplayEventSink>,
    /// New correlation id from the last `solver_responded` event.
    new_correlation_id: Mutex<Option<String>>,
}

impl SummaryEventSink {
    /// Wraps a sink.
    #[must_use]
    pub fn new(inner: Arc<dyn ReplayEventSink>) -> Self {
        Self {
            inner,
            new_correlation_id: Mutex::new(None),
        }
    }

    /// Returns the new correlation id, once the solver has responded.
    #[must_use]
    pub fn new_correlation_id(&self) -> Option<String> {
        self.new_correlation_id.lock().ok().and_then(|value| value.clone())
    }
}

impl ReplayEventSink for SummaryEventSink {
    fn record(&self, event: &ReplayEvent) {
        if let ReplayEvent::SolverResponded {
            new_correlation_id,
            ..
        } = event
            && let Ok(mut slot) = self.new_correlation_id.lock()
        {
            *slot = Some(new_correlation_id.clone());
        }
        self.inner.record(event);
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Maps configuration onto runner tunables.
#[must_use]
pub fn replay_options(config: &ReplayConfig) -> ReplayOptions {
    ReplayOptions {
        sentinel_mode: config.locator.sentinel_mode,
        max_object_bytes: config.source.max_object_bytes,
    }
}

/// Builds a runner backed by S3 and the HTTP solver.
///
/// # Errors
///
/// Returns [`WiringError`] when a collaborator cannot be constructed.
pub fn build_runner(
    config: &ReplayConfig,
    events: Arc<SummaryEventSink>,
) -> Result<ReplayRunner, WiringError> {
    let source = S3ObjectStore::new(&config.source).map_err(|source| WiringError::Store {
        role: "source",
        source,
    })?;
    let destination =
        S3ObjectStore::new(&config.destination).map_err(|source| WiringError::Store {
            role: "destination",
            source,
        })?;
    let solver = HttpSolverClient::new(&config.solver)?;
    Ok(ReplayRunner::new(ReplayRunnerConfig {
        source: Arc::new(source),
        destination: Arc::new(destination),
        solver: Arc::new(solver),
        local_root: config.local.root.clone(),
        options: replay_options(config),
        clock: None,
        events,
    }))
}
