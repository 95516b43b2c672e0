// crates/dnr-replay-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Run Orchestrator
// Description: Sequences scope resolution, location, download, and solve.
// Purpose: Expose one correlation-id-scoped replay operation.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`ReplayRunner::run`] performs, in order: scope resolution (unless an
//! explicit prefix is given), file location, download, solver submission,
//! and republish. With `skip_download` only the last two steps run and the
//! local run directory from a previous run must already exist; a missing
//! request file fails the run. All steps are synchronous with no retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::CorrelationId;
use crate::core::FileRoleSet;
use crate::core::SearchScope;
use crate::core::SentinelMode;
use crate::interfaces::ObjectStore;
use crate::interfaces::SolverClient;
use crate::runtime::error::ReplayError;
use crate::runtime::events::ReplayEvent;
use crate::runtime::events::ReplayEventSink;
use crate::runtime::events::ScopeSource;
use crate::runtime::local::LocalRunStore;
use crate::runtime::locator::FileLocator;
use crate::runtime::pipeline::DEFAULT_MAX_OBJECT_BYTES;
use crate::runtime::pipeline::TransferPipeline;
use crate::runtime::scope::Clock;
use crate::runtime::scope::ResolvedScope;
use crate::runtime::scope::ScopeResolver;
use crate::runtime::scope::SystemClock;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Tunables for a [`ReplayRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Missing-sentinel handling.
    pub sentinel_mode: SentinelMode,
    /// Object size cap for downloads.
    pub max_object_bytes: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            sentinel_mode: SentinelMode::Lenient,
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }
}

/// Collaborators wired into a [`ReplayRunner`].
pub struct ReplayRunnerConfig {
    /// Store the run's artifacts are fetched from.
    pub source: Arc<dyn ObjectStore>,
    /// Store the raw screen usage is republished to.
    pub destination: Arc<dyn ObjectStore>,
    /// Remote solving service.
    pub solver: Arc<dyn SolverClient>,
    /// Root directory for local run directories.
    pub local_root: PathBuf,
    /// Tunables.
    pub options: ReplayOptions,
    /// Time source for hint-based scoping (defaults to the UTC wall clock).
    pub clock: Option<Arc<dyn Clock>>,
    /// Event sink.
    pub events: Arc<dyn ReplayEventSink>,
}

/// One replay invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Correlation id of the run to replay.
    pub correlation_id: CorrelationId,
    /// Granularity used when no sentinel exists.
    pub scope_hint: Option<SearchScope>,
    /// Prefix that bypasses scope resolution.
    pub prefix: Option<String>,
    /// Reuse the local run directory instead of downloading.
    pub skip_download: bool,
}

impl RunRequest {
    /// Creates a request with no hint, no prefix, and downloads enabled.
    #[must_use]
    pub const fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            scope_hint: None,
            prefix: None,
            skip_download: false,
        }
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Replays a run end to end.
pub struct ReplayRunner {
    /// Scope resolver.
    resolver: ScopeResolver,
    /// File locator.
    locator: FileLocator,
    /// Transfer pipeline.
    pipeline: TransferPipeline,
    /// Event sink.
    events: Arc<dyn ReplayEventSink>,
}

impl ReplayRunner {
    /// Builds a runner from its collaborators.
    #[must_use]
    pub fn new(config: ReplayRunnerConfig) -> Self {
        let clock = config.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let resolver = ScopeResolver::new(
            Arc::clone(&config.source),
            config.options.sentinel_mode,
            clock,
            Arc::clone(&config.events),
        );
        let locator = FileLocator::new(Arc::clone(&config.source), Arc::clone(&config.events));
        let pipeline = TransferPipeline::new(
            config.source,
            config.destination,
            config.solver,
            LocalRunStore::new(config.local_root),
            config.options.max_object_bytes,
            Arc::clone(&config.events),
        );
        Self {
            resolver,
            locator,
            pipeline,
            events: config.events,
        }
    }

    /// Returns the local run storage.
    #[must_use]
    pub const fn local(&self) -> &LocalRunStore {
        self.pipeline.local()
    }

    /// Chooses the search prefix, honoring an explicit override.
    ///
    /// # Errors
    ///
    /// See [`ScopeResolver::resolve`].
    pub fn resolve_scope(
        &self,
        correlation_id: &CorrelationId,
        scope_hint: Option<SearchScope>,
        prefix: Option<&str>,
    ) -> Result<ResolvedScope, ReplayError> {
        if let Some(prefix) = prefix.filter(|prefix| !prefix.is_empty()) {
            self.events.record(&ReplayEvent::ScopeResolved {
                correlation_id: correlation_id.to_string(),
                prefix: prefix.to_string(),
                source: ScopeSource::Explicit,
            });
            return Ok(ResolvedScope {
                prefix: prefix.to_string(),
                source: ScopeSource::Explicit,
            });
        }
        self.resolver.resolve(correlation_id, scope_hint)
    }

    /// Locates the run's artifacts under a prefix.
    ///
    /// # Errors
    ///
    /// See [`FileLocator::locate`].
    pub fn locate(
        &self,
        correlation_id: &CorrelationId,
        prefix: &str,
    ) -> Result<FileRoleSet, ReplayError> {
        self.locator.locate(correlation_id, prefix)
    }

    /// Resolves, locates, and downloads a run's artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] from any of the three steps.
    pub fn download(
        &self,
        correlation_id: &CorrelationId,
        scope_hint: Option<SearchScope>,
        prefix: Option<&str>,
    ) -> Result<PathBuf, ReplayError> {
        let scope = self.resolve_scope(correlation_id, scope_hint, prefix)?;
        let files = self.locate(correlation_id, &scope.prefix)?;
        self.pipeline.download_all(correlation_id, &files)
    }

    /// Downloads every artifact of a located file set.
    ///
    /// # Errors
    ///
    /// See [`TransferPipeline::download_all`].
    pub fn download_all(
        &self,
        correlation_id: &CorrelationId,
        files: &FileRoleSet,
    ) -> Result<PathBuf, ReplayError> {
        self.pipeline.download_all(correlation_id, files)
    }

    /// Submits the persisted request and republishes the screen usage.
    ///
    /// # Errors
    ///
    /// See [`TransferPipeline::submit_and_republish`].
    pub fn submit_and_republish(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<CorrelationId, ReplayError> {
        self.pipeline.submit_and_republish(correlation_id)
    }

    /// Replays a run and returns its (input) correlation id.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReplayError`] encountered; earlier local writes are
    /// left in place.
    pub fn run(&self, request: &RunRequest) -> Result<CorrelationId, ReplayError> {
        if !request.skip_download {
            self.download(&request.correlation_id, request.scope_hint, request.prefix.as_deref())?;
        }
        self.submit_and_republish(&request.correlation_id)
    }
}
