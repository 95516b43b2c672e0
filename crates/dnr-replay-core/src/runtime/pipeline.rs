// crates/dnr-replay-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Transfer Pipeline
// Description: Download, solve-submit, and republish steps of a replay.
// Purpose: Move artifacts between stores, local disk, and the solver.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`TransferPipeline::download_all`] fetches each resolved artifact from the
//! source store, gunzips it, and writes it under the run directory.
//! [`TransferPipeline::submit_and_republish`] posts the persisted request to
//! the solver and uploads the local raw screen usage (gzip) to the
//! destination store keyed by the solver's new correlation id.
//!
//! The republish write is unconditional: a second upload for the same new
//! correlation id overwrites the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::CorrelationId;
use crate::core::FileRole;
use crate::core::FileRoleSet;
use crate::interfaces::ObjectStore;
use crate::interfaces::PutObject;
use crate::interfaces::SolverClient;
use crate::runtime::codec::gzip_compress;
use crate::runtime::codec::gzip_decompress_text;
use crate::runtime::error::ReplayError;
use crate::runtime::events::ReplayEvent;
use crate::runtime::events::ReplayEventSink;
use crate::runtime::local::LocalRunStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default cap on a single object (compressed and decompressed), in bytes.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 512 * 1024 * 1024;
/// Content type of the republished screen usage object.
const SCREEN_USAGE_CONTENT_TYPE: &str = "text/csv";
/// Content encoding of every object written by the pipeline.
const GZIP_ENCODING: &str = "gzip";

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Collaborators used by the transfer pipeline.
pub struct TransferPipeline {
    /// Store the artifacts are fetched from.
    source: Arc<dyn ObjectStore>,
    /// Store the screen usage is republished to.
    destination: Arc<dyn ObjectStore>,
    /// Remote solving service.
    solver: Arc<dyn SolverClient>,
    /// Local run storage.
    local: LocalRunStore,
    /// Object size cap.
    max_object_bytes: usize,
    /// Event sink.
    events: Arc<dyn ReplayEventSink>,
}

impl TransferPipeline {
    /// Creates a transfer pipeline.
    #[must_use]
    pub fn new(
        source: Arc<dyn ObjectStore>,
        destination: Arc<dyn ObjectStore>,
        solver: Arc<dyn SolverClient>,
        local: LocalRunStore,
        max_object_bytes: usize,
        events: Arc<dyn ReplayEventSink>,
    ) -> Self {
        Self {
            source,
            destination,
            solver,
            local,
            max_object_bytes,
            events,
        }
    }

    /// Returns the local run storage.
    #[must_use]
    pub const fn local(&self) -> &LocalRunStore {
        &self.local
    }

    /// Downloads and decompresses every resolved artifact.
    ///
    /// Re-running for the same file set rewrites identical files.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] when a fetch, decompression, or write fails.
    pub fn download_all(
        &self,
        correlation_id: &CorrelationId,
        files: &FileRoleSet,
    ) -> Result<PathBuf, ReplayError> {
        let prepared = self.local.prepare(correlation_id)?;
        self.events.record(&ReplayEvent::RunDirectoryPrepared {
            path: prepared.path.display().to_string(),
            created: prepared.created,
        });
        for (role, key) in files.entries() {
            let compressed = self.source.get(key, self.max_object_bytes)?;
            let text = gzip_decompress_text(&compressed, self.max_object_bytes).map_err(
                |source| ReplayError::Codec {
                    role,
                    source,
                },
            )?;
            let path = self.local.write(correlation_id, role, text.as_bytes())?;
            self.events.record(&ReplayEvent::ObjectDownloaded {
                role,
                key: key.to_string(),
                compressed_bytes: compressed.len(),
                bytes: text.len(),
                path: path.display().to_string(),
            });
        }
        Ok(prepared.path)
    }

    /// Submits the persisted request and republishes the raw screen usage.
    ///
    /// Returns the input correlation id; the new one is reported through the
    /// `solver_responded` event.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] when the request cannot be read, the solver
    /// fails, or the upload fails.
    pub fn submit_and_republish(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<CorrelationId, ReplayError> {
        let payload = self.local.read_request(correlation_id)?;
        self.events.record(&ReplayEvent::SolverSubmitted {
            correlation_id: correlation_id.to_string(),
            endpoint: self.solver.endpoint().to_string(),
        });
        let response = self.solver.submit(&payload)?;
        let new_correlation_id = response.correlation_id;
        self.events.record(&ReplayEvent::SolverResponded {
            correlation_id: correlation_id.to_string(),
            new_correlation_id: new_correlation_id.to_string(),
        });

        let Some(raw) = self.local.read_if_exists(correlation_id, FileRole::RawScreenUsage)? else {
            self.events.record(&ReplayEvent::ScreenUsageSkipped {
                correlation_id: correlation_id.to_string(),
            });
            return Ok(correlation_id.clone());
        };
        let compressed = gzip_compress(&raw).map_err(|source| ReplayError::Codec {
            role: FileRole::RawScreenUsage,
            source,
        })?;
        let bytes = compressed.len();
        self.destination.put(
            new_correlation_id.as_str(),
            PutObject {
                bytes: compressed,
                content_type: Some(SCREEN_USAGE_CONTENT_TYPE.to_string()),
                content_encoding: Some(GZIP_ENCODING.to_string()),
            },
        )?;
        self.events.record(&ReplayEvent::ScreenUsageRepublished {
            bucket: self.destination.bucket().to_string(),
            key: new_correlation_id.to_string(),
            bytes,
        });
        Ok(correlation_id.clone())
    }
}
