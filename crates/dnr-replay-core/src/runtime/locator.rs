// crates/dnr-replay-core/src/runtime/locator.rs
// ============================================================================
// Module: File Locator
// Description: Finds and classifies a run's artifacts under a prefix.
// Purpose: Assemble a validated file-role set from a prefix listing.
// Dependencies: crate::{core, interfaces, runtime::events}
// ============================================================================

//! ## Overview
//! Every key under the prefix that contains the correlation id is classified
//! with [`FileRole::classify`]. The raw screen usage role is resolved by a
//! separate existence probe on the bare correlation id key.
//!
//! When several keys match one role the last one enumerated wins. Listing
//! order is defined by the store (lexicographic for S3), so this is kept as
//! is and every replacement is reported as a `duplicate_role_match` event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::CorrelationId;
use crate::core::FileRole;
use crate::core::FileRoleMatches;
use crate::core::FileRoleSet;
use crate::interfaces::ObjectStore;
use crate::runtime::error::ReplayError;
use crate::runtime::events::ReplayEvent;
use crate::runtime::events::ReplayEventSink;

// ============================================================================
// SECTION: Locator
// ============================================================================

/// Locates a run's artifacts in the source store.
pub struct FileLocator {
    /// Source store to scan.
    store: Arc<dyn ObjectStore>,
    /// Event sink.
    events: Arc<dyn ReplayEventSink>,
}

impl FileLocator {
    /// Creates a locator over the source store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, events: Arc<dyn ReplayEventSink>) -> Self {
        Self {
            store,
            events,
        }
    }

    /// Scans `prefix` (the whole bucket when empty) and builds the file set.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::IncompleteFileSet`] when a mandatory role is
    /// unresolved and [`ReplayError::Store`] when listing or probing fails.
    pub fn locate(
        &self,
        correlation_id: &CorrelationId,
        prefix: &str,
    ) -> Result<FileRoleSet, ReplayError> {
        let needle = correlation_id.as_str();
        let mut matches = FileRoleMatches::new();
        for key in self.store.list_by_prefix(prefix) {
            let key = key?;
            if !key.contains(needle) {
                continue;
            }
            let Some(role) = FileRole::classify(&key) else {
                continue;
            };
            self.assign(&mut matches, correlation_id, role, key);
        }
        if self.store.exists(needle)? {
            self.assign(&mut matches, correlation_id, FileRole::RawScreenUsage, needle.to_string());
        }
        matches.complete().map_err(|missing| ReplayError::IncompleteFileSet {
            correlation_id: correlation_id.clone(),
            prefix: prefix.to_string(),
            missing,
        })
    }

    /// Records a match and reports any key it replaces.
    fn assign(
        &self,
        matches: &mut FileRoleMatches,
        correlation_id: &CorrelationId,
        role: FileRole,
        key: String,
    ) {
        self.events.record(&ReplayEvent::FileMatched {
            correlation_id: correlation_id.to_string(),
            role,
            key: key.clone(),
        });
        if let Some(replaced) = matches.assign(role, key.clone())
            && replaced != key
        {
            self.events.record(&ReplayEvent::DuplicateRoleMatch {
                correlation_id: correlation_id.to_string(),
                role,
                replaced,
                kept: key,
            });
        }
    }
}
