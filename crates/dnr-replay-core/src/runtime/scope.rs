// crates/dnr-replay-core/src/runtime/scope.rs
// ============================================================================
// Module: Scope Resolver
// Description: Derives the key prefix used to search for a run's artifacts.
// Purpose: Narrow the listing to the most precise prefix available.
// Dependencies: crate::{core, interfaces, runtime::events}, time
// ============================================================================

//! ## Overview
//! Resolution order, from most to least precise:
//! 1. The sentinel object (key == correlation id) exists: its last-modified
//!    date as `YYYY-MM-DD`, regardless of any hint.
//! 2. A scope hint is supplied: the current time at that granularity.
//! 3. Otherwise: the empty prefix, i.e. a full bucket scan.
//!
//! In [`SentinelMode::Strict`] a missing sentinel is an error instead of
//! falling through to steps 2 and 3.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use time::OffsetDateTime;

use crate::core::CorrelationId;
use crate::core::SearchScope;
use crate::core::SentinelMode;
use crate::interfaces::ObjectStore;
use crate::runtime::error::ReplayError;
use crate::runtime::events::ReplayEvent;
use crate::runtime::events::ReplayEventSink;
use crate::runtime::events::ScopeSource;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current time for hint-based scoping.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolved search prefix and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    /// Key prefix; empty means the whole bucket.
    pub prefix: String,
    /// Origin of the prefix.
    pub source: ScopeSource,
}

/// Chooses the search prefix for a correlation id.
pub struct ScopeResolver {
    /// Source store holding the sentinel.
    store: Arc<dyn ObjectStore>,
    /// Missing-sentinel handling.
    mode: SentinelMode,
    /// Time source for hint-based prefixes.
    clock: Arc<dyn Clock>,
    /// Event sink.
    events: Arc<dyn ReplayEventSink>,
}

impl ScopeResolver {
    /// Creates a resolver over the source store.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        mode: SentinelMode,
        clock: Arc<dyn Clock>,
        events: Arc<dyn ReplayEventSink>,
    ) -> Self {
        Self {
            store,
            mode,
            clock,
            events,
        }
    }

    /// Resolves the search prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Store`] when the sentinel probe fails and
    /// [`ReplayError::SentinelNotFound`] in strict mode when it is absent.
    pub fn resolve(
        &self,
        correlation_id: &CorrelationId,
        hint: Option<SearchScope>,
    ) -> Result<ResolvedScope, ReplayError> {
        let resolved = if let Some(modified) = self.store.head_timestamp(correlation_id.as_str())? {
            ResolvedScope {
                prefix: SearchScope::Day.prefix_for(modified),
                source: ScopeSource::Sentinel,
            }
        } else {
            self.events.record(&ReplayEvent::SentinelMissing {
                correlation_id: correlation_id.to_string(),
                bucket: self.store.bucket().to_string(),
            });
            if self.mode == SentinelMode::Strict {
                return Err(ReplayError::SentinelNotFound {
                    correlation_id: correlation_id.clone(),
                    bucket: self.store.bucket().to_string(),
                });
            }
            match hint {
                Some(scope) => ResolvedScope {
                    prefix: scope.prefix_for(self.clock.now()),
                    source: ScopeSource::Hint,
                },
                None => ResolvedScope {
                    prefix: String::new(),
                    source: ScopeSource::Unscoped,
                },
            }
        };
        self.events.record(&ReplayEvent::ScopeResolved {
            correlation_id: correlation_id.to_string(),
            prefix: resolved.prefix.clone(),
            source: resolved.source,
        });
        Ok(resolved)
    }
}
