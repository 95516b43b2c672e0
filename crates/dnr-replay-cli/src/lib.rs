// crates/dnr-replay-cli/src/lib.rs
// ============================================================================
// Module: DNR Replay CLI Library
// Description: Shared wiring for the `dnr-replay` command-line interface.
// Purpose: Build stores, solver, event sinks, and runner from configuration.
// Dependencies: crate::wiring
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and delegates to
//! the wiring here, which tests exercise without a process boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Configuration-to-runtime wiring.
pub mod wiring;
