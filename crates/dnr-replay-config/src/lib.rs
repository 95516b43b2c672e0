// crates/dnr-replay-config/src/lib.rs
// ============================================================================
// Module: DNR Replay Config Library
// Description: Canonical configuration model for DNR replay.
// Purpose: Single source of truth for config loading and validation.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Loads `dnr-replay.toml` (or the file named by `DNR_REPLAY_CONFIG`) and
//! validates it fail-closed.

pub mod config;

pub use config::BucketConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::CredentialsConfig;
pub use config::DEFAULT_SOLVER_MAX_RESPONSE_BYTES;
pub use config::DEFAULT_SOLVER_TIMEOUT_MS;
pub use config::EventSinkKind;
pub use config::EventsConfig;
pub use config::LocalConfig;
pub use config::LocatorConfig;
pub use config::ReplayConfig;
pub use config::SolverConfig;
