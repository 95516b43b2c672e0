// crates/dnr-replay-core/src/runtime/local.rs
// ============================================================================
// Module: Local Run Storage
// Description: Per-correlation-id directories under an explicit root.
// Purpose: Persist downloaded artifacts under fixed file names.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`LocalRunStore`] owns a root directory chosen at construction. Each run
//! gets `<root>/<correlation_id>/` holding up to four files named by
//! [`FileRole::file_name`]. Directories are created on first use, reused on
//! later runs, and never deleted here. There is no locking: two concurrent
//! runs for the same correlation id race on the same files.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;

use crate::core::CorrelationId;
use crate::core::FileRole;
use crate::runtime::error::ReplayError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of preparing a run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRunDirectory {
    /// Directory path.
    pub path: PathBuf,
    /// True when the directory did not exist before.
    pub created: bool,
}

/// Local storage rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct LocalRunStore {
    /// Root directory holding one subdirectory per correlation id.
    root: PathBuf,
}

impl LocalRunStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the run directory for a correlation id.
    #[must_use]
    pub fn run_dir(&self, correlation_id: &CorrelationId) -> PathBuf {
        self.root.join(correlation_id.as_str())
    }

    /// Returns the local path of a role's file.
    #[must_use]
    pub fn file_path(&self, correlation_id: &CorrelationId, role: FileRole) -> PathBuf {
        self.run_dir(correlation_id).join(role.file_name())
    }

    /// Creates the run directory if absent; an existing directory is reused.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::LocalIo`] when the directory cannot be created.
    pub fn prepare(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<PreparedRunDirectory, ReplayError> {
        let path = self.run_dir(correlation_id);
        let created = !path.is_dir();
        fs::create_dir_all(&path).map_err(|err| ReplayError::local_io(&path, &err))?;
        Ok(PreparedRunDirectory {
            path,
            created,
        })
    }

    /// Writes a role's file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::LocalIo`] when the write fails.
    pub fn write(
        &self,
        correlation_id: &CorrelationId,
        role: FileRole,
        contents: &[u8],
    ) -> Result<PathBuf, ReplayError> {
        let path = self.file_path(correlation_id, role);
        fs::write(&path, contents).map_err(|err| ReplayError::local_io(&path, &err))?;
        Ok(path)
    }

    /// Reads a role's file if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::LocalIo`] on any failure other than absence.
    pub fn read_if_exists(
        &self,
        correlation_id: &CorrelationId,
        role: FileRole,
    ) -> Result<Option<Vec<u8>>, ReplayError> {
        let path = self.file_path(correlation_id, role);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ReplayError::local_io(&path, &err)),
        }
    }

    /// Reads and parses the persisted request payload.
    ///
    /// A missing file is a hard failure.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::LocalIo`] when the file cannot be read and
    /// [`ReplayError::InvalidPayload`] when it is not JSON.
    pub fn read_request(&self, correlation_id: &CorrelationId) -> Result<Value, ReplayError> {
        let path = self.file_path(correlation_id, FileRole::Request);
        let bytes = fs::read(&path).map_err(|err| ReplayError::local_io(&path, &err))?;
        serde_json::from_slice(&bytes).map_err(|err| ReplayError::InvalidPayload {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}
