// crates/dnr-replay-core/src/core/files.rs
// ============================================================================
// Module: DNR File Roles
// Description: Semantic roles of the artifacts that make up one run.
// Purpose: Classify object keys and assemble validated file-role sets.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A run is made of up to four artifacts. Three are mandatory
//! ([`FileRole::Request`], [`FileRole::SolutionValues`],
//! [`FileRole::ModelDescriptor`]); [`FileRole::RawScreenUsage`] only exists
//! for some run types. [`FileRoleMatches`] accumulates classified keys and
//! [`FileRoleMatches::complete`] enforces the mandatory-role invariant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: File Roles
// ============================================================================

/// Logical role of a run artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// JSON payload consumed by the solver.
    Request,
    /// CSV solution values written by the replayed solve.
    SolutionValues,
    /// MPS model descriptor.
    ModelDescriptor,
    /// Optional CSV of raw screen usage; keyed by the bare correlation id.
    RawScreenUsage,
}

impl FileRole {
    /// All roles in download order.
    pub const ALL: [Self; 4] =
        [Self::RawScreenUsage, Self::Request, Self::SolutionValues, Self::ModelDescriptor];

    /// Roles that must resolve for a file set to be valid.
    pub const REQUIRED: [Self; 3] = [Self::Request, Self::SolutionValues, Self::ModelDescriptor];

    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::SolutionValues => "solution_values",
            Self::ModelDescriptor => "model_descriptor",
            Self::RawScreenUsage => "raw_screen_usage",
        }
    }

    /// Returns the fixed local file name for the role.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Request => "request.json",
            Self::SolutionValues => "solution_values.csv",
            Self::ModelDescriptor => "model.mps",
            Self::RawScreenUsage => "raw_screen_usage.csv",
        }
    }

    /// Returns true when the role is mandatory.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::RawScreenUsage)
    }

    /// Classifies a listed key that already contains the correlation id.
    ///
    /// Matching is by substring in fixed priority order: `request`, then
    /// `response`, then `mps`. Keys matching none of them are ignored.
    #[must_use]
    pub fn classify(key: &str) -> Option<Self> {
        if key.contains("request") {
            Some(Self::Request)
        } else if key.contains("response") {
            Some(Self::SolutionValues)
        } else if key.contains("mps") {
            Some(Self::ModelDescriptor)
        } else {
            None
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: File Role Set
// ============================================================================

/// Resolved object keys for one run.
///
/// # Invariants
/// - The three mandatory roles always hold a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRoleSet {
    /// Key of the solver request payload.
    pub request: String,
    /// Key of the solution values.
    pub solution_values: String,
    /// Key of the MPS model descriptor.
    pub model_descriptor: String,
    /// Key of the raw screen usage, when present.
    pub raw_screen_usage: Option<String>,
}

impl FileRoleSet {
    /// Returns the key for a role, if resolved.
    #[must_use]
    pub fn key(&self, role: FileRole) -> Option<&str> {
        match role {
            FileRole::Request => Some(&self.request),
            FileRole::SolutionValues => Some(&self.solution_values),
            FileRole::ModelDescriptor => Some(&self.model_descriptor),
            FileRole::RawScreenUsage => self.raw_screen_usage.as_deref(),
        }
    }

    /// Returns the resolved `(role, key)` pairs in download order.
    #[must_use]
    pub fn entries(&self) -> Vec<(FileRole, &str)> {
        FileRole::ALL.iter().filter_map(|role| self.key(*role).map(|key| (*role, key))).collect()
    }
}

/// Accumulator for classified keys prior to validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRoleMatches {
    /// Request key.
    request: Option<String>,
    /// Solution values key.
    solution_values: Option<String>,
    /// Model descriptor key.
    model_descriptor: Option<String>,
    /// Raw screen usage key.
    raw_screen_usage: Option<String>,
}

impl FileRoleMatches {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a key to a role, returning the key it replaced.
    ///
    /// Later assignments overwrite earlier ones (last-seen-wins).
    pub fn assign(&mut self, role: FileRole, key: impl Into<String>) -> Option<String> {
        let slot = match role {
            FileRole::Request => &mut self.request,
            FileRole::SolutionValues => &mut self.solution_values,
            FileRole::ModelDescriptor => &mut self.model_descriptor,
            FileRole::RawScreenUsage => &mut self.raw_screen_usage,
        };
        slot.replace(key.into())
    }

    /// Returns the key assigned to a role, if any.
    #[must_use]
    pub fn key(&self, role: FileRole) -> Option<&str> {
        match role {
            FileRole::Request => self.request.as_deref(),
            FileRole::SolutionValues => self.solution_values.as_deref(),
            FileRole::ModelDescriptor => self.model_descriptor.as_deref(),
            FileRole::RawScreenUsage => self.raw_screen_usage.as_deref(),
        }
    }

    /// Returns the mandatory roles that are still unresolved.
    #[must_use]
    pub fn missing(&self) -> Vec<FileRole> {
        FileRole::ALL
            .into_iter()
            .filter(|role| role.is_required() && self.key(*role).is_none())
            .collect()
    }

    /// Validates the mandatory roles and builds the file set.
    ///
    /// # Errors
    ///
    /// Returns the unresolved mandatory roles when any is missing.
    pub fn complete(self) -> Result<FileRoleSet, Vec<FileRole>> {
        match (self.request, self.solution_values, self.model_descriptor) {
            (Some(request), Some(solution_values), Some(model_descriptor)) => Ok(FileRoleSet {
                request,
                solution_values,
                model_descriptor,
                raw_screen_usage: self.raw_screen_usage,
            }),
            (request, solution_values, model_descriptor) => Err(Self {
                request,
                solution_values,
                model_descriptor,
                raw_screen_usage: None,
            }
            .missing()),
        }
    }
}
