//! Error types for indexing and type-context construction.
//!
//! Invariant violations are scoped to the offending file or type and never
//! abort a run: a malformed file is excluded from the registries, a cyclic
//! type degrades to its own members. "Not found" is data, not an error —
//! unresolved references carry an [`UnresolvedReason`] in the snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::Location;

/// Errors raised while indexing a single file.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Two scopes at the same depth claim the same start position with the
    /// same extent. This is a language-boundary-extraction bug upstream and
    /// is always surfaced, never silently tie-broken.
    #[error("malformed scope tree in {path}: same-depth scopes overlap at {location}")]
    MalformedScopeTree { path: Arc<str>, location: Location },

    /// More than one module-scope capture for one file.
    #[error("malformed scope tree in {path}: multiple module scopes")]
    MultipleRoots { path: Arc<str> },
}

/// Errors raised while building a type's member index.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The inheritance chain loops back on itself. The type's member index
    /// degrades to own-members-only; the type itself stays usable.
    #[error("cyclic inheritance involving '{type_name}'")]
    CyclicInheritance { type_name: SmolStr },
}

/// Why a reference failed to resolve. Recorded on the snapshot, not thrown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// No definition found locally or through imports.
    NotFound,
    /// The re-export chain looped; the cycle guard terminated the walk.
    CyclicReexport,
    /// The import specifier points outside the indexed project.
    MissingExternal,
}
