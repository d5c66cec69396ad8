//! Foundation types for the clew analysis core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Interned file identifiers
//! - [`LineCol`], [`Location`] - Source positions and ranges
//! - [`LineIndex`] - Byte-offset ↔ line/column conversion
//! - [`SymbolId`], [`ScopeId`] - Opaque, deterministic cross-file ids
//! - [`FileSet`], [`Language`] - Path↔id mapping with contents and language
//!
//! This module has NO dependencies on other clew modules.

mod file_id;
mod ids;
mod line_index;
mod source;
mod span;

pub use file_id::FileId;
pub use ids::{ScopeId, SymbolId};
pub use line_index::LineIndex;
pub use source::{FileSet, Language};
pub use span::{LineCol, Location};
