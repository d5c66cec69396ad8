//! Single-file indexing — captures in, immutable [`FileIndex`] out.
//!
//! Indexing is a pure function of one file's captures: no registry access,
//! no cross-file knowledge. A file change rebuilds the whole index; nothing
//! is patched in place. Because files are independent here, the project
//! layer maps this step over the file set in parallel.

mod definitions;
mod references;
mod scope_tree;

pub use definitions::{DefKind, Definition, ExportInfo};
pub use references::{RefKind, Reference};
pub use scope_tree::{Scope, ScopeKind, ScopeTree};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{FileId, Language, LineCol, Location};
use crate::capture::Capture;
use crate::error::IndexError;

/// The complete index of one file: scopes, definitions, references.
///
/// Immutable once built. Serializes losslessly to JSON (maps as records) for
/// fixture-based testing; `deserialize(serialize(index)) == index`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileIndex {
    pub file: FileId,
    pub path: Arc<str>,
    pub language: Language,
    pub scopes: ScopeTree,
    pub definitions: Vec<Definition>,
    pub references: Vec<Reference>,
}

impl FileIndex {
    /// Look up the reference covering `pos`, together with its position in
    /// the reference list (the snapshot is indexed the same way).
    pub fn reference_at(&self, pos: LineCol) -> Option<(usize, &Reference)> {
        self.references
            .iter()
            .enumerate()
            .filter(|(_, r)| r.location.contains_pos(pos))
            .min_by_key(|(_, r)| r.location.extent())
    }

    /// Look up a definition covering `pos`.
    pub fn definition_at(&self, pos: LineCol) -> Option<&Definition> {
        self.definitions
            .iter()
            .filter(|d| d.location.contains_pos(pos))
            .min_by_key(|d| d.location.extent())
    }
}

/// Index one file: build the scope tree, then extract definitions and
/// references with their scope assignments.
pub fn index_file(
    file: FileId,
    path: &str,
    language: Language,
    text: &str,
    captures: &[Capture],
) -> Result<FileIndex, IndexError> {
    let scopes = ScopeTree::build(path, file, language, text, captures)?;
    let definitions = definitions::extract(path, language, &scopes, captures)?;
    let references = references::extract(&scopes, captures)?;

    debug!(
        path,
        scopes = scopes.len(),
        definitions = definitions.len(),
        references = references.len(),
        "indexed file"
    );

    Ok(FileIndex {
        file,
        path: Arc::from(path),
        language,
        scopes,
        definitions,
        references,
    })
}
