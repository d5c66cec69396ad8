//! Project-wide registries built by folding per-file indexes.
//!
//! Indexing is per-file and parallel; the registries are the sequential fold
//! over its results. Every registry supports whole-file replacement
//! (`update_file`) and removal, both idempotent, so incremental updates are
//! just re-index-then-replace.

mod definitions;
mod exports;
mod imports;
mod scopes;

pub use definitions::DefinitionRegistry;
pub use exports::{Export, ExportRegistry};
pub use imports::{ImportEdge, ImportGraph};
pub use scopes::ScopeRegistry;

use crate::base::FileId;
use crate::index::FileIndex;

/// The four registries, updated together so they never disagree about which
/// files are present.
#[derive(Debug, Default)]
pub struct ProjectRegistries {
    pub definitions: DefinitionRegistry,
    pub exports: ExportRegistry,
    pub imports: ImportGraph,
    pub scopes: ScopeRegistry,
}

impl ProjectRegistries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's index into the registries, replacing any prior
    /// contribution from the same file.
    pub fn update_file(&mut self, index: &FileIndex) {
        self.definitions.update_file(index.file, &index.definitions);
        self.exports.update_file(index.file, &index.definitions);
        self.imports.update_file(index.file, &index.definitions);
        self.scopes.update_file(index.file, &index.scopes);
    }

    /// Purge every registry's contribution from `file`.
    pub fn remove_file(&mut self, file: FileId) {
        self.definitions.remove_file(file);
        self.exports.remove_file(file);
        self.imports.remove_file(file);
        self.scopes.remove_file(file);
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
        self.exports.clear();
        self.imports.clear();
        self.scopes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Language, LineCol, Location};
    use crate::capture::{Capture, CaptureKind, CaptureMeta};
    use crate::index::index_file;

    fn loc(start: (u32, u32), end: (u32, u32)) -> Location {
        Location::new(
            FileId::new(0),
            LineCol::new(start.0, start.1),
            LineCol::new(end.0, end.1),
        )
    }

    fn sample_index() -> FileIndex {
        let text = "export function run() {}\nimport { x } from './a';";
        let captures = vec![
            Capture::new(CaptureKind::FunctionDef, "run", loc((0, 7), (0, 24))).with_meta(
                CaptureMeta {
                    is_exported: true,
                    ..Default::default()
                },
            ),
            Capture::new(CaptureKind::ImportDef, "x", loc((1, 0), (1, 25))).with_meta(
                CaptureMeta {
                    source: Some("./a".into()),
                    ..Default::default()
                },
            ),
        ];
        index_file(FileId::new(0), "b.ts", Language::TypeScript, text, &captures).unwrap()
    }

    #[test]
    fn test_update_file_populates_all_registries() {
        let mut registries = ProjectRegistries::new();
        registries.update_file(&sample_index());

        assert_eq!(registries.definitions.len(), 2);
        assert!(registries.exports.lookup(FileId::new(0), "run").is_some());
        assert!(registries.imports.lookup(FileId::new(0), "x").is_some());
        assert!(registries.scopes.root_of(FileId::new(0)).is_some());
    }

    #[test]
    fn test_remove_file_clears_all_registries() {
        let mut registries = ProjectRegistries::new();
        registries.update_file(&sample_index());
        registries.remove_file(FileId::new(0));

        assert!(registries.definitions.is_empty());
        assert!(registries.exports.lookup(FileId::new(0), "run").is_none());
        assert!(registries.imports.edges_of(FileId::new(0)).is_empty());
        assert!(registries.scopes.is_empty());
    }

    #[test]
    fn test_update_twice_is_idempotent() {
        let mut registries = ProjectRegistries::new();
        let index = sample_index();
        registries.update_file(&index);
        registries.update_file(&index);

        assert_eq!(registries.definitions.len(), 2);
        assert_eq!(registries.scopes.len(), index.scopes.len());
    }
}
