//! Import graph — which file imports what from where.
//!
//! Edges are kept per importing file with the *specifier as written*; the
//! [`ModuleResolver`](crate::capture::ModuleResolver) turns specifiers into
//! file ids at query time, so the graph never goes stale when the module
//! layout changes.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{FileId, SymbolId};
use crate::capture::ModuleResolver;
use crate::index::{DefKind, Definition};

/// One import binding in a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportEdge {
    /// The import definition's symbol id.
    pub symbol: SymbolId,
    /// The name as exported by the source module.
    pub name: SmolStr,
    /// The module specifier as written.
    pub source: SmolStr,
    /// Local alias, if the binding renames the import.
    pub alias: Option<SmolStr>,
    pub is_reexport: bool,
}

impl ImportEdge {
    /// The name this binding is visible under in the importing file.
    pub fn local_name(&self) -> &SmolStr {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// All import edges of the project, keyed by importing file.
#[derive(Debug, Default)]
pub struct ImportGraph {
    edges: FxHashMap<FileId, Vec<ImportEdge>>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a file's import edges from its definitions.
    pub fn update_file(&mut self, file: FileId, definitions: &[Definition]) {
        let edges: Vec<ImportEdge> = definitions
            .iter()
            .filter_map(|def| match &def.kind {
                DefKind::Import {
                    source,
                    alias,
                    is_reexport,
                } => Some(ImportEdge {
                    symbol: def.id.clone(),
                    name: def.name.clone(),
                    source: source.clone(),
                    alias: alias.clone(),
                    is_reexport: *is_reexport,
                }),
                _ => None,
            })
            .collect();

        if edges.is_empty() {
            self.edges.remove(&file);
        } else {
            self.edges.insert(file, edges);
        }
    }

    pub fn remove_file(&mut self, file: FileId) {
        self.edges.remove(&file);
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// The import edges of `file`.
    pub fn edges_of(&self, file: FileId) -> &[ImportEdge] {
        self.edges.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find the import binding visible under `local_name` in `file`.
    pub fn lookup(&self, file: FileId, local_name: &str) -> Option<&ImportEdge> {
        self.edges_of(file)
            .iter()
            .find(|edge| edge.local_name() == local_name)
    }

    /// Files that import (directly) from `target`, under `modules`.
    ///
    /// Drives incremental re-resolution: a change to `target` invalidates
    /// exactly these files and their transitive importers.
    pub fn importers_of(&self, target: FileId, modules: &dyn ModuleResolver) -> Vec<FileId> {
        let mut importers: Vec<FileId> = self
            .edges
            .iter()
            .filter(|(from, edges)| {
                edges
                    .iter()
                    .any(|edge| modules.resolve_specifier(**from, &edge.source) == Some(target))
            })
            .map(|(from, _)| *from)
            .collect();
        importers.sort();
        importers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{LineCol, Location, ScopeId};
    use crate::capture::StaticModuleResolver;

    fn import_def(path: &str, name: &str, source: &str, alias: Option<&str>) -> Definition {
        let location = Location::new(FileId::new(0), LineCol::new(0, 0), LineCol::new(0, 30));
        Definition {
            id: SymbolId::derive("import", path, name, location.start),
            name: name.into(),
            kind: DefKind::Import {
                source: source.into(),
                alias: alias.map(Into::into),
                is_reexport: false,
            },
            location,
            defining_scope: ScopeId::derive(path, 0),
            export: None,
        }
    }

    #[test]
    fn test_lookup_uses_alias_as_local_name() {
        let mut graph = ImportGraph::new();
        graph.update_file(
            FileId::new(1),
            &[import_def("b.ts", "helper", "./a", Some("h"))],
        );

        let edge = graph.lookup(FileId::new(1), "h").unwrap();
        assert_eq!(edge.name.as_str(), "helper");
        // The original name is shadowed by the alias.
        assert!(graph.lookup(FileId::new(1), "helper").is_none());
    }

    #[test]
    fn test_importers_of() {
        let mut resolver = StaticModuleResolver::new();
        resolver.insert(FileId::new(1), "./a", FileId::new(0));
        resolver.insert(FileId::new(2), "./a", FileId::new(0));

        let mut graph = ImportGraph::new();
        graph.update_file(FileId::new(1), &[import_def("b.ts", "x", "./a", None)]);
        graph.update_file(FileId::new(2), &[import_def("c.ts", "y", "./a", None)]);
        graph.update_file(FileId::new(3), &[import_def("d.ts", "z", "./other", None)]);

        let importers = graph.importers_of(FileId::new(0), &resolver);
        assert_eq!(importers, vec![FileId::new(1), FileId::new(2)]);
    }

    #[test]
    fn test_remove_file_drops_edges() {
        let mut graph = ImportGraph::new();
        graph.update_file(FileId::new(1), &[import_def("b.ts", "x", "./a", None)]);
        graph.remove_file(FileId::new(1));

        assert!(graph.edges_of(FileId::new(1)).is_empty());
    }
}
