//! Call graph construction over a resolution snapshot.
//!
//! Nodes are callable definitions; an edge runs from the callable whose body
//! encloses a call site to each candidate target of that call. Multi-
//! candidate resolutions contribute one edge per candidate, so the graph
//! over-approximates rather than drops calls it cannot pin down.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::base::{FileId, ScopeId, SymbolId};
use crate::engine::ResolutionSnapshot;
use crate::index::{FileIndex, RefKind};
use crate::registry::ProjectRegistries;

/// The project call graph, with both edge directions materialized.
#[derive(Debug, Default)]
pub struct CallGraph {
    callees: FxHashMap<SymbolId, IndexSet<SymbolId>>,
    callers: FxHashMap<SymbolId, IndexSet<SymbolId>>,
    /// Every symbol that appears as a call target, module-level calls
    /// included. The complement over callables is the entry-point set.
    called: FxHashSet<SymbolId>,
}

impl CallGraph {
    /// Build the graph from the snapshot's call resolutions.
    pub fn build(
        indices: &FxHashMap<FileId, FileIndex>,
        registries: &ProjectRegistries,
        snapshot: &ResolutionSnapshot,
    ) -> Self {
        // Callable body scope → owning symbol, for locating call sites'
        // enclosing callables.
        let mut owners: FxHashMap<ScopeId, SymbolId> = FxHashMap::default();
        for def in registries.definitions.iter() {
            if !def.kind.is_callable() {
                continue;
            }
            if let Some(body) = registries.scopes.body_scope_of(def) {
                owners.insert(body.id.clone(), def.id.clone());
            }
        }

        let mut graph = Self::default();
        for (file, index) in indices {
            let outcomes = snapshot.file_outcomes(*file);
            for (reference, outcome) in index.references.iter().zip(outcomes) {
                if !matches!(
                    reference.kind,
                    RefKind::FunctionCall
                        | RefKind::MethodCall { .. }
                        | RefKind::ConstructorCall
                ) {
                    continue;
                }

                // Caller is the nearest enclosing callable; a module-level
                // call has none but still marks its targets as called.
                let caller = registries
                    .scopes
                    .ancestors(&reference.scope)
                    .find_map(|s| owners.get(&s.id));

                for resolution in &outcome.resolutions {
                    graph.called.insert(resolution.target.clone());
                    if let Some(caller) = caller {
                        graph
                            .callees
                            .entry(caller.clone())
                            .or_default()
                            .insert(resolution.target.clone());
                        graph
                            .callers
                            .entry(resolution.target.clone())
                            .or_default()
                            .insert(caller.clone());
                    }
                }
            }
        }

        debug!(
            nodes = graph.callees.len(),
            called = graph.called.len(),
            "built call graph"
        );

        graph
    }

    /// Symbols called from the body of `caller`.
    pub fn callees(&self, caller: &SymbolId) -> impl Iterator<Item = &SymbolId> {
        self.callees.get(caller).into_iter().flatten()
    }

    /// Callables whose bodies call `callee`.
    pub fn callers(&self, callee: &SymbolId) -> impl Iterator<Item = &SymbolId> {
        self.callers.get(callee).into_iter().flatten()
    }

    /// Whether any call site resolves to `id`.
    pub fn is_called(&self, id: &SymbolId) -> bool {
        self.called.contains(id)
    }

    /// Callable definitions no call site resolves to, sorted for stable
    /// output.
    pub fn entry_points(&self, registries: &ProjectRegistries) -> Vec<SymbolId> {
        let mut entries: Vec<SymbolId> = registries
            .definitions
            .iter()
            .filter(|def| def.kind.is_callable() && !self.called.contains(&def.id))
            .map(|def| def.id.clone())
            .collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Language, LineCol, Location};
    use crate::capture::{Capture, CaptureKind, StaticModuleResolver};
    use crate::engine::resolve_project;
    use crate::index::index_file;

    fn loc(start: (u32, u32), end: (u32, u32)) -> Location {
        Location::new(
            FileId::new(0),
            LineCol::new(start.0, start.1),
            LineCol::new(end.0, end.1),
        )
    }

    fn scope_cap(kind: CaptureKind, name: &str, text: &str, start: (u32, u32)) -> Capture {
        let mut line = start.0;
        let mut col = start.1;
        for c in text.chars() {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        Capture::new(
            kind,
            name,
            Location::new(
                FileId::new(0),
                LineCol::new(start.0, start.1),
                LineCol::new(line, col),
            ),
        )
        .with_text(text)
    }

    /// `main` calls `helper`; nothing calls `main`.
    fn call_chain() -> (FxHashMap<FileId, FileIndex>, ProjectRegistries) {
        let text = "function helper() {}\nfunction main() {\n  helper();\n}";
        let captures = vec![
            scope_cap(
                CaptureKind::FunctionScope,
                "helper",
                "function helper() {}",
                (0, 0),
            ),
            Capture::new(CaptureKind::FunctionDef, "helper", loc((0, 0), (0, 20))),
            scope_cap(
                CaptureKind::FunctionScope,
                "main",
                "function main() {\n  helper();\n}",
                (1, 0),
            ),
            Capture::new(CaptureKind::FunctionDef, "main", loc((1, 0), (3, 1))),
            Capture::new(CaptureKind::FunctionCall, "helper", loc((2, 2), (2, 10))),
        ];
        let index =
            index_file(FileId::new(0), "a.ts", Language::TypeScript, text, &captures).unwrap();
        let mut registries = ProjectRegistries::new();
        registries.update_file(&index);
        let mut indices = FxHashMap::default();
        indices.insert(FileId::new(0), index);
        (indices, registries)
    }

    fn id_of(registries: &ProjectRegistries, name: &str) -> SymbolId {
        registries
            .definitions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.clone())
            .unwrap()
    }

    #[test]
    fn test_edges_and_entry_points() {
        let (indices, registries) = call_chain();
        let modules = StaticModuleResolver::new();
        let snapshot = resolve_project(&indices, &registries, &modules);

        let graph = CallGraph::build(&indices, &registries, &snapshot);

        let main = id_of(&registries, "main");
        let helper = id_of(&registries, "helper");

        assert_eq!(graph.callees(&main).collect::<Vec<_>>(), vec![&helper]);
        assert_eq!(graph.callers(&helper).collect::<Vec<_>>(), vec![&main]);
        assert!(graph.is_called(&helper));
        assert_eq!(graph.entry_points(&registries), vec![main]);
    }

    #[test]
    fn test_module_level_call_marks_called_without_caller() {
        let text = "function run() {}\nrun();";
        let captures = vec![
            scope_cap(CaptureKind::FunctionScope, "run", "function run() {}", (0, 0)),
            Capture::new(CaptureKind::FunctionDef, "run", loc((0, 0), (0, 17))),
            Capture::new(CaptureKind::FunctionCall, "run", loc((1, 0), (1, 5))),
        ];
        let index =
            index_file(FileId::new(0), "a.ts", Language::TypeScript, text, &captures).unwrap();
        let mut registries = ProjectRegistries::new();
        registries.update_file(&index);
        let mut indices = FxHashMap::default();
        indices.insert(FileId::new(0), index);

        let modules = StaticModuleResolver::new();
        let snapshot = resolve_project(&indices, &registries, &modules);
        let graph = CallGraph::build(&indices, &registries, &snapshot);

        let run = id_of(&registries, "run");
        assert!(graph.is_called(&run));
        assert_eq!(graph.callers(&run).count(), 0);
        assert!(graph.entry_points(&registries).is_empty());
    }
}
