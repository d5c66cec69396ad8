//! Definition registry — id-keyed aggregation of all files' definitions.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{FileId, ScopeId, SymbolId};
use crate::index::Definition;

/// All definitions across the project, with reverse indices for scoped name
/// lookup.
///
/// Holds the definitions themselves (the per-file index keeps only its own
/// copy until `update_file` hands them over); every other registry stores
/// ids pointing in here.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    by_id: FxHashMap<SymbolId, Definition>,
    by_scope: FxHashMap<ScopeId, Vec<SymbolId>>,
    by_name: FxHashMap<SmolStr, Vec<SymbolId>>,
    by_file: FxHashMap<FileId, Vec<SymbolId>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a file's definitions. Idempotent: prior contributions are
    /// purged first.
    pub fn update_file(&mut self, file: FileId, definitions: &[Definition]) {
        self.remove_file(file);

        let mut ids = Vec::with_capacity(definitions.len());
        for def in definitions {
            self.by_scope
                .entry(def.defining_scope.clone())
                .or_default()
                .push(def.id.clone());
            self.by_name
                .entry(def.local_name().clone())
                .or_default()
                .push(def.id.clone());
            ids.push(def.id.clone());
            self.by_id.insert(def.id.clone(), def.clone());
        }
        self.by_file.insert(file, ids);
    }

    /// Purge all of a file's definitions, including reverse indices.
    pub fn remove_file(&mut self, file: FileId) {
        let Some(ids) = self.by_file.remove(&file) else {
            return;
        };
        for id in ids {
            if let Some(def) = self.by_id.remove(&id) {
                if let Some(list) = self.by_scope.get_mut(&def.defining_scope) {
                    list.retain(|i| *i != id);
                    if list.is_empty() {
                        self.by_scope.remove(&def.defining_scope);
                    }
                }
                if let Some(list) = self.by_name.get_mut(def.local_name()) {
                    list.retain(|i| *i != id);
                    if list.is_empty() {
                        self.by_name.remove(def.local_name());
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_scope.clear();
        self.by_name.clear();
        self.by_file.clear();
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &SymbolId) -> Option<&Definition> {
        self.by_id.get(id)
    }

    /// Find a definition binding `name` in exactly `scope`.
    ///
    /// This is the single step of the resolver's chain walk. Matching is on
    /// the locally bound name, so a renamed import is found under its alias
    /// and never under the source-module name.
    pub fn lookup_in_scope(&self, scope: &ScopeId, name: &str) -> Option<&Definition> {
        self.by_scope
            .get(scope)?
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .find(|def| def.local_name() == name)
    }

    /// All definitions bound under `name`, project-wide.
    pub fn with_name(&self, name: &str) -> impl Iterator<Item = &Definition> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    /// All definitions declared directly in `scope`.
    pub fn in_scope(&self, scope: &ScopeId) -> impl Iterator<Item = &Definition> {
        self.by_scope
            .get(scope)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    /// All definitions contributed by `file`.
    pub fn in_file(&self, file: FileId) -> impl Iterator<Item = &Definition> {
        self.by_file
            .get(&file)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    /// Iterate every definition in the registry.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{LineCol, Location};
    use crate::index::DefKind;

    fn make_def(name: &str, file: u32, line: u32) -> Definition {
        let location = Location::new(
            FileId::new(file),
            LineCol::new(line, 0),
            LineCol::new(line, 10),
        );
        Definition {
            id: SymbolId::derive("function", "a.ts", name, location.start),
            name: name.into(),
            kind: DefKind::Function { return_type: None },
            location,
            defining_scope: ScopeId::derive("a.ts", 0),
            export: None,
        }
    }

    #[test]
    fn test_update_file_is_idempotent() {
        let mut registry = DefinitionRegistry::new();
        let defs = vec![make_def("a", 0, 1), make_def("b", 0, 2)];

        registry.update_file(FileId::new(0), &defs);
        registry.update_file(FileId::new(0), &defs);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.with_name("a").count(), 1);
    }

    #[test]
    fn test_remove_file_purges_reverse_indices() {
        let mut registry = DefinitionRegistry::new();
        registry.update_file(FileId::new(0), &[make_def("a", 0, 1)]);
        registry.update_file(FileId::new(1), &[make_def("b", 1, 1)]);

        registry.remove_file(FileId::new(0));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.with_name("a").count(), 0);
        assert_eq!(registry.with_name("b").count(), 1);
        let scope = ScopeId::derive("a.ts", 0);
        assert!(registry.lookup_in_scope(&scope, "a").is_none());
    }

    #[test]
    fn test_renamed_import_binds_alias_not_source_name() {
        let location = Location::new(FileId::new(0), LineCol::new(0, 0), LineCol::new(0, 30));
        let import = Definition {
            id: SymbolId::derive("import", "a.ts", "helper", location.start),
            name: "helper".into(),
            kind: DefKind::Import {
                source: "./lib".into(),
                alias: Some("h".into()),
                is_reexport: false,
            },
            location,
            defining_scope: ScopeId::derive("a.ts", 0),
            export: None,
        };
        let mut registry = DefinitionRegistry::new();
        registry.update_file(FileId::new(0), std::slice::from_ref(&import));

        let scope = ScopeId::derive("a.ts", 0);
        assert!(registry.lookup_in_scope(&scope, "h").is_some());
        assert!(registry.lookup_in_scope(&scope, "helper").is_none());
        assert_eq!(registry.with_name("h").count(), 1);
        assert_eq!(registry.with_name("helper").count(), 0);

        // Purging must clean the alias-keyed reverse index too.
        registry.remove_file(FileId::new(0));
        assert_eq!(registry.with_name("h").count(), 0);
    }

    #[test]
    fn test_lookup_in_scope() {
        let mut registry = DefinitionRegistry::new();
        registry.update_file(FileId::new(0), &[make_def("a", 0, 1)]);

        let scope = ScopeId::derive("a.ts", 0);
        assert!(registry.lookup_in_scope(&scope, "a").is_some());
        assert!(registry.lookup_in_scope(&scope, "missing").is_none());

        let other_scope = ScopeId::derive("b.ts", 0);
        assert!(registry.lookup_in_scope(&other_scope, "a").is_none());
    }
}
