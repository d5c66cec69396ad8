//! Scope registry — the project-wide view over every file's scope tree.

use rustc_hash::FxHashMap;

use crate::base::{FileId, ScopeId};
use crate::index::{Definition, Scope, ScopeKind, ScopeTree};

/// All scopes of the project, parent-linked across a flat map.
///
/// Scope ids embed the file path, so scopes from different files never
/// collide and a file's contribution can be purged wholesale.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: FxHashMap<ScopeId, Scope>,
    roots: FxHashMap<FileId, ScopeId>,
    by_file: FxHashMap<FileId, Vec<ScopeId>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a file's scopes with its freshly built tree.
    pub fn update_file(&mut self, file: FileId, tree: &ScopeTree) {
        self.remove_file(file);

        let mut ids = Vec::with_capacity(tree.len());
        for scope in tree.iter() {
            ids.push(scope.id.clone());
            self.scopes.insert(scope.id.clone(), scope.clone());
        }
        self.roots.insert(file, tree.root().clone());
        self.by_file.insert(file, ids);
    }

    pub fn remove_file(&mut self, file: FileId) {
        if let Some(ids) = self.by_file.remove(&file) {
            for id in ids {
                self.scopes.remove(&id);
            }
        }
        self.roots.remove(&file);
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
        self.roots.clear();
        self.by_file.clear();
    }

    pub fn get(&self, id: &ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// The module root scope of `file`.
    pub fn root_of(&self, file: FileId) -> Option<&ScopeId> {
        self.roots.get(&file)
    }

    /// Walk the parent chain from `id` (inclusive) to the file's root.
    pub fn ancestors<'a>(&'a self, id: &ScopeId) -> impl Iterator<Item = &'a Scope> {
        let mut current = self.scopes.get(id);
        std::iter::from_fn(move || {
            let scope = current?;
            current = scope.parent.as_ref().and_then(|p| self.scopes.get(p));
            Some(scope)
        })
    }

    /// Whether `inner` is `outer` or transitively nested inside it.
    pub fn is_within(&self, inner: &ScopeId, outer: &ScopeId) -> bool {
        self.ancestors(inner).any(|s| &s.id == outer)
    }

    /// The scope a definition *introduces*: the child of the definition's
    /// enclosing scope whose construct sits inside the definition's span.
    ///
    /// `None` for definitions that introduce no scope (variables, imports).
    pub fn body_scope_of(&self, def: &Definition) -> Option<&Scope> {
        self.scopes.values().find(|scope| {
            scope.parent.as_ref() == Some(&def.defining_scope)
                && def.location.contains(&scope.construct)
        })
    }

    /// The nearest enclosing scope of `id` (inclusive) with kind `kind`.
    pub fn enclosing_of_kind(&self, id: &ScopeId, kind: ScopeKind) -> Option<&Scope> {
        self.ancestors(id).find(|s| s.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
