//! Scope-aware name resolution.
//!
//! Resolution walks the scope chain innermost-first, so the nearest
//! definition shadows outer ones. A hit on an import binding hands off to
//! the cross-file chase: specifier → file (via the
//! [`ModuleResolver`](crate::capture::ModuleResolver) oracle) → export table,
//! following re-export chains with a visited set so cycles terminate with a
//! reported reason instead of looping.
//!
//! Results are memoized per (scope, name); the cache lives for one
//! resolution run and is rebuilt from scratch after any file change.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use crate::base::{FileId, ScopeId, SymbolId};
use crate::capture::ModuleResolver;
use crate::error::UnresolvedReason;
use crate::index::{DefKind, Definition};
use crate::registry::{Export, ProjectRegistries};

/// One resolution run over a fixed registry state.
///
/// Borrowed, not owned: the resolver is created per run and discarded, which
/// is what keeps the memo table trivially consistent.
pub struct Resolver<'a> {
    registries: &'a ProjectRegistries,
    modules: &'a dyn ModuleResolver,
    cache: RefCell<FxHashMap<(ScopeId, SmolStr), Result<SymbolId, UnresolvedReason>>>,
    cache_enabled: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(registries: &'a ProjectRegistries, modules: &'a dyn ModuleResolver) -> Self {
        Self {
            registries,
            modules,
            cache: RefCell::new(FxHashMap::default()),
            cache_enabled: true,
        }
    }

    /// A resolver that skips memoization. Used to cross-check that caching
    /// never changes results.
    pub fn without_cache(registries: &'a ProjectRegistries, modules: &'a dyn ModuleResolver) -> Self {
        Self {
            cache_enabled: false,
            ..Self::new(registries, modules)
        }
    }

    /// Resolve `name` starting at `scope`, without crossing file boundaries.
    ///
    /// Returns the definition found by the innermost-first chain walk; the
    /// hit may be an import binding.
    pub fn resolve_local(&self, scope: &ScopeId, name: &str) -> Option<&Definition> {
        self.registries
            .scopes
            .ancestors(scope)
            .find_map(|s| self.registries.definitions.lookup_in_scope(&s.id, name))
    }

    /// Resolve `name` starting at `scope`, chasing imports across files.
    pub fn resolve(&self, scope: &ScopeId, name: &str) -> Result<SymbolId, UnresolvedReason> {
        if self.cache_enabled {
            let key = (scope.clone(), SmolStr::new(name));
            if let Some(hit) = self.cache.borrow().get(&key) {
                return hit.clone();
            }
            let result = self.resolve_uncached(scope, name);
            self.cache.borrow_mut().insert(key, result.clone());
            result
        } else {
            self.resolve_uncached(scope, name)
        }
    }

    fn resolve_uncached(&self, scope: &ScopeId, name: &str) -> Result<SymbolId, UnresolvedReason> {
        let Some(def) = self.resolve_local(scope, name) else {
            trace!(%scope, name, "name not found in scope chain");
            return Err(UnresolvedReason::NotFound);
        };

        match &def.kind {
            DefKind::Import { source, .. } => {
                let from = def.location.file;
                let Some(target) = self.modules.resolve_specifier(from, source) else {
                    return Err(UnresolvedReason::MissingExternal);
                };
                // `def.name` is the name as exported by the source module;
                // the local alias only matters for the chain walk above.
                self.resolve_export(target, &def.name)
            }
            _ => Ok(def.id.clone()),
        }
    }

    /// Resolve what `file` exports under `name`, following re-export chains.
    pub fn resolve_export(
        &self,
        file: FileId,
        name: &str,
    ) -> Result<SymbolId, UnresolvedReason> {
        let mut file = file;
        let mut name = SmolStr::new(name);
        let mut visited: FxHashSet<(FileId, SmolStr)> = FxHashSet::default();
        visited.insert((file, name.clone()));

        loop {
            match self.registries.exports.lookup(file, &name) {
                None => return Err(UnresolvedReason::NotFound),
                Some(Export::Local(id)) => return Ok(id.clone()),
                Some(Export::Reexport {
                    source,
                    imported_name,
                }) => {
                    let Some(next) = self.modules.resolve_specifier(file, source) else {
                        return Err(UnresolvedReason::MissingExternal);
                    };
                    if !visited.insert((next, imported_name.clone())) {
                        trace!(?next, name = %imported_name, "re-export cycle");
                        return Err(UnresolvedReason::CyclicReexport);
                    }
                    file = next;
                    name = imported_name.clone();
                }
            }
        }
    }
}
