//! Lightweight type tracking for member dispatch.
//!
//! This is not a type checker. It tracks just enough to answer "what type
//! does this variable hold" — declared annotations, constructor calls, and
//! known return types — and builds per-type member indexes (inherited
//! members included) so `recv.method()` can dispatch to a definition.
//!
//! Binding priority when several sources disagree: an explicit annotation
//! beats a constructor call, which beats an inferred return type.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::SymbolId;
use crate::error::TypeError;
use crate::index::{DefKind, Definition};
use crate::registry::ProjectRegistries;
use crate::resolve::Resolver;

/// Where a variable's type binding came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingOrigin {
    /// Declared annotation (`x: Foo`).
    Annotation,
    /// Constructor call (`x = new Foo()`, `x = Foo()`).
    Constructor,
    /// Known return type of the initializing call.
    ReturnType,
}

/// A variable's tracked type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeBinding {
    /// The type name as written, before resolution.
    pub type_name: SmolStr,
    pub origin: BindingOrigin,
}

/// Name-to-member table of one type, inheritance flattened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberIndex {
    /// Member name → definition, nearest definition winning on override.
    pub members: IndexMap<SmolStr, SymbolId>,
    /// True when a supertype failed to resolve or the hierarchy is cyclic;
    /// lookups still work over the members that were collected.
    pub degraded: bool,
}

/// Project-wide type facts computed for one resolution run.
#[derive(Debug, Default)]
pub struct TypeContext {
    bindings: FxHashMap<SymbolId, TypeBinding>,
    resolved: FxHashMap<SymbolId, SymbolId>,
    members: FxHashMap<SymbolId, MemberIndex>,
    implementers: FxHashMap<SymbolId, Vec<SymbolId>>,
    errors: Vec<TypeError>,
}

impl TypeContext {
    /// Compute bindings, member indexes, and implementer lists over the
    /// current registry state.
    pub fn build(registries: &ProjectRegistries, resolver: &Resolver<'_>) -> Self {
        let mut ctx = Self::default();

        // Variable bindings first: they only need name resolution.
        for def in registries.definitions.iter() {
            let DefKind::Variable {
                annotation,
                constructed,
                call_target,
            } = &def.kind
            else {
                continue;
            };

            let binding = if let Some(annotation) = annotation {
                Some(TypeBinding {
                    type_name: annotation.clone(),
                    origin: BindingOrigin::Annotation,
                })
            } else if let Some(constructed) = constructed {
                Some(TypeBinding {
                    type_name: constructed.clone(),
                    origin: BindingOrigin::Constructor,
                })
            } else if let Some(call_target) = call_target {
                infer_from_call(registries, resolver, def, call_target)
            } else {
                None
            };

            let Some(binding) = binding else { continue };
            if let Ok(type_id) = resolver.resolve(&def.defining_scope, &binding.type_name) {
                let is_type = registries
                    .definitions
                    .get(&type_id)
                    .is_some_and(|d| d.kind.is_type());
                if is_type {
                    ctx.resolved.insert(def.id.clone(), type_id);
                }
            }
            ctx.bindings.insert(def.id.clone(), binding);
        }

        // Member indexes, inheritance flattened with cycle detection.
        let type_ids: Vec<SymbolId> = registries
            .definitions
            .iter()
            .filter(|d| matches!(d.kind, DefKind::Class { .. } | DefKind::Interface { .. }))
            .map(|d| d.id.clone())
            .collect();
        for id in &type_ids {
            let mut in_progress = FxHashSet::default();
            ctx.member_index(registries, resolver, id, &mut in_progress);
        }

        // Implementer lists: a class whose supertype resolves to an
        // interface implements it.
        for id in &type_ids {
            let Some(def) = registries.definitions.get(id) else { continue };
            if !matches!(def.kind, DefKind::Class { .. }) {
                continue;
            }
            for super_name in def.kind.supertypes() {
                let Ok(super_id) = resolver.resolve(&def.defining_scope, super_name) else {
                    continue;
                };
                let is_interface = registries
                    .definitions
                    .get(&super_id)
                    .is_some_and(|d| matches!(d.kind, DefKind::Interface { .. }));
                if is_interface {
                    ctx.implementers.entry(super_id).or_default().push(id.clone());
                }
            }
        }
        for list in ctx.implementers.values_mut() {
            list.sort();
        }

        debug!(
            bindings = ctx.bindings.len(),
            types = ctx.members.len(),
            errors = ctx.errors.len(),
            "built type context"
        );

        ctx
    }

    /// Build (and memoize) the member index of `type_id`.
    fn member_index(
        &mut self,
        registries: &ProjectRegistries,
        resolver: &Resolver<'_>,
        type_id: &SymbolId,
        in_progress: &mut FxHashSet<SymbolId>,
    ) -> MemberIndex {
        if let Some(done) = self.members.get(type_id) {
            return done.clone();
        }
        let Some(def) = registries.definitions.get(type_id) else {
            return MemberIndex::default();
        };

        in_progress.insert(type_id.clone());
        let mut index = MemberIndex::default();

        // Own members: everything defined directly in the type's body scope.
        if let Some(body) = registries.scopes.body_scope_of(def) {
            for member in registries.definitions.in_scope(&body.id) {
                if matches!(member.kind, DefKind::Import { .. }) {
                    continue;
                }
                index.members.insert(member.name.clone(), member.id.clone());
            }
        }

        // Inherited members fill the gaps; own members always win.
        for super_name in def.kind.supertypes() {
            let Ok(super_id) = resolver.resolve(&def.defining_scope, super_name) else {
                index.degraded = true;
                continue;
            };
            if in_progress.contains(&super_id) {
                self.errors.push(TypeError::CyclicInheritance {
                    type_name: def.name.clone(),
                });
                index.degraded = true;
                continue;
            }
            let inherited = self.member_index(registries, resolver, &super_id, in_progress);
            index.degraded |= inherited.degraded;
            for (name, id) in inherited.members {
                index.members.entry(name).or_insert(id);
            }
        }

        in_progress.remove(type_id);
        self.members.insert(type_id.clone(), index.clone());
        index
    }

    /// The tracked binding of a variable, if any.
    pub fn binding_of(&self, var: &SymbolId) -> Option<&TypeBinding> {
        self.bindings.get(var)
    }

    /// The resolved type symbol of a variable, if its binding resolved.
    pub fn type_of(&self, var: &SymbolId) -> Option<&SymbolId> {
        self.resolved.get(var)
    }

    /// The member index of a type.
    pub fn members_of(&self, type_id: &SymbolId) -> Option<&MemberIndex> {
        self.members.get(type_id)
    }

    /// Look up `name` among the (flattened) members of `type_id`.
    pub fn member(&self, type_id: &SymbolId, name: &str) -> Option<&SymbolId> {
        self.members.get(type_id)?.members.get(name)
    }

    /// Classes implementing the interface `type_id`, sorted.
    pub fn implementers_of(&self, type_id: &SymbolId) -> &[SymbolId] {
        self.implementers
            .get(type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every type with a member named `name`. The fallback for dispatch on
    /// receivers of unknown type.
    pub fn types_with_member<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = (&'s SymbolId, &'s SymbolId)> {
        self.members
            .iter()
            .filter_map(move |(type_id, index)| Some((type_id, index.members.get(name)?)))
    }

    /// Hierarchy errors found while flattening inheritance.
    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }
}

/// Infer a binding for `x = f(...)`: a callee resolving to a class is a
/// constructor call; one resolving to a function with a declared return
/// type yields that type.
fn infer_from_call(
    registries: &ProjectRegistries,
    resolver: &Resolver<'_>,
    def: &Definition,
    call_target: &SmolStr,
) -> Option<TypeBinding> {
    let callee_id = resolver.resolve(&def.defining_scope, call_target).ok()?;
    let callee = registries.definitions.get(&callee_id)?;
    match &callee.kind {
        DefKind::Class { .. } => Some(TypeBinding {
            type_name: callee.name.clone(),
            origin: BindingOrigin::Constructor,
        }),
        DefKind::Function {
            return_type: Some(rt),
        } => Some(TypeBinding {
            type_name: rt.clone(),
            origin: BindingOrigin::ReturnType,
        }),
        _ => None,
    }
}
