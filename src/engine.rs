//! Reference resolution over the whole project.
//!
//! One run takes the current registries, builds a fresh [`Resolver`] and
//! [`TypeContext`], and resolves every reference of every file into a
//! [`ResolutionSnapshot`]. Plain name references resolve to at most one
//! target; member accesses may resolve to several candidates, each carrying
//! a confidence grade, and consumers decide how conservative to be.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::base::{FileId, ScopeId, SymbolId};
use crate::capture::ModuleResolver;
use crate::error::UnresolvedReason;
use crate::index::{DefKind, FileIndex, RefKind, Reference, ScopeKind};
use crate::registry::ProjectRegistries;
use crate::resolve::Resolver;
use crate::types::TypeContext;

/// How sure the engine is about one candidate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    /// Unique target: scope-chain hit or member of a known concrete type.
    Direct,
    /// One of N implementations behind an interface.
    High,
    /// Name-based guess on a receiver of unknown type.
    Low,
}

/// Why a candidate was selected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    Direct,
    InterfaceImplementation,
    Heuristic,
}

/// One candidate target of a reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub target: SymbolId,
    pub confidence: Confidence,
    pub reason: Reason,
}

impl Resolution {
    fn direct(target: SymbolId) -> Self {
        Self {
            target,
            confidence: Confidence::Direct,
            reason: Reason::Direct,
        }
    }
}

/// The outcome for one reference: zero or more candidates, or a reason.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub resolutions: Vec<Resolution>,
    /// Set exactly when `resolutions` is empty.
    pub unresolved: Option<UnresolvedReason>,
}

impl ResolvedReference {
    fn resolved(resolutions: Vec<Resolution>) -> Self {
        Self {
            resolutions,
            unresolved: None,
        }
    }

    fn unresolved(reason: UnresolvedReason) -> Self {
        Self {
            resolutions: Vec::new(),
            unresolved: Some(reason),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.resolutions.is_empty()
    }
}

/// All resolution outcomes of one run, positionally parallel to each file's
/// reference list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSnapshot {
    files: FxHashMap<FileId, Vec<ResolvedReference>>,
    unresolved_counts: FxHashMap<UnresolvedReason, usize>,
}

impl ResolutionSnapshot {
    /// Outcomes for `file`, in the same order as its reference list.
    pub fn file_outcomes(&self, file: FileId) -> &[ResolvedReference] {
        self.files.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The outcome of the reference at index `i` of `file`.
    pub fn outcome(&self, file: FileId, i: usize) -> Option<&ResolvedReference> {
        self.files.get(&file)?.get(i)
    }

    /// How many references failed to resolve, per reason.
    pub fn unresolved_count(&self, reason: UnresolvedReason) -> usize {
        self.unresolved_counts.get(&reason).copied().unwrap_or(0)
    }

    /// How many of `file`'s references failed to resolve.
    pub fn unresolved_in(&self, file: FileId) -> usize {
        self.file_outcomes(file)
            .iter()
            .filter(|o| o.unresolved.is_some())
            .count()
    }

    /// Iterate every (file, outcomes) pair.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &[ResolvedReference])> {
        self.files.iter().map(|(f, v)| (*f, v.as_slice()))
    }

    /// Absorb a partial re-resolution: `other`'s files replace this
    /// snapshot's entries for the same files.
    pub fn merge(&mut self, other: ResolutionSnapshot) {
        for (file, outcomes) in other.files {
            self.files.insert(file, outcomes);
        }
        self.recount();
    }

    /// Drop a removed file's outcomes.
    pub fn remove_file(&mut self, file: FileId) {
        if self.files.remove(&file).is_some() {
            self.recount();
        }
    }

    fn recount(&mut self) {
        self.unresolved_counts.clear();
        for outcomes in self.files.values() {
            for outcome in outcomes {
                if let Some(reason) = outcome.unresolved {
                    *self.unresolved_counts.entry(reason).or_insert(0) += 1;
                }
            }
        }
    }
}

/// Resolve every reference of every index into a snapshot.
pub fn resolve_project(
    indices: &FxHashMap<FileId, FileIndex>,
    registries: &ProjectRegistries,
    modules: &dyn ModuleResolver,
) -> ResolutionSnapshot {
    resolve_files(indices.values(), registries, modules)
}

/// Resolve the references of a subset of files. Registries and type facts
/// still cover the whole project; only the outcome set is partial.
pub fn resolve_files<'i>(
    files: impl Iterator<Item = &'i FileIndex>,
    registries: &ProjectRegistries,
    modules: &dyn ModuleResolver,
) -> ResolutionSnapshot {
    let resolver = Resolver::new(registries, modules);
    let types = TypeContext::build(registries, &resolver);
    let engine = Engine {
        registries,
        resolver: &resolver,
        types: &types,
        owners: type_owners(registries),
    };

    let mut snapshot = ResolutionSnapshot::default();
    let mut resolved = 0usize;
    for index in files {
        let outcomes: Vec<ResolvedReference> = index
            .references
            .iter()
            .map(|reference| engine.resolve_reference(reference))
            .collect();
        for outcome in &outcomes {
            match outcome.unresolved {
                Some(reason) => *snapshot.unresolved_counts.entry(reason).or_insert(0) += 1,
                None => resolved += 1,
            }
        }
        snapshot.files.insert(index.file, outcomes);
    }

    info!(
        files = snapshot.files.len(),
        resolved,
        unresolved = snapshot.unresolved_counts.values().sum::<usize>(),
        "resolved references"
    );

    snapshot
}

/// Files whose resolution may change when `changed` changes: the file itself
/// plus its transitive importers.
pub fn affected_files(
    registries: &ProjectRegistries,
    modules: &dyn ModuleResolver,
    changed: FileId,
) -> Vec<FileId> {
    let mut affected = vec![changed];
    let mut seen: rustc_hash::FxHashSet<FileId> = [changed].into_iter().collect();
    let mut frontier = vec![changed];

    while let Some(file) = frontier.pop() {
        for importer in registries.imports.importers_of(file, modules) {
            if seen.insert(importer) {
                affected.push(importer);
                frontier.push(importer);
            }
        }
    }

    affected.sort();
    affected
}

/// Map from a type's body scope to the type symbol that owns it. Used to
/// answer "which class is `self` in here".
fn type_owners(registries: &ProjectRegistries) -> FxHashMap<ScopeId, SymbolId> {
    let mut owners = FxHashMap::default();
    for def in registries.definitions.iter() {
        if !matches!(def.kind, DefKind::Class { .. } | DefKind::Interface { .. }) {
            continue;
        }
        if let Some(body) = registries.scopes.body_scope_of(def) {
            owners.insert(body.id.clone(), def.id.clone());
        }
    }
    owners
}

struct Engine<'a> {
    registries: &'a ProjectRegistries,
    resolver: &'a Resolver<'a>,
    types: &'a TypeContext,
    owners: FxHashMap<ScopeId, SymbolId>,
}

impl Engine<'_> {
    fn resolve_reference(&self, reference: &Reference) -> ResolvedReference {
        match &reference.kind {
            RefKind::FunctionCall
            | RefKind::ConstructorCall
            | RefKind::VariableRef
            | RefKind::TypeRef
            | RefKind::Assignment { .. } => self.resolve_name(&reference.scope, &reference.name),
            RefKind::MethodCall { receiver, .. } | RefKind::PropertyAccess { receiver, .. } => {
                self.resolve_member(&reference.scope, receiver.as_deref(), &reference.name)
            }
        }
    }

    fn resolve_name(&self, scope: &ScopeId, name: &str) -> ResolvedReference {
        match self.resolver.resolve(scope, name) {
            Ok(target) => ResolvedReference::resolved(vec![Resolution::direct(target)]),
            Err(reason) => ResolvedReference::unresolved(reason),
        }
    }

    fn resolve_member(
        &self,
        scope: &ScopeId,
        receiver: Option<&str>,
        name: &str,
    ) -> ResolvedReference {
        let receiver_type = match receiver {
            Some("self") | Some("this") => self.enclosing_type(scope),
            Some(recv) => self
                .resolver
                .resolve(scope, recv)
                .ok()
                .and_then(|var| self.types.type_of(&var).cloned()),
            None => None,
        };

        match receiver_type {
            Some(type_id) => self.dispatch(&type_id, name),
            None => self.heuristic(name),
        }
    }

    /// The type whose body encloses `scope`, for `self`/`this` receivers.
    fn enclosing_type(&self, scope: &ScopeId) -> Option<SymbolId> {
        self.registries
            .scopes
            .ancestors(scope)
            .filter(|s| s.kind == ScopeKind::Class)
            .find_map(|s| self.owners.get(&s.id).cloned())
    }

    /// Dispatch `name` on a receiver of known type.
    fn dispatch(&self, type_id: &SymbolId, name: &str) -> ResolvedReference {
        let Some(member) = self.types.member(type_id, name) else {
            return self.heuristic(name);
        };

        let is_interface = self
            .registries
            .definitions
            .get(type_id)
            .is_some_and(|d| matches!(d.kind, DefKind::Interface { .. }));
        if !is_interface {
            return ResolvedReference::resolved(vec![Resolution::direct(member.clone())]);
        }

        // Interface dispatch: one candidate per implementation. With no
        // implementers in the project, the interface's own member stands.
        let mut resolutions: Vec<Resolution> = self
            .types
            .implementers_of(type_id)
            .iter()
            .filter_map(|implementer| self.types.member(implementer, name))
            .map(|target| Resolution {
                target: target.clone(),
                confidence: Confidence::High,
                reason: Reason::InterfaceImplementation,
            })
            .collect();
        if resolutions.is_empty() {
            resolutions.push(Resolution::direct(member.clone()));
        }
        ResolvedReference::resolved(resolutions)
    }

    /// Receiver type unknown: every type with a matching member is a
    /// low-confidence candidate.
    fn heuristic(&self, name: &str) -> ResolvedReference {
        let mut resolutions: Vec<Resolution> = self
            .types
            .types_with_member(name)
            .map(|(_, target)| Resolution {
                target: target.clone(),
                confidence: Confidence::Low,
                reason: Reason::Heuristic,
            })
            .collect();
        if resolutions.is_empty() {
            return ResolvedReference::unresolved(UnresolvedReason::NotFound);
        }
        resolutions.sort_by(|a, b| a.target.cmp(&b.target));
        resolutions.dedup();
        ResolvedReference::resolved(resolutions)
    }
}
