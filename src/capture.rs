//! The parser-facing capture abstraction.
//!
//! The core never sees a syntax tree. A per-language parsing collaborator
//! runs pattern queries and yields classified [`Capture`]s — (kind, name,
//! node text, location) plus whatever metadata the pattern extracted. The
//! indexer is a pure function of one file's captures.
//!
//! The second consumed interface is the [`ModuleResolver`] oracle: a
//! read-only view of the project that maps an import specifier, as written
//! in a given file, to the file it denotes.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{FileId, Location};

/// Classification of a capture produced by the parsing collaborator.
///
/// Scope captures carry the *full construct* span (header included); the
/// indexer normalizes them to body-only. Definition and reference captures
/// carry the span of the construct or the referencing expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureKind {
    // Scope-introducing constructs
    ModuleScope,
    ClassScope,
    FunctionScope,
    MethodScope,
    BlockScope,
    // Definitions
    FunctionDef,
    ClassDef,
    VariableDef,
    InterfaceDef,
    EnumDef,
    TypeAliasDef,
    NamespaceDef,
    ImportDef,
    // References
    FunctionCall,
    MethodCall,
    ConstructorCall,
    VariableRef,
    PropertyAccess,
    TypeRef,
    Assignment,
}

impl CaptureKind {
    /// Whether this capture introduces a scope.
    pub fn is_scope(self) -> bool {
        matches!(
            self,
            CaptureKind::ModuleScope
                | CaptureKind::ClassScope
                | CaptureKind::FunctionScope
                | CaptureKind::MethodScope
                | CaptureKind::BlockScope
        )
    }

    /// Whether this capture declares a definition.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            CaptureKind::FunctionDef
                | CaptureKind::ClassDef
                | CaptureKind::VariableDef
                | CaptureKind::InterfaceDef
                | CaptureKind::EnumDef
                | CaptureKind::TypeAliasDef
                | CaptureKind::NamespaceDef
                | CaptureKind::ImportDef
        )
    }

    /// Whether this capture is a reference to a name.
    pub fn is_reference(self) -> bool {
        !self.is_scope() && !self.is_definition()
    }
}

/// Optional metadata attached to a capture by the language query.
///
/// Only the fields relevant to the capture's kind are populated; the rest
/// stay at their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMeta {
    /// Receiver name for method calls / property accesses (`f` in `f.bar()`).
    pub receiver: Option<SmolStr>,
    /// Location of the receiver expression.
    pub receiver_location: Option<Location>,
    /// Property chain for member accesses (`a.b.c` → ["a", "b"]).
    pub property_chain: Vec<SmolStr>,
    /// Raw type annotation (`x: Foo`, `def f() -> Bar`). Not yet resolved.
    pub annotation: Option<SmolStr>,
    /// Constructed type name for `x = new T(...)` assignments.
    pub constructed: Option<SmolStr>,
    /// Callee name for `x = f(...)` assignments.
    pub call_target: Option<SmolStr>,
    /// Import source specifier (`'./core'`, `"pkg.module"`).
    pub source: Option<SmolStr>,
    /// Local alias for imports (`import { a as b }` → b).
    pub alias: Option<SmolStr>,
    /// Whether an import re-exports the name (`export ... from`).
    pub is_reexport: bool,
    /// Whether the definition is explicitly exported.
    pub is_exported: bool,
    /// Supertype / implemented-interface names for class-like definitions.
    pub supertypes: Vec<SmolStr>,
}

/// One classified capture over a file's syntax tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// The classification assigned by the language query.
    pub kind: CaptureKind,
    /// The captured name (definition name, referenced name, scope owner name).
    pub name: SmolStr,
    /// The captured node's source text. Used for body-boundary extraction
    /// on scope captures; may be empty elsewhere.
    pub text: Arc<str>,
    /// The captured node's full span.
    pub location: Location,
    /// Kind-specific metadata.
    pub meta: CaptureMeta,
}

impl Capture {
    /// Create a capture with empty text and default metadata.
    pub fn new(kind: CaptureKind, name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            kind,
            name: name.into(),
            text: Arc::from(""),
            location,
            meta: CaptureMeta::default(),
        }
    }

    /// Attach node text (needed on scope captures).
    pub fn with_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.text = text.into();
        self
    }

    /// Attach metadata.
    pub fn with_meta(mut self, meta: CaptureMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Read-only project oracle: maps import specifiers to files.
///
/// Owned by the file/project-traversal collaborator. The core never touches
/// the file system; everything it knows about module layout comes through
/// this trait. "Which files import X" queries are answered by the
/// [`ImportGraph`](crate::registry::ImportGraph) on top of this mapping.
pub trait ModuleResolver {
    /// Resolve an import specifier as written in `from` to the file it
    /// denotes, or `None` if the specifier points outside the indexed
    /// project (external dependency).
    fn resolve_specifier(&self, from: FileId, specifier: &str) -> Option<FileId>;
}

/// A map-backed [`ModuleResolver`] for tests and embedders that precompute
/// specifier resolution.
#[derive(Debug, Default)]
pub struct StaticModuleResolver {
    edges: FxHashMap<(FileId, SmolStr), FileId>,
}

impl StaticModuleResolver {
    /// Create an empty resolver (every specifier is external).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register that `specifier`, written in `from`, denotes `target`.
    pub fn insert(&mut self, from: FileId, specifier: impl Into<SmolStr>, target: FileId) {
        self.edges.insert((from, specifier.into()), target);
    }
}

impl ModuleResolver for StaticModuleResolver {
    fn resolve_specifier(&self, from: FileId, specifier: &str) -> Option<FileId> {
        self.edges.get(&(from, SmolStr::new(specifier))).copied()
    }
}
