//! clew — cross-file static analysis over parser captures.
//!
//! The crate turns classified parser captures into a queryable picture of a
//! multi-language codebase: where every name is defined, what every
//! reference resolves to, and who calls whom. Parsing itself lives outside;
//! a per-language collaborator feeds [`capture::Capture`]s in and a
//! [`capture::ModuleResolver`] answers import-specifier questions.
//!
//! Layering, bottom to top:
//!
//! ```text
//! base         ids, spans, file set
//! capture      parser-facing inputs (captures, module oracle)
//! index        per-file: scope tree, definitions, references
//! registry     project-wide fold of the per-file indexes
//! resolve      scope-chain + cross-file name resolution
//! types        variable bindings, member indexes, implementers
//! engine       reference resolution into a snapshot
//! graph        call graph over the snapshot
//! project      file lifecycle and queries
//! ```
//!
//! Each layer depends only on the ones above it in the list. Per-file
//! indexing is pure and runs in parallel; everything project-wide is a
//! sequential fold that can be redone per file, which is what makes
//! incremental updates whole-file replacement rather than patching.

pub mod base;
pub mod capture;
pub mod engine;
pub mod error;
pub mod graph;
pub mod index;
pub mod project;
pub mod registry;
pub mod resolve;
pub mod types;

pub use base::{FileId, FileSet, Language, LineCol, LineIndex, Location, ScopeId, SymbolId};
pub use capture::{Capture, CaptureKind, CaptureMeta, ModuleResolver, StaticModuleResolver};
pub use engine::{Confidence, Reason, Resolution, ResolutionSnapshot, ResolvedReference};
pub use error::{IndexError, TypeError, UnresolvedReason};
pub use graph::CallGraph;
pub use index::{index_file, Definition, FileIndex, Reference};
pub use project::{Project, SourceInput};
pub use resolve::Resolver;
pub use types::TypeContext;
