//! The project layer: file lifecycle, parallel indexing, and queries.
//!
//! A [`Project`] owns the file set, the per-file indexes, and the registries,
//! and keeps a resolution snapshot plus call graph that are rebuilt on
//! demand. Batch indexing runs per-file in parallel (indexing is a pure
//! function of one file's captures); the registry fold stays sequential.
//!
//! A file whose captures violate the scope-tree invariants is excluded from
//! resolution with its error recorded; the rest of the project proceeds.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::base::{FileId, FileSet, Language, LineCol, SymbolId};
use crate::capture::{Capture, ModuleResolver};
use crate::engine::{self, ResolutionSnapshot, ResolvedReference};
use crate::error::IndexError;
use crate::graph::CallGraph;
use crate::index::{index_file, Definition, FileIndex, Reference};
use crate::registry::ProjectRegistries;

/// One file's worth of input to a batch update.
pub struct SourceInput {
    pub path: Arc<str>,
    pub language: Language,
    pub text: Arc<str>,
    pub captures: Vec<Capture>,
}

impl SourceInput {
    pub fn new(
        path: impl Into<Arc<str>>,
        language: Language,
        text: impl Into<Arc<str>>,
        captures: Vec<Capture>,
    ) -> Self {
        Self {
            path: path.into(),
            language,
            text: text.into(),
            captures,
        }
    }
}

/// All state of one analyzed project.
pub struct Project {
    files: FileSet,
    modules: Box<dyn ModuleResolver + Send + Sync>,
    indices: FxHashMap<FileId, FileIndex>,
    registries: ProjectRegistries,
    excluded: FxHashMap<FileId, IndexError>,
    snapshot: Option<ResolutionSnapshot>,
    graph: Option<CallGraph>,
}

impl Project {
    pub fn new(modules: Box<dyn ModuleResolver + Send + Sync>) -> Self {
        Self {
            files: FileSet::new(),
            modules,
            indices: FxHashMap::default(),
            registries: ProjectRegistries::default(),
            excluded: FxHashMap::default(),
            snapshot: None,
            graph: None,
        }
    }

    /// The file set, for id assignment by the capture-producing collaborator.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// The id a path is (or will be) indexed under.
    pub fn file_id(&self, path: &str) -> FileId {
        self.files.file_id(Path::new(path))
    }

    /// Add or replace one file. Returns its id; a malformed file is recorded
    /// as excluded, purging any prior contribution.
    pub fn add_file(&mut self, input: SourceInput) -> FileId {
        self.add_files(vec![input])[0]
    }

    /// Add or replace a batch of files, indexing them in parallel.
    pub fn add_files(&mut self, inputs: Vec<SourceInput>) -> Vec<FileId> {
        let assigned: Vec<(FileId, SourceInput)> = inputs
            .into_iter()
            .map(|input| {
                let file = self.files.file_id(Path::new(input.path.as_ref()));
                self.files.set_contents(file, input.text.clone());
                self.files.set_language(file, input.language);
                (file, input)
            })
            .collect();

        let indexed: Vec<(FileId, Result<FileIndex, IndexError>)> = assigned
            .par_iter()
            .map(|(file, input)| {
                (
                    *file,
                    index_file(*file, &input.path, input.language, &input.text, &input.captures),
                )
            })
            .collect();

        let ids: Vec<FileId> = indexed.iter().map(|(file, _)| *file).collect();
        for (file, result) in indexed {
            match result {
                Ok(index) => {
                    self.registries.update_file(&index);
                    self.indices.insert(file, index);
                    self.excluded.remove(&file);
                }
                Err(error) => {
                    warn!(?file, %error, "excluding file from analysis");
                    // Stale contributions would resolve against the old
                    // contents.
                    self.registries.remove_file(file);
                    self.indices.remove(&file);
                    self.excluded.insert(file, error);
                    if let Some(snapshot) = &mut self.snapshot {
                        snapshot.remove_file(file);
                    }
                }
            }
        }

        info!(
            files = ids.len(),
            excluded = self.excluded.len(),
            "updated project files"
        );
        ids
    }

    /// Remove a file entirely.
    pub fn remove_file(&mut self, file: FileId) {
        self.registries.remove_file(file);
        self.indices.remove(&file);
        self.excluded.remove(&file);
        self.files.remove(file);
        if let Some(snapshot) = &mut self.snapshot {
            snapshot.remove_file(file);
        }
    }

    /// Resolve all references and rebuild the call graph.
    pub fn resolve(&mut self) -> &ResolutionSnapshot {
        let snapshot = engine::resolve_project(&self.indices, &self.registries, &*self.modules);
        self.graph = Some(CallGraph::build(&self.indices, &self.registries, &snapshot));
        self.snapshot.insert(snapshot)
    }

    /// Re-resolve only the files affected by `changed` (themselves plus
    /// transitive importers), patching the previous snapshot. Falls back to
    /// a full run when no snapshot exists yet.
    pub fn resolve_incremental(&mut self, changed: &[FileId]) -> &ResolutionSnapshot {
        let Some(mut snapshot) = self.snapshot.take() else {
            return self.resolve();
        };

        let mut affected: Vec<FileId> = changed
            .iter()
            .flat_map(|&file| engine::affected_files(&self.registries, &*self.modules, file))
            .collect();
        affected.sort();
        affected.dedup();

        let partial = engine::resolve_files(
            affected.iter().filter_map(|file| self.indices.get(file)),
            &self.registries,
            &*self.modules,
        );
        snapshot.merge(partial);
        self.graph = Some(CallGraph::build(&self.indices, &self.registries, &snapshot));
        self.snapshot.insert(snapshot)
    }

    /// The latest snapshot. Outcomes for files changed since the last
    /// `resolve`/`resolve_incremental` are stale until one runs again.
    pub fn snapshot(&self) -> Option<&ResolutionSnapshot> {
        self.snapshot.as_ref()
    }

    /// The latest call graph; same staleness rules as [`snapshot`](Self::snapshot).
    pub fn graph(&self) -> Option<&CallGraph> {
        self.graph.as_ref()
    }

    /// Files excluded from analysis, with the invariant violation that
    /// excluded them.
    pub fn excluded_files(&self) -> impl Iterator<Item = (FileId, &IndexError)> {
        self.excluded.iter().map(|(f, e)| (*f, e))
    }

    /// The index of one file.
    pub fn index_of(&self, file: FileId) -> Option<&FileIndex> {
        self.indices.get(&file)
    }

    /// Look up a definition anywhere in the project.
    pub fn definition(&self, id: &SymbolId) -> Option<&Definition> {
        self.registries.definitions.get(id)
    }

    /// The reference at a position together with its resolution outcome.
    /// The outcome side is `None` until `resolve` has run.
    pub fn reference_at(
        &self,
        file: FileId,
        pos: LineCol,
    ) -> Option<(&Reference, Option<&ResolvedReference>)> {
        let index = self.indices.get(&file)?;
        let (i, reference) = index.reference_at(pos)?;
        let outcome = self.snapshot.as_ref().and_then(|s| s.outcome(file, i));
        Some((reference, outcome))
    }

    /// Callables nothing in the project calls. Empty until `resolve` runs.
    pub fn entry_points(&self) -> Vec<SymbolId> {
        self.graph
            .as_ref()
            .map(|g| g.entry_points(&self.registries))
            .unwrap_or_default()
    }

    /// Direct callees of `caller`. Empty until `resolve` runs.
    pub fn callees(&self, caller: &SymbolId) -> Vec<SymbolId> {
        self.graph
            .as_ref()
            .map(|g| g.callees(caller).cloned().collect())
            .unwrap_or_default()
    }

    /// Direct callers of `callee`. Empty until `resolve` runs.
    pub fn callers(&self, callee: &SymbolId) -> Vec<SymbolId> {
        self.graph
            .as_ref()
            .map(|g| g.callers(callee).cloned().collect())
            .unwrap_or_default()
    }
}
