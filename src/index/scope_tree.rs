//! Scope tree construction and scope assignment.
//!
//! Scope-introducing captures arrive with the *full construct* span — header,
//! name, and body. A scope's location must be its **body only**: a class's
//! name has to resolve to its enclosing scope (so other files can import it)
//! while its members resolve to its own scope. Body extraction differs per
//! language (brace-delimited vs indentation-based) but the output is uniform.
//!
//! Given uniform body-only locations, `defining_scope(location)` is the
//! deepest scope whose body contains the location, with smallest-extent
//! tie-break at equal depth. A tie that cannot be broken is a boundary-
//! extraction bug upstream and surfaces as
//! [`IndexError::MalformedScopeTree`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::base::{FileId, Language, LineCol, LineIndex, Location, ScopeId};
use crate::capture::{Capture, CaptureKind};
use crate::error::IndexError;

/// The kind of construct a scope belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    Method,
    Block,
}

/// A lexical scope with a body-only location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Globally unique id (embeds the file path).
    pub id: ScopeId,
    /// What construct introduced the scope.
    pub kind: ScopeKind,
    /// The body-only span. Names defined here are visible here.
    pub body: Location,
    /// The full construct span, header included. Equals `body` for the
    /// module root. Used to attach header-resident definitions (parameters)
    /// to the scope they belong to.
    pub construct: Location,
    /// Enclosing scope; `None` only for the module root.
    pub parent: Option<ScopeId>,
    /// Nesting depth; the root is 0 and children increase strictly by 1.
    pub depth: u32,
}

/// All scopes of one file, parent-linked, with precomputed depths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTree {
    path: Arc<str>,
    root: ScopeId,
    scopes: IndexMap<ScopeId, Scope>,
}

impl ScopeTree {
    /// Build the scope tree for one file from its scope captures.
    ///
    /// `text` is the file contents, used only to bound the synthesized
    /// module root when the parser does not emit one.
    pub fn build(
        path: &str,
        file: FileId,
        language: Language,
        text: &str,
        captures: &[Capture],
    ) -> Result<Self, IndexError> {
        let path: Arc<str> = Arc::from(path);

        // The module root spans the whole file. Parsers may emit an explicit
        // ModuleScope capture; more than one is malformed.
        let mut root_body = None;
        for cap in captures.iter().filter(|c| c.kind == CaptureKind::ModuleScope) {
            if root_body.replace(cap.location).is_some() {
                return Err(IndexError::MultipleRoots { path });
            }
        }
        let root_body = root_body.unwrap_or_else(|| file_extent(file, text, captures));

        // Normalize every other scope capture to its body-only span.
        let mut pending: Vec<(ScopeKind, Location, Location)> = vec![(
            ScopeKind::Module,
            root_body,
            root_body,
        )];
        for cap in captures {
            let kind = match cap.kind {
                CaptureKind::ClassScope => ScopeKind::Class,
                CaptureKind::FunctionScope => ScopeKind::Function,
                CaptureKind::MethodScope => ScopeKind::Method,
                CaptureKind::BlockScope => ScopeKind::Block,
                _ => continue,
            };
            let body = body_location(language, cap);
            pending.push((kind, body, cap.location));
        }

        // Two scopes with identical bodies have no containment order and no
        // extent tie-break: report the boundary bug.
        for (i, (_, a, _)) in pending.iter().enumerate() {
            for (_, b, _) in pending.iter().skip(i + 1) {
                if a == b {
                    return Err(IndexError::MalformedScopeTree {
                        path,
                        location: *a,
                    });
                }
            }
        }

        // Deterministic ordinals: outermost (largest extent) first, then by
        // position. This also guarantees parents sort before children.
        pending.sort_by(|(_, a, _), (_, b, _)| {
            b.extent().cmp(&a.extent()).then(a.start.cmp(&b.start))
        });

        // Parent = the containing scope with the smallest extent (deepest).
        // Files hold few scopes; the quadratic scan is simpler than a stack
        // over a sorted interval list and equally deterministic.
        let ids: Vec<ScopeId> = (0..pending.len())
            .map(|i| ScopeId::derive(&path, i as u32))
            .collect();
        let mut scopes: IndexMap<ScopeId, Scope> = IndexMap::with_capacity(pending.len());
        for (i, (kind, body, construct)) in pending.iter().enumerate() {
            let mut parent: Option<usize> = None;
            for (j, (_, other_body, _)) in pending.iter().enumerate() {
                if i == j || !other_body.contains(body) {
                    continue;
                }
                match parent {
                    Some(p) if pending[p].1.extent() <= other_body.extent() => {}
                    _ => parent = Some(j),
                }
            }
            // Parents sort before children (larger extent), so their depth
            // is already known.
            let depth = match parent {
                Some(p) => scopes[&ids[p]].depth + 1,
                None => 0,
            };
            scopes.insert(
                ids[i].clone(),
                Scope {
                    id: ids[i].clone(),
                    kind: *kind,
                    body: *body,
                    construct: *construct,
                    parent: parent.map(|p| ids[p].clone()),
                    depth,
                },
            );
        }

        trace!(path = %path, scopes = scopes.len(), "built scope tree");

        let root_index = pending
            .iter()
            .position(|(kind, _, _)| *kind == ScopeKind::Module)
            .expect("module root is always present");

        Ok(Self {
            path,
            root: ids[root_index].clone(),
            scopes,
        })
    }

    /// The file path this tree was built for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The module root scope id.
    pub fn root(&self) -> &ScopeId {
        &self.root
    }

    /// Look up a scope by id.
    pub fn get(&self, id: &ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Iterate all scopes in deterministic order (outermost first).
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    /// Number of scopes including the root.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// A tree always has at least the module root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The deepest scope whose body contains `location`; ties at equal depth
    /// break by smallest body extent; no container falls back to the root.
    ///
    /// An unbreakable tie (equal depth, equal extent) is an invariant
    /// violation and is reported, never silently resolved.
    pub fn defining_scope(&self, location: &Location) -> Result<ScopeId, IndexError> {
        let mut best: Option<&Scope> = None;
        for scope in self.scopes.values() {
            if !scope.body.contains(location) {
                continue;
            }
            match best {
                None => best = Some(scope),
                Some(current) => {
                    if scope.depth > current.depth {
                        best = Some(scope);
                    } else if scope.depth == current.depth {
                        if scope.body.extent() < current.body.extent() {
                            best = Some(scope);
                        } else if scope.body.extent() == current.body.extent() {
                            return Err(IndexError::MalformedScopeTree {
                                path: self.path.clone(),
                                location: *location,
                            });
                        }
                    }
                }
            }
        }
        Ok(best.map(|s| s.id.clone()).unwrap_or_else(|| self.root.clone()))
    }

    /// Scope assignment for definitions.
    ///
    /// Same as [`defining_scope`](Self::defining_scope), with one addition:
    /// a definition that sits in a callable's *header* (inside the construct
    /// span but outside the body — a parameter) belongs to that callable's
    /// scope. The construct itself never claims its own definition because a
    /// definition's span equals the construct span, and containment there is
    /// not strict.
    pub fn definition_scope(&self, location: &Location) -> Result<ScopeId, IndexError> {
        let mut header_owner: Option<&Scope> = None;
        for scope in self.scopes.values() {
            if !matches!(scope.kind, ScopeKind::Function | ScopeKind::Method) {
                continue;
            }
            if scope.construct == *location
                || !scope.construct.contains(location)
                || scope.body.contains(location)
            {
                continue;
            }
            match header_owner {
                Some(current) if current.depth >= scope.depth => {}
                _ => header_owner = Some(scope),
            }
        }
        if let Some(owner) = header_owner {
            return Ok(owner.id.clone());
        }
        self.defining_scope(location)
    }

    /// Walk the parent chain from `id` (inclusive) to the root.
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
}

/// Full-file extent for the synthesized module root.
fn file_extent(file: FileId, text: &str, captures: &[Capture]) -> Location {
    let mut end = LineIndex::new(text).end();
    // Guard against truncated text: the root must still contain every capture.
    for cap in captures {
        end = end.max(cap.location.end);
    }
    Location::new(file, LineCol::new(0, 0), end)
}

/// Normalize a scope capture's construct span to its body-only span.
fn body_location(language: Language, cap: &Capture) -> Location {
    let body = if language.brace_delimited() {
        brace_body(language, cap)
    } else {
        indent_body(cap)
    };
    // A construct with no recognizable body (expression-bodied arrow
    // function, forward declaration) keeps its full span.
    body.unwrap_or(cap.location)
}

/// Tracks an absolute position while walking node text.
#[derive(Copy, Clone)]
struct Cursor {
    pos: LineCol,
}

impl Cursor {
    fn new(start: LineCol) -> Self {
        Self { pos: start }
    }

    fn advance(&mut self, c: char) {
        if c == '\n' {
            self.pos.line += 1;
            self.pos.col = 0;
        } else {
            self.pos.col += 1;
        }
    }
}

/// Body of a brace-delimited construct: the span strictly inside the
/// outermost `{...}`, skipping comments and string literals while locating
/// the braces.
fn brace_body(language: Language, cap: &Capture) -> Option<Location> {
    let mut cursor = Cursor::new(cap.location.start);
    let mut chars = cap.text.chars().peekable();
    let mut depth = 0u32;
    let mut body_start: Option<LineCol> = None;

    while let Some(c) = chars.next() {
        match c {
            '/' if matches!(chars.peek(), Some('/')) => {
                cursor.advance(c);
                for c in chars.by_ref() {
                    cursor.advance(c);
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            '/' if matches!(chars.peek(), Some('*')) => {
                cursor.advance(c);
                let mut prev = '\0';
                for c in chars.by_ref() {
                    cursor.advance(c);
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                continue;
            }
            '#' if language == Language::Python => {
                cursor.advance(c);
                for c in chars.by_ref() {
                    cursor.advance(c);
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            '"' | '`' => {
                cursor.advance(c);
                skip_string(&mut cursor, &mut chars, c);
                continue;
            }
            '\'' if language != Language::Rust => {
                cursor.advance(c);
                skip_string(&mut cursor, &mut chars, c);
                continue;
            }
            '\'' if is_rust_char_literal(&mut chars.clone()) => {
                cursor.advance(c);
                skip_string(&mut cursor, &mut chars, c);
                continue;
            }
            '{' => {
                cursor.advance(c);
                depth += 1;
                if depth == 1 {
                    body_start = Some(cursor.pos);
                }
                continue;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(start) = body_start {
                        return Some(Location::new(cap.location.file, start, cursor.pos));
                    }
                }
                cursor.advance(c);
                continue;
            }
            _ => {}
        }
        cursor.advance(c);
    }

    // Unbalanced braces: take everything after the opening brace.
    body_start.map(|start| Location::new(cap.location.file, start, cap.location.end))
}

/// Consume a string literal, honoring backslash escapes.
fn skip_string(
    cursor: &mut Cursor,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    delim: char,
) {
    let mut escaped = false;
    for c in chars.by_ref() {
        cursor.advance(c);
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delim {
            break;
        }
    }
}

/// Distinguish a Rust char literal from a lifetime at a `'` boundary.
fn is_rust_char_literal(lookahead: &mut std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    match lookahead.next() {
        Some('\\') => true,
        Some(_) => matches!(lookahead.next(), Some('\'')),
        None => false,
    }
}

/// Body of an indentation-delimited (Python) construct: everything after the
/// header line. The header ends at the first `:` outside brackets and
/// strings. A single-line construct (`def m(self): pass`) keeps its body on
/// the header line, after the colon.
fn indent_body(cap: &Capture) -> Option<Location> {
    let mut cursor = Cursor::new(cap.location.start);
    let mut chars = cap.text.chars().peekable();
    let mut bracket_depth = 0u32;

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                cursor.advance(c);
                for c in chars.by_ref() {
                    cursor.advance(c);
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            '"' | '\'' => {
                cursor.advance(c);
                skip_string(&mut cursor, &mut chars, c);
                continue;
            }
            '(' | '[' | '{' => bracket_depth += 1,
            ')' | ']' | '}' => bracket_depth = bracket_depth.saturating_sub(1),
            ':' if bracket_depth == 0 => {
                cursor.advance(c);
                let after_colon = cursor.pos;
                let next_line = LineCol::new(after_colon.line + 1, 0);
                let start = if next_line <= cap.location.end {
                    next_line
                } else {
                    after_colon
                };
                return Some(Location::new(cap.location.file, start, cap.location.end));
            }
            _ => {}
        }
        cursor.advance(c);
    }

    None
}
