//! Opaque identifiers for symbols and scopes.
//!
//! Registries associate ids with ids rather than holding object references,
//! which is what keeps cross-file links free of ownership cycles. Both id
//! types are deterministic: re-indexing an unchanged file reproduces the
//! same ids.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::LineCol;

/// A globally unique, deterministic identifier for a definition.
///
/// Derived from the definition's kind, file path, name, and start position.
/// Stable across runs, comparable, hashable — never a live pointer into
/// another file's index.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(Arc<str>);

impl SymbolId {
    /// Derive a symbol id from its identity components.
    pub fn derive(kind: &str, path: &str, name: &str, start: LineCol) -> Self {
        Self(Arc::from(format!(
            "{kind}:{path}:{name}:{}:{}",
            start.line, start.col
        )))
    }

    /// The id as a string (for display and serialization).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A globally unique identifier for a scope.
///
/// Embeds the file path plus a file-local ordinal, so ids from different
/// files can never collide and a file's scopes can be purged by prefix-free
/// exact lookups.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(Arc<str>);

impl ScopeId {
    /// Derive a scope id from the file path and the scope's ordinal within
    /// the file's scope tree.
    pub fn derive(path: &str, ordinal: u32) -> Self {
        Self(Arc::from(format!("{path}#{ordinal}")))
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_id_deterministic() {
        let a = SymbolId::derive("function", "src/a.ts", "run", LineCol::new(3, 0));
        let b = SymbolId::derive("function", "src/a.ts", "run", LineCol::new(3, 0));

        assert_eq!(a, b);
    }

    #[test]
    fn test_symbol_id_distinguishes_location() {
        let a = SymbolId::derive("function", "src/a.ts", "run", LineCol::new(3, 0));
        let b = SymbolId::derive("function", "src/a.ts", "run", LineCol::new(9, 0));

        assert_ne!(a, b);
    }

    #[test]
    fn test_symbol_id_distinguishes_kind() {
        let a = SymbolId::derive("function", "src/a.ts", "run", LineCol::new(3, 0));
        let b = SymbolId::derive("class", "src/a.ts", "run", LineCol::new(3, 0));

        assert_ne!(a, b);
    }

    #[test]
    fn test_scope_id_embeds_path() {
        let a = ScopeId::derive("src/a.ts", 0);
        let b = ScopeId::derive("src/b.ts", 0);

        assert_ne!(a, b);
        assert_eq!(a.as_str(), "src/a.ts#0");
    }
}
