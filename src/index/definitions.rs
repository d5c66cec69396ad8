//! Definition extraction — turning definition captures into symbols.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{Language, Location, ScopeId, SymbolId};
use crate::capture::{Capture, CaptureKind};
use crate::error::IndexError;

use super::scope_tree::ScopeTree;

/// The kind-specific payload of a definition.
///
/// One variant per definition kind; matching is exhaustive everywhere, never
/// shape-sniffed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefKind {
    /// A function or method. Methods are functions whose defining scope is a
    /// class body.
    Function {
        /// Declared return type annotation, unresolved.
        return_type: Option<SmolStr>,
    },
    Class {
        /// Supertype / implemented-interface names, unresolved.
        supertypes: Vec<SmolStr>,
    },
    /// A variable, parameter, or field.
    Variable {
        /// Declared type annotation, unresolved.
        annotation: Option<SmolStr>,
        /// Constructed type name when initialized with `new T(...)`.
        constructed: Option<SmolStr>,
        /// Callee name when initialized with `f(...)`.
        call_target: Option<SmolStr>,
    },
    Interface {
        supertypes: Vec<SmolStr>,
    },
    Enum,
    TypeAlias,
    Namespace,
    /// An import binding. Resolution chases these across files.
    Import {
        /// The import source specifier as written.
        source: SmolStr,
        /// Local alias, if the binding renames the imported name.
        alias: Option<SmolStr>,
        /// Whether the import immediately re-exports the name.
        is_reexport: bool,
    },
}

impl DefKind {
    /// Short label embedded in the symbol id.
    pub fn label(&self) -> &'static str {
        match self {
            DefKind::Function { .. } => "function",
            DefKind::Class { .. } => "class",
            DefKind::Variable { .. } => "variable",
            DefKind::Interface { .. } => "interface",
            DefKind::Enum => "enum",
            DefKind::TypeAlias => "type_alias",
            DefKind::Namespace => "namespace",
            DefKind::Import { .. } => "import",
        }
    }

    /// Whether the definition can appear as a call-graph node.
    pub fn is_callable(&self) -> bool {
        matches!(self, DefKind::Function { .. })
    }

    /// Whether the definition introduces a type usable in annotations.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DefKind::Class { .. } | DefKind::Interface { .. } | DefKind::Enum | DefKind::TypeAlias
        )
    }

    /// Supertype names for class-like definitions.
    pub fn supertypes(&self) -> &[SmolStr] {
        match self {
            DefKind::Class { supertypes } | DefKind::Interface { supertypes } => supertypes,
            _ => &[],
        }
    }
}

/// Export metadata attached to an exported definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// The name other files import this symbol under (the alias if renamed).
    pub exported_name: SmolStr,
    /// Whether this is a re-export of another file's symbol.
    pub is_reexport: bool,
    /// True for languages without export syntax (Python), where module-top-
    /// level definitions are importable by convention.
    pub is_implicit: bool,
}

/// A named definition with its enclosing scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Deterministic, globally unique id.
    pub id: SymbolId,
    pub name: SmolStr,
    pub kind: DefKind,
    pub location: Location,
    /// The scope *enclosing* the definition — never the scope the definition
    /// itself introduces.
    pub defining_scope: ScopeId,
    /// Present when the definition is visible to other files.
    pub export: Option<ExportInfo>,
}

impl Definition {
    /// The name this definition binds in its scope.
    ///
    /// A renamed import binds its alias; the original name is not visible.
    /// Every other definition binds `name`.
    pub fn local_name(&self) -> &SmolStr {
        match &self.kind {
            DefKind::Import {
                alias: Some(alias), ..
            } => alias,
            _ => &self.name,
        }
    }
}

/// Extract definitions from a file's captures, assigning each its enclosing
/// scope.
pub(crate) fn extract(
    path: &str,
    language: Language,
    tree: &ScopeTree,
    captures: &[Capture],
) -> Result<Vec<Definition>, IndexError> {
    let mut definitions = Vec::new();

    for cap in captures.iter().filter(|c| c.kind.is_definition()) {
        let kind = match cap.kind {
            CaptureKind::FunctionDef => DefKind::Function {
                return_type: cap.meta.annotation.clone(),
            },
            CaptureKind::ClassDef => DefKind::Class {
                supertypes: cap.meta.supertypes.clone(),
            },
            CaptureKind::VariableDef => DefKind::Variable {
                annotation: cap.meta.annotation.clone(),
                constructed: cap.meta.constructed.clone(),
                call_target: cap.meta.call_target.clone(),
            },
            CaptureKind::InterfaceDef => DefKind::Interface {
                supertypes: cap.meta.supertypes.clone(),
            },
            CaptureKind::EnumDef => DefKind::Enum,
            CaptureKind::TypeAliasDef => DefKind::TypeAlias,
            CaptureKind::NamespaceDef => DefKind::Namespace,
            CaptureKind::ImportDef => DefKind::Import {
                source: cap.meta.source.clone().unwrap_or_default(),
                alias: cap.meta.alias.clone(),
                is_reexport: cap.meta.is_reexport,
            },
            _ => unreachable!("is_definition filtered"),
        };

        let defining_scope = tree.definition_scope(&cap.location)?;
        let export = export_info(language, tree, &defining_scope, cap, &kind);
        let id = SymbolId::derive(kind.label(), path, &cap.name, cap.location.start);

        definitions.push(Definition {
            id,
            name: cap.name.clone(),
            kind,
            location: cap.location,
            defining_scope,
            export,
        });
    }

    Ok(definitions)
}

/// Compute export metadata for one definition.
///
/// Explicit export markers always win. Languages without export syntax
/// implicitly export module-top-level definitions (imports excluded — an
/// import is re-exported only when marked so).
fn export_info(
    language: Language,
    tree: &ScopeTree,
    defining_scope: &ScopeId,
    cap: &Capture,
    kind: &DefKind,
) -> Option<ExportInfo> {
    let exported_name = cap.meta.alias.clone().unwrap_or_else(|| cap.name.clone());

    if cap.meta.is_exported || cap.meta.is_reexport {
        return Some(ExportInfo {
            exported_name,
            is_reexport: cap.meta.is_reexport,
            is_implicit: false,
        });
    }

    if !language.has_explicit_exports()
        && defining_scope == tree.root()
        && !matches!(kind, DefKind::Import { .. })
    {
        return Some(ExportInfo {
            exported_name,
            is_reexport: false,
            is_implicit: true,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, LineCol};
    use crate::capture::CaptureMeta;

    fn loc(start: (u32, u32), end: (u32, u32)) -> Location {
        Location::new(
            FileId::new(0),
            LineCol::new(start.0, start.1),
            LineCol::new(end.0, end.1),
        )
    }

    fn module_tree(language: Language) -> ScopeTree {
        let root = Capture::new(CaptureKind::ModuleScope, "", loc((0, 0), (20, 0)));
        ScopeTree::build("a", FileId::new(0), language, "", &[root]).unwrap()
    }

    #[test]
    fn test_extract_function_definition() {
        let tree = module_tree(Language::TypeScript);
        let cap = Capture::new(CaptureKind::FunctionDef, "run", loc((1, 0), (3, 1)));

        let defs = extract("a.ts", Language::TypeScript, &tree, &[cap]).unwrap();

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name.as_str(), "run");
        assert_eq!(defs[0].defining_scope, *tree.root());
        assert!(defs[0].kind.is_callable());
        assert!(defs[0].export.is_none()); // TS: not exported unless marked
    }

    #[test]
    fn test_explicit_export() {
        let tree = module_tree(Language::TypeScript);
        let cap = Capture::new(CaptureKind::ClassDef, "Foo", loc((1, 0), (3, 1))).with_meta(
            CaptureMeta {
                is_exported: true,
                ..Default::default()
            },
        );

        let defs = extract("a.ts", Language::TypeScript, &tree, &[cap]).unwrap();
        let export = defs[0].export.as_ref().unwrap();

        assert_eq!(export.exported_name.as_str(), "Foo");
        assert!(!export.is_implicit);
    }

    #[test]
    fn test_python_implicit_export_at_module_level() {
        let tree = module_tree(Language::Python);
        let cap = Capture::new(CaptureKind::FunctionDef, "helper", loc((1, 0), (2, 8)));

        let defs = extract("a.py", Language::Python, &tree, &[cap]).unwrap();
        let export = defs[0].export.as_ref().unwrap();

        assert!(export.is_implicit);
        assert_eq!(export.exported_name.as_str(), "helper");
    }

    #[test]
    fn test_python_import_not_implicitly_reexported() {
        let tree = module_tree(Language::Python);
        let cap = Capture::new(CaptureKind::ImportDef, "helper", loc((0, 0), (0, 25))).with_meta(
            CaptureMeta {
                source: Some("pkg.utils".into()),
                ..Default::default()
            },
        );

        let defs = extract("a.py", Language::Python, &tree, &[cap]).unwrap();

        assert!(defs[0].export.is_none());
    }

    #[test]
    fn test_import_alias_is_exported_name() {
        let tree = module_tree(Language::TypeScript);
        let cap = Capture::new(CaptureKind::ImportDef, "core", loc((0, 0), (0, 40))).with_meta(
            CaptureMeta {
                source: Some("./a".into()),
                alias: Some("coreAlias".into()),
                is_reexport: true,
                ..Default::default()
            },
        );

        let defs = extract("b.ts", Language::TypeScript, &tree, &[cap]).unwrap();
        let export = defs[0].export.as_ref().unwrap();

        assert!(export.is_reexport);
        assert_eq!(export.exported_name.as_str(), "coreAlias");
    }

    #[test]
    fn test_ids_are_deterministic() {
        let tree = module_tree(Language::TypeScript);
        let cap = Capture::new(CaptureKind::FunctionDef, "run", loc((1, 0), (3, 1)));

        let a = extract("a.ts", Language::TypeScript, &tree, std::slice::from_ref(&cap)).unwrap();
        let b = extract("a.ts", Language::TypeScript, &tree, &[cap]).unwrap();

        assert_eq!(a[0].id, b[0].id);
    }
}
