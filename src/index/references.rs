//! Reference extraction — turning reference captures into scoped name uses.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{Location, ScopeId};
use crate::capture::{Capture, CaptureKind};
use crate::error::IndexError;

use super::scope_tree::ScopeTree;

/// The kind-specific payload of a reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    FunctionCall,
    /// `recv.name(...)`. The reference name is the method name.
    MethodCall {
        receiver: Option<SmolStr>,
        receiver_location: Option<Location>,
        /// Intermediate receiver chain for `a.b.c()` (["a", "b"]).
        property_chain: Vec<SmolStr>,
    },
    /// `new T(...)` or a call resolving to a class. The reference name is
    /// the constructed type.
    ConstructorCall,
    VariableRef,
    /// `recv.name` without a call. The reference name is the property.
    PropertyAccess {
        receiver: Option<SmolStr>,
        property_chain: Vec<SmolStr>,
    },
    /// A name used in type position (annotation, extends clause).
    TypeRef,
    /// `name = <expr>`. Feeds type bindings when the right-hand side is a
    /// constructor or a call with a known return type.
    Assignment {
        annotation: Option<SmolStr>,
        constructed: Option<SmolStr>,
        call_target: Option<SmolStr>,
    },
}

impl RefKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            RefKind::FunctionCall => "function_call",
            RefKind::MethodCall { .. } => "method_call",
            RefKind::ConstructorCall => "constructor_call",
            RefKind::VariableRef => "variable_reference",
            RefKind::PropertyAccess { .. } => "property_access",
            RefKind::TypeRef => "type_reference",
            RefKind::Assignment { .. } => "assignment",
        }
    }
}

/// A use of a name, attached to the scope it occurs in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: SmolStr,
    pub location: Location,
    /// The scope the reference occurs in — where name lookup starts.
    pub scope: ScopeId,
    pub kind: RefKind,
}

/// Extract references from a file's captures, assigning each its scope.
pub(crate) fn extract(tree: &ScopeTree, captures: &[Capture]) -> Result<Vec<Reference>, IndexError> {
    let mut references = Vec::new();

    for cap in captures.iter().filter(|c| c.kind.is_reference()) {
        let kind = match cap.kind {
            CaptureKind::FunctionCall => RefKind::FunctionCall,
            CaptureKind::MethodCall => RefKind::MethodCall {
                receiver: cap.meta.receiver.clone(),
                receiver_location: cap.meta.receiver_location,
                property_chain: cap.meta.property_chain.clone(),
            },
            CaptureKind::ConstructorCall => RefKind::ConstructorCall,
            CaptureKind::VariableRef => RefKind::VariableRef,
            CaptureKind::PropertyAccess => RefKind::PropertyAccess {
                receiver: cap.meta.receiver.clone(),
                property_chain: cap.meta.property_chain.clone(),
            },
            CaptureKind::TypeRef => RefKind::TypeRef,
            CaptureKind::Assignment => RefKind::Assignment {
                annotation: cap.meta.annotation.clone(),
                constructed: cap.meta.constructed.clone(),
                call_target: cap.meta.call_target.clone(),
            },
            _ => unreachable!("is_reference filtered"),
        };

        references.push(Reference {
            name: cap.name.clone(),
            location: cap.location,
            scope: tree.defining_scope(&cap.location)?,
            kind,
        });
    }

    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, Language, LineCol};
    use crate::capture::CaptureMeta;

    fn loc(start: (u32, u32), end: (u32, u32)) -> Location {
        Location::new(
            FileId::new(0),
            LineCol::new(start.0, start.1),
            LineCol::new(end.0, end.1),
        )
    }

    #[test]
    fn test_extract_method_call() {
        let root = Capture::new(CaptureKind::ModuleScope, "", loc((0, 0), (10, 0)));
        let tree = ScopeTree::build("a.ts", FileId::new(0), Language::TypeScript, "", &[root])
            .unwrap();

        let cap = Capture::new(CaptureKind::MethodCall, "bar", loc((2, 2), (2, 10))).with_meta(
            CaptureMeta {
                receiver: Some("f".into()),
                receiver_location: Some(loc((2, 2), (2, 3))),
                ..Default::default()
            },
        );

        let refs = extract(&tree, &[cap]).unwrap();

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name.as_str(), "bar");
        assert_eq!(refs[0].scope, *tree.root());
        match &refs[0].kind {
            RefKind::MethodCall { receiver, .. } => {
                assert_eq!(receiver.as_deref(), Some("f"));
            }
            other => panic!("expected method call, got {}", other.label()),
        }
    }

    #[test]
    fn test_reference_scope_is_innermost() {
        let fn_text = "function go() {\n  run();\n}";
        let fn_cap = Capture::new(CaptureKind::FunctionScope, "go", loc((0, 0), (2, 1)))
            .with_text(fn_text);
        let tree = ScopeTree::build(
            "a.ts",
            FileId::new(0),
            Language::TypeScript,
            fn_text,
            &[fn_cap],
        )
        .unwrap();

        let call = Capture::new(CaptureKind::FunctionCall, "run", loc((1, 2), (1, 7)));
        let refs = extract(&tree, &[call]).unwrap();

        let func = tree
            .iter()
            .find(|s| s.kind == super::super::ScopeKind::Function)
            .unwrap();
        assert_eq!(refs[0].scope, func.id);
    }
}
