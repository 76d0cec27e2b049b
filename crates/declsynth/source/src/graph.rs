//! Declaration graph files.
//!
//! ```json
//! {
//!   "declarations": [ { "kind": "enum", "name": "Direction", "package": "demo", ... } ],
//!   "library_types": [ "android.net.Uri" ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use declsynth_kotlin::is_identifier;
use declsynth_types::Declaration;

use crate::error::{SourceError, SourceResult};

/// Top-level declarations of a compilation plus externally known types.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolGraph {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Canonical names of classpath types that exist outside the graph.
    #[serde(default)]
    pub library_types: Vec<String>,
}

impl SymbolGraph {
    pub fn from_json(json: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Fill in package, enclosing chain and file imports of nested declarations
/// and check that every name is a valid identifier.
pub(crate) fn normalize(declaration: &mut Declaration) -> SourceResult<()> {
    if !declaration.package.is_empty()
        && !declaration.package.split('.').all(is_identifier)
    {
        return Err(SourceError::InvalidDeclaration(format!(
            "'{}' is not a valid package name",
            declaration.package
        )));
    }
    normalize_nested(declaration)
}

fn normalize_nested(declaration: &mut Declaration) -> SourceResult<()> {
    if !is_identifier(&declaration.name) {
        return Err(SourceError::InvalidDeclaration(format!(
            "'{}' is not a valid declaration name",
            declaration.name
        )));
    }
    let mut enclosing = declaration.enclosing.clone();
    enclosing.push(declaration.name.clone());
    for nested in &mut declaration.nested {
        nested.package = declaration.package.clone();
        nested.enclosing = enclosing.clone();
        if nested.imports.is_empty() {
            nested.imports = declaration.imports.clone();
        }
        normalize_nested(nested)?;
    }
    Ok(())
}

/// Depth-first, declaration-order list of a declaration and everything
/// nested in it.
pub(crate) fn flatten(declaration: &Declaration) -> Vec<&Declaration> {
    let mut out = vec![declaration];
    for nested in &declaration.nested {
        out.extend(flatten(nested));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use declsynth_types::DeclKind;

    #[test]
    fn nested_declarations_inherit_scope() {
        let mut device = Declaration::new(DeclKind::Class, "demo", "Device")
            .with_import("android.net.Uri")
            .with_nested(Declaration::new(DeclKind::Class, "", "Laptop"));
        normalize(&mut device).unwrap();
        let laptop = &device.nested[0];
        assert_eq!(laptop.package, "demo");
        assert_eq!(laptop.enclosing, ["Device"]);
        assert_eq!(laptop.imports, ["android.net.Uri"]);
        assert_eq!(laptop.qualified_name().canonical(), "demo.Device.Laptop");
    }

    #[test]
    fn flatten_is_depth_first() {
        let mut root = Declaration::new(DeclKind::Class, "demo", "A")
            .with_nested(
                Declaration::new(DeclKind::Class, "", "B")
                    .with_nested(Declaration::new(DeclKind::Class, "", "C")),
            )
            .with_nested(Declaration::new(DeclKind::Class, "", "D"));
        normalize(&mut root).unwrap();
        let names: Vec<String> = flatten(&root)
            .iter()
            .map(|d| d.qualified_name().canonical())
            .collect();
        assert_eq!(names, ["demo.A", "demo.A.B", "demo.A.B.C", "demo.A.D"]);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut bad = Declaration::new(DeclKind::Class, "demo", "Not Valid");
        assert!(normalize(&mut bad).is_err());
        let mut bad_package = Declaration::new(DeclKind::Class, "demo..x", "Ok");
        assert!(normalize(&mut bad_package).is_err());
    }

    #[test]
    fn graph_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(
            &path,
            r#"{"declarations": [{"kind": "object", "name": "Registry", "package": "demo"}],
                "library_types": ["android.net.Uri"]}"#,
        )
        .unwrap();
        let graph = SymbolGraph::from_path(&path).unwrap();
        assert_eq!(graph.declarations.len(), 1);
        assert_eq!(graph.library_types, ["android.net.Uri"]);
        assert!(SymbolGraph::from_path(&dir.path().join("missing.json")).is_err());
    }
}
