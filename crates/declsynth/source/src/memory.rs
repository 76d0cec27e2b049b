//! In-memory symbol source backed by a [`SymbolGraph`].

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::debug;

use declsynth_kotlin::{ClassName, FileSpec};
use declsynth_types::{Declaration, QualifiedName};

use crate::absorb::declarations_from_file;
use crate::builtins::default_import;
use crate::error::{SourceError, SourceResult};
use crate::graph::{flatten, normalize, SymbolGraph};
use crate::source::SymbolSource;

/// Symbol source holding every declaration in memory.
///
/// Declarations are kept in graph order (depth first, declaration order),
/// which is the order discovery and sealed-subclass queries report them in.
#[derive(Debug)]
pub struct InMemorySymbolSource {
    declarations: HashMap<QualifiedName, Declaration>,
    order: Vec<QualifiedName>,
    new_in_round: Vec<QualifiedName>,
    library_types: BTreeSet<String>,
    source_packages: BTreeSet<String>,
    round: usize,
}

impl InMemorySymbolSource {
    /// An empty source at round 1.
    pub fn new() -> Self {
        Self {
            declarations: HashMap::new(),
            order: Vec::new(),
            new_in_round: Vec::new(),
            library_types: BTreeSet::new(),
            source_packages: BTreeSet::new(),
            round: 1,
        }
    }

    pub fn from_graph(graph: SymbolGraph) -> SourceResult<Self> {
        let mut source = Self::new();
        for library_type in graph.library_types {
            source.add_library_type(library_type);
        }
        for declaration in graph.declarations {
            source.add_declaration(declaration)?;
        }
        debug!(
            declarations = source.order.len(),
            library_types = source.library_types.len(),
            "loaded declaration graph"
        );
        Ok(source)
    }

    pub fn from_json(json: &str) -> SourceResult<Self> {
        Self::from_graph(SymbolGraph::from_json(json)?)
    }

    pub fn from_path(path: &Path) -> SourceResult<Self> {
        Self::from_graph(SymbolGraph::from_path(path)?)
    }

    /// Add a top-level declaration (and everything nested in it) as new in
    /// the current round.
    pub fn add_declaration(&mut self, mut declaration: Declaration) -> SourceResult<()> {
        normalize(&mut declaration)?;
        let flattened: Vec<Declaration> = flatten(&declaration).into_iter().cloned().collect();
        for decl in &flattened {
            let name = decl.qualified_name();
            if self.declarations.contains_key(&name) {
                return Err(SourceError::DuplicateDeclaration(name.canonical()));
            }
        }
        self.source_packages.insert(declaration.package.clone());
        for decl in flattened {
            let name = decl.qualified_name();
            self.order.push(name.clone());
            self.new_in_round.push(name.clone());
            self.declarations.insert(name, decl);
        }
        Ok(())
    }

    /// Register a classpath type by canonical name.
    pub fn add_library_type(&mut self, canonical: impl Into<String>) {
        self.library_types.insert(canonical.into());
    }

    /// Number of declarations, nested ones included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every declaration in graph order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.order
            .iter()
            .filter_map(|name| self.declarations.get(name))
    }

    fn contains(&self, name: &QualifiedName) -> bool {
        self.declarations.contains_key(name)
    }

    /// In the graph or registered as a library type.
    fn is_known(&self, class: &ClassName) -> bool {
        self.contains(&QualifiedName::from(class)) || self.library_types.contains(&class.canonical())
    }

    /// Outside every source package, so assumed to come from the classpath.
    fn is_external(&self, class: &ClassName) -> bool {
        !class.package().is_empty() && !self.source_packages.contains(class.package())
    }

    fn type_parameter_in_scope(&self, context: &Declaration, name: &str) -> bool {
        let mut scope = Some(context.qualified_name());
        while let Some(current) = scope {
            let declaration = if current == context.qualified_name() {
                Some(context)
            } else {
                self.declarations.get(&current)
            };
            if declaration.is_some_and(|d| d.type_parameters.iter().any(|p| p == name)) {
                return true;
            }
            scope = current.parent();
        }
        false
    }

    fn class_in_graph(&self, name: QualifiedName) -> Option<ClassName> {
        if self.contains(&name) {
            name.to_class_name().ok()
        } else {
            None
        }
    }
}

impl Default for InMemorySymbolSource {
    fn default() -> Self {
        Self::new()
    }
}

/// `base` extended with the nested `rest` segments.
fn nested_class(base: ClassName, rest: &[&str]) -> ClassName {
    rest.iter().fold(base, |class, segment| class.nested(*segment))
}

impl SymbolSource for InMemorySymbolSource {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn round(&self) -> usize {
        self.round
    }

    fn declaration(&self, name: &QualifiedName) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    fn new_declarations(&self) -> Vec<&Declaration> {
        self.new_in_round
            .iter()
            .filter_map(|name| self.declarations.get(name))
            .collect()
    }

    fn resolve_class(&self, context: &Declaration, name: &str) -> Option<ClassName> {
        let segments: Vec<&str> = name.split('.').collect();
        let (first, rest) = segments.split_first()?;

        if rest.is_empty() && self.type_parameter_in_scope(context, first) {
            return Some(ClassName::new("", *first));
        }

        // Nested scopes, innermost first.
        let mut scope = Some(context.qualified_name());
        while let Some(current) = scope {
            let mut candidate = current.nested(*first);
            for segment in rest {
                candidate = candidate.nested(*segment);
            }
            if let Some(class) = self.class_in_graph(candidate) {
                return Some(class);
            }
            scope = current.parent();
        }

        // Explicit imports.
        for import in context.imports.iter().filter(|i| !i.ends_with(".*")) {
            if import.rsplit('.').next() != Some(*first) {
                continue;
            }
            if let Ok(imported) = ClassName::parse(import) {
                let class = nested_class(imported, rest);
                if self.is_known(&class) || self.is_external(&class) {
                    return Some(class);
                }
            }
        }

        // Same package.
        let mut same_package: Vec<String> = vec![first.to_string()];
        same_package.extend(rest.iter().map(|s| s.to_string()));
        let candidate = QualifiedName::new(context.package.clone(), same_package);
        if let Some(class) = self.class_in_graph(candidate.clone()) {
            return Some(class);
        }
        if let Ok(class) = candidate.to_class_name() {
            if self.library_types.contains(&class.canonical()) {
                return Some(class);
            }
        }

        // Star imports.
        for package in context.imports.iter().filter_map(|i| i.strip_suffix(".*")) {
            let class = nested_class(ClassName::new(package, *first), rest);
            if self.is_known(&class) {
                return Some(class);
            }
        }

        if rest.is_empty() {
            if let Some(class) = default_import(first) {
                return Some(class);
            }
        }

        // Fully qualified.
        if !rest.is_empty() {
            if let Ok(class) = ClassName::parse(name) {
                if self.is_known(&class) || self.is_external(&class) {
                    return Some(class);
                }
            }
        }

        None
    }

    fn sealed_subclasses<'a>(&'a self, declaration: &'a Declaration) -> Vec<&'a Declaration> {
        let Ok(sealed) = declaration.qualified_name().to_class_name() else {
            return Vec::new();
        };
        self.declarations()
            .filter(|candidate| {
                candidate.supertypes.iter().any(|supertype| match supertype {
                    declsynth_types::TypeRef::Named { name, .. } => {
                        self.resolve_class(candidate, name).as_ref() == Some(&sealed)
                    }
                    _ => false,
                })
            })
            .collect()
    }

    fn advance_round(&mut self, generated: &[FileSpec]) -> SourceResult<usize> {
        self.round += 1;
        self.new_in_round.clear();
        let mut added = 0;
        for file in generated {
            for declaration in declarations_from_file(file)? {
                self.add_declaration(declaration)?;
                added += 1;
            }
        }
        debug!(round = self.round, added, "advanced resolution round");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declsynth_kotlin::{PropertySpec, TypeName, TypeSpec};
    use declsynth_types::{DeclKind, FunctionDecl, Modifier, PropertyDecl, TypeRef};

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn source(declarations: Vec<Declaration>) -> InMemorySymbolSource {
        let mut source = InMemorySymbolSource::new();
        for declaration in declarations {
            source.add_declaration(declaration).unwrap();
        }
        source
    }

    fn device() -> Declaration {
        Declaration::new(DeclKind::Class, "demo", "Device")
            .with_modifier(Modifier::Sealed)
            .with_property(PropertyDecl::new("brand", ty("String")))
            .with_nested(Declaration::new(DeclKind::Class, "", "Laptop").with_supertype(ty("Device")))
            .with_nested(
                Declaration::new(DeclKind::Class, "", "Smartphone").with_supertype(ty("Device")),
            )
    }

    #[test]
    fn nested_declarations_are_addressable() {
        let source = source(vec![device()]);
        assert_eq!(source.len(), 3);
        let laptop = QualifiedName::new("demo", vec!["Device".into(), "Laptop".into()]);
        assert!(source.declaration(&laptop).is_some());
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut source = source(vec![device()]);
        let err = source.add_declaration(device()).unwrap_err();
        assert!(matches!(err, SourceError::DuplicateDeclaration(name) if name == "demo.Device"));
    }

    #[test]
    fn resolution_order() {
        let context = Declaration::new(DeclKind::Class, "demo", "Screen")
            .with_import("android.net.Uri")
            .with_import("demo.widgets.*")
            .with_type_parameter("T");
        let widget = Declaration::new(DeclKind::Class, "demo.widgets", "Button");
        let source = source(vec![device(), widget, context.clone()]);

        let resolve = |name: &str| source.resolve_class(&context, name).map(|c| c.canonical());
        assert_eq!(resolve("T").as_deref(), Some("T"));
        assert_eq!(resolve("Device").as_deref(), Some("demo.Device"));
        assert_eq!(resolve("Device.Laptop").as_deref(), Some("demo.Device.Laptop"));
        assert_eq!(resolve("Uri").as_deref(), Some("android.net.Uri"));
        assert_eq!(resolve("Button").as_deref(), Some("demo.widgets.Button"));
        assert_eq!(resolve("List").as_deref(), Some("kotlin.collections.List"));
        assert_eq!(resolve("java.io.File").as_deref(), Some("java.io.File"));
        assert_eq!(resolve("SomeScreen"), None);
        assert_eq!(resolve("demo.Missing"), None);
    }

    #[test]
    fn nested_scope_wins_over_package() {
        let outer = Declaration::new(DeclKind::Class, "demo", "Outer")
            .with_nested(Declaration::new(DeclKind::Class, "", "Item"))
            .with_nested(
                Declaration::new(DeclKind::Class, "", "User")
                    .with_property(PropertyDecl::new("item", ty("Item"))),
            );
        let top_item = Declaration::new(DeclKind::Class, "demo", "Item");
        let source = source(vec![outer, top_item]);
        let user = source
            .declaration(&QualifiedName::new("demo", vec!["Outer".into(), "User".into()]))
            .unwrap();
        assert_eq!(
            source.resolve_class(user, "Item").unwrap().canonical(),
            "demo.Outer.Item"
        );
    }

    #[test]
    fn library_types_resolve_in_source_packages() {
        let mut source = source(vec![Declaration::new(DeclKind::Class, "demo", "Screen")
            .with_property(PropertyDecl::new("theme", ty("Theme")))]);
        let screen = QualifiedName::top_level("demo", "Screen");
        assert!(!source.is_valid(source.declaration(&screen).unwrap()));
        source.add_library_type("demo.Theme");
        assert!(source.is_valid(source.declaration(&screen).unwrap()));
    }

    #[test]
    fn sealed_subclasses_in_graph_order() {
        let source = source(vec![device()]);
        let device = source
            .declaration(&QualifiedName::top_level("demo", "Device"))
            .unwrap();
        let names: Vec<&str> = source
            .sealed_subclasses(device)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["Laptop", "Smartphone"]);
    }

    #[test]
    fn inherited_members_are_shadowed_and_cycles_tolerated() {
        let base = Declaration::new(DeclKind::Interface, "demo", "Base")
            .with_supertype(ty("Child"))
            .with_property(PropertyDecl::new("title", ty("String")))
            .with_property(PropertyDecl::new("count", ty("Int")))
            .with_function(FunctionDecl::new("refresh"));
        let child = Declaration::new(DeclKind::Class, "demo", "Child")
            .with_supertype(ty("Base"))
            .with_property(PropertyDecl::new("title", ty("String")).with_modifier(Modifier::Override))
            .with_function(FunctionDecl::new("refresh").with_modifier(Modifier::Override));
        let source = source(vec![base, child]);
        let child = source
            .declaration(&QualifiedName::top_level("demo", "Child"))
            .unwrap();

        let properties: Vec<(&str, &str)> = source
            .all_properties(child)
            .iter()
            .map(|m| (m.member.name.as_str(), m.owner.name.as_str()))
            .collect();
        assert_eq!(properties, [("title", "Child"), ("count", "Base")]);

        let functions = source.all_functions(child);
        assert_eq!(functions.len(), 1);
        assert!(functions[0].member.has_modifier(Modifier::Override));
    }

    #[test]
    fn generated_types_become_next_round_declarations() {
        let controller = Declaration::new(DeclKind::Class, "demo", "WeatherViewModel")
            .with_supertype(ty("SomeWeatherViewModel"));
        let mut source = source(vec![controller]);
        let name = QualifiedName::top_level("demo", "WeatherViewModel");
        assert_eq!(source.round(), 1);
        assert!(!source.is_valid(source.declaration(&name).unwrap()));

        let generated = FileSpec::new("demo", "WeatherViewModelContract").with_type(
            TypeSpec::interface("SomeWeatherViewModel")
                .with_property(PropertySpec::new("city", TypeName::string())),
        );
        let added = source.advance_round(&[generated]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(source.round(), 2);

        let new: Vec<&str> = source
            .new_declarations()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(new, ["SomeWeatherViewModel"]);
        assert!(source.is_valid(source.declaration(&name).unwrap()));
    }

    #[test]
    fn type_name_falls_back_to_context_package() {
        let context = Declaration::new(DeclKind::Class, "demo", "WeatherViewModel");
        let source = source(vec![context.clone()]);
        let fallback = source.type_name(&context, &ty("List<SomeWeatherViewModel>?"));
        assert_eq!(
            fallback.to_string(),
            "kotlin.collections.List<demo.SomeWeatherViewModel>?"
        );
    }

    #[test]
    fn load_from_json() {
        let json = r#"{
            "declarations": [
                {"kind": "enum", "name": "Direction", "package": "demo",
                 "nested": [{"kind": "enum_entry", "name": "Up"}, {"kind": "enum_entry", "name": "Down"}]}
            ],
            "library_types": ["android.net.Uri"]
        }"#;
        let source = InMemorySymbolSource::from_json(json).unwrap();
        assert_eq!(source.new_declarations().len(), 3);
        assert!(InMemorySymbolSource::from_json("{").is_err());
    }
}
