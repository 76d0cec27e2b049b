//! Declaration model.
//!
//! A [`Declaration`] is an immutable snapshot of one class-like declaration
//! in the compilation: its kind, modifiers, members, supertypes, nested
//! declarations and the markers applied to it. Graph files deserialize
//! straight into these types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use declsynth_kotlin::{ClassName, KModifier, KotlinError};

use crate::marker::MarkerInstance;
use crate::typeref::TypeRef;

// ── Qualified Name ───────────────────────────────────────────────────

/// Stable identity of a declaration: package plus the chain of simple names
/// from the outermost enclosing declaration down to the declaration itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    package: String,
    simple_names: Vec<String>,
}

impl QualifiedName {
    pub fn new(package: impl Into<String>, simple_names: Vec<String>) -> Self {
        Self {
            package: package.into(),
            simple_names,
        }
    }

    pub fn top_level(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(package, vec![name.into()])
    }

    pub fn nested(&self, name: impl Into<String>) -> Self {
        let mut simple_names = self.simple_names.clone();
        simple_names.push(name.into());
        Self::new(self.package.clone(), simple_names)
    }

    /// The enclosing declaration's name, if nested.
    pub fn parent(&self) -> Option<Self> {
        if self.simple_names.len() < 2 {
            return None;
        }
        let mut simple_names = self.simple_names.clone();
        simple_names.pop();
        Some(Self::new(self.package.clone(), simple_names))
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn simple_names(&self) -> &[String] {
        &self.simple_names
    }

    pub fn simple_name(&self) -> &str {
        self.simple_names
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn canonical(&self) -> String {
        let relative = self.simple_names.join(".");
        if self.package.is_empty() {
            relative
        } else {
            format!("{}.{}", self.package, relative)
        }
    }

    /// The Kotlin class name generated code uses to refer to this
    /// declaration.
    pub fn to_class_name(&self) -> Result<ClassName, KotlinError> {
        ClassName::from_parts(self.package.clone(), self.simple_names.clone())
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = KotlinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let class = ClassName::parse(&value)?;
        Ok(Self::new(class.package(), class.simple_names().to_vec()))
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.canonical()
    }
}

impl From<&ClassName> for QualifiedName {
    fn from(class: &ClassName) -> Self {
        Self::new(class.package(), class.simple_names().to_vec())
    }
}

// ── Kind, Visibility, Modifiers ──────────────────────────────────────

/// Kind of a class-like declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Interface,
    Object,
    Enum,
    EnumEntry,
    Annotation,
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "a class"),
            Self::Interface => write!(f, "an interface"),
            Self::Object => write!(f, "an object"),
            Self::Enum => write!(f, "an enum class"),
            Self::EnumEntry => write!(f, "an enum entry"),
            Self::Annotation => write!(f, "an annotation class"),
        }
    }
}

/// Declared visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    pub fn to_kmodifier(self) -> KModifier {
        match self {
            Self::Public => KModifier::Public,
            Self::Internal => KModifier::Internal,
            Self::Protected => KModifier::Protected,
            Self::Private => KModifier::Private,
        }
    }
}

/// Non-visibility modifiers a declaration or member may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Sealed,
    Data,
    Abstract,
    Open,
    Final,
    Override,
    Suspend,
    Inline,
    Operator,
    Infix,
    Vararg,
    Crossinline,
    Noinline,
    Const,
    Lateinit,
    Value,
    Inner,
    Tailrec,
    External,
    Fun,
}

impl Modifier {
    pub fn to_kmodifier(self) -> KModifier {
        match self {
            Self::Sealed => KModifier::Sealed,
            Self::Data => KModifier::Data,
            Self::Abstract => KModifier::Abstract,
            Self::Open => KModifier::Open,
            Self::Final => KModifier::Final,
            Self::Override => KModifier::Override,
            Self::Suspend => KModifier::Suspend,
            Self::Inline => KModifier::Inline,
            Self::Operator => KModifier::Operator,
            Self::Infix => KModifier::Infix,
            Self::Vararg => KModifier::Vararg,
            Self::Crossinline => KModifier::Crossinline,
            Self::Noinline => KModifier::Noinline,
            Self::Const => KModifier::Const,
            Self::Lateinit => KModifier::Lateinit,
            Self::Value => KModifier::Value,
            Self::Inner => KModifier::Inner,
            Self::Tailrec => KModifier::Tailrec,
            Self::External => KModifier::External,
            Self::Fun => KModifier::Fun,
        }
    }
}

// ── Members ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// A property declared in a class body or primary constructor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "is_default")]
    pub mutable: bool,
    /// `false` for properties computed by a getter with no storage.
    #[serde(default = "default_true")]
    pub has_backing_field: bool,
    #[serde(default, skip_serializing_if = "is_default")]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerInstance>,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            mutable: false,
            has_backing_field: true,
            visibility: Visibility::Public,
            modifiers: BTreeSet::new(),
            markers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_marker(mut self, marker: MarkerInstance) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn computed(mut self) -> Self {
        self.has_backing_field = false;
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A value parameter of a function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Only `vararg`, `crossinline` and `noinline` are meaningful here.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: BTreeSet::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }
}

/// A member function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
    /// Declared return type. Absent means `Unit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            visibility: Visibility::Public,
            modifiers: BTreeSet::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// The declared return type, `Unit` when omitted.
    pub fn returns(&self) -> TypeRef {
        self.return_type.clone().unwrap_or_else(TypeRef::unit)
    }
}

// ── Declaration ──────────────────────────────────────────────────────

/// A class-like declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    /// Package of the containing file. Nested declarations inherit it.
    #[serde(default)]
    pub package: String,
    /// Simple names of the enclosing declarations, outermost first. Filled in
    /// by the symbol source for nested declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enclosing: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Declaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerInstance>,
    /// Imports of the containing file: canonical names or `package.*`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

impl Declaration {
    pub fn new(kind: DeclKind, package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            package: package.into(),
            enclosing: Vec::new(),
            visibility: Visibility::Public,
            modifiers: BTreeSet::new(),
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            nested: Vec::new(),
            markers: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    pub fn with_supertype(mut self, ty: TypeRef) -> Self {
        self.supertypes.push(ty);
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_nested(mut self, nested: Declaration) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn with_marker(mut self, marker: MarkerInstance) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Enum entries, in declaration order.
    pub fn with_entries<'a>(mut self, entries: impl IntoIterator<Item = &'a str>) -> Self {
        for entry in entries {
            self.nested
                .push(Declaration::new(DeclKind::EnumEntry, self.package.clone(), entry));
        }
        self
    }

    pub fn qualified_name(&self) -> QualifiedName {
        let mut simple_names = self.enclosing.clone();
        simple_names.push(self.name.clone());
        QualifiedName::new(self.package.clone(), simple_names)
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_sealed(&self) -> bool {
        self.has_modifier(Modifier::Sealed)
    }

    /// A `data class`.
    pub fn is_aggregate(&self) -> bool {
        self.kind == DeclKind::Class && self.has_modifier(Modifier::Data)
    }

    /// Enum entries in declaration order.
    pub fn enum_entries(&self) -> impl Iterator<Item = &Declaration> {
        self.nested
            .iter()
            .filter(|nested| nested.kind == DeclKind::EnumEntry)
    }

    /// Declared properties that own storage.
    pub fn stored_properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.properties.iter().filter(|p| p.has_backing_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_of_nested() {
        let mut laptop = Declaration::new(DeclKind::Class, "demo", "Laptop");
        laptop.enclosing = vec!["Device".into()];
        let name = laptop.qualified_name();
        assert_eq!(name.canonical(), "demo.Device.Laptop");
        assert_eq!(name.parent().map(|p| p.canonical()).as_deref(), Some("demo.Device"));
        assert_eq!(
            name.to_class_name().unwrap().relative_name(),
            "Device.Laptop"
        );
    }

    #[test]
    fn graph_json_defaults() {
        let json = r#"{
            "kind": "class",
            "name": "Location",
            "package": "demo.weather",
            "modifiers": ["data"],
            "properties": [
                {"name": "name", "type": "String"},
                {"name": "label", "type": "String", "has_backing_field": false}
            ]
        }"#;
        let decl: Declaration = serde_json::from_str(json).unwrap();
        assert!(decl.is_aggregate());
        assert_eq!(decl.visibility, Visibility::Public);
        let stored: Vec<&str> = decl.stored_properties().map(|p| p.name.as_str()).collect();
        assert_eq!(stored, ["name"]);
    }

    #[test]
    fn enum_entries_in_order() {
        let decl = Declaration::new(DeclKind::Enum, "demo", "Direction")
            .with_entries(["Up", "Down", "Left", "Right"]);
        let entries: Vec<&str> = decl.enum_entries().map(|e| e.name.as_str()).collect();
        assert_eq!(entries, ["Up", "Down", "Left", "Right"]);
    }

    #[test]
    fn function_return_defaults_to_unit() {
        let f = FunctionDecl::new("refresh");
        assert_eq!(f.returns(), TypeRef::unit());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{"kind": "struct", "name": "X"}"#;
        assert!(serde_json::from_str::<Declaration>(json).is_err());
    }
}
