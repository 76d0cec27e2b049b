//! Declaration specs: parameters, properties, functions, types and files.
//!
//! Specs are plain values assembled with `with_*` builder methods. They carry
//! no formatting state; [`crate::render`] turns a [`FileSpec`] into text.

use std::collections::BTreeSet;

use crate::code::CodeBlock;
use crate::modifier::KModifier;
use crate::names::{ClassName, MemberName, TypeName};

// ── Parameter ────────────────────────────────────────────────────────

/// A function or constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: BTreeSet<KModifier>,
    pub default: Option<CodeBlock>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            modifiers: BTreeSet::new(),
            default: None,
        }
    }

    pub fn with_modifier(mut self, modifier: KModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_default(mut self, default: CodeBlock) -> Self {
        self.default = Some(default);
        self
    }
}

// ── Property ─────────────────────────────────────────────────────────

/// A property declared at top level or inside a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: BTreeSet<KModifier>,
    pub mutable: bool,
    /// Receiver type for extension properties.
    pub receiver: Option<TypeName>,
    pub initializer: Option<CodeBlock>,
    /// Expression body of a custom getter.
    pub getter: Option<CodeBlock>,
    pub kdoc: Option<CodeBlock>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            modifiers: BTreeSet::new(),
            mutable: false,
            receiver: None,
            initializer: None,
            getter: None,
            kdoc: None,
        }
    }

    pub fn with_modifier(mut self, modifier: KModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = KModifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<TypeName>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_initializer(mut self, initializer: CodeBlock) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn with_getter(mut self, getter: CodeBlock) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.kdoc = Some(kdoc);
        self
    }
}

// ── Function ─────────────────────────────────────────────────────────

/// A function declared at top level or inside a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunSpec {
    pub name: String,
    pub modifiers: BTreeSet<KModifier>,
    pub annotations: Vec<ClassName>,
    pub receiver: Option<TypeName>,
    pub parameters: Vec<ParameterSpec>,
    pub returns: TypeName,
    /// Statements between the braces. `None` declares the function without
    /// a body (abstract or interface member).
    pub body: Option<CodeBlock>,
    pub kdoc: Option<CodeBlock>,
}

impl FunSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: BTreeSet::new(),
            annotations: Vec::new(),
            receiver: None,
            parameters: Vec::new(),
            returns: TypeName::unit(),
            body: None,
            kdoc: None,
        }
    }

    pub fn with_modifier(mut self, modifier: KModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = KModifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_annotation(mut self, annotation: ClassName) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<TypeName>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_returns(mut self, returns: impl Into<TypeName>) -> Self {
        self.returns = returns.into();
        self
    }

    pub fn with_body(mut self, body: CodeBlock) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.kdoc = Some(kdoc);
        self
    }
}

// ── Type ─────────────────────────────────────────────────────────────

/// The keyword introducing a [`TypeSpec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Object,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Object => "object",
        }
    }
}

/// A class, interface or object declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSpec {
    pub kind: TypeKind,
    pub name: String,
    pub modifiers: BTreeSet<KModifier>,
    pub kdoc: Option<CodeBlock>,
    pub superinterfaces: Vec<TypeName>,
    pub primary_constructor: Vec<ParameterSpec>,
    pub properties: Vec<PropertySpec>,
    pub functions: Vec<FunSpec>,
}

impl TypeSpec {
    fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers: BTreeSet::new(),
            kdoc: None,
            superinterfaces: Vec::new(),
            primary_constructor: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Object, name)
    }

    pub fn with_modifier(mut self, modifier: KModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = KModifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.kdoc = Some(kdoc);
        self
    }

    pub fn with_superinterface(mut self, ty: impl Into<TypeName>) -> Self {
        self.superinterfaces.push(ty.into());
        self
    }

    pub fn with_constructor_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.primary_constructor.push(parameter);
        self
    }

    pub fn with_property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_function(mut self, function: FunSpec) -> Self {
        self.functions.push(function);
        self
    }
}

// ── File ─────────────────────────────────────────────────────────────

/// A top-level member of a [`FileSpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileMember {
    Type(TypeSpec),
    Property(PropertySpec),
    Function(FunSpec),
}

impl FileMember {
    /// Declared name of the member.
    pub fn name(&self) -> &str {
        match self {
            Self::Type(ty) => &ty.name,
            Self::Property(property) => &property.name,
            Self::Function(function) => &function.name,
        }
    }
}

/// A single Kotlin source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSpec {
    pub package: String,
    pub name: String,
    /// Leading `//` comment, one entry per line.
    pub comment: Vec<String>,
    /// Imports added on top of the ones inferred from referenced names.
    pub imports: Vec<MemberName>,
    pub members: Vec<FileMember>,
}

impl FileSpec {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            comment: Vec::new(),
            imports: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_comment(mut self, line: impl Into<String>) -> Self {
        self.comment.push(line.into());
        self
    }

    pub fn with_import(mut self, member: MemberName) -> Self {
        self.imports.push(member);
        self
    }

    pub fn with_type(mut self, ty: TypeSpec) -> Self {
        self.members.push(FileMember::Type(ty));
        self
    }

    pub fn with_property(mut self, property: PropertySpec) -> Self {
        self.members.push(FileMember::Property(property));
        self
    }

    pub fn with_function(mut self, function: FunSpec) -> Self {
        self.members.push(FileMember::Function(function));
        self
    }

    /// Top-level types declared in this file.
    pub fn types(&self) -> impl Iterator<Item = &TypeSpec> {
        self.members.iter().filter_map(|member| match member {
            FileMember::Type(ty) => Some(ty),
            _ => None,
        })
    }

    /// Path of the file relative to a source root: package segments as
    /// directories followed by `<name>.kt`.
    pub fn relative_path(&self) -> std::path::PathBuf {
        let mut path = std::path::PathBuf::new();
        for segment in self.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.kt", self.name));
        path
    }

    /// Render to Kotlin source text.
    pub fn render(&self) -> String {
        crate::render::render_file(self)
    }
}
