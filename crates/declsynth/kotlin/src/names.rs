//! Names of Kotlin types and top-level members.
//!
//! A [`ClassName`] is a package plus one or more simple names (nested
//! classes append to the list). A [`TypeName`] is a class name with type
//! arguments and nullability. A [`MemberName`] names a top-level function or
//! property that generated code refers to and must import.

use serde::{Deserialize, Serialize};

use crate::error::{KotlinError, KotlinResult};

/// Kotlin hard keywords. Identifiers matching one of these are escaped with
/// backticks when rendered.
const HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Escape an identifier with backticks if it collides with a hard keyword.
pub fn escape_identifier(name: &str) -> String {
    if HARD_KEYWORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

/// Whether `name` is a syntactically valid (unescaped) Kotlin identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

// ── Class Name ───────────────────────────────────────────────────────

/// Fully-qualified name of a class, interface or object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassName {
    package: String,
    simple_names: Vec<String>,
}

impl ClassName {
    /// A top-level class in `package`.
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_names: vec![simple_name.into()],
        }
    }

    /// A class with an explicit chain of enclosing simple names.
    ///
    /// Fails when `simple_names` is empty.
    pub fn from_parts(
        package: impl Into<String>,
        simple_names: Vec<String>,
    ) -> KotlinResult<Self> {
        if simple_names.is_empty() {
            return Err(KotlinError::InvalidName(
                "a class name needs at least one simple name".into(),
            ));
        }
        Ok(Self {
            package: package.into(),
            simple_names,
        })
    }

    /// A type from the `kotlin` package, e.g. `kotlin.String`.
    pub fn kotlin(simple_name: &str) -> Self {
        Self::new("kotlin", simple_name)
    }

    /// Parse a dotted canonical name.
    ///
    /// Segments are split into package and simple names at the first segment
    /// starting with an upper-case letter (`android.net.Uri`,
    /// `demo.Device.Laptop`). When no segment is capitalised, the last
    /// segment is taken as the simple name.
    pub fn parse(canonical: &str) -> KotlinResult<Self> {
        let segments: Vec<&str> = canonical.split('.').collect();
        if segments.iter().any(|s| !is_identifier(s)) {
            return Err(KotlinError::InvalidName(format!(
                "'{}' is not a dotted identifier",
                canonical
            )));
        }
        let split = segments
            .iter()
            .position(|s| s.chars().next().is_some_and(char::is_uppercase))
            .unwrap_or(segments.len() - 1);
        Ok(Self {
            package: segments[..split].join("."),
            simple_names: segments[split..].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// A class nested in this one.
    pub fn nested(&self, simple_name: impl Into<String>) -> Self {
        let mut simple_names = self.simple_names.clone();
        simple_names.push(simple_name.into());
        Self {
            package: self.package.clone(),
            simple_names,
        }
    }

    /// A top-level class in the same package.
    pub fn peer(&self, simple_name: impl Into<String>) -> Self {
        Self::new(self.package.clone(), simple_name)
    }

    /// The outermost enclosing class (or `self` when already top level).
    pub fn top_level(&self) -> Self {
        Self::new(self.package.clone(), self.simple_names[0].clone())
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn simple_names(&self) -> &[String] {
        &self.simple_names
    }

    /// The innermost simple name.
    pub fn simple_name(&self) -> &str {
        self.simple_names
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Simple names joined with dots, without the package.
    pub fn relative_name(&self) -> String {
        self.simple_names.join(".")
    }

    /// The dotted, fully-qualified name.
    pub fn canonical(&self) -> String {
        if self.package.is_empty() {
            self.relative_name()
        } else {
            format!("{}.{}", self.package, self.relative_name())
        }
    }

    /// This class as a non-null type without arguments.
    pub fn as_type(&self) -> TypeName {
        TypeName::from(self.clone())
    }
}

impl std::fmt::Display for ClassName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl TryFrom<String> for ClassName {
    type Error = KotlinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClassName> for String {
    fn from(value: ClassName) -> Self {
        value.canonical()
    }
}

// ── Member Name ──────────────────────────────────────────────────────

/// A top-level function or property referenced from generated code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberName {
    package: String,
    name: String,
}

impl MemberName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Parse `package.member`.
    pub fn parse(canonical: &str) -> KotlinResult<Self> {
        match canonical.rsplit_once('.') {
            Some((package, name)) if is_identifier(name) => Ok(Self::new(package, name)),
            None if is_identifier(canonical) => Ok(Self::new("", canonical)),
            _ => Err(KotlinError::InvalidName(format!(
                "'{}' is not a member name",
                canonical
            ))),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

impl std::fmt::Display for MemberName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl TryFrom<String> for MemberName {
    type Error = KotlinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemberName> for String {
    fn from(value: MemberName) -> Self {
        value.canonical()
    }
}

// ── Type Name ────────────────────────────────────────────────────────

/// A Kotlin type: a class with arguments, a function type, or the `*`
/// projection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    Class {
        class: ClassName,
        arguments: Vec<TypeName>,
        nullable: bool,
    },
    Lambda {
        receiver: Option<Box<TypeName>>,
        parameters: Vec<TypeName>,
        returns: Box<TypeName>,
        nullable: bool,
        suspending: bool,
    },
    Star,
}

impl TypeName {
    pub fn boolean() -> Self {
        ClassName::kotlin("Boolean").into()
    }

    pub fn int() -> Self {
        ClassName::kotlin("Int").into()
    }

    pub fn string() -> Self {
        ClassName::kotlin("String").into()
    }

    pub fn unit() -> Self {
        ClassName::kotlin("Unit").into()
    }

    /// `kotlin.Array<element>`.
    pub fn array_of(element: TypeName) -> Self {
        ClassName::kotlin("Array").as_type().parameterized_by(vec![element])
    }

    /// A non-suspending function type without receiver.
    pub fn lambda(parameters: Vec<TypeName>, returns: TypeName) -> Self {
        Self::Lambda {
            receiver: None,
            parameters,
            returns: Box::new(returns),
            nullable: false,
            suspending: false,
        }
    }

    /// Replace the type arguments of a class type. Other types are returned
    /// unchanged.
    pub fn parameterized_by(self, arguments: Vec<TypeName>) -> Self {
        match self {
            Self::Class { class, nullable, .. } => Self::Class {
                class,
                arguments,
                nullable,
            },
            other => other,
        }
    }

    /// Copy with the given nullability. `*` has none.
    pub fn with_nullable(mut self, value: bool) -> Self {
        match &mut self {
            Self::Class { nullable, .. } | Self::Lambda { nullable, .. } => *nullable = value,
            Self::Star => {}
        }
        self
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Class { nullable, .. } | Self::Lambda { nullable, .. } => *nullable,
            Self::Star => false,
        }
    }

    /// The class of a class type.
    pub fn class(&self) -> Option<&ClassName> {
        match self {
            Self::Class { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Whether this is exactly (non-null) `kotlin.Unit`.
    pub fn is_unit(&self) -> bool {
        matches!(
            self,
            Self::Class { class, arguments, nullable: false }
                if arguments.is_empty() && *class == ClassName::kotlin("Unit")
        )
    }

    /// Every class name mentioned by this type, nested types included.
    pub fn referenced_classes(&self) -> Vec<&ClassName> {
        match self {
            Self::Class {
                class, arguments, ..
            } => {
                let mut out = vec![class];
                for argument in arguments {
                    out.extend(argument.referenced_classes());
                }
                out
            }
            Self::Lambda {
                receiver,
                parameters,
                returns,
                ..
            } => {
                let mut out = Vec::new();
                if let Some(receiver) = receiver {
                    out.extend(receiver.referenced_classes());
                }
                for parameter in parameters {
                    out.extend(parameter.referenced_classes());
                }
                out.extend(returns.referenced_classes());
                out
            }
            Self::Star => Vec::new(),
        }
    }

    /// Format with a caller-supplied spelling for class names.
    pub fn format_with(&self, class_name: &dyn Fn(&ClassName) -> String) -> String {
        match self {
            Self::Class {
                class,
                arguments,
                nullable,
            } => {
                let mut out = class_name(class);
                if !arguments.is_empty() {
                    let args: Vec<String> =
                        arguments.iter().map(|a| a.format_with(class_name)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                if *nullable {
                    out.push('?');
                }
                out
            }
            Self::Lambda {
                receiver,
                parameters,
                returns,
                nullable,
                suspending,
            } => {
                let mut out = String::new();
                if *suspending {
                    out.push_str("suspend ");
                }
                if let Some(receiver) = receiver {
                    out.push_str(&receiver.format_with(class_name));
                    out.push('.');
                }
                let params: Vec<String> =
                    parameters.iter().map(|p| p.format_with(class_name)).collect();
                out.push_str(&format!(
                    "({}) -> {}",
                    params.join(", "),
                    returns.format_with(class_name)
                ));
                if *nullable {
                    format!("({})?", out)
                } else {
                    out
                }
            }
            Self::Star => "*".to_string(),
        }
    }
}

impl From<ClassName> for TypeName {
    fn from(class: ClassName) -> Self {
        Self::Class {
            class,
            arguments: Vec::new(),
            nullable: false,
        }
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_with(&|class: &ClassName| class.canonical()))
    }
}
