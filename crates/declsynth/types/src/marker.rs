//! Marker vocabulary and typed marker configuration.
//!
//! Markers are plain metadata. Their arguments are read when a declaration is
//! discovered, before its resolvability is checked, into a typed
//! configuration value; anything missing, mistyped, unknown or contradictory
//! is rejected there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};

/// Package the marker annotations are declared in.
pub const DEFAULT_MARKER_PACKAGE: &str = "com.seriouslyhypersonic.annotations";

// ── Marker Instance ──────────────────────────────────────────────────

/// A marker argument value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl MarkerValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Int(_) => "an integer",
            Self::String(_) => "a string",
        }
    }
}

/// One application of a marker to a declaration or property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerInstance {
    /// Simple or fully-qualified marker name.
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, MarkerValue>,
}

impl MarkerInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: MarkerValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_argument(name, MarkerValue::String(value.into()))
    }

    pub fn with_int(self, name: impl Into<String>, value: i64) -> Self {
        self.with_argument(name, MarkerValue::Int(value))
    }

    pub fn with_bool(self, name: impl Into<String>, value: bool) -> Self {
        self.with_argument(name, MarkerValue::Bool(value))
    }

    /// The simple name, with any package prefix removed.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

// ── Vocabulary ───────────────────────────────────────────────────────

/// The markers this system understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Generates `is<Case>` accessors for enums and sealed hierarchies.
    CaseDetection,
    /// Generates a persistence contract for a data class.
    Persistence,
    /// Overrides the column name of one stored property.
    ColumnName,
    /// Generates a controller contract, accessor and optional preview model.
    Previewable,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 4] = [
        Self::CaseDetection,
        Self::Persistence,
        Self::ColumnName,
        Self::Previewable,
    ];

    /// Simple names recognised for this marker.
    pub fn simple_names(&self) -> &'static [&'static str] {
        match self {
            Self::CaseDetection => &["CaseDetection"],
            Self::Persistence => &["ContentType", "ContentValue", "ContentObject"],
            Self::ColumnName => &["ColumnName"],
            Self::Previewable => &["Previewable"],
        }
    }

    /// Human-readable parameter list.
    pub fn parameters(&self) -> &'static str {
        match self {
            Self::CaseDetection => "none",
            Self::Persistence => {
                "authority: String (alias authorithy), path: String, code: Int = 0, writable: Boolean = false"
            }
            Self::ColumnName => "name: String",
            Self::Previewable => "generate_model: Boolean = false (alias generateModel)",
        }
    }

    /// Declarations the marker may be applied to.
    pub fn target(&self) -> &'static str {
        match self {
            Self::CaseDetection => "enum class, sealed class, sealed interface",
            Self::Persistence => "data class",
            Self::ColumnName => "stored property",
            Self::Previewable => "controller class",
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.simple_names()[0])
    }
}

/// Recognises marker instances by simple or package-qualified name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerVocabulary {
    package: String,
}

impl MarkerVocabulary {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Whether `instance` is an application of `kind`.
    pub fn matches(&self, instance: &MarkerInstance, kind: MarkerKind) -> bool {
        kind.simple_names().iter().any(|simple| {
            instance.name == *simple
                || instance
                    .name
                    .strip_prefix(self.package.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
                    == Some(*simple)
        })
    }

    /// Every instance of `kind` in `markers`.
    pub fn find<'a>(
        &'a self,
        markers: &'a [MarkerInstance],
        kind: MarkerKind,
    ) -> impl Iterator<Item = &'a MarkerInstance> + 'a {
        markers
            .iter()
            .filter(move |instance| self.matches(instance, kind))
    }

    /// Fully-qualified names of every spelling of `kind`.
    pub fn qualified_names(&self, kind: MarkerKind) -> Vec<String> {
        kind.simple_names()
            .iter()
            .map(|simple| format!("{}.{}", self.package, simple))
            .collect()
    }
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_PACKAGE)
    }
}

// ── Argument Reader ──────────────────────────────────────────────────

/// Consumes the arguments of one marker instance, tracking which names were
/// read so leftovers can be reported.
struct Arguments<'a> {
    declaration: &'a str,
    instance: &'a MarkerInstance,
    seen: Vec<&'a str>,
}

impl<'a> Arguments<'a> {
    fn new(declaration: &'a str, instance: &'a MarkerInstance) -> Self {
        Self {
            declaration,
            instance,
            seen: Vec::new(),
        }
    }

    fn error(&self, reason: String) -> SynthError {
        SynthError::InvalidMarker {
            declaration: self.declaration.to_string(),
            marker: self.instance.simple_name().to_string(),
            reason,
        }
    }

    fn raw(&mut self, name: &'a str) -> Option<&'a MarkerValue> {
        self.seen.push(name);
        self.instance.arguments.get(name)
    }

    fn string(&mut self, name: &'a str) -> SynthResult<Option<String>> {
        match self.raw(name) {
            None => Ok(None),
            Some(MarkerValue::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(self.error(format!(
                "'{}' must be a string, found {}",
                name,
                other.type_name()
            ))),
        }
    }

    fn int(&mut self, name: &'a str) -> SynthResult<Option<i64>> {
        match self.raw(name) {
            None => Ok(None),
            Some(MarkerValue::Int(value)) => Ok(Some(*value)),
            Some(other) => Err(self.error(format!(
                "'{}' must be an integer, found {}",
                name,
                other.type_name()
            ))),
        }
    }

    fn bool(&mut self, name: &'a str) -> SynthResult<Option<bool>> {
        match self.raw(name) {
            None => Ok(None),
            Some(MarkerValue::Bool(value)) => Ok(Some(*value)),
            Some(other) => Err(self.error(format!(
                "'{}' must be a boolean, found {}",
                name,
                other.type_name()
            ))),
        }
    }

    /// Read an argument that has two accepted spellings.
    fn aliased<T: PartialEq + std::fmt::Debug>(
        &mut self,
        name: &'a str,
        alias: &'a str,
        read: impl Fn(&mut Self, &'a str) -> SynthResult<Option<T>>,
    ) -> SynthResult<Option<T>> {
        let primary = read(self, name)?;
        let secondary = read(self, alias)?;
        match (primary, secondary) {
            (Some(a), Some(b)) if a != b => Err(self.error(format!(
                "'{}' ({:?}) and '{}' ({:?}) disagree",
                name, a, alias, b
            ))),
            (Some(a), _) => Ok(Some(a)),
            (None, b) => Ok(b),
        }
    }

    fn required<T>(&self, name: &str, value: Option<T>) -> SynthResult<T> {
        value.ok_or_else(|| self.error(format!("missing required argument '{}'", name)))
    }

    fn finish(self) -> SynthResult<()> {
        let unknown: Vec<&str> = self
            .instance
            .arguments
            .keys()
            .map(String::as_str)
            .filter(|key| !self.seen.contains(key))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(self.error(format!("unknown argument(s): {}", unknown.join(", "))))
        }
    }
}

// ── Typed Configurations ─────────────────────────────────────────────

/// Arguments of a persistence marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Which spelling of the marker was used.
    pub marker: String,
    pub authority: String,
    pub path: String,
    pub code: i32,
    pub writable: bool,
}

impl PersistenceConfig {
    pub fn from_marker(declaration: &str, instance: &MarkerInstance) -> SynthResult<Self> {
        let mut args = Arguments::new(declaration, instance);
        let authority = args.aliased("authority", "authorithy", Arguments::string)?;
        let authority = args.required("authority", authority)?;
        let path = args.string("path")?;
        let path = args.required("path", path)?;
        let code = match args.int("code")? {
            None => 0,
            Some(code) => i32::try_from(code)
                .map_err(|_| args.error(format!("'code' {} does not fit in an Int", code)))?,
        };
        let writable = args.bool("writable")?.unwrap_or(false);
        args.finish()?;
        Ok(Self {
            marker: instance.simple_name().to_string(),
            authority,
            path,
            code,
            writable,
        })
    }
}

/// Column-name override for a stored property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub name: String,
}

impl ColumnOverride {
    pub fn from_marker(declaration: &str, instance: &MarkerInstance) -> SynthResult<Self> {
        let mut args = Arguments::new(declaration, instance);
        let name = args.string("name")?;
        let name = args.required("name", name)?;
        if name.is_empty() {
            return Err(args.error("'name' must not be empty".into()));
        }
        args.finish()?;
        Ok(Self { name })
    }
}

/// Arguments of the contract/preview marker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub generate_model: bool,
}

impl ContractConfig {
    pub fn from_marker(declaration: &str, instance: &MarkerInstance) -> SynthResult<Self> {
        let mut args = Arguments::new(declaration, instance);
        let generate_model = args
            .aliased("generate_model", "generateModel", Arguments::bool)?
            .unwrap_or(false);
        args.finish()?;
        Ok(Self { generate_model })
    }
}

/// The discriminator marker takes no arguments; only its spelling is kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDetectionConfig {
    pub marker: String,
}

impl CaseDetectionConfig {
    pub fn from_marker(declaration: &str, instance: &MarkerInstance) -> SynthResult<Self> {
        Arguments::new(declaration, instance).finish()?;
        Ok(Self {
            marker: instance.simple_name().to_string(),
        })
    }
}

impl Default for CaseDetectionConfig {
    fn default() -> Self {
        Self {
            marker: MarkerKind::CaseDetection.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECL: &str = "demo.weather.Location";

    #[test]
    fn vocabulary_matches_simple_and_qualified_names() {
        let vocabulary = MarkerVocabulary::default();
        let simple = MarkerInstance::new("ContentValue");
        let qualified = MarkerInstance::new("com.seriouslyhypersonic.annotations.ContentObject");
        let foreign = MarkerInstance::new("org.other.ContentType");
        assert!(vocabulary.matches(&simple, MarkerKind::Persistence));
        assert!(vocabulary.matches(&qualified, MarkerKind::Persistence));
        assert!(!vocabulary.matches(&foreign, MarkerKind::Persistence));
        assert!(!vocabulary.matches(&simple, MarkerKind::CaseDetection));
    }

    #[test]
    fn persistence_defaults() {
        let marker = MarkerInstance::new("ContentType")
            .with_string("authority", "demo.provider")
            .with_string("path", "locations");
        let config = PersistenceConfig::from_marker(DECL, &marker).unwrap();
        assert_eq!(config.code, 0);
        assert!(!config.writable);
        assert_eq!(config.marker, "ContentType");
    }

    #[test]
    fn misspelled_authority_is_accepted() {
        let marker = MarkerInstance::new("ContentObject")
            .with_string("authorithy", "demo.provider")
            .with_string("path", "locations")
            .with_int("code", -3)
            .with_bool("writable", true);
        let config = PersistenceConfig::from_marker(DECL, &marker).unwrap();
        assert_eq!(config.authority, "demo.provider");
        assert_eq!(config.code, -3);
        assert!(config.writable);
    }

    #[test]
    fn conflicting_spellings_are_fatal() {
        let marker = MarkerInstance::new("ContentValue")
            .with_string("authority", "a")
            .with_string("authorithy", "b")
            .with_string("path", "p");
        let err = PersistenceConfig::from_marker(DECL, &marker).unwrap_err();
        assert!(matches!(err, SynthError::InvalidMarker { .. }));
        assert!(err.to_string().contains("disagree"));
    }

    #[test]
    fn agreeing_spellings_are_fine() {
        let marker = MarkerInstance::new("ContentValue")
            .with_string("authority", "a")
            .with_string("authorithy", "a")
            .with_string("path", "p");
        assert!(PersistenceConfig::from_marker(DECL, &marker).is_ok());
    }

    #[test]
    fn missing_and_mistyped_arguments() {
        let missing = MarkerInstance::new("ContentType").with_string("authority", "a");
        let err = PersistenceConfig::from_marker(DECL, &missing).unwrap_err();
        assert!(err.to_string().contains("missing required argument 'path'"));

        let mistyped = MarkerInstance::new("ContentType")
            .with_string("authority", "a")
            .with_string("path", "p")
            .with_string("code", "7");
        let err = PersistenceConfig::from_marker(DECL, &mistyped).unwrap_err();
        assert!(err.to_string().contains("'code' must be an integer"));
    }

    #[test]
    fn unknown_arguments_and_overflow() {
        let unknown = MarkerInstance::new("ContentType")
            .with_string("authority", "a")
            .with_string("path", "p")
            .with_bool("cache", true);
        let err = PersistenceConfig::from_marker(DECL, &unknown).unwrap_err();
        assert!(err.to_string().contains("unknown argument(s): cache"));

        let overflow = MarkerInstance::new("ContentType")
            .with_string("authority", "a")
            .with_string("path", "p")
            .with_int("code", i64::from(i32::MAX) + 1);
        assert!(PersistenceConfig::from_marker(DECL, &overflow).is_err());
    }

    #[test]
    fn contract_config_alias() {
        let camel = MarkerInstance::new("Previewable").with_bool("generateModel", true);
        assert!(ContractConfig::from_marker(DECL, &camel).unwrap().generate_model);
        let bare = MarkerInstance::new("Previewable");
        assert!(!ContractConfig::from_marker(DECL, &bare).unwrap().generate_model);
    }

    #[test]
    fn column_override_requires_name() {
        let empty = MarkerInstance::new("ColumnName").with_string("name", "");
        assert!(ColumnOverride::from_marker(DECL, &empty).is_err());
        let named = MarkerInstance::new("ColumnName").with_string("name", "LOCATION_NAME");
        assert_eq!(
            ColumnOverride::from_marker(DECL, &named).unwrap().name,
            "LOCATION_NAME"
        );
    }

    #[test]
    fn case_detection_takes_no_arguments() {
        let marker = MarkerInstance::new("CaseDetection").with_bool("strict", true);
        assert!(CaseDetectionConfig::from_marker(DECL, &marker).is_err());
        let qualified = MarkerInstance::new("com.seriouslyhypersonic.annotations.CaseDetection");
        assert_eq!(
            CaseDetectionConfig::from_marker(DECL, &qualified).unwrap().marker,
            "CaseDetection"
        );
    }

    #[test]
    fn marker_values_from_json() {
        let json = r#"{"name": "ContentType", "arguments": {"authority": "a", "code": 3, "writable": true}}"#;
        let marker: MarkerInstance = serde_json::from_str(json).unwrap();
        assert_eq!(marker.arguments["code"], MarkerValue::Int(3));
        assert_eq!(marker.arguments["writable"], MarkerValue::Bool(true));
    }
}
