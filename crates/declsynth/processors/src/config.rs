//! Synthesis and driver configuration.
//!
//! Generated code refers to a small runtime library (the persistence
//! contract interface, a typed cursor getter, the preview-aware
//! `injectViewModel`) and to platform types. Every one of those symbols is
//! configurable so the synthesizers carry no hard-coded package names.

use serde::{Deserialize, Serialize};

use declsynth_kotlin::{ClassName, MemberName};
use declsynth_types::{MarkerVocabulary, DEFAULT_MARKER_PACKAGE};

use crate::error::{DriverError, DriverResult};

// ── Runtime Symbols ──────────────────────────────────────────────────

/// Types and members referenced by generated code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSymbols {
    pub content_type_contract: ClassName,
    pub content_provider: ClassName,
    pub content_values: ClassName,
    pub cursor: ClassName,
    pub matrix_cursor: ClassName,
    pub uri: ClassName,
    pub uri_matcher: ClassName,
    /// Typed `Cursor.get(column)` extension.
    pub cursor_get: MemberName,
    pub composable: ClassName,
    pub qualifier: ClassName,
    pub view_model_store_owner: ClassName,
    pub local_view_model_store_owner: ClassName,
    pub creation_extras: ClassName,
    pub default_extras: MemberName,
    pub scope: ClassName,
    pub local_koin_scope: ClassName,
    pub parameters_definition: ClassName,
    /// Resolves the preview substitute under inspection mode and the live
    /// instance otherwise.
    pub inject_view_model: MemberName,
}

impl Default for RuntimeSymbols {
    fn default() -> Self {
        Self {
            content_type_contract: ClassName::new(
                "com.seriouslyhypersonic.library.content",
                "ContentTypeContract",
            ),
            content_provider: ClassName::new("android.content", "ContentProvider"),
            content_values: ClassName::new("android.content", "ContentValues"),
            cursor: ClassName::new("android.database", "Cursor"),
            matrix_cursor: ClassName::new("android.database", "MatrixCursor"),
            uri: ClassName::new("android.net", "Uri"),
            uri_matcher: ClassName::new("android.content", "UriMatcher"),
            cursor_get: MemberName::new("com.seriouslyhypersonic.library.ktx", "get"),
            composable: ClassName::new("androidx.compose.runtime", "Composable"),
            qualifier: ClassName::new("org.koin.core.qualifier", "Qualifier"),
            view_model_store_owner: ClassName::new("androidx.lifecycle", "ViewModelStoreOwner"),
            local_view_model_store_owner: ClassName::new(
                "androidx.lifecycle.viewmodel.compose",
                "LocalViewModelStoreOwner",
            ),
            creation_extras: ClassName::new("androidx.lifecycle.viewmodel", "CreationExtras"),
            default_extras: MemberName::new("org.koin.androidx.compose", "defaultExtras"),
            scope: ClassName::new("org.koin.core.scope", "Scope"),
            local_koin_scope: ClassName::new("org.koin.compose", "LocalKoinScope"),
            parameters_definition: ClassName::new(
                "org.koin.core.parameter",
                "ParametersDefinition",
            ),
            inject_view_model: MemberName::new(
                "com.seriouslyhypersonic.library.preview",
                "injectViewModel",
            ),
        }
    }
}

// ── Synthesis Config ─────────────────────────────────────────────────

/// Configuration shared by every synthesizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Package the marker annotations live in.
    pub marker_package: String,
    /// Scheme of generated content URIs.
    pub uri_scheme: String,
    pub runtime: RuntimeSymbols,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            marker_package: DEFAULT_MARKER_PACKAGE.to_string(),
            uri_scheme: "content".to_string(),
            runtime: RuntimeSymbols::default(),
        }
    }
}

impl SynthesisConfig {
    pub fn vocabulary(&self) -> MarkerVocabulary {
        MarkerVocabulary::new(self.marker_package.clone())
    }

    /// Reject values generated code could not embed verbatim.
    pub fn validate(&self) -> DriverResult<()> {
        let mut chars = self.uri_scheme.chars();
        let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(DriverError::InvalidConfig(format!(
                "'{}' is not a valid URI scheme",
                self.uri_scheme
            )));
        }
        if !self.marker_package.is_empty()
            && !self
                .marker_package
                .split('.')
                .all(declsynth_kotlin::is_identifier)
        {
            return Err(DriverError::InvalidConfig(format!(
                "'{}' is not a valid marker package",
                self.marker_package
            )));
        }
        Ok(())
    }
}

// ── Driver Config ────────────────────────────────────────────────────

/// Limits of the round driver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Upper bound on resolution rounds.
    pub max_rounds: usize,
    /// Fail the run when declarations are still deferred after the last
    /// round instead of reporting them.
    pub deny_unresolved: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_rounds: 16,
            deny_unresolved: false,
        }
    }
}
