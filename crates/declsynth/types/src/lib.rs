//! # declsynth-types
//!
//! Declaration model and marker vocabulary shared by the declsynth symbol
//! source and synthesizers.
//!
//! - [`Declaration`]: immutable snapshot of a class-like declaration.
//! - [`TypeRef`]: a type as written, before name resolution.
//! - [`MarkerVocabulary`] and the typed configurations
//!   ([`PersistenceConfig`], [`ColumnOverride`], [`ContractConfig`]) that
//!   marker arguments are parsed into at discovery.
//! - [`SynthError`]: every way synthesis of a declaration can fail.

#![deny(unsafe_code)]

pub mod declaration;
pub mod error;
pub mod marker;
pub mod typeref;

pub use declaration::{
    DeclKind, Declaration, FunctionDecl, Modifier, ParameterDecl, PropertyDecl, QualifiedName,
    Visibility,
};
pub use error::{SynthError, SynthResult};
pub use marker::{
    CaseDetectionConfig, ColumnOverride, ContractConfig, MarkerInstance, MarkerKind, MarkerValue,
    MarkerVocabulary, PersistenceConfig, DEFAULT_MARKER_PACKAGE,
};
pub use typeref::{TypeRef, TypeRefParseError};
