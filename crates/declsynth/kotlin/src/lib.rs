//! # declsynth-kotlin
//!
//! Kotlin source model used by the declsynth synthesizers.
//!
//! Synthesizers never concatenate source text directly. They build
//! [`FileSpec`] values out of names, [`CodeBlock`]s and declaration specs,
//! and the renderer turns those into text with a fixed layout so identical
//! inputs always produce byte-identical files.
//!
//! ```text
//! ClassName / MemberName / TypeName      (names)
//!            │
//!            ▼
//! CodeBlock ──► PropertySpec / FunSpec / TypeSpec ──► FileSpec
//!                                                      │
//!                                                      ▼
//!                                              render_file() ──► String
//! ```

#![deny(unsafe_code)]

pub mod code;
pub mod error;
pub mod modifier;
pub mod names;
pub mod render;
pub mod spec;

pub use code::{string_literal, CodeBlock, CodeBlockBuilder, CodePart};
pub use error::{KotlinError, KotlinResult};
pub use modifier::KModifier;
pub use names::{escape_identifier, is_identifier, ClassName, MemberName, TypeName};
pub use render::render_file;
pub use spec::{FileMember, FileSpec, FunSpec, ParameterSpec, PropertySpec, TypeKind, TypeSpec};
