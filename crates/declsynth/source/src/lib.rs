//! # declsynth-source
//!
//! The symbol source: the declaration graph a synthesis run reads from.
//!
//! ```text
//!   graph.json ──► SymbolGraph ──► InMemorySymbolSource ◄── generated FileSpecs
//!                                        │                   (advance_round)
//!                                        ▼
//!                  new_declarations / resolve / all_properties / sealed_subclasses
//! ```
//!
//! Names are resolved the way the Kotlin compiler would see them from inside
//! a declaration: type parameters, enclosing scopes, explicit imports, the
//! declaration's own package, star imports, default imports and finally
//! fully qualified names.

#![deny(unsafe_code)]

pub mod absorb;
pub mod builtins;
pub mod error;
pub mod graph;
pub mod memory;
pub mod source;

pub use absorb::declarations_from_file;
pub use builtins::default_import;
pub use error::{SourceError, SourceResult};
pub use graph::SymbolGraph;
pub use memory::InMemorySymbolSource;
pub use source::{Member, SymbolSource};
