//! # declsynth-emit
//!
//! Code emission backend. Synthesizers hand it [`GeneratedUnit`]s; it renders
//! them, enforces write-once output per path and returns newly emitted units
//! to the driver so they can be resubmitted as declarations of the next
//! resolution round.
//!
//! ```text
//!   synthesizer ──► GeneratedUnit ──► CodeEmitter::emit ──► <out>/<pkg>/<File>.kt
//!                                          │
//!                                          └──► take_new ──► next round
//! ```

#![deny(unsafe_code)]

pub mod emitter;
pub mod error;
pub mod fs;
pub mod unit;

pub use emitter::{CodeEmitter, EmitStatus, MemoryEmitter};
pub use error::{EmitError, EmitResult};
pub use fs::{FsEmitter, Manifest, ManifestEntry, MANIFEST_FILE};
pub use unit::{Fingerprint, GeneratedUnit, RenderedUnit};
