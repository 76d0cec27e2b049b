//! # declsynth-processors
//!
//! Discovery, the three synthesizers and the round driver.
//!
//! Every synthesizer derives a plan from a marked declaration, turns the
//! plan into a [`FileSpec`](declsynth_kotlin::FileSpec) and hands the
//! resulting unit to the emitter. The [`Driver`] runs the synthesizers
//! round by round until generated code stops producing new input.
//!
//! ```text
//!                      ┌──────────────────────┐
//!   SymbolSource ────► │ discover (per marker)│
//!                      └──────────┬───────────┘
//!            ┌────────────────────┼────────────────────┐
//!            ▼                    ▼                    ▼
//!   DiscriminatorPlan        ContractPlan        ControllerPlan
//!   <T>CaseDetection.kt      <T>Contract.kt      <T>Contract.kt
//!            └────────────────────┼────────────────────┘
//!                                 ▼
//!                           CodeEmitter ──► next round
//! ```

#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod contract;
pub mod discovery;
pub mod discriminator;
pub mod driver;
pub mod error;
pub mod naming;
pub mod preview;

pub use codec::{CodecError, CodecResult, ColumnKind, Mapping, Record, Row, Value};
pub use config::{DriverConfig, RuntimeSymbols, SynthesisConfig};
pub use contract::{
    ColumnPlan, ContentContractProcessor, ContractContext, ContractMarkers, ContractPlan,
    FieldDescriptor,
};
pub use discovery::{discover, Candidate, Discovered, MarkerArguments, ValidityFilter};
pub use discriminator::{CasePlan, CaseTest, CaseDetectionProcessor, Discriminated, DiscriminatorPlan};
pub use driver::{Driver, ProcessOutcome, Round, RunSummary, SymbolProcessor};
pub use error::{DriverError, DriverResult};
pub use preview::{ContractFunction, ContractParameter, ContractProperty, ControllerPlan, PreviewProcessor};
