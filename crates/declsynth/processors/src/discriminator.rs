//! Discriminator synthesis: one `is<Case>` accessor per case of an enum or
//! sealed hierarchy.
//!
//! ```text
//! @CaseDetection enum class Direction { Up, Down }
//!
//! public val Direction.isUp: Boolean
//!   get() = this == Direction.Up
//! public val Direction.isDown: Boolean
//!   get() = this == Direction.Down
//! ```

use std::collections::HashSet;

use tracing::debug;

use declsynth_emit::{CodeEmitter, EmitResult, GeneratedUnit};
use declsynth_kotlin::{ClassName, CodeBlock, FileSpec, PropertySpec, TypeName};
use declsynth_source::SymbolSource;
use declsynth_types::{
    CaseDetectionConfig, DeclKind, Declaration, MarkerKind, MarkerVocabulary, SynthError,
    SynthResult, Visibility,
};

use crate::config::SynthesisConfig;
use crate::discovery::{discover, Candidate, Discovered, MarkerArguments, ValidityFilter};
use crate::driver::{ProcessOutcome, Round, SymbolProcessor};
use crate::naming;

// ── Classification ───────────────────────────────────────────────────

/// The shapes a discriminator can be synthesized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discriminated {
    /// An enum class; cases are its entries.
    Enum,
    /// A non-generic sealed class or sealed interface; cases are its direct
    /// subclasses.
    Sealed,
}

impl Discriminated {
    pub fn classify(declaration: &Declaration, marker: &str) -> SynthResult<Self> {
        let name = declaration.qualified_name().canonical();
        match declaration.kind {
            DeclKind::Enum => Ok(Self::Enum),
            DeclKind::Class | DeclKind::Interface => {
                if !declaration.is_sealed() {
                    Err(SynthError::NotSealed {
                        declaration: name,
                        marker: marker.to_string(),
                    })
                } else if !declaration.type_parameters.is_empty() {
                    Err(SynthError::GenericSealed {
                        declaration: name,
                        marker: marker.to_string(),
                    })
                } else {
                    Ok(Self::Sealed)
                }
            }
            other => Err(SynthError::UnsupportedKind {
                declaration: name,
                marker: marker.to_string(),
                expected: MarkerKind::CaseDetection.target().to_string(),
                actual: other.to_string(),
            }),
        }
    }
}

// ── Plan ─────────────────────────────────────────────────────────────

/// How an accessor tests its receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseTest {
    /// `this == Case`
    Identity,
    /// `this is Case`
    Membership,
}

/// One generated accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasePlan {
    pub accessor: String,
    pub case: ClassName,
    pub test: CaseTest,
}

impl CasePlan {
    /// Whether the accessor holds for a value whose class is the first entry
    /// of `lineage`, followed by its superclasses.
    pub fn holds_for(&self, lineage: &[ClassName]) -> bool {
        match self.test {
            CaseTest::Identity => lineage.first() == Some(&self.case),
            CaseTest::Membership => lineage.contains(&self.case),
        }
    }
}

/// Every accessor generated for one discriminated declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscriminatorPlan {
    pub receiver: ClassName,
    pub visibility: Visibility,
    pub cases: Vec<CasePlan>,
}

impl DiscriminatorPlan {
    pub fn derive(
        declaration: &Declaration,
        source: &dyn SymbolSource,
        marker: &str,
    ) -> SynthResult<Self> {
        let shape = Discriminated::classify(declaration, marker)?;
        let receiver = naming::class_name(declaration)?;
        let cases = match shape {
            Discriminated::Enum => declaration
                .enum_entries()
                .map(|entry| {
                    Ok(CasePlan {
                        accessor: naming::enum_accessor(&entry.name),
                        case: naming::class_name(entry)?,
                        test: CaseTest::Identity,
                    })
                })
                .collect::<SynthResult<Vec<_>>>()?,
            Discriminated::Sealed => source
                .sealed_subclasses(declaration)
                .into_iter()
                .map(|subclass| {
                    Ok(CasePlan {
                        accessor: naming::sealed_accessor(&subclass.name),
                        case: naming::class_name(subclass)?,
                        test: CaseTest::Membership,
                    })
                })
                .collect::<SynthResult<Vec<_>>>()?,
        };

        let mut accessors = HashSet::new();
        for case in &cases {
            if !accessors.insert(case.accessor.as_str()) {
                return Err(SynthError::DuplicateAccessor {
                    declaration: receiver.canonical(),
                    accessor: case.accessor.clone(),
                });
            }
        }

        Ok(Self {
            receiver,
            visibility: declaration.visibility,
            cases,
        })
    }

    /// Accessors that evaluate to `true` for a value of the given lineage.
    pub fn evaluate(&self, lineage: &[ClassName]) -> Vec<&str> {
        self.cases
            .iter()
            .filter(|case| case.holds_for(lineage))
            .map(|case| case.accessor.as_str())
            .collect()
    }

    pub fn to_file(&self) -> FileSpec {
        let mut file = FileSpec::new(
            self.receiver.package(),
            naming::case_detection_file(self.receiver.simple_name()),
        );
        for case in &self.cases {
            let kdoc = CodeBlock::builder()
                .add("Returns `true` if this [")
                .add_type(self.receiver.clone())
                .add("] is [")
                .add_type(case.case.clone())
                .add("], `false` otherwise.")
                .build();
            let getter = CodeBlock::builder()
                .add(match case.test {
                    CaseTest::Identity => "this == ",
                    CaseTest::Membership => "this is ",
                })
                .add_type(case.case.clone())
                .build();
            file = file.with_property(
                PropertySpec::new(case.accessor.clone(), TypeName::boolean())
                    .with_modifier(self.visibility.to_kmodifier())
                    .with_receiver(self.receiver.clone())
                    .with_kdoc(kdoc)
                    .with_getter(getter),
            );
        }
        file
    }
}

impl MarkerArguments for CaseDetectionConfig {
    const KIND: MarkerKind = MarkerKind::CaseDetection;

    /// Every application is checked; the last spelling names the marker in
    /// error messages.
    fn parse(declaration: &Declaration, vocabulary: &MarkerVocabulary) -> SynthResult<Self> {
        let name = declaration.qualified_name().canonical();
        let mut config = Self::default();
        for instance in vocabulary.find(&declaration.markers, Self::KIND) {
            config = Self::from_marker(&name, instance)?;
        }
        Ok(config)
    }
}

/// Synthesize the accessor unit for one marked declaration.
pub fn synthesize(
    declaration: &Declaration,
    source: &dyn SymbolSource,
    vocabulary: &MarkerVocabulary,
) -> SynthResult<GeneratedUnit> {
    let config = CaseDetectionConfig::parse(declaration, vocabulary)?;
    synthesize_with(declaration, &config, source)
}

/// Synthesize from marker arguments parsed at discovery.
pub fn synthesize_with(
    declaration: &Declaration,
    config: &CaseDetectionConfig,
    source: &dyn SymbolSource,
) -> SynthResult<GeneratedUnit> {
    let plan = DiscriminatorPlan::derive(declaration, source, &config.marker)?;
    Ok(GeneratedUnit::new(plan.to_file(), declaration.qualified_name()))
}

// ── Processor ────────────────────────────────────────────────────────

/// Runs discriminator synthesis over every resolvable marked declaration.
pub struct CaseDetectionProcessor {
    vocabulary: MarkerVocabulary,
}

impl CaseDetectionProcessor {
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            vocabulary: config.vocabulary(),
        }
    }
}

impl SymbolProcessor for CaseDetectionProcessor {
    fn name(&self) -> &str {
        "case-detection"
    }

    fn process(
        &mut self,
        round: &Round<'_>,
        emitter: &mut dyn CodeEmitter,
    ) -> EmitResult<ProcessOutcome> {
        let found: Discovered<'_, CaseDetectionConfig> =
            discover(round, &self.vocabulary, ValidityFilter::Required);
        let mut outcome = ProcessOutcome {
            deferred: found.deferred,
            failures: found.failures,
            ..ProcessOutcome::default()
        };
        for Candidate {
            declaration,
            config,
        } in found.ready
        {
            match synthesize_with(declaration, &config, round.source) {
                Ok(unit) => {
                    debug!(
                        declaration = %declaration.qualified_name(),
                        file = %unit.path().display(),
                        "synthesized case accessors"
                    );
                    emitter.emit(unit)?;
                    outcome.emitted += 1;
                }
                Err(error) => outcome.failures.push(error),
            }
        }
        Ok(outcome)
    }
}
