//! The multi-round driver.
//!
//! Each round, every processor sees the declarations new in that round plus
//! the ones it deferred in the previous round. Units emitted during a round
//! are fed back to the symbol source and become the next round's new
//! declarations. The run ends with the first round that emits nothing.
//!
//! ```text
//!   round N ──► processors ──► emitter ──► take_new ──► advance_round ──► round N+1
//!                   │                                         (until no new units)
//!                   └──► deferred (per processor) ─────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use declsynth_emit::{CodeEmitter, EmitResult};
use declsynth_kotlin::FileSpec;
use declsynth_source::SymbolSource;
use declsynth_types::{QualifiedName, SynthError};

use crate::config::{DriverConfig, SynthesisConfig};
use crate::contract::ContentContractProcessor;
use crate::discriminator::CaseDetectionProcessor;
use crate::error::{DriverError, DriverResult};
use crate::preview::PreviewProcessor;

// ── Round ────────────────────────────────────────────────────────────

/// What a processor sees in one round.
#[derive(Clone, Copy)]
pub struct Round<'a> {
    /// Round number, starting at 1.
    pub number: usize,
    pub source: &'a dyn SymbolSource,
    /// Declarations this processor deferred in the previous round.
    pub deferred: &'a [QualifiedName],
}

impl<'a> Round<'a> {
    pub fn new(number: usize, source: &'a dyn SymbolSource, deferred: &'a [QualifiedName]) -> Self {
        Self {
            number,
            source,
            deferred,
        }
    }

    /// The first round: nothing deferred yet.
    pub fn first(source: &'a dyn SymbolSource) -> Self {
        Self::new(1, source, &[])
    }
}

// ── Processor ────────────────────────────────────────────────────────

/// Outcome of one processor in one round.
#[derive(Debug, Default, PartialEq)]
pub struct ProcessOutcome {
    /// Units handed to the emitter.
    pub emitted: usize,
    /// Declarations to look at again next round.
    pub deferred: Vec<QualifiedName>,
    /// Declarations whose synthesis failed. Siblings are unaffected.
    pub failures: Vec<SynthError>,
}

/// A synthesis pass driven round by round.
pub trait SymbolProcessor {
    fn name(&self) -> &str;

    /// Synthesize every ready declaration of the round. Emission errors are
    /// fatal; synthesis errors are collected per declaration.
    fn process(
        &mut self,
        round: &Round<'_>,
        emitter: &mut dyn CodeEmitter,
    ) -> EmitResult<ProcessOutcome>;

    /// Called once after the last round.
    fn finish(&mut self) {}
}

// ── Summary ──────────────────────────────────────────────────────────

/// Summary of a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Rounds executed, including the final one that emitted nothing.
    pub rounds: usize,
    /// Units emitted per processor.
    pub emitted: BTreeMap<String, usize>,
    /// Declarations still deferred when the run ended.
    pub unresolved: Vec<String>,
}

impl RunSummary {
    pub fn total_emitted(&self) -> usize {
        self.emitted.values().sum()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} unit(s) in {} round(s)",
            self.total_emitted(),
            self.rounds
        )?;
        if !self.unresolved.is_empty() {
            write!(f, ", {} unresolved", self.unresolved.len())?;
        }
        Ok(())
    }
}

// ── Driver ───────────────────────────────────────────────────────────

/// Runs processors over a symbol source until no new units appear.
pub struct Driver {
    processors: Vec<Box<dyn SymbolProcessor>>,
    config: DriverConfig,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            processors: Vec::new(),
            config,
        }
    }

    /// A driver with the discriminator, persistence-contract and
    /// controller-contract processors, in that order.
    pub fn standard(synthesis: &SynthesisConfig, config: DriverConfig) -> DriverResult<Self> {
        synthesis.validate()?;
        Ok(Self::new(config)
            .with_processor(Box::new(CaseDetectionProcessor::new(synthesis)))
            .with_processor(Box::new(ContentContractProcessor::new(synthesis)))
            .with_processor(Box::new(PreviewProcessor::new(synthesis))))
    }

    pub fn with_processor(mut self, processor: Box<dyn SymbolProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn run(
        &mut self,
        source: &mut dyn SymbolSource,
        emitter: &mut dyn CodeEmitter,
    ) -> DriverResult<RunSummary> {
        let mut deferred: Vec<Vec<QualifiedName>> = vec![Vec::new(); self.processors.len()];
        let mut summary = RunSummary::default();
        for processor in &self.processors {
            summary.emitted.insert(processor.name().to_string(), 0);
        }

        loop {
            let number = source.round();
            if number > self.config.max_rounds {
                return Err(DriverError::RoundLimitExceeded(self.config.max_rounds));
            }
            info!(
                round = number,
                source = source.name(),
                new = source.new_declarations().len(),
                "starting round"
            );

            let mut failures = Vec::new();
            for (processor, deferred) in self.processors.iter_mut().zip(deferred.iter_mut()) {
                let carried = std::mem::take(deferred);
                let round = Round::new(number, &*source, &carried);
                let outcome = processor.process(&round, emitter)?;
                debug!(
                    processor = processor.name(),
                    round = number,
                    emitted = outcome.emitted,
                    deferred = outcome.deferred.len(),
                    failed = outcome.failures.len(),
                    "processor finished round"
                );
                if let Some(count) = summary.emitted.get_mut(processor.name()) {
                    *count += outcome.emitted;
                }
                *deferred = outcome.deferred;
                failures.extend(outcome.failures);
            }
            summary.rounds = number;

            if !failures.is_empty() {
                return Err(DriverError::SynthesisFailed(failures));
            }

            let new_units = emitter.take_new();
            if new_units.is_empty() {
                break;
            }
            let files: Vec<FileSpec> = new_units.into_iter().map(|unit| unit.file).collect();
            source.advance_round(&files)?;
        }

        for processor in &mut self.processors {
            processor.finish();
        }
        emitter.finish()?;

        let mut unresolved: Vec<String> = deferred
            .into_iter()
            .flatten()
            .map(|name| name.canonical())
            .collect();
        unresolved.sort();
        unresolved.dedup();
        if !unresolved.is_empty() {
            if self.config.deny_unresolved {
                return Err(DriverError::Unresolved(unresolved));
            }
            for name in &unresolved {
                warn!(declaration = %name, "declaration never became resolvable");
            }
        }
        summary.unresolved = unresolved;
        info!(
            rounds = summary.rounds,
            units = summary.total_emitted(),
            "synthesis complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declsynth_emit::{GeneratedUnit, MemoryEmitter};
    use declsynth_kotlin::TypeSpec;
    use declsynth_source::InMemorySymbolSource;
    use declsynth_types::{DeclKind, Declaration};

    /// Emits one new interface per round for the first `rounds` rounds.
    struct Chain {
        rounds: usize,
    }

    impl SymbolProcessor for Chain {
        fn name(&self) -> &str {
            "chain"
        }

        fn process(
            &mut self,
            round: &Round<'_>,
            emitter: &mut dyn CodeEmitter,
        ) -> EmitResult<ProcessOutcome> {
            if round.number > self.rounds {
                return Ok(ProcessOutcome::default());
            }
            let name = format!("Step{}", round.number);
            emitter.emit(GeneratedUnit::new(
                FileSpec::new("demo", name.clone()).with_type(TypeSpec::interface(name.clone())),
                QualifiedName::top_level("demo", name),
            ))?;
            Ok(ProcessOutcome {
                emitted: 1,
                ..ProcessOutcome::default()
            })
        }
    }

    struct Failing;

    impl SymbolProcessor for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn process(&mut self, _: &Round<'_>, _: &mut dyn CodeEmitter) -> EmitResult<ProcessOutcome> {
            Ok(ProcessOutcome {
                failures: vec![SynthError::NoStoredProperties {
                    declaration: "demo.Empty".into(),
                }],
                ..ProcessOutcome::default()
            })
        }
    }

    /// Defers the same declaration forever.
    struct Stuck;

    impl SymbolProcessor for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }

        fn process(&mut self, _: &Round<'_>, _: &mut dyn CodeEmitter) -> EmitResult<ProcessOutcome> {
            Ok(ProcessOutcome {
                deferred: vec![QualifiedName::top_level("demo", "Waiting")],
                ..ProcessOutcome::default()
            })
        }
    }

    fn source() -> InMemorySymbolSource {
        let mut source = InMemorySymbolSource::new();
        source
            .add_declaration(Declaration::new(DeclKind::Class, "demo", "Seed"))
            .unwrap();
        source
    }

    #[test]
    fn runs_until_a_round_emits_nothing() {
        let mut driver = Driver::new(DriverConfig::default()).with_processor(Box::new(Chain { rounds: 3 }));
        let mut source = source();
        let mut emitter = MemoryEmitter::new();
        let summary = driver.run(&mut source, &mut emitter).unwrap();
        assert_eq!(summary.rounds, 4);
        assert_eq!(summary.emitted["chain"], 3);
        assert_eq!(summary.to_string(), "3 unit(s) in 4 round(s)");
        assert!(source
            .declaration(&QualifiedName::top_level("demo", "Step3"))
            .is_some());
    }

    #[test]
    fn round_limit_is_enforced() {
        let config = DriverConfig {
            max_rounds: 2,
            ..DriverConfig::default()
        };
        let mut driver = Driver::new(config).with_processor(Box::new(Chain { rounds: 5 }));
        let err = driver
            .run(&mut source(), &mut MemoryEmitter::new())
            .unwrap_err();
        assert!(matches!(err, DriverError::RoundLimitExceeded(2)));
    }

    #[test]
    fn failures_fail_the_run_after_the_round() {
        let mut driver = Driver::new(DriverConfig::default())
            .with_processor(Box::new(Failing))
            .with_processor(Box::new(Chain { rounds: 1 }));
        let mut emitter = MemoryEmitter::new();
        let err = driver.run(&mut source(), &mut emitter).unwrap_err();
        assert!(matches!(err, DriverError::SynthesisFailed(ref f) if f.len() == 1));
        // The sibling processor still ran its round.
        assert_eq!(emitter.len(), 1);
    }

    #[test]
    fn leftover_deferrals_are_reported_or_denied() {
        let mut driver = Driver::new(DriverConfig::default()).with_processor(Box::new(Stuck));
        let summary = driver.run(&mut source(), &mut MemoryEmitter::new()).unwrap();
        assert_eq!(summary.unresolved, ["demo.Waiting"]);
        assert_eq!(summary.to_string(), "0 unit(s) in 1 round(s), 1 unresolved");

        let config = DriverConfig {
            deny_unresolved: true,
            ..DriverConfig::default()
        };
        let mut driver = Driver::new(config).with_processor(Box::new(Stuck));
        let err = driver.run(&mut source(), &mut MemoryEmitter::new()).unwrap_err();
        assert!(matches!(err, DriverError::Unresolved(ref names) if names == &["demo.Waiting"]));
    }

    #[test]
    fn standard_driver_validates_config() {
        let synthesis = SynthesisConfig {
            uri_scheme: String::new(),
            ..SynthesisConfig::default()
        };
        assert!(Driver::standard(&synthesis, DriverConfig::default()).is_err());
        let driver = Driver::standard(&SynthesisConfig::default(), DriverConfig::default()).unwrap();
        assert_eq!(
            driver.processor_names(),
            ["case-detection", "content-contract", "previewable"]
        );
    }
}
