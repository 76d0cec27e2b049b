//! Discovery: the declarations a processor works on in one round.
//!
//! Marker arguments are parsed here, before the validity filter, so a
//! malformed marker fails the run even on a declaration that never resolves.

use std::collections::HashSet;

use tracing::debug;

use declsynth_types::{
    Declaration, MarkerKind, MarkerVocabulary, QualifiedName, SynthError, SynthResult,
};

use crate::driver::Round;

/// Whether discovery holds back declarations that do not resolve yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidityFilter {
    /// Only resolvable declarations are ready; the rest are deferred.
    Required,
    /// Every marked declaration is ready, resolvable or not.
    Ignored,
}

/// Typed marker arguments a processor needs for one declaration.
pub trait MarkerArguments: Sized {
    /// The marker that makes a declaration a candidate.
    const KIND: MarkerKind;

    fn parse(declaration: &Declaration, vocabulary: &MarkerVocabulary) -> SynthResult<Self>;
}

/// A ready declaration with its parsed marker arguments.
#[derive(Debug)]
pub struct Candidate<'a, C> {
    pub declaration: &'a Declaration,
    pub config: C,
}

/// Result of discovery for one marker in one round.
#[derive(Debug)]
pub struct Discovered<'a, C> {
    pub ready: Vec<Candidate<'a, C>>,
    pub deferred: Vec<QualifiedName>,
    /// Declarations whose marker arguments are malformed.
    pub failures: Vec<SynthError>,
}

impl<C> Default for Discovered<'_, C> {
    fn default() -> Self {
        Self {
            ready: Vec::new(),
            deferred: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<C> Discovered<'_, C> {
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty() && self.deferred.is_empty() && self.failures.is_empty()
    }
}

/// Declarations carrying `C::KIND`: the ones deferred by the previous round
/// followed by the ones new in this round, each listed once.
pub fn discover<'a, C: MarkerArguments>(
    round: &Round<'a>,
    vocabulary: &MarkerVocabulary,
    filter: ValidityFilter,
) -> Discovered<'a, C> {
    let source = round.source;
    let carried = round
        .deferred
        .iter()
        .filter_map(|name| source.declaration(name))
        .filter(|decl| vocabulary.find(&decl.markers, C::KIND).next().is_some());
    let mut seen = HashSet::new();
    let candidates: Vec<&'a Declaration> = carried
        .chain(source.annotated_with(vocabulary, C::KIND))
        .filter(|decl| seen.insert(decl.qualified_name()))
        .collect();

    let mut discovered = Discovered::default();
    for declaration in candidates {
        let config = match C::parse(declaration, vocabulary) {
            Ok(config) => config,
            Err(error) => {
                discovered.failures.push(error);
                continue;
            }
        };
        if filter == ValidityFilter::Required && !source.is_valid(declaration) {
            debug!(
                declaration = %declaration.qualified_name(),
                round = round.number,
                unresolved = ?source.unresolved_references(declaration),
                "deferring declaration"
            );
            discovered.deferred.push(declaration.qualified_name());
        } else {
            discovered.ready.push(Candidate {
                declaration,
                config,
            });
        }
    }
    discovered
}
