//! # Field Resolver
//!
//! Chooses one value for a contested field from the candidates offered by
//! each source. The choice is a pure function of the candidate multiset and
//! the configured source priority:
//!
//! 1. the value supplied by the most sources wins;
//! 2. on a frequency tie, the value backed by the highest-priority source wins;
//! 3. if that also ties, the value that appeared first in the input wins.

use crate::conflicts::{ConflictCandidate, ResolutionRule};
use crate::field_spec::FieldSpec;
use crate::model::{present, SourceId, Value};
use tracing::trace;

/// One source's offer for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: Option<Value>,
    pub source: SourceId,
}

impl Candidate {
    pub fn new(value: Option<Value>, source: impl Into<SourceId>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}

/// Outcome of resolving one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The chosen value, `None` when no source supplied one
    pub chosen: Option<Value>,
    /// True when two or more distinct values competed
    pub conflict: bool,
    /// The deciding rule; set only for conflicts
    pub rule: Option<ResolutionRule>,
    /// Distinct values with attribution, in first-appearance order
    pub candidates: Vec<ConflictCandidate>,
}

impl Resolution {
    fn empty() -> Self {
        Self {
            chosen: None,
            conflict: false,
            rule: None,
            candidates: Vec::new(),
        }
    }
}

/// Resolves contested fields against a field spec's source priority
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    spec: &'a FieldSpec,
}

impl<'a> FieldResolver<'a> {
    pub fn new(spec: &'a FieldSpec) -> Self {
        Self { spec }
    }

    /// Resolve a field from its candidates.
    pub fn resolve(&self, field: &str, candidates: &[Candidate]) -> Resolution {
        let tally = tally(candidates);

        match tally.len() {
            0 => Resolution::empty(),
            1 => Resolution {
                chosen: Some(tally[0].value.clone()),
                conflict: false,
                rule: None,
                candidates: tally,
            },
            _ => {
                let (index, rule) = self.pick(&tally);
                let chosen = tally[index].value.clone();
                trace!(field, %chosen, %rule, distinct = tally.len(), "resolved contested field");
                Resolution {
                    chosen: Some(chosen),
                    conflict: true,
                    rule: Some(rule),
                    candidates: tally,
                }
            }
        }
    }

    /// Index of the winning candidate. `tally` must hold at least two entries.
    fn pick(&self, tally: &[ConflictCandidate]) -> (usize, ResolutionRule) {
        let top = tally.iter().map(ConflictCandidate::count).max().unwrap_or(0);
        let leaders: Vec<usize> = (0..tally.len())
            .filter(|&i| tally[i].count() == top)
            .collect();
        if leaders.len() == 1 {
            return (leaders[0], ResolutionRule::Frequency);
        }

        let ranks: Vec<usize> = leaders
            .iter()
            .map(|&i| self.best_rank(&tally[i]))
            .collect();
        let best = ranks.iter().copied().min().unwrap_or(usize::MAX);
        let mut at_best = leaders
            .iter()
            .zip(&ranks)
            .filter(|(_, &rank)| rank == best)
            .map(|(&i, _)| i);

        // leaders are in first-appearance order, so the first at the best rank
        // is also the order tie-break winner
        let winner = at_best.next().unwrap_or(leaders[0]);
        if at_best.next().is_none() {
            (winner, ResolutionRule::PriorityTiebreak)
        } else {
            (winner, ResolutionRule::OrderTiebreak)
        }
    }

    fn best_rank(&self, candidate: &ConflictCandidate) -> usize {
        candidate
            .sources
            .iter()
            .map(|source| self.spec.priority_rank(source))
            .min()
            .unwrap_or(usize::MAX)
    }
}

/// Group non-blank candidate values, keeping first-appearance order and the
/// sources behind each value.
pub fn tally(candidates: &[Candidate]) -> Vec<ConflictCandidate> {
    let mut distinct: Vec<ConflictCandidate> = Vec::new();
    for candidate in candidates {
        let Some(value) = present(candidate.value.as_ref()) else {
            continue;
        };
        match distinct.iter_mut().find(|c| &c.value == value) {
            Some(existing) => existing.sources.push(candidate.source.clone()),
            None => distinct.push(ConflictCandidate::new(
                value.clone(),
                vec![candidate.source.clone()],
            )),
        }
    }
    distinct
}
