//! # Record Merger
//!
//! Builds the merged record for one identifier from whichever sources have a
//! record for it. Contested fields go through the [`FieldResolver`];
//! combinable fields are copied from their owning source and reported when
//! another source sends them; fields the spec does not mention are passed
//! through as given so no data is dropped.

use crate::conflicts::ConflictEvent;
use crate::field_spec::FieldSpec;
use crate::model::{present, Identifier, MergedRecord, RecordsBySource, SourceId, SourceRecord};
use crate::resolver::{Candidate, FieldResolver};
use std::collections::BTreeSet;

/// Everything produced while merging one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub record: MergedRecord,
    /// Conflict events in field declaration order
    pub conflicts: Vec<ConflictEvent>,
    /// Fields present in the data but absent from the spec
    pub unclassified: Vec<String>,
    /// Combinable fields with a value from a source other than their owner
    pub foreign: Vec<(String, SourceId)>,
}

/// Merges the per-source records of one identifier
#[derive(Debug, Clone, Copy)]
pub struct RecordMerger<'a> {
    spec: &'a FieldSpec,
    resolver: FieldResolver<'a>,
}

impl<'a> RecordMerger<'a> {
    pub fn new(spec: &'a FieldSpec) -> Self {
        Self {
            spec,
            resolver: FieldResolver::new(spec),
        }
    }

    /// Merge one identifier's records.
    ///
    /// Every record in `records` must carry `id`; the orchestrator enforces
    /// this before grouping.
    pub fn merge(&self, id: &Identifier, records: &RecordsBySource<'_>) -> MergeOutcome {
        let ordered = self.in_priority_order(records);
        let mut record = MergedRecord::new(id.clone());
        let mut conflicts = Vec::new();

        for field in self.spec.contested_fields() {
            let candidates: Vec<Candidate> = ordered
                .iter()
                .map(|(source, rec)| Candidate::new(rec.get(field).cloned(), (*source).clone()))
                .collect();

            let resolution = self.resolver.resolve(field, &candidates);
            if let (true, Some(chosen), Some(rule)) =
                (resolution.conflict, resolution.chosen.clone(), resolution.rule)
            {
                conflicts.push(ConflictEvent::new(
                    id.clone(),
                    field,
                    resolution.candidates,
                    chosen,
                    rule,
                ));
            }
            record.set(field, resolution.chosen);
        }

        let mut foreign = Vec::new();
        for (field, owner) in self.spec.combinable_fields() {
            let value = records
                .get(owner)
                .and_then(|rec| present(rec.get(field)))
                .cloned();
            record.set(field, value);

            foreign.extend(
                ordered
                    .iter()
                    .filter(|(source, rec)| *source != owner && present(rec.get(field)).is_some())
                    .map(|(source, _)| (field.to_string(), (*source).clone())),
            );
        }

        let mut unclassified = BTreeSet::new();
        for (_, rec) in &ordered {
            for (field, value) in &rec.fields {
                if self.spec.is_known(field) {
                    continue;
                }
                unclassified.insert(field.clone());
                if record.get(field).is_none() {
                    record.set(field.clone(), value.clone());
                }
            }
        }

        MergeOutcome {
            record,
            conflicts,
            unclassified: unclassified.into_iter().collect(),
            foreign,
        }
    }

    fn in_priority_order<'r>(
        &self,
        records: &'r RecordsBySource<'r>,
    ) -> Vec<(&'r SourceId, &'r SourceRecord)> {
        let mut ordered: Vec<_> = records.iter().map(|(s, r)| (s, *r)).collect();
        ordered.sort_by(|a, b| self.spec.compare_sources(a.0, b.0));
        ordered
    }
}
