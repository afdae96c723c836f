//! # Merge Orchestrator
//!
//! Runs one complete merge: indexes each source by identifier, walks the
//! union of identifiers in ascending order, merges each group and collects
//! the merged records, the conflict log and the data-quality warnings into
//! an immutable [`MergeResult`].
//!
//! A run never fails. Records without an identifier are skipped, duplicate
//! identifiers within a source keep the last record, and both are reported
//! as warnings.

use crate::audit::{AuditSink, DataQualityWarning};
use crate::conflicts::{ConflictEvent, ConflictLog};
use crate::field_spec::FieldSpec;
use crate::merger::RecordMerger;
use crate::model::{Identifier, MergedRecord, RecordsBySource, SourceId, SourceRecord};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// All records supplied by one source for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCollection {
    pub source: SourceId,
    pub records: Vec<SourceRecord>,
}

impl SourceCollection {
    pub fn new(source: impl Into<SourceId>, records: Vec<SourceRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Summary counts for a merge result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub records: usize,
    pub conflicts: usize,
    pub warnings: usize,
}

/// The complete output of one orchestration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    id_field: String,
    records: BTreeMap<Identifier, MergedRecord>,
    conflicts: ConflictLog,
    warnings: Vec<DataQualityWarning>,
}

impl MergeResult {
    /// Look up the merged record for an identifier
    pub fn get(&self, id: &Identifier) -> Option<&MergedRecord> {
        self.records.get(id)
    }

    /// All merged records in ascending identifier order
    pub fn list_all(&self) -> impl ExactSizeIterator<Item = &MergedRecord> {
        self.records.values()
    }

    /// The conflict log in processing order
    pub fn conflicts(&self) -> &ConflictLog {
        &self.conflicts
    }

    /// Data-quality warnings in the order they were raised
    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.records.keys()
    }

    /// Name of the field the identifier is rendered under
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> MergeStats {
        MergeStats {
            records: self.records.len(),
            conflicts: self.conflicts.len(),
            warnings: self.warnings.len(),
        }
    }

    /// Merged records as flat JSON objects, in identifier order
    pub fn records_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.records
                .values()
                .map(|record| record.to_json(&self.id_field))
                .collect(),
        )
    }
}

/// Drives a merge run against a field spec and audit sink
pub struct MergeOrchestrator<'a> {
    spec: &'a FieldSpec,
    sink: &'a dyn AuditSink,
}

impl<'a> MergeOrchestrator<'a> {
    pub fn new(spec: &'a FieldSpec, sink: &'a dyn AuditSink) -> Self {
        Self { spec, sink }
    }

    /// Merge the given source collections into a fresh result.
    pub fn run(&self, sources: &[SourceCollection]) -> MergeResult {
        let mut warnings = Vec::new();
        let indexes = self.index_sources(sources, &mut warnings);

        let universe: BTreeSet<&Identifier> =
            indexes.values().flat_map(|index| index.keys()).collect();
        debug!(
            sources = indexes.len(),
            identifiers = universe.len(),
            "merging source collections"
        );

        let merger = RecordMerger::new(self.spec);
        let mut records = BTreeMap::new();
        let mut conflicts = ConflictLog::new();

        for id in universe {
            let group: RecordsBySource<'_> = indexes
                .iter()
                .filter_map(|(source, index)| index.get(id).map(|rec| (source.clone(), *rec)))
                .collect();

            let outcome = merger.merge(id, &group);

            for field in outcome.unclassified {
                self.raise(
                    &mut warnings,
                    DataQualityWarning::UnclassifiedField {
                        id: id.clone(),
                        field,
                    },
                );
            }

            for (field, source) in outcome.foreign {
                self.raise(
                    &mut warnings,
                    DataQualityWarning::ForeignCombinableField {
                        id: id.clone(),
                        field,
                        source,
                    },
                );
            }

            let missing = self.missing_required(&outcome.record);
            if !missing.is_empty() {
                self.raise(
                    &mut warnings,
                    DataQualityWarning::IncompleteRecord {
                        id: id.clone(),
                        missing,
                    },
                );
            }

            for event in outcome.conflicts {
                self.record_conflict(&mut conflicts, event);
            }
            records.insert(id.clone(), outcome.record);
        }

        info!(
            records = records.len(),
            conflicts = conflicts.len(),
            warnings = warnings.len(),
            "merge run complete"
        );

        MergeResult {
            id_field: self.spec.id_field.clone(),
            records,
            conflicts,
            warnings,
        }
    }

    /// Index each source by identifier, skipping records without one and
    /// keeping the last record for duplicated identifiers.
    fn index_sources<'s>(
        &self,
        sources: &'s [SourceCollection],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> BTreeMap<SourceId, HashMap<Identifier, &'s SourceRecord>> {
        let mut indexes: BTreeMap<SourceId, HashMap<Identifier, &'s SourceRecord>> =
            BTreeMap::new();

        for collection in sources {
            let index = indexes.entry(collection.source.clone()).or_default();
            for (position, record) in collection.records.iter().enumerate() {
                let Some(id) = record.identifier(&self.spec.id_field) else {
                    self.raise(
                        warnings,
                        DataQualityWarning::MissingIdentifier {
                            source: collection.source.clone(),
                            position,
                        },
                    );
                    continue;
                };
                if index.insert(id.clone(), record).is_some() {
                    self.raise(
                        warnings,
                        DataQualityWarning::DuplicateIdentifier {
                            source: collection.source.clone(),
                            id,
                        },
                    );
                }
            }
        }

        indexes
    }

    fn missing_required(&self, record: &MergedRecord) -> Vec<String> {
        self.spec
            .required
            .iter()
            .filter(|field| record.get(field).is_none())
            .cloned()
            .collect()
    }

    fn raise(&self, warnings: &mut Vec<DataQualityWarning>, warning: DataQualityWarning) {
        self.sink.warning(&warning);
        warnings.push(warning);
    }

    fn record_conflict(&self, log: &mut ConflictLog, event: ConflictEvent) {
        self.sink.conflict(&event);
        log.append(event);
    }
}
