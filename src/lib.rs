//! # Unimerge
//!
//! A deterministic multi-source record merging and conflict-resolution engine.
//!
//! Records describing the same entity arrive from several independent
//! sources keyed by a shared identifier. Unimerge produces one canonical
//! record per identifier, resolves disagreeing field values by frequency
//! with an explicit priority-then-order tie-break, and records every
//! resolution in an append-only conflict log for audit.

pub mod audit;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod field_spec;
pub mod ingest;
pub mod merger;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod serving;

// Re-export main types for convenience
pub use audit::{AuditSink, DataQualityWarning, MemoryAuditSink, NoopAuditSink, TracingAuditSink};
pub use config::MergeConfig;
pub use conflicts::{ConflictCandidate, ConflictEvent, ConflictLog, ResolutionRule};
pub use error::{ConfigError, IngestError};
pub use field_spec::{FieldClass, FieldSpec};
pub use model::{Identifier, MergedRecord, SourceId, SourceRecord, Value};
pub use orchestrator::{MergeResult, MergeStats, SourceCollection};
pub use serving::{HealthReport, MergeView};

use std::sync::Arc;

/// Main API for merging source collections.
///
/// Holds only the static field spec and the audit sink, so one instance can
/// serve concurrent runs over independent inputs.
pub struct Unimerge {
    spec: FieldSpec,
    sink: Arc<dyn AuditSink>,
}

impl Unimerge {
    /// Create an engine that reports to `tracing`
    pub fn new(spec: FieldSpec) -> Self {
        Self::with_audit_sink(spec, Arc::new(TracingAuditSink))
    }

    /// Create an engine with a custom audit sink
    pub fn with_audit_sink(spec: FieldSpec, sink: Arc<dyn AuditSink>) -> Self {
        Self { spec, sink }
    }

    pub fn field_spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Merge all source collections into a fresh result.
    pub fn run(&self, sources: &[SourceCollection]) -> MergeResult {
        orchestrator::MergeOrchestrator::new(&self.spec, self.sink.as_ref()).run(sources)
    }
}

impl Default for Unimerge {
    fn default() -> Self {
        Self::new(FieldSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_shareable() {
        assert_send_sync::<Unimerge>();
        assert_send_sync::<MergeResult>();
    }

    #[test]
    fn test_run_reports_to_sink() {
        let sink = Arc::new(MemoryAuditSink::new());
        let engine = Unimerge::with_audit_sink(FieldSpec::citizen(), sink.clone());
        let sources = vec![
            SourceCollection::new(
                "health",
                vec![SourceRecord::from_pairs(
                    "health",
                    [("citizen_id", "A1"), ("name", "Ada")],
                )],
            ),
            SourceCollection::new(
                "education",
                vec![SourceRecord::from_pairs(
                    "education",
                    [("citizen_id", "A1"), ("name", "Ada L.")],
                )],
            ),
        ];

        let result = engine.run(&sources);

        assert_eq!(result.len(), 1);
        assert_eq!(sink.conflicts().len(), 1);
        assert_eq!(engine.field_spec().id_field, "citizen_id");
    }
}
