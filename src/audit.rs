//! # Audit Module
//!
//! Data-quality warnings raised during a merge run and the sinks that
//! receive them, together with every conflict event, for persistence outside
//! the engine.

use crate::conflicts::ConflictEvent;
use crate::model::{Identifier, SourceId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// A recoverable anomaly in the input data
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DataQualityWarning {
    /// A record had no usable identifier and was skipped
    MissingIdentifier { source: SourceId, position: usize },
    /// A source supplied the same identifier more than once; the last record won
    DuplicateIdentifier { source: SourceId, id: Identifier },
    /// A field without classification was passed through verbatim
    UnclassifiedField { id: Identifier, field: String },
    /// A combinable field arrived from a source that does not own it and
    /// was not used
    ForeignCombinableField {
        id: Identifier,
        field: String,
        source: SourceId,
    },
    /// Required fields are still null after merging
    IncompleteRecord { id: Identifier, missing: Vec<String> },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentifier { source, position } => write!(
                f,
                "record {position} from {source} has no identifier, skipped"
            ),
            Self::DuplicateIdentifier { source, id } => write!(
                f,
                "duplicate identifier {id} in {source}, keeping the last record"
            ),
            Self::UnclassifiedField { id, field } => write!(
                f,
                "unclassified field {field} for {id} passed through"
            ),
            Self::ForeignCombinableField { id, field, source } => write!(
                f,
                "{field} for {id} supplied by non-owner {source}, ignored"
            ),
            Self::IncompleteRecord { id, missing } => write!(
                f,
                "insufficient data for {id}, missing {}",
                missing.join(", ")
            ),
        }
    }
}

/// Receives audit output from the orchestrator
pub trait AuditSink: Send + Sync {
    fn conflict(&self, event: &ConflictEvent);
    fn warning(&self, warning: &DataQualityWarning);
}

/// Forwards audit output to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn conflict(&self, event: &ConflictEvent) {
        info!(
            id = %event.id,
            field = %event.field,
            chosen = %event.chosen,
            rule = %event.rule,
            candidates = event.candidates.len(),
            "{event}"
        );
    }

    fn warning(&self, warning: &DataQualityWarning) {
        warn!("{warning}");
    }
}

/// Discards audit output
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn conflict(&self, _event: &ConflictEvent) {}
    fn warning(&self, _warning: &DataQualityWarning) {}
}

/// Collects audit output in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    conflicts: Mutex<Vec<ConflictEvent>>,
    warnings: Mutex<Vec<DataQualityWarning>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conflicts(&self) -> Vec<ConflictEvent> {
        self.conflicts.lock().clone()
    }

    pub fn warnings(&self) -> Vec<DataQualityWarning> {
        self.warnings.lock().clone()
    }

    /// Drain everything collected so far
    pub fn take(&self) -> (Vec<ConflictEvent>, Vec<DataQualityWarning>) {
        (
            std::mem::take(&mut *self.conflicts.lock()),
            std::mem::take(&mut *self.warnings.lock()),
        )
    }
}

impl AuditSink for MemoryAuditSink {
    fn conflict(&self, event: &ConflictEvent) {
        self.conflicts.lock().push(event.clone());
    }

    fn warning(&self, warning: &DataQualityWarning) {
        self.warnings.lock().push(warning.clone());
    }
}

impl<T: AuditSink + ?Sized> AuditSink for std::sync::Arc<T> {
    fn conflict(&self, event: &ConflictEvent) {
        (**self).conflict(event)
    }

    fn warning(&self, warning: &DataQualityWarning) {
        (**self).warning(warning)
    }
}
