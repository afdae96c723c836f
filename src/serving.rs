//! Read-side view of the latest merge result.
//!
//! Each run produces a complete [`MergeResult`]; publishing it swaps a shared
//! pointer so readers see either the previous result or the new one, never a
//! partially built result.

use crate::conflicts::ConflictEvent;
use crate::model::{Identifier, MergedRecord};
use crate::orchestrator::MergeResult;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Service health summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// Number of results published so far
    pub generation: u64,
    pub records: usize,
    pub conflicts: usize,
    pub warnings: usize,
}

/// Holds the current merge result for concurrent readers
#[derive(Debug, Default)]
pub struct MergeView {
    current: RwLock<Arc<MergeResult>>,
    generation: AtomicU64,
}

impl MergeView {
    /// An empty view with no published result
    pub fn new() -> Self {
        Self::default()
    }

    /// A view seeded with an initial result
    pub fn with_result(result: MergeResult) -> Self {
        let view = Self::new();
        view.publish(result);
        view
    }

    /// Replace the current result, returning the previous one.
    pub fn publish(&self, result: MergeResult) -> Arc<MergeResult> {
        let next = Arc::new(result);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "published merge result");
        previous
    }

    /// The current result; stays valid after later publications
    pub fn snapshot(&self) -> Arc<MergeResult> {
        Arc::clone(&self.current.read())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn get(&self, id: &Identifier) -> Option<MergedRecord> {
        self.current.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<MergedRecord> {
        self.current.read().list_all().cloned().collect()
    }

    pub fn conflicts(&self) -> Vec<ConflictEvent> {
        self.current.read().conflicts().events().to_vec()
    }

    pub fn health(&self) -> HealthReport {
        let snapshot = self.snapshot();
        let stats = snapshot.stats();
        HealthReport {
            status: "healthy".to_string(),
            generation: self.generation(),
            records: stats.records,
            conflicts: stats.conflicts,
            warnings: stats.warnings,
        }
    }
}
