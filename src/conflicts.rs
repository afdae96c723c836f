//! # Conflicts Module
//!
//! Structured records of field-level disagreements and the append-only log
//! that collects them during a merge run.

use crate::model::{Identifier, SourceId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The rule that decided a contested field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionRule {
    /// One value was supplied by strictly more sources than any other
    Frequency,
    /// Frequencies tied; the highest-priority source decided
    PriorityTiebreak,
    /// Frequencies and priorities tied; the first candidate won
    OrderTiebreak,
}

impl ResolutionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::PriorityTiebreak => "priority-tiebreak",
            Self::OrderTiebreak => "order-tiebreak",
        }
    }
}

impl fmt::Display for ResolutionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A distinct candidate value with the sources that supplied it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictCandidate {
    pub value: Value,
    pub sources: Vec<SourceId>,
}

impl ConflictCandidate {
    /// Create a new conflict candidate
    pub fn new(value: Value, sources: Vec<SourceId>) -> Self {
        Self { value, sources }
    }

    /// Number of sources that supplied this value
    pub fn count(&self) -> usize {
        self.sources.len()
    }
}

/// A resolved disagreement on one contested field of one entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictEvent {
    pub id: Identifier,
    pub field: String,
    /// Distinct values in order of first appearance
    pub candidates: Vec<ConflictCandidate>,
    pub chosen: Value,
    pub rule: ResolutionRule,
}

impl ConflictEvent {
    /// Create a new conflict event
    pub fn new(
        id: Identifier,
        field: impl Into<String>,
        candidates: Vec<ConflictCandidate>,
        chosen: Value,
        rule: ResolutionRule,
    ) -> Self {
        Self {
            id,
            field: field.into(),
            candidates,
            chosen,
            rule,
        }
    }
}

impl fmt::Display for ConflictEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} conflict resolved for {}: [", self.field, self.id)?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} from ", candidate.value)?;
            for (j, source) in candidate.sources.iter().enumerate() {
                if j > 0 {
                    f.write_str("+")?;
                }
                write!(f, "{source}")?;
            }
        }
        write!(f, "] -> {} ({})", self.chosen, self.rule)
    }
}

/// Append-only, ordered sequence of conflict events for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictLog {
    events: Vec<ConflictEvent>,
}

impl ConflictLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: ConflictEvent) {
        self.events.push(event);
    }

    /// All events in processing order
    pub fn events(&self) -> &[ConflictEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConflictEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded for one entity, in field order
    pub fn for_identifier<'a>(
        &'a self,
        id: &'a Identifier,
    ) -> impl Iterator<Item = &'a ConflictEvent> + 'a {
        self.events.iter().filter(move |event| &event.id == id)
    }
}

impl<'a> IntoIterator for &'a ConflictLog {
    type Item = &'a ConflictEvent;
    type IntoIter = std::slice::Iter<'a, ConflictEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_event(id: &str) -> ConflictEvent {
        ConflictEvent::new(
            Identifier::new(id),
            "name",
            vec![
                ConflictCandidate::new(Value::text("John Uzendu"), vec![SourceId::new("health")]),
                ConflictCandidate::new(
                    Value::text("Johnmicheal Uzendu"),
                    vec![SourceId::new("education")],
                ),
            ],
            Value::text("John Uzendu"),
            ResolutionRule::PriorityTiebreak,
        )
    }

    #[test]
    fn test_conflict_event_creation() {
        let event = name_event("A1234");
        assert_eq!(event.field, "name");
        assert_eq!(event.candidates.len(), 2);
        assert_eq!(event.candidates[0].count(), 1);
        assert_ne!(event.candidates[1].value, event.chosen);
    }

    #[test]
    fn test_conflict_event_display() {
        let event = name_event("A1234");
        assert_eq!(
            event.to_string(),
            "name conflict resolved for A1234: [\"John Uzendu\" from health, \"Johnmicheal Uzendu\" from education] -> \"John Uzendu\" (priority-tiebreak)"
        );
    }

    #[test]
    fn test_rule_serde() {
        let json = serde_json::to_string(&ResolutionRule::PriorityTiebreak).unwrap();
        assert_eq!(json, "\"priority-tiebreak\"");
        let rule: ResolutionRule = serde_json::from_str("\"order-tiebreak\"").unwrap();
        assert_eq!(rule, ResolutionRule::OrderTiebreak);
        assert_eq!(ResolutionRule::Frequency.to_string(), "frequency");
    }

    #[test]
    fn test_log_preserves_append_order() {
        let mut log = ConflictLog::new();
        assert!(log.is_empty());

        log.append(name_event("B"));
        log.append(name_event("A"));
        log.append(name_event("B"));

        let ids: Vec<_> = log.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "B"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.for_identifier(&Identifier::new("B")).count(), 2);
    }
}
