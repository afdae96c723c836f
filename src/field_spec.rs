//! # Field Spec
//!
//! Static merge rules: which field carries the identifier, which fields are
//! contested between sources, which are owned by a single source, and the
//! source priority used to break frequency ties.

use crate::error::ConfigError;
use crate::model::SourceId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// How a field is merged
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "class")]
pub enum FieldClass {
    /// Sources may disagree; the value is chosen by the field resolver
    Contested,
    /// Owned by one source and carried through unchanged
    Combinable { owner: SourceId },
}

impl FieldClass {
    pub fn is_contested(&self) -> bool {
        matches!(self, FieldClass::Contested)
    }

    /// The owning source of a combinable field
    pub fn owner(&self) -> Option<&SourceId> {
        match self {
            FieldClass::Contested => None,
            FieldClass::Combinable { owner } => Some(owner),
        }
    }
}

/// A classified field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    #[serde(flatten)]
    pub class: FieldClass,
}

/// The complete merge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field holding the entity identifier in every source record
    pub id_field: String,
    /// Classified fields in declaration order
    pub fields: Vec<FieldRule>,
    /// Sources from highest to lowest priority
    pub source_priority: Vec<SourceId>,
    /// Fields expected to be non-null after merging
    pub required: Vec<String>,
}

impl FieldSpec {
    /// Create an empty field spec
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            fields: Vec::new(),
            source_priority: Vec::new(),
            required: Vec::new(),
        }
    }

    /// The citizen master-data rules: health and education sources share
    /// demographic fields and each own one attribute.
    pub fn citizen() -> Self {
        Self::new("citizen_id")
            .with_contested("name")
            .with_contested("dob")
            .with_contested("gender")
            .with_combinable("health_status", "health")
            .with_combinable("school_name", "education")
            .with_source_priority(["health", "education"])
            .with_required(["name", "dob", "gender"])
    }

    /// Add a contested field
    pub fn add_contested(&mut self, name: impl Into<String>) {
        self.fields.push(FieldRule {
            name: name.into(),
            class: FieldClass::Contested,
        });
    }

    /// Add a field owned by one source
    pub fn add_combinable(&mut self, name: impl Into<String>, owner: impl Into<SourceId>) {
        self.fields.push(FieldRule {
            name: name.into(),
            class: FieldClass::Combinable {
                owner: owner.into(),
            },
        });
    }

    pub fn with_contested(mut self, name: impl Into<String>) -> Self {
        self.add_contested(name);
        self
    }

    pub fn with_combinable(mut self, name: impl Into<String>, owner: impl Into<SourceId>) -> Self {
        self.add_combinable(name, owner);
        self
    }

    /// Set the source priority order (first = highest)
    pub fn set_source_priority<I, S>(&mut self, sources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        self.source_priority = sources.into_iter().map(Into::into).collect();
    }

    pub fn with_source_priority<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        self.set_source_priority(sources);
        self
    }

    pub fn with_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Look up the classification of a field
    pub fn classify(&self, field: &str) -> Option<&FieldClass> {
        self.fields
            .iter()
            .find(|rule| rule.name == field)
            .map(|rule| &rule.class)
    }

    /// True if the field is the identifier or has a classification
    pub fn is_known(&self, field: &str) -> bool {
        field == self.id_field || self.classify(field).is_some()
    }

    /// Contested field names in declaration order
    pub fn contested_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|rule| rule.class.is_contested())
            .map(|rule| rule.name.as_str())
    }

    /// Combinable fields with their owners, in declaration order
    pub fn combinable_fields(&self) -> impl Iterator<Item = (&str, &SourceId)> {
        self.fields
            .iter()
            .filter_map(|rule| rule.class.owner().map(|owner| (rule.name.as_str(), owner)))
    }

    /// Rank of a source in the priority order; lower is better.
    /// Unlisted sources rank after every listed one.
    pub fn priority_rank(&self, source: &SourceId) -> usize {
        self.source_priority
            .iter()
            .position(|s| s == source)
            .unwrap_or(self.source_priority.len())
    }

    /// Order two sources by priority, falling back to name for unlisted ones
    pub fn compare_sources(&self, a: &SourceId, b: &SourceId) -> Ordering {
        self.priority_rank(a)
            .cmp(&self.priority_rank(b))
            .then_with(|| a.cmp(b))
    }

    /// Validate internal consistency.
    ///
    /// `sources` lists the sources that will be fed to the engine; when
    /// non-empty, every combinable owner must be among them.
    pub fn validate(&self, sources: &[SourceId]) -> Result<(), ConfigError> {
        if self.id_field.trim().is_empty() {
            return Err(ConfigError::EmptyIdField);
        }

        let mut seen = BTreeSet::new();
        for rule in &self.fields {
            if rule.name == self.id_field {
                return Err(ConfigError::ClassifiedIdField(rule.name.clone()));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateField(rule.name.clone()));
            }
        }

        let mut seen_sources = BTreeSet::new();
        for source in &self.source_priority {
            if !seen_sources.insert(source) {
                return Err(ConfigError::DuplicatePriority(source.0.clone()));
            }
        }

        if !sources.is_empty() {
            for (field, owner) in self.combinable_fields() {
                if !sources.contains(owner) {
                    return Err(ConfigError::UnknownOwner {
                        field: field.to_string(),
                        owner: owner.0.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Build a spec from the flat config representation.
    pub fn from_parts(
        id_field: String,
        contested: Vec<String>,
        combinable: BTreeMap<String, String>,
        priority: Vec<String>,
        required: Vec<String>,
    ) -> Self {
        let mut spec = Self::new(id_field);
        for field in contested {
            spec.add_contested(field);
        }
        for (field, owner) in combinable {
            spec.add_combinable(field, owner);
        }
        spec.set_source_priority(priority);
        spec.required = required;
        spec
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::citizen()
    }
}
