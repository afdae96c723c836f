//! # Data Model
//!
//! Core data structures for multi-source record merging.
//! Includes entity identifiers, source tags, scalar values, and the
//! per-source and merged record shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier naming one entity across all sources.
///
/// Ordering is lexicographic over the underlying string, which is the
/// processing order used by the orchestrator. Integer identifiers are
/// rendered to text first, so `10` sorts before `9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    /// Create a new identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract an identifier from a field value.
    ///
    /// Text is trimmed and integers are rendered in decimal; blank text and
    /// booleans do not name an entity.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }
            Value::Integer(n) => Some(Self(n.to_string())),
            Value::Boolean(_) => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Name of a source category (e.g. "health", "education")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A scalar field value.
///
/// Equality is structural: `Text("1")` and `Integer(1)` are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for text that is empty after trimming. Blank values carry no
    /// information and are treated as absent.
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Drop blank text so that it never reaches resolution or output.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_blank())
}

/// A record as supplied by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// The source this record came from
    pub source: SourceId,
    /// Field values; `None` is an explicit null
    pub fields: BTreeMap<String, Option<Value>>,
}

impl SourceRecord {
    /// Create a new source record
    pub fn new(source: SourceId, fields: BTreeMap<String, Option<Value>>) -> Self {
        Self { source, fields }
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_pairs<I, K, V>(source: impl Into<SourceId>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Some(v.into())))
            .collect();
        Self {
            source: source.into(),
            fields,
        }
    }

    /// Get a field value, treating explicit nulls as absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).and_then(Option::as_ref)
    }

    /// Read the identifier out of `id_field`
    pub fn identifier(&self, id_field: &str) -> Option<Identifier> {
        self.get(id_field).and_then(Identifier::from_value)
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One source's contribution to a merge group
pub type RecordsBySource<'a> = BTreeMap<SourceId, &'a SourceRecord>;

/// The canonical record produced for one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub id: Identifier,
    pub fields: BTreeMap<String, Option<Value>>,
}

impl MergedRecord {
    /// Create a new merged record
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).and_then(Option::as_ref)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Option<Value>) {
        self.fields.insert(field.into(), value);
    }

    /// True when the field is defined (possibly as null) in this record
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Render as a flat JSON object with the identifier stored under `id_field`.
    pub fn to_json(&self, id_field: &str) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            id_field.to_string(),
            serde_json::Value::String(self.id.0.clone()),
        );
        for (field, value) in &self.fields {
            let json = match value {
                Some(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
                None => serde_json::Value::Null,
            };
            object.insert(field.clone(), json);
        }
        serde_json::Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_value() {
        assert_eq!(
            Identifier::from_value(&Value::text("  A1234 ")),
            Some(Identifier::new("A1234"))
        );
        assert_eq!(
            Identifier::from_value(&Value::Integer(42)),
            Some(Identifier::new("42"))
        );
        assert_eq!(Identifier::from_value(&Value::text("   ")), None);
        assert_eq!(Identifier::from_value(&Value::Boolean(true)), None);
    }

    #[test]
    fn test_identifier_ordering() {
        let mut ids = vec![
            Identifier::new("B2"),
            Identifier::new("A10"),
            Identifier::new("A2"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                Identifier::new("A10"),
                Identifier::new("A2"),
                Identifier::new("B2")
            ]
        );

        let mut numeric: Vec<_> = [9, 10, 100]
            .into_iter()
            .filter_map(|n| Identifier::from_value(&Value::Integer(n)))
            .collect();
        numeric.sort();
        assert_eq!(
            numeric,
            vec![
                Identifier::new("10"),
                Identifier::new("100"),
                Identifier::new("9")
            ]
        );
    }

    #[test]
    fn test_value_equality_is_structural() {
        assert_ne!(Value::text("1"), Value::Integer(1));
        assert_eq!(Value::text("M"), Value::from("M"));
    }

    #[test]
    fn test_blank_values() {
        assert!(Value::text("").is_blank());
        assert!(Value::text(" \t").is_blank());
        assert!(!Value::text("x").is_blank());
        assert!(!Value::Integer(0).is_blank());
        assert_eq!(present(Some(&Value::text(" "))), None);
    }

    #[test]
    fn test_source_record_accessors() {
        let mut record = SourceRecord::from_pairs("health", [("citizen_id", "A1"), ("name", "Ada")]);
        record.fields.insert("dob".to_string(), None);

        assert_eq!(record.source, SourceId::new("health"));
        assert_eq!(record.get("name"), Some(&Value::text("Ada")));
        assert_eq!(record.get("dob"), None);
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.identifier("citizen_id"), Some(Identifier::new("A1")));
        assert_eq!(record.identifier("id"), None);
    }

    #[test]
    fn test_merged_record_json() {
        let mut merged = MergedRecord::new(Identifier::new("A1"));
        merged.set("name", Some(Value::text("Ada")));
        merged.set("age", Some(Value::Integer(36)));
        merged.set("school_name", None);

        let json = merged.to_json("citizen_id");
        assert_eq!(json["citizen_id"], "A1");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["age"], 36);
        assert!(json["school_name"].is_null());
    }
}
