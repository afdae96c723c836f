//! # Ingest Module
//!
//! Reads source collections from JSON documents. A document is either an
//! object holding the records under a collection key (`{"citizens": [...]}`)
//! or a bare array of records. Every record must be a flat object of scalar
//! values; anything else rejects the whole file, so the engine only ever
//! sees well-formed records.

use crate::config::SourceConfig;
use crate::error::{IngestError, IngestResult};
use crate::model::{SourceId, SourceRecord, Value};
use crate::orchestrator::SourceCollection;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Parse a JSON document into a source collection.
pub fn parse_source(
    json: &str,
    source: &SourceId,
    collection_key: &str,
) -> IngestResult<SourceCollection> {
    let document: serde_json::Value =
        serde_json::from_str(json).map_err(|error| IngestError::Json {
            source_name: source.0.clone(),
            error,
        })?;

    let elements = match &document {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => match map.get(collection_key) {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(IngestError::MissingCollection {
                    source_name: source.0.clone(),
                    key: collection_key.to_string(),
                })
            }
        },
        _ => {
            return Err(IngestError::MissingCollection {
                source_name: source.0.clone(),
                key: collection_key.to_string(),
            })
        }
    };

    let records = elements
        .iter()
        .enumerate()
        .map(|(position, element)| to_record(source, position, element))
        .collect::<IngestResult<Vec<_>>>()?;

    Ok(SourceCollection::new(source.clone(), records))
}

/// Read and parse one source file.
pub fn load_source_file(
    path: impl AsRef<Path>,
    source: &SourceId,
    collection_key: &str,
) -> IngestResult<SourceCollection> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let collection = parse_source(&raw, source, collection_key)?;
    info!(
        source = %collection.source,
        path = %path.display(),
        records = collection.len(),
        "loaded source"
    );
    Ok(collection)
}

/// Load every configured source, in configuration order.
pub fn load_sources(sources: &[SourceConfig]) -> IngestResult<Vec<SourceCollection>> {
    sources
        .iter()
        .map(|config| {
            load_source_file(
                &config.path,
                &SourceId::new(config.name.clone()),
                &config.collection_key,
            )
        })
        .collect()
}

fn to_record(
    source: &SourceId,
    position: usize,
    element: &serde_json::Value,
) -> IngestResult<SourceRecord> {
    let serde_json::Value::Object(object) = element else {
        return Err(IngestError::NotAnObject {
            source_name: source.0.clone(),
            position,
        });
    };

    let mut fields = BTreeMap::new();
    for (field, value) in object {
        let value = match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Text(n.to_string()),
            }),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(IngestError::NestedValue {
                    source_name: source.0.clone(),
                    position,
                    field: field.clone(),
                })
            }
        };
        fields.insert(field.clone(), value);
    }

    Ok(SourceRecord::new(source.clone(), fields))
}
