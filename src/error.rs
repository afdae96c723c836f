//! Error types for the outer layers of the crate.
//!
//! The merge engine itself never fails; anomalies in the data become
//! [`crate::audit::DataQualityWarning`]s. These errors cover configuration and
//! source ingestion only.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Layered config could not be extracted.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// The identifier field name is empty.
    #[error("invalid field spec: identifier field name is empty")]
    EmptyIdField,

    /// The identifier field was also given a classification.
    #[error("invalid field spec: identifier field `{0}` cannot be classified")]
    ClassifiedIdField(String),

    /// A field was classified more than once.
    #[error("invalid field spec: field `{0}` is classified more than once")]
    DuplicateField(String),

    /// A source appears more than once in the priority list.
    #[error("invalid field spec: source `{0}` is listed twice in the priority order")]
    DuplicatePriority(String),

    /// A combinable field names an owner that is not a configured source.
    #[error("invalid field spec: field `{field}` is owned by unknown source `{owner}`")]
    UnknownOwner { field: String, owner: String },

    /// A `--source` override was not of the form `name=path`.
    #[error("invalid source override `{0}`, expected NAME=PATH")]
    InvalidSourceOverride(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

/// Errors raised while reading a source file into records.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read source file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in source `{source_name}`: {error}")]
    Json {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },

    /// The document is neither a bare array nor an object holding the
    /// collection key.
    #[error("source `{source_name}` has no `{key}` array")]
    MissingCollection { source_name: String, key: String },

    #[error("source `{source_name}` element {position} is not a JSON object")]
    NotAnObject { source_name: String, position: usize },

    #[error("source `{source_name}` element {position} field `{field}` is not a scalar")]
    NestedValue {
        source_name: String,
        position: usize,
        field: String,
    },
}

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;
