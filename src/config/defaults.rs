//! Default constants for unimerge configuration.
//!
//! The defaults describe the citizen master-data deployment: a health and an
//! education source sharing demographic fields.

// =============================================================================
// Environment
// =============================================================================

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "UNIMERGE_";

/// Separator between nested keys in environment variable names
/// (`UNIMERGE_LOG__LEVEL`). Single underscores belong to field names.
pub const ENV_SPLIT: &str = "__";

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "UNIMERGE_CONFIG";

// =============================================================================
// Field Spec Defaults
// =============================================================================

/// Field carrying the entity identifier
pub const DEFAULT_ID_FIELD: &str = "citizen_id";

/// Fields resolved across sources
pub const DEFAULT_CONTESTED_FIELDS: [&str; 3] = ["name", "dob", "gender"];

/// Fields owned by one source, as `(field, owner)`
pub const DEFAULT_COMBINABLE_FIELDS: [(&str, &str); 2] = [
    ("health_status", "health"),
    ("school_name", "education"),
];

/// Source priority, highest first
pub const DEFAULT_SOURCE_PRIORITY: [&str; 2] = ["health", "education"];

// =============================================================================
// Source Defaults
// =============================================================================

/// Key holding the record array in a source document
pub const DEFAULT_COLLECTION_KEY: &str = "citizens";

/// Default source files, as `(source, path)`
pub const DEFAULT_SOURCES: [(&str, &str); 2] =
    [("health", "health.json"), ("education", "education.json")];

// =============================================================================
// Logging Defaults
// =============================================================================

/// Default log filter when neither `RUST_LOG` nor config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
