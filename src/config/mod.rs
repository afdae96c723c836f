//! Layered configuration for unimerge.
//!
//! Configuration is loaded with precedence: CLI args > Env vars > Config file > Defaults
//!
//! # Example config file (unimerge.toml)
//! ```toml
//! [fields]
//! id_field = "citizen_id"
//! contested = ["name", "dob", "gender"]
//! required = ["name", "dob", "gender"]
//! priority = ["health", "education"]
//!
//! [fields.combinable]
//! health_status = "health"
//! school_name = "education"
//!
//! [[sources]]
//! name = "health"
//! path = "data/health.json"
//!
//! [[sources]]
//! name = "education"
//! path = "data/education.json"
//!
//! [log]
//! level = "debug"
//! file = "mdm.log"
//! ```

mod defaults;

pub use defaults::*;

use crate::error::ConfigError;
use crate::field_spec::FieldSpec;
use crate::model::SourceId;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration for a merge deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Merge rules
    pub fields: FieldsConfig,
    /// Source files, in load order
    pub sources: Vec<SourceConfig>,
    /// Logging output
    pub log: LogConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            fields: FieldsConfig::default(),
            sources: DEFAULT_SOURCES
                .iter()
                .map(|(name, path)| SourceConfig::new(*name, *path))
                .collect(),
            log: LogConfig::default(),
        }
    }
}

impl MergeConfig {
    /// Load configuration with precedence: CLI args > Env > File > Defaults
    ///
    /// # Arguments
    /// * `config_path` - Optional path to TOML config file
    /// * `overrides` - CLI overrides to apply on top
    pub fn load(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(MergeConfig::default()));

        // Layer 1: Config file (if provided)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 2: Environment variables with UNIMERGE_ prefix
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG"])
                .split(ENV_SPLIT),
        );

        // Layer 3: CLI overrides
        figment = figment.merge(Serialized::defaults(&overrides));

        let mut config: MergeConfig = figment.extract()?;
        for (name, path) in overrides.source_paths {
            config.upsert_source(name, path);
        }
        Ok(config)
    }

    /// Load from environment and optional config file only (no CLI overrides)
    pub fn from_env(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load(config_path, ConfigOverrides::default())
    }

    /// Build and validate the field spec against the configured sources.
    pub fn field_spec(&self) -> Result<FieldSpec, ConfigError> {
        let spec = self.fields.to_field_spec();
        spec.validate(&self.source_ids())?;
        Ok(spec)
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources
            .iter()
            .map(|source| SourceId::new(source.name.clone()))
            .collect()
    }

    /// Point an existing source at a new path, or append a new source.
    pub fn upsert_source(&mut self, name: String, path: PathBuf) {
        match self.sources.iter_mut().find(|source| source.name == name) {
            Some(existing) => existing.path = path,
            None => self.sources.push(SourceConfig::new(name, path)),
        }
    }
}

/// Merge rules in their flat file form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Field carrying the identifier
    pub id_field: String,
    /// Fields resolved across sources, in resolution order
    pub contested: Vec<String>,
    /// Field name -> owning source
    pub combinable: BTreeMap<String, String>,
    /// Sources from highest to lowest priority
    pub priority: Vec<String>,
    /// Fields expected to be non-null after merging
    pub required: Vec<String>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            contested: DEFAULT_CONTESTED_FIELDS.map(String::from).to_vec(),
            combinable: DEFAULT_COMBINABLE_FIELDS
                .iter()
                .map(|(field, owner)| (field.to_string(), owner.to_string()))
                .collect(),
            priority: DEFAULT_SOURCE_PRIORITY.map(String::from).to_vec(),
            required: DEFAULT_CONTESTED_FIELDS.map(String::from).to_vec(),
        }
    }
}

impl FieldsConfig {
    pub fn to_field_spec(&self) -> FieldSpec {
        FieldSpec::from_parts(
            self.id_field.clone(),
            self.contested.clone(),
            self.combinable.clone(),
            self.priority.clone(),
            self.required.clone(),
        )
    }
}

/// One source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub path: PathBuf,
    /// Key holding the record array; ignored for bare-array documents
    #[serde(default = "default_collection_key")]
    pub collection_key: String,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            collection_key: default_collection_key(),
        }
    }
}

fn default_collection_key() -> String {
    DEFAULT_COLLECTION_KEY.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` env-filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Write logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// CLI overrides that take precedence over file and env config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogOverrides>,
    /// `--source NAME=PATH` pairs, applied after extraction
    #[serde(skip)]
    pub source_paths: Vec<(String, PathBuf)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Parse a `NAME=PATH` source override.
pub fn parse_source_override(arg: &str) -> Result<(String, PathBuf), ConfigError> {
    match arg.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(ConfigError::InvalidSourceOverride(arg.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MergeConfig::default();
        assert_eq!(config.fields.id_field, "citizen_id");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].collection_key, "citizens");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_default_field_spec_matches_citizen_preset() {
        let spec = MergeConfig::default().field_spec().unwrap();
        assert_eq!(spec, FieldSpec::citizen());
    }

    #[test]
    fn test_parse_source_override() {
        assert_eq!(
            parse_source_override("health=data/h.json").unwrap(),
            ("health".to_string(), PathBuf::from("data/h.json"))
        );
        assert!(parse_source_override("health").is_err());
        assert!(parse_source_override("=x.json").is_err());
        assert!(parse_source_override("health=").is_err());
    }

    #[test]
    fn test_upsert_source() {
        let mut config = MergeConfig::default();
        config.upsert_source("health".to_string(), PathBuf::from("h2.json"));
        config.upsert_source("tax".to_string(), PathBuf::from("tax.json"));

        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.sources[0].path, PathBuf::from("h2.json"));
        assert_eq!(config.sources[2].name, "tax");
    }

    #[test]
    fn test_unknown_owner_rejected() {
        let mut config = MergeConfig::default();
        config.sources.retain(|source| source.name == "health");
        assert!(matches!(
            config.field_spec(),
            Err(ConfigError::UnknownOwner { .. })
        ));
    }
}
