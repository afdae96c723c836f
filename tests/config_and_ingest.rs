//! Loading configuration and source files from disk, then merging and
//! serving the result the way the `unimerge` binary does.

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use unimerge::config::{ConfigOverrides, LogOverrides, MergeConfig};
use unimerge::{ingest, ConfigError, FieldSpec, Identifier, IngestError, MergeView, Unimerge, Value};

const HEALTH_JSON: &str = r#"{
  "citizens": [
    {"citizen_id": "A1234", "name": "John Uzendu", "dob": "1990-05-15", "gender": "M", "health_status": "Healthy"},
    {"citizen_id": "B5678", "name": "Ada Okafor", "dob": "1985-02-01", "gender": "F", "health_status": "Recovered"},
    {"name": "Missing Id", "dob": "2000-01-01", "gender": "F", "health_status": "Healthy"}
  ]
}"#;

const EDUCATION_JSON: &str = r#"{
  "citizens": [
    {"citizen_id": "A1234", "name": "Johnmicheal Uzendu", "dob": "1990-05-15", "gender": "M", "school_name": "ESUST"},
    {"citizen_id": "C9012", "name": "Chidi Eze", "dob": "", "gender": "M", "school_name": "UNN"}
  ]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn config_file_drives_full_pipeline() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let health = write(dir.path(), "health.json", HEALTH_JSON);
    let education = write(dir.path(), "education.json", EDUCATION_JSON);
    let config_path = write(
        dir.path(),
        "unimerge.toml",
        &format!(
            r#"
[fields]
id_field = "citizen_id"
contested = ["name", "dob", "gender"]
required = ["name", "dob"]
priority = ["health", "education"]

[fields.combinable]
health_status = "health"
school_name = "education"

[[sources]]
name = "health"
path = "{}"

[[sources]]
name = "education"
path = "{}"
"#,
            health.display(),
            education.display()
        ),
    );

    let config = MergeConfig::from_env(Some(&config_path))?;
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.fields.required, vec!["name", "dob"]);

    let spec = config.field_spec()?;
    let sources = ingest::load_sources(&config.sources)?;
    assert_eq!(sources[0].len(), 3);

    let engine = Unimerge::new(spec);
    let view = MergeView::with_result(engine.run(&sources));

    let ids: Vec<_> = view.list().into_iter().map(|r| r.id.0).collect();
    assert_eq!(ids, vec!["A1234", "B5678", "C9012"]);

    let john = view.get(&Identifier::new("A1234")).expect("A1234");
    assert_eq!(john.get("name"), Some(&Value::text("John Uzendu")));
    assert_eq!(john.get("school_name"), Some(&Value::text("ESUST")));

    let chidi = view.get(&Identifier::new("C9012")).expect("C9012");
    assert_eq!(chidi.get("dob"), None);
    assert_eq!(chidi.get("health_status"), None);

    let health_report = view.health();
    assert_eq!(health_report.records, 3);
    assert_eq!(health_report.conflicts, 1);
    // one missing identifier, one incomplete record
    assert_eq!(health_report.warnings, 2);
    Ok(())
}

#[test]
fn cli_overrides_take_precedence() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config_path = write(
        dir.path(),
        "unimerge.toml",
        r#"
[log]
level = "warn"

[[sources]]
name = "health"
path = "from-file.json"
"#,
    );

    let overrides = ConfigOverrides {
        log: Some(LogOverrides {
            level: Some("debug".to_string()),
            file: None,
        }),
        source_paths: vec![
            ("health".into(), "override.json".into()),
            ("education".into(), "edu.json".into()),
        ],
    };
    let config = MergeConfig::load(Some(&config_path), overrides)?;

    assert_eq!(config.log.level, "debug");
    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.sources[0].path, Path::new("override.json"));
    assert_eq!(config.sources[0].collection_key, "citizens");
    assert_eq!(config.sources[1].name, "education");
    assert_eq!(config.field_spec()?, FieldSpec::citizen());
    Ok(())
}

#[test]
fn invalid_field_spec_is_reported() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config_path = write(
        dir.path(),
        "unimerge.toml",
        r#"
[fields]
contested = ["name", "school_name"]
"#,
    );

    let config = MergeConfig::from_env(Some(&config_path))?;
    let err = config.field_spec().unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateField(ref field) if field == "school_name"));
    Ok(())
}

#[test]
fn malformed_toml_is_a_config_error() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config_path = write(dir.path(), "unimerge.toml", "[fields\nid_field = 3");

    let err = MergeConfig::from_env(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
    Ok(())
}

#[test]
fn bare_array_source_with_custom_key_is_accepted() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = write(
        dir.path(),
        "tax.json",
        r#"[{"citizen_id": 77, "name": "Emeka"}]"#,
    );

    let collection = ingest::load_source_file(&path, &"tax".into(), "people")?;
    assert_eq!(collection.records[0].identifier("citizen_id"), Some(Identifier::new("77")));

    let broken = write(dir.path(), "broken.json", r#"{"people": {"citizen_id": 1}}"#);
    let err = ingest::load_source_file(&broken, &"tax".into(), "people").unwrap_err();
    assert!(matches!(err, IngestError::MissingCollection { .. }));
    Ok(())
}
