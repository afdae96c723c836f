use std::path::PathBuf;

use anyhow::bail;
use tracing_subscriber::EnvFilter;
use unimerge::config::{
    parse_source_override, ConfigOverrides, LogConfig, LogOverrides, MergeConfig, CONFIG_PATH_ENV,
};
use unimerge::{ingest, Identifier, MergeView, Unimerge};

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn parse_all(flags: &[&str]) -> Vec<String> {
    let mut values = Vec::new();
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if flags.contains(&arg.as_str()) {
            if let Some(value) = args.next() {
                values.push(value);
            }
        }
    }
    values
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|arg| arg == flag)
}

fn print_help() {
    eprintln!(
        r#"unimerge - merge per-entity records from multiple sources

USAGE:
    unimerge [OPTIONS]

OPTIONS:
    -c, --config <FILE>        Path to config file (TOML)
    -s, --source <NAME=PATH>   Add or override a source file (repeatable)
    -g, --get <ID>             Print a single merged record
        --conflicts            Print the conflict log
        --warnings             Print data-quality warnings
        --health               Print the health report
        --log-level <FILTER>   Log filter [default: info]
        --log-file <FILE>      Write logs to a file instead of stderr
    -h, --help                 Print help

ENVIRONMENT:
    UNIMERGE_CONFIG            Path to config file
    UNIMERGE_LOG__LEVEL        Log filter
    UNIMERGE_FIELDS__ID_FIELD  Identifier field name
    RUST_LOG                   Overrides the log filter

CONFIG FILE (unimerge.toml):
    [fields]
    id_field = "citizen_id"
    contested = ["name", "dob", "gender"]
    priority = ["health", "education"]

    [fields.combinable]
    health_status = "health"
    school_name = "education"

    [[sources]]
    name = "health"
    path = "health.json"
"#
    );
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;

    match &log.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    if has_flag("-h") || has_flag("--help") {
        print_help();
        return Ok(());
    }

    // Build CLI overrides
    let mut overrides = ConfigOverrides::default();
    let mut log_overrides = LogOverrides::default();

    if let Some(level) = parse_arg("--log-level") {
        log_overrides.level = Some(level);
    }
    if let Some(file) = parse_arg("--log-file") {
        log_overrides.file = Some(file.into());
    }
    if log_overrides.level.is_some() || log_overrides.file.is_some() {
        overrides.log = Some(log_overrides);
    }

    for arg in parse_all(&["--source", "-s"]) {
        overrides.source_paths.push(parse_source_override(&arg)?);
    }

    // Load config: CLI > Env > File > Defaults
    let config_path = parse_arg("--config")
        .or_else(|| parse_arg("-c"))
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from);
    let config = MergeConfig::load(config_path.as_deref(), overrides)?;

    init_logging(&config.log)?;

    let spec = config.field_spec()?;
    let id_field = spec.id_field.clone();
    let sources = ingest::load_sources(&config.sources)?;

    let engine = Unimerge::new(spec);
    let view = MergeView::with_result(engine.run(&sources));

    let output = if let Some(id) = parse_arg("--get").or_else(|| parse_arg("-g")) {
        match view.get(&Identifier::new(id.trim())) {
            Some(record) => record.to_json(&id_field),
            None => bail!("record {id} not found"),
        }
    } else if has_flag("--conflicts") {
        serde_json::to_value(view.conflicts())?
    } else if has_flag("--warnings") {
        serde_json::to_value(view.snapshot().warnings())?
    } else if has_flag("--health") {
        serde_json::to_value(view.health())?
    } else {
        view.snapshot().records_json()
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
