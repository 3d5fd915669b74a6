use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use routebind_engine::{DynamicRecord, Populator, PopulatorConfig, RequestContext};
use routebind_types::RecordSchema;
use routebind_util::{BindConfig, Router, ValueMap};
use tracing::debug;

/// Populate a schema-described record from an HTTP-style request and print it as JSON.
#[derive(Parser, Debug)]
#[command(name = "routebind", version, about)]
struct Args {
    /// Record schema (YAML, or JSON when the file ends in `.json`)
    #[arg(long)]
    schema: PathBuf,

    /// Request target, for example `/display/activeMatrix?rival=acid.burn`
    #[arg(long)]
    uri: String,

    /// Route template used to capture path variables; repeat for several, first match wins
    #[arg(long = "route")]
    routes: Vec<String>,

    /// General form values, url-encoded (`handle=the.plague&x=y`)
    #[arg(long, default_value = "")]
    form: String,

    /// Submitted body values, url-encoded
    #[arg(long, default_value = "")]
    submitted: String,

    /// Configuration file; defaults to ROUTEBIND_CONFIG_PATH or the user config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let record = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<DynamicRecord> {
    let schema = load_schema(&args.schema)?;
    let config = BindConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let router = Router::from_templates(args.routes.iter().map(String::as_str)).context("invalid route template")?;

    let context = RequestContext::builder()
        .uri(args.uri.as_str())
        .route(&router)
        .form(ValueMap::parse(&args.form))
        .submitted_form(ValueMap::parse(&args.submitted))
        .build()?;
    debug!(path = %context.path(), schema = %schema.name, "Built request context");

    let mut record = DynamicRecord::new(schema);
    Populator::new(PopulatorConfig::from(&config))
        .populate(Some(&context), &mut record)
        .context("failed to populate record")?;
    Ok(record)
}

fn load_schema(path: &Path) -> Result<RecordSchema> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read schema file: {}", path.display()))?;
    let is_json = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    let schema = if is_json {
        RecordSchema::from_json_str(&text)
    } else {
        RecordSchema::from_yaml_str(&text)
    };
    schema.with_context(|| format!("failed to load schema: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    const SCHEMA: &str = r#"
name: hacker_references
fields:
  - field: handle
    sources: [form]
  - field: super_computer
    key: super.computer
    sources: [form]
  - field: rival
    sources: [query]
  - field: display
    key: type
    sources: [path]
  - field: bacon
    sources: query
    kind: list
"#;

    fn args(dir: &Path, uri: &str) -> Args {
        let schema = dir.join("schema.yaml");
        std::fs::write(&schema, SCHEMA).unwrap();
        Args {
            schema,
            uri: uri.to_string(),
            routes: vec!["/display/{type}/".to_string()],
            form: "handle=the.plague".to_string(),
            submitted: "super.computer=gibson".to_string(),
            config: Some(dir.join("missing-config.json")),
        }
    }

    #[test]
    fn populates_every_declared_field() {
        let dir = tempdir().unwrap();
        let record = run(&args(dir.path(), "/display/activeMatrix/?rival=crash.override&bacon=slice,bits")).unwrap();
        assert_eq!(
            record.to_json(),
            json!({
                "handle": "the.plague",
                "super_computer": "gibson",
                "rival": "crash.override",
                "display": "activeMatrix",
                "bacon": ["slice", "bits"],
            })
        );
    }

    #[test]
    fn honors_configured_delimiter() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"list_delimiter": ";"}"#).unwrap();

        let mut arguments = args(dir.path(), "/display/x/?bacon=slice;bits");
        arguments.config = Some(config_path);
        let record = run(&arguments).unwrap();
        assert_eq!(record.get("bacon"), Some(&json!(["slice", "bits"])));
    }

    #[test]
    fn unmatched_route_is_an_error() {
        let dir = tempdir().unwrap();
        let error = run(&args(dir.path(), "/salty/meats")).unwrap_err();
        assert!(error.to_string().contains("no route matched"), "error: {error}");
    }

    #[test]
    fn json_schema_files_are_supported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{"name": "r", "fields": [{"field": "rival", "sources": ["query"]}]}"#).unwrap();
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.fields[0].key, "rival");
    }
}
