#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads a reflection snapshot and generator settings, runs the pipeline and
//! writes the document.
//!
//! The snapshot loader tries candidates in order: the explicit `--snapshot`
//! path, then `<name>.yaml`, `<name>.yml` and `<name>.json` in every search
//! directory. A candidate that is missing or fails to parse is logged and
//! skipped; only running out of candidates is an error.

use crate::error::{CliError, CliResult};
use oasgen_core::{
    Document, DocumentGenerator, Framework, GeneratorSettings, ReflectionSnapshot, SchemaType,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SNAPSHOT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Output dialect flag.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTypeArg {
    /// Swagger 2.0.
    Swagger2,
    /// OpenAPI 3.0.
    Openapi3,
}

impl From<SchemaTypeArg> for SchemaType {
    fn from(value: SchemaTypeArg) -> Self {
        match value {
            SchemaTypeArg::Swagger2 => SchemaType::Swagger2,
            SchemaTypeArg::Openapi3 => SchemaType::OpenApi3,
        }
    }
}

/// Hosting framework flag.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkArg {
    /// Classic Web API conventions.
    WebApi,
    /// ASP.NET Core conventions.
    AspNetCore,
}

impl From<FrameworkArg> for Framework {
    fn from(value: FrameworkArg) -> Self {
        match value {
            FrameworkArg::WebApi => Framework::WebApi,
            FrameworkArg::AspNetCore => Framework::AspNetCore,
        }
    }
}

/// Where the snapshot and settings come from, plus settings overrides.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Reflection snapshot file (YAML or JSON). Tried before the search directories.
    #[clap(long, short, env = "OASGEN_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Directories searched for `<snapshot-name>.{yaml,yml,json}`.
    #[clap(long = "search-dir", default_value = ".")]
    pub search_dirs: Vec<PathBuf>,

    /// File stem looked up in the search directories.
    #[clap(long, default_value = "snapshot")]
    pub snapshot_name: String,

    /// Generator settings file (YAML or JSON).
    #[clap(long, env = "OASGEN_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Output dialect.
    #[clap(long, value_enum)]
    pub schema_type: Option<SchemaTypeArg>,

    /// Hosting framework conventions.
    #[clap(long, value_enum)]
    pub framework: Option<FrameworkArg>,

    /// Document title.
    #[clap(long)]
    pub title: Option<String>,

    /// Document version.
    #[clap(long = "doc-version")]
    pub doc_version: Option<String>,

    /// Default URL template for controllers without route attributes.
    #[clap(long)]
    pub url_template: Option<String>,

    /// Only include operations of these API groups (repeatable).
    #[clap(long = "api-group")]
    pub api_groups: Vec<String>,

    /// Lower-case the literal segments of native paths.
    #[clap(long)]
    pub lowercase_paths: bool,
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            snapshot: None,
            search_dirs: vec![PathBuf::from(".")],
            snapshot_name: "snapshot".to_string(),
            settings: None,
            schema_type: None,
            framework: None,
            title: None,
            doc_version: None,
            url_template: None,
            api_groups: Vec::new(),
            lowercase_paths: false,
        }
    }
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Output file; `.yaml`/`.yml` writes YAML, anything else JSON. Stdout when omitted.
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Write YAML to stdout instead of JSON.
    #[clap(long)]
    pub yaml: bool,
}

/// Serialization format of the written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty JSON.
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Format implied by an output path (YAML for `.yaml`/`.yml`).
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

/// Snapshot files to try, in order.
pub fn snapshot_candidates(args: &SourceArgs) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = args.snapshot.iter().cloned().collect();
    for dir in &args.search_dirs {
        for ext in SNAPSHOT_EXTENSIONS {
            candidates.push(dir.join(format!("{}.{}", args.snapshot_name, ext)));
        }
    }
    candidates
}

/// Loads the first candidate snapshot that exists and parses.
pub fn load_snapshot(args: &SourceArgs) -> CliResult<(PathBuf, ReflectionSnapshot)> {
    let candidates = snapshot_candidates(args);
    for candidate in &candidates {
        if !candidate.is_file() {
            debug!(path = %candidate.display(), "Snapshot candidate not present");
            continue;
        }
        match ReflectionSnapshot::from_path(candidate) {
            Ok(snapshot) => {
                info!(
                    path = %candidate.display(),
                    controllers = snapshot.controllers.len(),
                    "Loaded reflection snapshot"
                );
                return Ok((candidate.clone(), snapshot));
            }
            Err(e) => {
                warn!(path = %candidate.display(), error = %e, "Skipping unreadable snapshot");
            }
        }
    }

    let tried = candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(CliError::SnapshotNotFound(tried))
}

/// Reads the settings file, if any, then applies flag overrides.
pub fn load_settings(args: &SourceArgs) -> CliResult<GeneratorSettings> {
    let mut settings = match &args.settings {
        Some(path) => read_settings_file(path)?,
        None => GeneratorSettings::default(),
    };

    if let Some(schema_type) = args.schema_type {
        settings = settings.with_schema_type(schema_type.into());
    }
    if let Some(framework) = args.framework {
        settings = settings.with_framework(framework.into());
    }
    if let Some(title) = &args.title {
        settings.info.title = title.clone();
    }
    if let Some(version) = &args.doc_version {
        settings.info.version = version.clone();
    }
    if let Some(template) = &args.url_template {
        settings = settings.with_default_url_template(template.clone());
    }
    if !args.api_groups.is_empty() {
        settings = settings.with_api_groups(args.api_groups.clone());
    }
    if args.lowercase_paths {
        settings.lowercase_paths = true;
    }
    Ok(settings)
}

fn read_settings_file(path: &Path) -> CliResult<GeneratorSettings> {
    let invalid = |reason: String| CliError::Settings(path.display().to_string(), reason);
    let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| invalid(e.to_string())),
        _ => serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string())),
    }
}

/// Serializes a document.
pub fn render(document: &Document, format: OutputFormat) -> CliResult<String> {
    let text = match format {
        OutputFormat::Json => document.to_json_string()?,
        OutputFormat::Yaml => document.to_yaml_string()?,
    };
    Ok(text)
}

/// Builds the generator and the snapshot described by `args`.
pub fn prepare(args: &SourceArgs) -> CliResult<(DocumentGenerator, ReflectionSnapshot)> {
    let settings = load_settings(args)?;
    let generator = DocumentGenerator::new(settings)?;
    let (_, snapshot) = load_snapshot(args)?;
    Ok((generator, snapshot))
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let (generator, snapshot) = prepare(&args.source)?;
    let document = generator.generate(&snapshot)?;

    match &args.output {
        Some(path) => {
            let text = render(&document, OutputFormat::for_path(path))?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text)?;
            info!(path = %path.display(), "Wrote document");
        }
        None => {
            let format = if args.yaml {
                OutputFormat::Yaml
            } else {
                OutputFormat::Json
            };
            println!("{}", render(&document, format)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SNAPSHOT: &str = r#"
controllers:
  - name: PersonsController
    actions:
      - name: Get
        returns: string
"#;

    #[test]
    fn test_candidates_order() {
        let args = SourceArgs {
            snapshot: Some(PathBuf::from("explicit.json")),
            search_dirs: vec![PathBuf::from("a"), PathBuf::from("b")],
            ..Default::default()
        };
        let candidates = snapshot_candidates(&args);
        assert_eq!(candidates.len(), 7);
        assert_eq!(candidates[0], PathBuf::from("explicit.json"));
        assert_eq!(candidates[1], PathBuf::from("a").join("snapshot.yaml"));
        assert_eq!(candidates[3], PathBuf::from("a").join("snapshot.json"));
        assert_eq!(candidates[6], PathBuf::from("b").join("snapshot.json"));
    }

    #[test]
    fn test_loader_skips_broken_candidates() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("snapshot.yaml"), "controllers: [not, valid").unwrap();
        fs::write(dir.path().join("snapshot.json"), r#"{"controllers": []}"#).unwrap();

        let args = SourceArgs {
            snapshot: Some(dir.path().join("missing.yaml")),
            search_dirs: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        let (path, snapshot) = load_snapshot(&args).unwrap();
        assert_eq!(path, dir.path().join("snapshot.json"));
        assert!(snapshot.controllers.is_empty());
    }

    #[test]
    fn test_loader_candidates_exhausted() {
        let dir = tempdir().unwrap();
        let args = SourceArgs {
            search_dirs: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        match load_snapshot(&args) {
            Err(CliError::SnapshotNotFound(tried)) => assert!(tried.contains("snapshot.yml")),
            other => panic!("Expected SnapshotNotFound, got {:?}", other.map(|(p, _)| p)),
        }
    }

    #[test]
    fn test_settings_file_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            "schema_type: Swagger2\ninfo:\n  title: Persons\n  version: \"2.0\"\n",
        )
        .unwrap();

        let args = SourceArgs {
            settings: Some(path),
            framework: Some(FrameworkArg::AspNetCore),
            doc_version: Some("3.1".into()),
            ..Default::default()
        };
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.schema_type, SchemaType::Swagger2);
        assert_eq!(settings.framework, Framework::AspNetCore);
        assert_eq!(settings.info.title, "Persons");
        assert_eq!(settings.info.version, "3.1");
    }

    #[test]
    fn test_invalid_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let args = SourceArgs {
            settings: Some(path),
            ..Default::default()
        };
        assert!(matches!(load_settings(&args), Err(CliError::Settings(_, _))));
    }

    #[test]
    fn test_execute_writes_yaml_and_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("snapshot.yaml"), SNAPSHOT).unwrap();

        let yaml_out = dir.path().join("out").join("openapi.yaml");
        let args = GenerateArgs {
            source: SourceArgs {
                search_dirs: vec![dir.path().to_path_buf()],
                ..Default::default()
            },
            output: Some(yaml_out.clone()),
            yaml: false,
        };
        execute(&args).unwrap();
        let yaml = fs::read_to_string(&yaml_out).unwrap();
        assert!(yaml.contains("/api/Persons"));
        assert!(yaml.contains("openapi:"));

        let json_out = dir.path().join("swagger.json");
        let args = GenerateArgs {
            source: SourceArgs {
                search_dirs: vec![dir.path().to_path_buf()],
                schema_type: Some(SchemaTypeArg::Swagger2),
                ..Default::default()
            },
            output: Some(json_out.clone()),
            yaml: false,
        };
        execute(&args).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
        assert_eq!(json["swagger"], "2.0");
        assert_eq!(
            json["paths"]["/api/Persons"]["get"]["operationId"],
            "Persons_Get"
        );
    }
}
