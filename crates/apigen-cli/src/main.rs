use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use apigen_compiler::OutputFile;
use apigen_core::config::{self, ApigenConfig, CONFIG_FILE_NAME};
use apigen_core::input::{self, InputSource};
use apigen_core::ir::{IrModel, IrOperation};
use apigen_core::transform::{self, TransformOptions};
use apigen_core::{Diagnostics, SpecDocument, parse};
use apigen_plugins::Pipeline;

#[derive(Parser)]
#[command(name = "apigen", about = "OpenAPI 3.x to TypeScript code generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from an OpenAPI document
    Generate {
        /// Path to the document (YAML or JSON). Defaults to `input` from the config
        #[arg(short, long)]
        input: Option<String>,

        /// Output directory. Defaults to `output` from the config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an OpenAPI document
    Validate {
        /// Path to the document
        #[arg(short, long)]
        input: String,
    },

    /// Inspect the normalized IR of an OpenAPI document
    Inspect {
        /// Path to the document
        #[arg(short, long)]
        input: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Print the whole IR instead of a summary
        #[arg(long)]
        full: bool,
    },

    /// Initialize a new apigen configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input, output } => cmd_generate(input, output),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Inspect {
            input,
            format,
            full,
        } => cmd_inspect(&input, format, full),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apigen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load `.apigen.yaml` from the current directory, falling back to defaults.
fn load_project_config() -> Result<ApigenConfig> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let config = config::load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if config.is_none() {
        log::debug!("no {CONFIG_FILE_NAME} found, using defaults");
    }
    Ok(config.unwrap_or_default())
}

/// Read and parse a local document. Remote inputs are rejected with the URL
/// that would have to be downloaded.
fn read_document(raw: &str) -> Result<SpecDocument> {
    let path = match input::parse_input(raw)? {
        InputSource::Path(path) => path,
        source => {
            let url = source.remote_url().unwrap_or(raw);
            anyhow::bail!(
                "remote inputs are not fetched; download {url} and pass the file with --input"
            );
        }
    };

    let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document)
}

fn load_ir(raw: &str, cfg: &ApigenConfig) -> Result<(IrModel, Diagnostics)> {
    let document = read_document(raw)?;
    let options = TransformOptions::from_config(cfg);
    let (ir, diagnostics) = transform::transform_with_options(&document, &options)?;
    Ok((ir, diagnostics))
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("  warning: {diagnostic}");
    }
}

/// Write or remove every output under `base`.
fn write_outputs(base: &Path, outputs: &[OutputFile]) -> Result<usize> {
    fs::create_dir_all(base)
        .with_context(|| format!("failed to create output directory {}", base.display()))?;
    let mut written = 0;
    for output in outputs {
        output.write(base)?;
        if output.content.is_some() {
            eprintln!("  wrote {}", base.join(&output.path).display());
            written += 1;
        }
    }
    Ok(written)
}

fn cmd_generate(input: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let cfg = load_project_config()?;
    let input = input.unwrap_or_else(|| cfg.input.clone());
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    let (ir, mut diagnostics) = load_ir(&input, &cfg)?;

    let pipeline = Pipeline::from_config(&cfg)?;
    eprintln!(
        "Generating {} → {} ({})",
        input,
        output_dir.display(),
        pipeline.order().join(", ")
    );

    let generated = pipeline.generate(&ir, &cfg)?;
    diagnostics.extend(generated.diagnostics);
    report(&diagnostics);

    let written = write_outputs(&output_dir, &generated.files)?;
    eprintln!("Generated {written} files in {}", output_dir.display());
    Ok(())
}

fn cmd_validate(input: &str) -> Result<()> {
    let document = read_document(input)?;
    let spec = &document.spec;

    eprintln!("Valid OpenAPI {} document: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Webhooks: {}", spec.webhooks.len());
    if let Some(components) = &spec.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    let (ir, diagnostics) =
        transform::transform_with_options(&document, &TransformOptions::default())?;
    eprintln!("  Operations: {}", ir.operations().count());
    report(&diagnostics);

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &str, format: InspectFormat, full: bool) -> Result<()> {
    let cfg = load_project_config()?;
    let (ir, diagnostics) = load_ir(input, &cfg)?;
    report(&diagnostics);

    let value = if full {
        serde_json::to_value(&ir)?
    } else {
        inspect_summary(&ir)
    };

    match format {
        InspectFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&value)?),
        InspectFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn inspect_summary(ir: &IrModel) -> serde_json::Value {
    let schemas: Vec<serde_json::Value> = ir
        .components
        .schemas
        .iter()
        .map(|(name, schema)| {
            serde_json::json!({
                "name": name,
                "type": schema.schema_type,
                "ref": schema.ref_path,
            })
        })
        .collect();

    let operation = |op: &IrOperation| {
        let paginated: Vec<&str> = [
            &op.parameters.path,
            &op.parameters.query,
            &op.parameters.header,
            &op.parameters.cookie,
        ]
        .into_iter()
        .flat_map(|group| group.values())
        .filter(|p| p.pagination.is_some())
        .map(|p| p.name.as_str())
        .collect();
        serde_json::json!({
            "id": op.id,
            "method": op.method.as_str(),
            "path": op.path,
            "tags": op.tags,
            "responses": op.responses.keys().collect::<Vec<_>>(),
            "pagination": paginated,
        })
    };

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "servers": ir.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "schemas": schemas,
        "operations": ir.operations().map(operation).collect::<Vec<_>>(),
        "webhooks": ir.webhook_operations().map(operation).collect::<Vec<_>>(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
