mod registry;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use lineage_core::FamilyTreeDocument;
use lineage_eval::{EvalError, EvaluateOptions, EvaluationEngine, load_document};
use lineage_generate::{
    BundledReferenceData, CsvReferenceData, GenerateOptions, GenerationEngine, GenerationError,
    ReferenceDataProvider, ReferenceIndex,
};
use registry::{RunContext, copy_artifact, init_run_logging, init_stderr_logging, start_run};
use settings::{ConfigOverrides, SettingsError, resolve_tree_config};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "lineage", version, about = "Synthetic family-tree generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a family tree into a new run directory.
    Generate(GenerateArgs),
    /// Evaluate a generated family_tree.json.
    Evaluate(EvaluateArgs),
    /// Print the JSON Schema of family_tree.json.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// TOML file with tree configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Family tree depth limit.
    #[arg(long)]
    ftdl: Option<u32>,
    /// Sibling-partner depth limit.
    #[arg(long)]
    spdl: Option<u32>,
    /// Partner-with-children probability.
    #[arg(long)]
    pcp: Option<f64>,
    /// Counties table (county_code,county).
    #[arg(long, value_name = "CSV", requires = "cities")]
    counties: Option<PathBuf>,
    /// Cities table (county_code,cities).
    #[arg(long, value_name = "CSV", requires = "counties")]
    cities: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional extra copy of family_tree.json.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Path to family_tree.json.
    #[arg(value_name = "FAMILY_TREE_JSON")]
    document: PathBuf,
    /// Output directory; defaults to the document's directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Exit with an error when violations are found.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Write violations.json.
    #[arg(long, default_value_t = false)]
    write_violations: bool,
    /// Violations listed in report.md.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Schema(args) => run_schema(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        config,
        seed,
        ftdl,
        spdl,
        pcp,
        counties,
        cities,
        run_dir,
        out,
    } = args;

    let overrides = ConfigOverrides {
        seed,
        tree_depth_limit: ftdl,
        sibling_partner_depth_limit: spdl,
        partner_probability: pcp,
    };
    let tree_config = resolve_tree_config(config.as_deref(), &overrides)?;
    tree_config.validate()?;

    let (provider, reference_label): (Box<dyn ReferenceDataProvider>, String) =
        match (counties, cities) {
            (Some(counties), Some(cities)) => {
                let label = format!("{},{}", counties.display(), cities.display());
                (Box::new(CsvReferenceData::new(counties, cities)), label)
            }
            (None, None) => (Box::new(BundledReferenceData::new()), "bundled".to_string()),
            _ => {
                return Err(CliError::InvalidConfig(
                    "--counties and --cities must be given together".to_string(),
                ));
            }
        };
    let reference = ReferenceIndex::build(provider.as_ref())?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: run_dir.clone(),
        config_file: config,
        reference: reference_label,
        config: tree_config.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, seed = tree_config.seed);
    let timer = Instant::now();

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: run_dir,
        config: tree_config,
    });
    let result = engine.run_in(&reference, run_paths.run_root.clone(), &run_id)?;

    if let Some(out) = out.as_deref() {
        copy_artifact(&result.document_path, out)?;
        tracing::info!(event = "document_copied", path = %out.display());
    }

    tracing::info!(
        event = "run_finished",
        status = "success",
        total_people = result.report.total_people,
        total_marriages = result.report.total_marriages,
        duration_ms = timer.elapsed().as_millis() as u64
    );
    println!("{}", result.run_dir.display());
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), CliError> {
    init_stderr_logging()?;

    let document = load_document(&args.document)?;
    let dataset_dir = args
        .document
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let engine = EvaluationEngine::new(EvaluateOptions {
        strict: args.strict,
        max_examples: args.max_examples,
        write_violations: args.write_violations,
        out_dir: args.out_dir,
    });
    let result = engine.run(&document, &dataset_dir)?;

    tracing::info!(
        event = "evaluation_finished",
        violations = result.violations.len(),
        report = %result.report_path.display()
    );
    println!("{}", result.report_path.display());
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let schema = schemars::schema_for!(FamilyTreeDocument);
    let mut encoded = serde_json::to_string_pretty(&schema)?;
    encoded.push('\n');

    match args.out {
        Some(path) => std::fs::write(path, encoded)?,
        None => print!("{encoded}"),
    }
    Ok(())
}
