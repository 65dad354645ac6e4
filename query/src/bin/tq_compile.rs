use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value as JsonValue, json};

use telemetry_query::codec::{DecoderConfig, Diagnostics, RowDecoder, Value};
use telemetry_query::constants::{APP_NAME_LOWER, ENV_BACKEND, ENV_LOG};
use telemetry_query::filters::parse_filter_collection;
use telemetry_query::schema::{TableSchema, load_schema};
use telemetry_query::sql::{Backend, ClauseCompiler, ColumnBindings};

#[derive(Parser)]
#[command(name = "tq-compile")]
#[command(version, about = "Compile telemetry filters and decode raw rows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter document into a WHERE clause and parameters
    Compile {
        /// Table schema JSON file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Filter document JSON file
        #[arg(long, short = 'f')]
        filters: PathBuf,

        /// Target backend (bigquery, mysql or postgres)
        #[arg(long, short = 'b', env = ENV_BACKEND, default_value = "bigquery", value_parser = parse_backend)]
        backend: Backend,
    },
    /// Decode a JSON array of raw rows into records
    Decode {
        /// Table schema JSON file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// JSON file holding an array of rows, each an array of cells
        #[arg(long, short = 'r')]
        rows: PathBuf,

        /// Record kind to decode
        #[arg(long, value_enum, default_value_t = RecordKind::Event)]
        record: RecordKind,

        /// Abort on the first malformed row instead of skipping it
        #[arg(long)]
        fail_fast: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Event,
    Feature,
}

/// Parse backend from CLI/env string
fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("\nError: {:#}\n", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let output = match cli.command {
        Commands::Compile {
            schema,
            filters,
            backend,
        } => compile(&schema, &filters, backend)?,
        Commands::Decode {
            schema,
            rows,
            record,
            fail_fast,
        } => decode(&schema, &rows, record, DecoderConfig { fail_fast })?,
    };

    let text = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}

fn read_schema(path: &Path) -> Result<TableSchema> {
    load_schema(path).with_context(|| format!("Failed to load schema: {}", path.display()))
}

fn compile(schema_path: &Path, filters_path: &Path, backend: Backend) -> Result<JsonValue> {
    let schema = read_schema(schema_path)?;
    let content = std::fs::read_to_string(filters_path)
        .with_context(|| format!("Failed to read filters: {}", filters_path.display()))?;
    let collection = parse_filter_collection(&content)
        .with_context(|| format!("Failed to parse filters: {}", filters_path.display()))?;

    let bindings = ColumnBindings::from_schema(&schema);
    let clause = ClauseCompiler::new(backend, &bindings)
        .compile_collection(&collection)
        .with_context(|| format!("Failed to compile filters for {}", backend))?;

    tracing::info!(
        backend = %backend,
        table = %schema.name(),
        parameters = clause.parameters.len(),
        "Compiled clause"
    );
    Ok(json!({
        "backend": backend.name(),
        "text": clause.text,
        "parameters": clause.parameters,
    }))
}

fn decode(
    schema_path: &Path,
    rows_path: &Path,
    record: RecordKind,
    config: DecoderConfig,
) -> Result<JsonValue> {
    let schema = read_schema(schema_path)?;
    let content = std::fs::read_to_string(rows_path)
        .with_context(|| format!("Failed to read rows: {}", rows_path.display()))?;
    let raw: Vec<Vec<JsonValue>> = serde_json::from_str(&content)
        .with_context(|| format!("Rows must be a JSON array of arrays: {}", rows_path.display()))?;
    if raw.is_empty() {
        bail!("No rows in {}", rows_path.display());
    }
    let rows: Vec<Vec<Value>> = raw
        .into_iter()
        .map(|row| row.into_iter().map(Value::from_json).collect())
        .collect();

    let diagnostics = Diagnostics::new();
    let mut decoder = RowDecoder::new(&schema, &diagnostics).with_config(config);
    let (records, skipped) = match record {
        RecordKind::Event => {
            let batch = decoder.decode_events(&rows)?;
            (serde_json::to_value(batch.records)?, batch.skipped)
        }
        RecordKind::Feature => {
            let batch = decoder.decode_features(&rows)?;
            (serde_json::to_value(batch.records)?, batch.skipped)
        }
    };

    tracing::info!(
        table = %schema.name(),
        skipped,
        issues = diagnostics.issue_count(),
        "Decoded rows"
    );
    Ok(json!({
        "records": records,
        "skipped": skipped,
        "warned_fields": diagnostics.warned_fields(),
    }))
}

fn init_logging() {
    let default_filter = format!("info,{}=info", APP_NAME_LOWER);

    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or(default_filter);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
