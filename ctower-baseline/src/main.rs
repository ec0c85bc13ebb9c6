//! ctower - agent performance baseline calculator
//!
//! **Usage:**
//! ```bash
//! ctower [--config <file>] [--mode standard|extended] analyze --query <q> [--document <file>] [--characterization <json>]
//! ctower [--config <file>] batch <requests.json>
//! ctower [--config <file>] ranges
//! ```
//!
//! Reports are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ctower_baseline::models::{BaselineRequest, RawCharacterization};
use ctower_baseline::services::{CharacterizationSource, KeywordSource, ProvidedSource};
use ctower_common::config::{load_config, resolve_config_source, CalculationMode, CONFIG_ENV_VAR};
use serde_json::json;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ctower", version)]
#[command(about = "Compute domain-specific performance baselines for operational agents")]
struct Cli {
    /// Config file (overrides CTOWER_CONFIG and the user config file)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Calculation mode (overrides the config file)
    #[arg(long, global = true, value_enum)]
    mode: Option<ModeArg>,

    /// Characterization source
    #[arg(long, global = true, value_enum, default_value = "keyword")]
    source: SourceArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one analysis synchronously and print the report
    Analyze {
        /// What to baseline
        #[arg(long)]
        query: String,

        /// Use case document (plain text)
        #[arg(long, value_name = "FILE")]
        document: Option<PathBuf>,

        /// Characterization fields as a JSON object
        #[arg(long, value_name = "JSON")]
        characterization: Option<String>,
    },

    /// Run every request in a JSON array concurrently
    Batch {
        #[arg(value_name = "FILE")]
        requests: PathBuf,

        /// Status poll interval in milliseconds
        #[arg(long, default_value = "25")]
        poll_ms: u64,
    },

    /// Print the active range table
    Ranges,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Standard,
    Extended,
}

impl From<ModeArg> for CalculationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => CalculationMode::Standard,
            ModeArg::Extended => CalculationMode::Extended,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceArg {
    /// Keyword heuristics over the document, overridden by provided fields
    Keyword,
    /// Provided fields only
    Provided,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_source = resolve_config_source(cli.config.as_deref(), CONFIG_ENV_VAR);
    let mut config = load_config(&config_source)?;
    if let Some(mode) = cli.mode {
        config.engine.mode = mode.into();
    }

    init_tracing(&config.logging.level);
    info!(source = ?config_source, "Starting ctower v{}", env!("CARGO_PKG_VERSION"));

    let source: Arc<dyn CharacterizationSource> = match cli.source {
        SourceArg::Keyword => Arc::new(KeywordSource::new()?),
        SourceArg::Provided => Arc::new(ProvidedSource),
    };
    let registry = ctower_baseline::build_registry(&config, source)?;

    match cli.command {
        Command::Analyze {
            query,
            document,
            characterization,
        } => {
            let mut request = BaselineRequest::new(query);
            if let Some(path) = document {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read document {}", path.display()))?;
                request = request.with_document(text);
            }
            if let Some(raw) = characterization {
                let raw: RawCharacterization = serde_json::from_str(&raw)
                    .context("--characterization must be a JSON object")?;
                request = request.with_characterization(raw);
            }

            let report = registry.run_blocking(request).await?;
            print_json(&report)?;
        }

        Command::Batch { requests, poll_ms } => {
            let text = std::fs::read_to_string(&requests)
                .with_context(|| format!("Failed to read {}", requests.display()))?;
            let batch = BaselineRequest::batch_from_json(&text)?;
            info!(count = batch.len(), "Submitting batch");

            let mut task_ids = Vec::with_capacity(batch.len());
            for request in batch {
                task_ids.push(registry.submit(request).await);
            }

            let mut results = Vec::with_capacity(task_ids.len());
            for task_id in &task_ids {
                let status = registry.wait(*task_id, Duration::from_millis(poll_ms)).await;
                results.push(json!({ "task_id": task_id, "outcome": status }));
            }

            print_json(&json!({
                "generated_at": ctower_common::time::to_rfc3339(ctower_common::time::now()),
                "tasks": registry.list().await,
                "results": results,
            }))?;
        }

        Command::Ranges => {
            let table = registry.engine().range_table();
            print_json(&json!({
                "total_categories": table.category_count(),
                "total_metrics": table.metric_count(),
                "ranges": table,
            }))?;
        }
    }

    Ok(())
}
