//! cropwatch: daily field metrics pipeline.
//!
//! # Usage
//!
//! ```text
//! cropwatch materialize raw 2024-01-01 --plots
//! cropwatch backfill --from 2024-01-01 --to 2024-01-31
//! cropwatch show change 2024-01-02 --format csv
//! cropwatch catalog export --out field_definitions.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cropwatch_core::{Asset, CropwatchConfig, PartitionKey};

mod commands;

#[derive(Parser)]
#[command(
    name = "cropwatch",
    about = "Daily-partitioned field metrics pipeline",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to cropwatch.toml. Defaults apply when the file does not exist.
    #[arg(short, long, global = true, default_value = "cropwatch.toml")]
    config: PathBuf,

    /// Override the artifact store URI (file://DIR, redb://FILE, memory://).
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Materialize one asset for one partition.
    Materialize {
        /// raw or change
        asset: Asset,
        /// Partition date (YYYY-MM-DD).
        partition: PartitionKey,
        /// Also render PNG plots into the store.
        #[arg(long)]
        plots: bool,
    },
    /// Materialize raw then change for every day in a range.
    Backfill {
        #[arg(long)]
        from: PartitionKey,
        #[arg(long)]
        to: PartitionKey,
        #[arg(long)]
        plots: bool,
        /// Concurrent partitions; defaults to pipeline.parallelism.
        #[arg(short = 'j', long)]
        parallelism: Option<usize>,
    },
    /// Print a stored artifact.
    Show {
        asset: Asset,
        partition: PartitionKey,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Field catalog operations.
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Write the effective catalog (including a synthetic fallback) as JSON.
    Export {
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cropwatch=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Materialize {
            asset,
            partition,
            plots,
        } => commands::materialize::run(&config, asset, partition, plots).await,
        Command::Backfill {
            from,
            to,
            plots,
            parallelism,
        } => {
            let parallelism = parallelism.unwrap_or(config.pipeline.parallelism);
            commands::backfill::run(&config, from, to, plots, parallelism).await
        }
        Command::Show {
            asset,
            partition,
            format,
        } => commands::show::run(&config, asset, partition, format),
        Command::Catalog { action } => match action {
            CatalogAction::Export { out } => commands::catalog::export(&config, out.as_deref()),
        },
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CropwatchConfig> {
    let mut config = CropwatchConfig::load_or_default(&cli.config)?;
    if let Some(uri) = &cli.store {
        config.store.uri = uri.clone();
        config.store.location()?;
    }
    Ok(config)
}
