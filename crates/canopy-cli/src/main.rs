//! Canopy CLI - Command line interface for dimension hierarchies

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, dimension, element, filter, io, load};
use canopy_storage::{HierarchyStore, RedbStore};
use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(author, version, about = "Filter and consolidate dimension hierarchies")]
pub struct Cli {
    /// Dimension to work on (default: from config)
    #[arg(short = 'D', long, env = "CANOPY_DIMENSION", global = true)]
    pub dimension: Option<String>,

    /// Data directory
    #[arg(short, long, env = "CANOPY_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage dimensions
    Dimension(dimension::DimensionArgs),
    /// Manage elements
    Element(element::ElementArgs),
    /// Evaluate a filter against a dimension
    Filter(filter::FilterArgs),
    /// Load consolidations into a dimension
    Load(load::LoadArgs),
    /// Import a dimension document
    Import(io::ImportArgs),
    /// Export a dimension document
    Export(io::ExportArgs),
    /// Manage CLI configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub storage: Arc<RedbStore>,
    pub config: Config,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let data_dir = cli
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir());
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("canopy.redb");
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = RedbStore::open(&db_path)?;

        Ok(Self {
            storage: Arc::new(storage),
            config,
        })
    }

    /// The dimension named on the command line or in the config
    pub fn dimension(&self, cli: &Cli) -> anyhow::Result<String> {
        cli.dimension
            .clone()
            .or_else(|| self.config.default_dimension.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("No dimension given. Use --dimension or 'canopy config set default_dimension <name>'")
            })
    }

    pub fn format(&self, cli: &Cli) -> OutputFormat {
        cli.format.unwrap_or(self.config.format)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting canopy CLI");

    // Commands that never touch storage
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli, Config::load()).await?;

    match &cli.command {
        Commands::Dimension(args) => dimension::run(args, &cli, &ctx).await?,
        Commands::Element(args) => element::run(args, &cli, &ctx).await?,
        Commands::Filter(args) => filter::run(args, &cli, &ctx).await?,
        Commands::Load(args) => load::run(args, &cli, &ctx).await?,
        Commands::Import(args) => io::run_import(args, &cli, &ctx).await?,
        Commands::Export(args) => io::run_export(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    ctx.storage.close().await?;
    Ok(())
}
