//! Import/Export commands

use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use clap::{Args, ValueEnum};

use crate::commands::load::print_report;
use crate::{AppContext, Cli};
use canopy_core::{ConsolidationMode, LoadSemantic};
use canopy_storage::{export_dimension, import_dimension, ConsolidationLoad, HierarchyExport};

/// Export format
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    /// Elements and edges document
    #[default]
    Json,
    /// Tab-separated `parent child weight` lines, readable by `canopy load`
    Edges,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Input file (JSON export document)
    pub file: PathBuf,

    /// Import into this dimension instead of the one named in the file
    #[arg(long = "as")]
    pub target: Option<String>,

    /// Consolidation mode (default: from config)
    #[arg(short, long)]
    pub mode: Option<ConsolidationMode>,

    /// Load semantic (default: from config)
    #[arg(short, long)]
    pub semantic: Option<LoadSemantic>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(long = "as", value_enum, default_value = "json")]
    pub export_format: ExportFormat,
}

pub async fn run_import(args: &ImportArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let content = std::fs::read_to_string(&args.file)?;
    let mut data: HierarchyExport = serde_json::from_str(&content)?;
    tracing::debug!("Import format version: {}", data.version);
    if let Some(target) = &args.target {
        data.dimension = target.clone();
    }

    let load = ConsolidationLoad::new(
        args.mode.unwrap_or(ctx.config.default_mode),
        args.semantic.unwrap_or(ctx.config.default_semantic),
    );
    let report = import_dimension(ctx.storage.as_ref(), &data, load).await?;

    println!(
        "Imported {} elements and {} edges from {:?}",
        data.elements.len(),
        data.edges.len(),
        args.file
    );
    print_report(&report, ctx.format(cli))
}

pub async fn run_export(args: &ExportArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let dimension = ctx.dimension(cli)?;
    tracing::info!("Exporting dimension {}", dimension);

    let data = export_dimension(ctx.storage.as_ref(), &dimension).await?;
    let content = match args.export_format {
        ExportFormat::Json => serde_json::to_string_pretty(&data)?,
        ExportFormat::Edges => export_to_edges(&data),
    };

    if let Some(ref path) = args.output {
        // Owner read/write only
        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(path, &content)?;
        }
        println!("Exported to {:?}", path);
    } else {
        print!("{}", content);
        std::io::stdout().flush()?;
    }

    Ok(())
}

fn export_to_edges(data: &HierarchyExport) -> String {
    let mut output = format!("# {}: parent\tchild\tweight\n", data.dimension);
    for edge in &data.edges {
        output.push_str(&format!("{}\t{}\t{}\n", edge.parent, edge.child, edge.weight));
    }
    output
}
