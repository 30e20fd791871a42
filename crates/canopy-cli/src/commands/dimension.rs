//! Dimension commands

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{table, to_json, OutputFormat};
use crate::{AppContext, Cli};
use canopy_storage::{Dimension, HierarchyStore};

#[derive(Args)]
pub struct DimensionArgs {
    #[command(subcommand)]
    pub command: DimensionCommands,
}

#[derive(Subcommand)]
pub enum DimensionCommands {
    /// List all dimensions
    List,
    /// Create a new dimension
    Create {
        /// Dimension name
        name: String,
        /// Dimension description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Delete a dimension with its elements and consolidations
    Delete {
        /// Dimension name
        name: String,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
    /// Show dimension statistics
    Show {
        /// Dimension name (default: current dimension)
        name: Option<String>,
    },
}

#[derive(Serialize)]
struct DimensionStats {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    elements: usize,
    consolidations: usize,
    roots: usize,
    bases: usize,
    consolidated: usize,
}

pub async fn run(args: &DimensionArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running dimension command");

    match &args.command {
        DimensionCommands::List => {
            let dimensions = ctx.storage.list_dimensions().await?;
            tracing::info!("Found {} dimensions", dimensions.len());

            if ctx.format(cli) == OutputFormat::Json {
                println!("{}", to_json(&dimensions)?);
            } else if dimensions.is_empty() {
                println!("No dimensions found. Create one with 'canopy dimension create <name>'");
            } else {
                let rows: Vec<Vec<String>> = dimensions
                    .iter()
                    .map(|d| {
                        vec![
                            d.name.clone(),
                            d.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                            d.description.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", table(&["name", "updated", "description"], &rows));
            }
        }
        DimensionCommands::Create { name, description } => {
            if ctx.storage.get_dimension(name).await?.is_some() {
                anyhow::bail!("Dimension '{}' already exists", name);
            }

            let mut dimension = Dimension::new(name);
            if let Some(desc) = description {
                dimension = dimension.with_description(desc);
            }
            ctx.storage.save_dimension(&dimension).await?;
            tracing::info!("Created dimension: {}", name);
            println!("Created dimension: {}", name);
        }
        DimensionCommands::Delete { name, force } => {
            if ctx.storage.get_dimension(name).await?.is_none() {
                anyhow::bail!("Dimension '{}' not found", name);
            }

            let element_count = ctx.storage.get_elements(name).await?.len();
            let edge_count = ctx.storage.get_edges(name).await?.len();
            if !force {
                println!(
                    "Dimension '{}' has {} elements and {} consolidations",
                    name, element_count, edge_count
                );
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            ctx.storage.delete_dimension(name).await?;
            tracing::info!("Deleted dimension: {} ({} elements, {} consolidations)", name, element_count, edge_count);
            println!("Deleted dimension: {}", name);
        }
        DimensionCommands::Show { name } => {
            let name = match name {
                Some(n) => n.clone(),
                None => ctx.dimension(cli)?,
            };
            let record = ctx
                .storage
                .get_dimension(&name)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Dimension '{}' not found", name))?;
            let forest = ctx.storage.load_forest(&name, true).await?;

            let stats = DimensionStats {
                name: record.name,
                description: record.description,
                elements: forest.len(),
                consolidations: forest.edge_count(),
                roots: forest.roots().len(),
                bases: forest.bases().len(),
                consolidated: forest.elements().filter(|e| forest.is_consolidated(&e.name)).count(),
            };

            if ctx.format(cli) == OutputFormat::Json {
                println!("{}", to_json(&stats)?);
            } else {
                println!("Dimension '{}':", stats.name);
                if let Some(desc) = &stats.description {
                    println!("  Description: {}", desc);
                }
                println!("  Created: {}", record.created_at);
                println!("  Elements: {}", stats.elements);
                println!("    roots: {}", stats.roots);
                println!("    bases: {}", stats.bases);
                println!("    consolidated: {}", stats.consolidated);
                println!("  Consolidations: {}", stats.consolidations);
            }
        }
    }

    Ok(())
}
