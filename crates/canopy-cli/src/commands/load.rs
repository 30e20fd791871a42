//! Consolidation load command

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::output::{table, to_json, OutputFormat};
use crate::{AppContext, Cli};
use canopy_core::{ConsolidationMode, Edge, LoadSemantic};
use canopy_storage::{ConsolidationLoad, LoadReport};

#[derive(Args)]
pub struct LoadArgs {
    /// Source edges: a JSON array, or delimited `parent,child[,weight]` lines
    pub source: PathBuf,

    /// Consolidation mode: multiple, unique, uniqueRoot (default: from config)
    #[arg(short, long)]
    pub mode: Option<ConsolidationMode>,

    /// Load semantic: create, add, update, insert, delete (default: from config)
    #[arg(short, long)]
    pub semantic: Option<LoadSemantic>,

    /// Field separator for delimited sources
    #[arg(long, default_value_t = ',')]
    pub separator: char,
}

/// Read source edges, choosing the format by file extension
pub fn read_edges(path: &Path, separator: char) -> anyhow::Result<Vec<Edge>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return Ok(serde_json::from_str(&content)?);
    }
    parse_delimited(&content, separator)
}

/// `parent<sep>child[<sep>weight]` per line; blank lines and `#` comments are skipped
fn parse_delimited(content: &str, separator: char) -> anyhow::Result<Vec<Edge>> {
    let mut edges = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(separator).map(str::trim).collect();
        let edge = match fields.as_slice() {
            [parent, child] => Edge::new(*parent, *child),
            [parent, child, weight] => {
                let weight: f64 = weight
                    .parse()
                    .with_context(|| format!("line {}: bad weight '{}'", n + 1, weight))?;
                Edge::new(*parent, *child).with_weight(weight)
            }
            _ => anyhow::bail!("line {}: expected 2 or 3 fields, got {}", n + 1, fields.len()),
        };
        edges.push(edge);
    }
    Ok(edges)
}

pub fn print_report(report: &LoadReport, format: OutputFormat) -> anyhow::Result<()> {
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    if format == OutputFormat::Json {
        println!("{}", to_json(report)?);
        return Ok(());
    }

    let stats = &report.stats;
    println!(
        "Loaded consolidations into '{}' ({}, {})",
        report.dimension, report.mode, report.semantic
    );
    let rows = [
        ("before", stats.existing),
        ("source", stats.from_source),
        ("after", stats.after),
        ("added", stats.added),
        ("removed", stats.removed),
        ("reweighted", stats.reweighted),
        ("skipped", stats.skipped),
    ]
    .iter()
    .map(|(label, count)| vec![label.to_string(), count.to_string()])
    .collect::<Vec<_>>();
    println!("{}", table(&["edges", "count"], &rows));
    if !report.emptied.is_empty() {
        println!("Parents left without children: {}", report.emptied.join(", "));
    }
    Ok(())
}

pub async fn run(args: &LoadArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let dimension = ctx.dimension(cli)?;
    let load = ConsolidationLoad::new(
        args.mode.unwrap_or(ctx.config.default_mode),
        args.semantic.unwrap_or(ctx.config.default_semantic),
    );

    let edges = read_edges(&args.source, args.separator)?;
    tracing::info!("Read {} source edges from {:?}", edges.len(), args.source);

    let report = load.run(ctx.storage.as_ref(), &dimension, &edges).await?;
    print_report(&report, ctx.format(cli))
}
