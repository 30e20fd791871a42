//! Filter command

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};
use canopy_core::{FilterDefinition, FilterEngine, FilterState, FilterWarning, Forest};
use canopy_storage::HierarchyStore;

/// Whole-dimension selections that need no condition file
#[derive(Clone, Copy, ValueEnum)]
pub enum Preset {
    All,
    None,
    Roots,
    Bases,
    Consolidated,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Filter definition (TOML, or JSON with a .json extension)
    #[arg(required_unless_present = "preset", conflicts_with = "preset")]
    pub conditions: Option<PathBuf>,

    /// Use a preset instead of a condition file
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Also list denied elements
    #[arg(long)]
    pub denied: bool,
}

#[derive(Serialize)]
struct FilterOutput<'a> {
    dimension: &'a str,
    accepted: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    denied: Option<Vec<&'a str>>,
    warnings: &'a [FilterWarning],
}

/// Read a filter definition, choosing the parser by file extension
pub fn read_definition(path: &Path) -> anyhow::Result<FilterDefinition> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let definition = if is_json {
        FilterDefinition::from_json(&content)?
    } else {
        let definition: FilterDefinition = toml::from_str(&content)?;
        definition.validate()?;
        definition
    };
    Ok(definition)
}

fn preset_state(forest: &Forest, preset: Preset) -> FilterState {
    match preset {
        Preset::All => FilterState::accept_all(forest),
        Preset::None => FilterState::deny_all(forest),
        Preset::Roots => {
            let mut state = FilterState::deny_all(forest);
            state.accept_roots(forest);
            state
        }
        Preset::Bases => FilterState::only_bases(forest),
        Preset::Consolidated => FilterState::only_consolidated(forest),
    }
}

pub async fn run(args: &FilterArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let dimension = ctx.dimension(cli)?;
    let forest = ctx.storage.load_forest(&dimension, true).await?;

    let (state, warnings) = match (&args.preset, &args.conditions) {
        (Some(preset), _) => (preset_state(&forest, *preset), Vec::new()),
        (None, Some(path)) => {
            let definition = read_definition(path)?;
            tracing::info!(
                dimension = %dimension,
                lists = definition.condition_lists().len(),
                "Evaluating filter"
            );
            let result = FilterEngine::new(&forest).evaluate_definition(&definition)?;
            (result.state, result.warnings)
        }
        (None, None) => anyhow::bail!("Give a condition file or --preset"),
    };

    for warning in &warnings {
        eprintln!("warning: {}", warning);
    }

    let output = FilterOutput {
        dimension: &dimension,
        accepted: state.accepted(),
        denied: args.denied.then(|| state.denied()),
        warnings: &warnings,
    };

    if ctx.format(cli) == OutputFormat::Json {
        println!("{}", to_json(&output)?);
    } else {
        for name in &output.accepted {
            println!("{}", name);
        }
        if let Some(denied) = &output.denied {
            println!();
            println!("Denied ({}):", denied.len());
            for name in denied {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
