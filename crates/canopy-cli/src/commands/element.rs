//! Element commands

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::output::{table, to_json, OutputFormat};
use crate::{AppContext, Cli};
use canopy_core::{AttributeValue, Element, ElementKind};
use canopy_storage::HierarchyStore;

#[derive(Args)]
pub struct ElementArgs {
    #[command(subcommand)]
    pub command: ElementCommands,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum KindArg {
    #[default]
    Numeric,
    String,
}

impl From<KindArg> for ElementKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Numeric => ElementKind::Numeric,
            KindArg::String => ElementKind::String,
        }
    }
}

#[derive(Subcommand)]
pub enum ElementCommands {
    /// Add or update one element
    Add {
        /// Element name
        name: String,
        /// Value type
        #[arg(short, long, value_enum, default_value = "numeric")]
        kind: KindArg,
        /// Attribute as NAME=VALUE (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
    },
    /// Upsert elements from a JSON array file
    Import {
        /// Input file
        file: PathBuf,
    },
    /// List elements with their parents
    List {
        /// Only elements without parents
        #[arg(long)]
        roots: bool,
        /// Only elements without children
        #[arg(long, conflicts_with = "roots")]
        bases: bool,
    },
}

fn parse_attribute(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

pub async fn run(args: &ElementArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let dimension = ctx.dimension(cli)?;
    tracing::debug!(dimension = %dimension, "Running element command");

    match &args.command {
        ElementCommands::Add { name, kind, attributes } => {
            let mut element = Element::new(name).with_kind((*kind).into());
            for (key, value) in attributes {
                let value = match value.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => AttributeValue::Number(n),
                    _ => AttributeValue::Text(value.clone()),
                };
                element = element.with_attribute(key, value);
            }
            ctx.storage.save_elements(&dimension, &[element]).await?;
            println!("Saved element '{}' in dimension '{}'", name, dimension);
        }
        ElementCommands::Import { file } => {
            tracing::info!("Importing elements from {:?}", file);
            let content = std::fs::read_to_string(file)?;
            let elements: Vec<Element> = serde_json::from_str(&content)?;
            let saved = ctx.storage.save_elements(&dimension, &elements).await?;
            println!("Imported {} elements into dimension '{}'", saved.len(), dimension);
        }
        ElementCommands::List { roots, bases } => {
            let forest = ctx.storage.load_forest(&dimension, true).await?;
            let listed: Vec<&Element> = forest
                .elements()
                .filter(|e| !*roots || forest.is_root(&e.name))
                .filter(|e| !*bases || forest.is_base(&e.name))
                .collect();

            if ctx.format(cli) == OutputFormat::Json {
                println!("{}", to_json(&listed)?);
            } else {
                let rows: Vec<Vec<String>> = listed
                    .iter()
                    .map(|e| {
                        let kind = match e.kind {
                            ElementKind::Numeric => "numeric",
                            ElementKind::String => "string",
                        };
                        vec![
                            e.name.clone(),
                            kind.to_string(),
                            forest.children(&e.name).len().to_string(),
                            forest.parents(&e.name).join(", "),
                        ]
                    })
                    .collect();
                println!("{}", table(&["name", "kind", "children", "parents"], &rows));
                println!("{} elements", listed.len());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("Currency=EUR").unwrap(),
            ("Currency".to_string(), "EUR".to_string())
        );
        assert_eq!(parse_attribute("Note=a=b").unwrap().1, "a=b");
        assert!(parse_attribute("Currency").is_err());
        assert!(parse_attribute("=EUR").is_err());
    }
}
