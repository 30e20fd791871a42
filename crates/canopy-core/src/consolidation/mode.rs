//! Consolidation modes and load semantics

use super::edge_set::EdgeIdentity;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Uniqueness invariant enforced on the merged edge set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsolidationMode {
    /// Any number of parents per child
    #[default]
    Multiple,
    /// At most one parent per child
    Unique,
    /// At most one parent per child within each root's subtree
    UniqueRoot,
}

impl ConsolidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multiple => "multiple",
            Self::Unique => "unique",
            Self::UniqueRoot => "uniqueRoot",
        }
    }

    /// Identity used while merging; root scoping happens afterwards
    pub(crate) fn identity(&self) -> EdgeIdentity {
        match self {
            Self::Unique => EdgeIdentity::Child,
            Self::Multiple | Self::UniqueRoot => EdgeIdentity::Pair,
        }
    }
}

impl FromStr for ConsolidationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "multiple" => Ok(Self::Multiple),
            "unique" => Ok(Self::Unique),
            "uniqueroot" | "unique-root" | "unique_root" => Ok(Self::UniqueRoot),
            _ => Err(Error::UnknownConsolidationMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ConsolidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How source edges combine with what the store already holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSemantic {
    /// Build from the source only
    Create,
    /// Merge the source into existing edges
    #[default]
    Add,
    /// Drop existing edges, then build from the source
    Update,
    /// Keep existing edges; the source only contributes new ones
    Insert,
    /// Remove the source pairs from existing edges
    Delete,
}

impl LoadSemantic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Add => "add",
            Self::Update => "update",
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }

    /// Whether existing edges take part in the merge
    pub fn reads_existing(&self) -> bool {
        matches!(self, Self::Add | Self::Insert | Self::Delete)
    }
}

impl FromStr for LoadSemantic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "add" => Ok(Self::Add),
            "update" => Ok(Self::Update),
            "insert" => Ok(Self::Insert),
            "delete" => Ok(Self::Delete),
            _ => Err(Error::UnknownLoadSemantic(s.to_string())),
        }
    }
}

impl std::fmt::Display for LoadSemantic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Multiple".parse::<ConsolidationMode>().unwrap(), ConsolidationMode::Multiple);
        assert_eq!("uniqueRoot".parse::<ConsolidationMode>().unwrap(), ConsolidationMode::UniqueRoot);
        assert!(matches!(
            "several".parse::<ConsolidationMode>(),
            Err(Error::UnknownConsolidationMode(_))
        ));
    }

    #[test]
    fn test_semantic_parsing() {
        assert_eq!("INSERT".parse::<LoadSemantic>().unwrap(), LoadSemantic::Insert);
        assert!(matches!("merge".parse::<LoadSemantic>(), Err(Error::UnknownLoadSemantic(_))));
    }

    #[test]
    fn test_which_semantics_read_existing() {
        assert!(!LoadSemantic::Create.reads_existing());
        assert!(!LoadSemantic::Update.reads_existing());
        assert!(LoadSemantic::Add.reads_existing());
        assert!(LoadSemantic::Insert.reads_existing());
        assert!(LoadSemantic::Delete.reads_existing());
    }

    #[test]
    fn test_mode_serde_names() {
        let json = serde_json::to_string(&ConsolidationMode::UniqueRoot).unwrap();
        assert_eq!(json, "\"uniqueRoot\"");
    }
}
