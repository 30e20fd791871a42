//! Declarative filter conditions and definitions

use super::predicate::Predicate;
use crate::error::{Error, Result};
use crate::limits::validate_condition_count;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a condition does with the elements it reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Accept,
    Deny,
}

/// How a condition relates to the conditions before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

/// How matched elements spread through the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Propagation {
    /// Exactly the matched elements
    #[default]
    OnlyNodes,
    /// The roots above each match
    OnlyRoots,
    /// The leaves below each match
    OnlyBases,
    /// Each match and everything below it
    NodesToBases,
    /// Each match and every ancestor on the way up
    RootToNodes,
    /// Ancestors of each match, then the leaves below it
    RootToBases,
    /// Ancestors of each match, then the consolidated elements below it
    RootToConsolidates,
}

impl Propagation {
    pub const ALL: [Propagation; 7] = [
        Self::OnlyNodes,
        Self::OnlyRoots,
        Self::OnlyBases,
        Self::NodesToBases,
        Self::RootToNodes,
        Self::RootToBases,
        Self::RootToConsolidates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnlyNodes => "onlyNodes",
            Self::OnlyRoots => "onlyRoots",
            Self::OnlyBases => "onlyBases",
            Self::NodesToBases => "nodesToBases",
            Self::RootToNodes => "rootToNodes",
            Self::RootToBases => "rootToBases",
            Self::RootToConsolidates => "rootToConsolidates",
        }
    }
}

impl FromStr for Propagation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPropagation(s.to_string()))
    }
}

impl TryFrom<String> for Propagation {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Propagation> for String {
    fn from(p: Propagation) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Propagation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ordered step of a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub action: FilterAction,

    pub predicate: Predicate,

    /// Match this attribute's value instead of the element name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<Combinator>,

    #[serde(default)]
    pub propagation: Propagation,
}

impl FilterCondition {
    pub fn new(action: FilterAction, predicate: Predicate) -> Self {
        Self {
            action,
            predicate,
            attribute: None,
            combinator: None,
            propagation: Propagation::OnlyNodes,
        }
    }

    pub fn accept(predicate: Predicate) -> Self {
        Self::new(FilterAction::Accept, predicate)
    }

    pub fn deny(predicate: Predicate) -> Self {
        Self::new(FilterAction::Deny, predicate)
    }

    pub fn on_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn and(mut self) -> Self {
        self.combinator = Some(Combinator::And);
        self
    }

    pub fn or(mut self) -> Self {
        self.combinator = Some(Combinator::Or);
        self
    }

    pub fn propagate(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }
}

/// How the accepted sets of several condition lists combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// Intersection
    #[default]
    And,
    /// Union
    Or,
}

/// An independently evaluated list of conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionList {
    #[serde(default, rename = "condition")]
    pub conditions: Vec<FilterCondition>,
}

/// A complete filter as read from configuration
///
/// ```toml
/// [[condition]]
/// action = "accept"
/// predicate = { operator = "like", value = "A*" }
/// propagation = "rootToNodes"
/// ```
///
/// Additional lists go under `[[list]]` / `[[list.condition]]` and are
/// combined with the top-level `operator`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    #[serde(default)]
    pub operator: LogicalOperator,

    #[serde(default, rename = "condition", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<FilterCondition>,

    #[serde(default, rename = "list", skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ConditionList>,
}

impl FilterDefinition {
    pub fn new(conditions: Vec<FilterCondition>) -> Self {
        Self {
            conditions,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn validate(&self) -> Result<()> {
        for list in self.condition_lists() {
            validate_condition_count(list.len())?;
        }
        Ok(())
    }

    /// Non-empty condition lists, top-level list first
    pub fn condition_lists(&self) -> Vec<&[FilterCondition]> {
        std::iter::once(self.conditions.as_slice())
            .chain(self.lists.iter().map(|l| l.conditions.as_slice()))
            .filter(|l| !l.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.condition_lists().is_empty()
    }
}
