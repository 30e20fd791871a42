//! Persisted records: dimensions, elements with stable ids, and id-based edges

use crate::error::{StorageError, StorageResult};
use canopy_core::Element;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Maximum length for dimension names
pub const MAX_DIMENSION_NAME_LEN: usize = 255;

/// Unique identifier for a stored element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Ulid);

impl ElementId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named hierarchy held by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension name (unique, no `:`)
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Validate a dimension name; `:` is reserved as the key separator
pub fn validate_dimension_name(name: &str) -> StorageResult<()> {
    if name.trim().is_empty()
        || name.chars().count() > MAX_DIMENSION_NAME_LEN
        || name.contains(':')
        || name.chars().any(char::is_control)
    {
        return Err(StorageError::InvalidDimensionName(name.to_string()));
    }
    Ok(())
}

/// An element together with its store id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    pub id: ElementId,

    #[serde(flatten)]
    pub element: Element,
}

/// A consolidation expressed in store ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEdge {
    pub parent: ElementId,
    pub child: ElementId,
    pub weight: f64,
}

/// Bulk write for one dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidationBatch {
    /// The complete edge set after the write
    pub edges: Vec<StoredEdge>,

    /// Parents whose last child was removed
    #[serde(default)]
    pub emptied: Vec<ElementId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_names() {
        assert!(validate_dimension_name("Regions").is_ok());
        assert!(validate_dimension_name("Cost Centers 2024").is_ok());
        assert!(validate_dimension_name("").is_err());
        assert!(validate_dimension_name("a:b").is_err());
        assert!(validate_dimension_name("tab\there").is_err());
    }

    #[test]
    fn test_stored_element_flattens() {
        let stored = StoredElement {
            id: ElementId::new(),
            element: Element::new("Germany").with_attribute("Currency", "EUR"),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["name"], "Germany");
        assert_eq!(json["attributes"]["Currency"], "EUR");

        let back: StoredElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);
    }
}
