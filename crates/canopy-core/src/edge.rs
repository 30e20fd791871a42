//! Consolidation edge types

use serde::{Deserialize, Serialize};

fn default_weight() -> f64 {
    1.0
}

/// A weighted parent -> child consolidation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Consolidated (parent) element name
    pub parent: String,

    /// Child element name
    pub child: String,

    /// Consolidation factor
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Edge {
    /// Create an edge with the default weight of 1.0
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// True if both edges connect the same parent and child
    pub fn same_pair(&self, other: &Edge) -> bool {
        self.parent == other.parent && self.child == other.child
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.parent, self.child, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_default_weight() {
        let edge = Edge::new("Europe", "Germany");
        assert_eq!(edge.weight, 1.0);

        let parsed: Edge = serde_json::from_str(r#"{"parent":"P","child":"C"}"#).unwrap();
        assert_eq!(parsed.weight, 1.0);
    }

    #[test]
    fn test_same_pair_ignores_weight() {
        let a = Edge::new("P", "X").with_weight(1.0);
        let b = Edge::new("P", "X").with_weight(2.0);
        let c = Edge::new("Q", "X");
        assert!(a.same_pair(&b));
        assert!(!a.same_pair(&c));
    }
}
