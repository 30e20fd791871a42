//! Element (dimension member) types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Element value type
///
/// Consolidated is not a kind of its own: any element with at least one
/// child is consolidated, whatever its declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Numeric,
    String,
}

/// Attribute value attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// A named member of a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element name (unique within dimension)
    pub name: String,

    /// Declared value type
    #[serde(default)]
    pub kind: ElementKind,

    /// Named attribute values
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, AttributeValue>,
}

impl Element {
    /// Create a numeric element without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Numeric,
            attributes: HashMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Attribute value as matched by filter predicates
    ///
    /// Missing and blank values both read as the empty string.
    pub fn attribute_text(&self, name: &str) -> String {
        match self.attributes.get(name) {
            Some(value) => {
                let text = value.to_string();
                if text.trim().is_empty() {
                    String::new()
                } else {
                    text
                }
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_creation() {
        let element = Element::new("Germany")
            .with_kind(ElementKind::String)
            .with_attribute("Currency", "EUR")
            .with_attribute("Population", 83.2);

        assert_eq!(element.name, "Germany");
        assert_eq!(element.kind, ElementKind::String);
        assert_eq!(element.attribute_text("Currency"), "EUR");
        assert_eq!(element.attribute("Population"), Some(&AttributeValue::Number(83.2)));
    }

    #[test]
    fn test_blank_attribute_reads_as_empty() {
        let element = Element::new("Austria").with_attribute("Currency", "   ");
        assert_eq!(element.attribute_text("Currency"), "");
        assert_eq!(element.attribute_text("Missing"), "");
    }

    #[test]
    fn test_attribute_value_serde() {
        let json = r#"{"name":"X","attributes":{"a":"text","b":2.5}}"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.kind, ElementKind::Numeric);
        assert_eq!(element.attribute("a"), Some(&AttributeValue::Text("text".into())));
        assert_eq!(element.attribute("b"), Some(&AttributeValue::Number(2.5)));
    }
}
