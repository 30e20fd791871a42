//! Condition predicates and their compiled matchers

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Test applied to an element name or attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "value", rename_all = "snake_case")]
pub enum Predicate {
    /// Exact string equality
    Equal(String),
    /// Whole-value wildcard match: `*` any run, `?` one character
    Like(String),
    /// Unanchored regular expression search
    Regex(String),
    /// Empty after trimming
    IsEmpty,
    GreaterThan(f64),
    GreaterOrEqual(f64),
    LessThan(f64),
    LessOrEqual(f64),
}

impl Predicate {
    pub fn equal(value: impl Into<String>) -> Self {
        Self::Equal(value.into())
    }

    pub fn like(pattern: impl Into<String>) -> Self {
        Self::Like(pattern.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex(pattern.into())
    }

    /// Compile into a matcher; only a malformed regex fails
    pub fn compile(&self) -> Result<Matcher, regex::Error> {
        Ok(match self {
            Self::Equal(v) => Matcher::Equal(v.clone()),
            Self::Like(p) => Matcher::Like(p.chars().collect()),
            Self::Regex(p) => Matcher::Regex(Regex::new(p)?),
            Self::IsEmpty => Matcher::IsEmpty,
            Self::GreaterThan(n) => Matcher::Compare(Comparison::Greater, *n),
            Self::GreaterOrEqual(n) => Matcher::Compare(Comparison::GreaterOrEqual, *n),
            Self::LessThan(n) => Matcher::Compare(Comparison::Less, *n),
            Self::LessOrEqual(n) => Matcher::Compare(Comparison::LessOrEqual, *n),
        })
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal(v) => write!(f, "= {:?}", v),
            Self::Like(p) => write!(f, "like {:?}", p),
            Self::Regex(p) => write!(f, "regex {:?}", p),
            Self::IsEmpty => write!(f, "is empty"),
            Self::GreaterThan(n) => write!(f, "> {}", n),
            Self::GreaterOrEqual(n) => write!(f, ">= {}", n),
            Self::LessThan(n) => write!(f, "< {}", n),
            Self::LessOrEqual(n) => write!(f, "<= {}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// A predicate ready to test values
#[derive(Debug, Clone)]
pub enum Matcher {
    Equal(String),
    Like(Vec<char>),
    Regex(Regex),
    IsEmpty,
    Compare(Comparison, f64),
}

impl Matcher {
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Equal(v) => value == v,
            Self::Like(pattern) => wildcard_match(value, pattern),
            Self::Regex(re) => re.is_match(value),
            Self::IsEmpty => value.trim().is_empty(),
            Self::Compare(op, bound) => match value.trim().parse::<f64>() {
                Ok(n) => match op {
                    Comparison::Greater => n > *bound,
                    Comparison::GreaterOrEqual => n >= *bound,
                    Comparison::Less => n < *bound,
                    Comparison::LessOrEqual => n <= *bound,
                },
                Err(_) => false,
            },
        }
    }
}

/// Match `text` against a `*`/`?` pattern, backtracking to the last star
fn wildcard_match(text: &str, pattern: &[char]) -> bool {
    let text: Vec<char> = text.chars().collect();
    let mut text_idx = 0;
    let mut pattern_idx = 0;
    let mut star_idx: Option<usize> = None;
    let mut match_idx = 0;

    while text_idx < text.len() {
        if pattern_idx < pattern.len()
            && (pattern[pattern_idx] == '?' || pattern[pattern_idx] == text[text_idx])
        {
            text_idx += 1;
            pattern_idx += 1;
        } else if pattern_idx < pattern.len() && pattern[pattern_idx] == '*' {
            star_idx = Some(pattern_idx);
            match_idx = text_idx;
            pattern_idx += 1;
        } else if let Some(star) = star_idx {
            pattern_idx = star + 1;
            match_idx += 1;
            text_idx = match_idx;
        } else {
            return false;
        }
    }

    while pattern_idx < pattern.len() && pattern[pattern_idx] == '*' {
        pattern_idx += 1;
    }

    pattern_idx == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(predicate: Predicate, value: &str) -> bool {
        predicate.compile().unwrap().is_match(value)
    }

    #[test]
    fn test_like() {
        assert!(matches(Predicate::like("A*"), "A1"));
        assert!(matches(Predicate::like("A*"), "A"));
        assert!(!matches(Predicate::like("A*"), "BA"));
        assert!(matches(Predicate::like("?2"), "A2"));
        assert!(!matches(Predicate::like("?2"), "A22"));
        assert!(matches(Predicate::like("*ger*"), "Germany-ger-x"));
        assert!(matches(Predicate::like("*"), ""));
    }

    #[test]
    fn test_regex_is_unanchored() {
        assert!(matches(Predicate::regex("er"), "Germany"));
        assert!(!matches(Predicate::regex("^er"), "Germany"));
        assert!(Predicate::regex("(unclosed").compile().is_err());
    }

    #[test]
    fn test_equal_and_empty() {
        assert!(matches(Predicate::equal("EUR"), "EUR"));
        assert!(!matches(Predicate::equal("EUR"), "eur"));
        assert!(matches(Predicate::IsEmpty, "  "));
        assert!(!matches(Predicate::IsEmpty, "x"));
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(matches(Predicate::GreaterThan(10.0), "10.5"));
        assert!(!matches(Predicate::GreaterThan(10.0), "10"));
        assert!(matches(Predicate::GreaterOrEqual(10.0), "10"));
        assert!(matches(Predicate::LessThan(0.0), " -3 "));
        assert!(matches(Predicate::LessOrEqual(2.0), "2"));
        assert!(!matches(Predicate::LessThan(100.0), "abc"));
    }

    #[test]
    fn test_predicate_serde() {
        let p: Predicate = serde_json::from_str(r#"{"operator":"like","value":"A*"}"#).unwrap();
        assert_eq!(p, Predicate::like("A*"));
        let p: Predicate = serde_json::from_str(r#"{"operator":"is_empty"}"#).unwrap();
        assert_eq!(p, Predicate::IsEmpty);
        let p: Predicate =
            serde_json::from_str(r#"{"operator":"greater_than","value":5}"#).unwrap();
        assert_eq!(p, Predicate::GreaterThan(5.0));
    }
}
