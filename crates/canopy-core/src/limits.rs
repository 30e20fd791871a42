//! Input validation limits for element names and consolidation weights

/// Maximum length for element names (255 chars)
pub const MAX_ELEMENT_NAME_LEN: usize = 255;

/// Maximum number of conditions in a single condition list (1000)
pub const MAX_CONDITIONS: usize = 1000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyElementName,
    ElementNameTooLong { len: usize, max: usize },
    NonFiniteWeight { parent: String, child: String },
    TooManyConditions { count: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyElementName => write!(f, "Element name cannot be empty"),
            Self::ElementNameTooLong { len, max } => {
                write!(f, "Element name too long: {} chars (max {})", len, max)
            }
            Self::NonFiniteWeight { parent, child } => {
                write!(f, "Weight of {} -> {} is not a finite number", parent, child)
            }
            Self::TooManyConditions { count, max } => {
                write!(f, "Too many filter conditions: {} (max {})", count, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate element name
pub fn validate_element_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyElementName);
    }
    let len = name.chars().count();
    if len > MAX_ELEMENT_NAME_LEN {
        return Err(ValidationError::ElementNameTooLong {
            len,
            max: MAX_ELEMENT_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate a consolidation weight
pub fn validate_weight(parent: &str, child: &str, weight: f64) -> Result<(), ValidationError> {
    if !weight.is_finite() {
        return Err(ValidationError::NonFiniteWeight {
            parent: parent.to_string(),
            child: child.to_string(),
        });
    }
    Ok(())
}

/// Validate the length of one condition list
pub fn validate_condition_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_CONDITIONS {
        return Err(ValidationError::TooManyConditions {
            count,
            max: MAX_CONDITIONS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_element_name() {
        assert!(validate_element_name("Europe").is_ok());
        assert!(validate_element_name("").is_err());
        assert!(validate_element_name(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight("P", "C", -1.0).is_ok());
        assert!(validate_weight("P", "C", f64::NAN).is_err());
        assert!(validate_weight("P", "C", f64::INFINITY).is_err());
    }
}
