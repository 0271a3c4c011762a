//! Error types for the symbology and contour engines.

use thiserror::Error;

use crate::GeometryType;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for symbolization and contouring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    // === Rule compilation errors ===
    #[error("Invalid rule for property '{property}': {message}")]
    InvalidRuleShape { property: String, message: String },

    #[error("Attribute '{0}' is used with both numeric and string values")]
    InconsistentAttributeClass(String),

    // === Attribute extraction errors ===
    #[error("Attribute '{0}' is missing from the feature collection")]
    MissingAttribute(String),

    #[error("Attribute '{attribute}' of feature {feature} is not a scalar")]
    NonScalarAttribute { attribute: String, feature: usize },

    #[error("Attribute '{attribute}' of feature {feature} is not finite and real")]
    NonFiniteAttribute { attribute: String, feature: usize },

    #[error("Attribute '{attribute}' of feature {feature} is not a double")]
    NonDoubleAttribute { attribute: String, feature: usize },

    #[error("Attribute '{attribute}' of feature {feature} is not a scalar string")]
    InconsistentAttributeType { attribute: String, feature: usize },

    // === Validation errors ===
    #[error("Geometry mismatch: symbol spec is for {expected} features, collection has {found}")]
    GeometryMismatch {
        expected: GeometryType,
        found: GeometryType,
    },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl MapError {
    /// Create an InvalidRuleShape error.
    pub fn invalid_rule(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRuleShape {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a ConfigError.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Stable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            MapError::InvalidRuleShape { .. } => "InvalidRuleShape",
            MapError::InconsistentAttributeClass(_) => "InconsistentAttributeClass",
            MapError::MissingAttribute(_) => "MissingAttribute",
            MapError::NonScalarAttribute { .. } => "NonScalarAttribute",
            MapError::NonFiniteAttribute { .. } => "NonFiniteAttribute",
            MapError::NonDoubleAttribute { .. } => "NonDoubleAttribute",
            MapError::InconsistentAttributeType { .. } => "InconsistentAttributeType",
            MapError::GeometryMismatch { .. } => "GeometryMismatch",
            MapError::InvalidGrid(_) => "InvalidGrid",
            MapError::ConfigError(_) => "ConfigError",
            MapError::IoError(_) => "IoError",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::ConfigError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MapError::MissingAttribute("NAME".into()).code(),
            "MissingAttribute"
        );
        assert_eq!(
            MapError::invalid_rule("Color", "bad").code(),
            "InvalidRuleShape"
        );
    }

    #[test]
    fn test_geometry_mismatch_message() {
        let err = MapError::GeometryMismatch {
            expected: GeometryType::Line,
            found: GeometryType::Polygon,
        };
        assert_eq!(
            err.to_string(),
            "Geometry mismatch: symbol spec is for Line features, collection has Polygon"
        );
    }
}
