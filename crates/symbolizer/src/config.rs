//! JSON symbol spec files.

use std::path::Path;

use map_common::{GeometryType, MapResult};
use serde::{Deserialize, Serialize};

use crate::compile::{compile_symbol_spec, RuleTuple, SymbolSpec};

/// Uncompiled symbol spec as stored in a JSON file.
///
/// ```json
/// {
///   "geometry": "Line",
///   "rules": [
///     {"attribute": "CLASS", "attribute_value": 2, "property": "Color", "property_value": "r"},
///     {"attribute": "Default", "property": "Color", "property_value": "k"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpecConfig {
    pub geometry: GeometryType,
    #[serde(default)]
    pub rules: Vec<RuleTuple>,
}

impl SymbolSpecConfig {
    /// Parse a symbol spec from a JSON string.
    pub fn from_json(json: &str) -> MapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a symbol spec from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn compile(&self) -> MapResult<SymbolSpec> {
        compile_symbol_spec(self.geometry, &self.rules)
    }

    /// Check that the rules compile.
    pub fn validate(&self) -> MapResult<()> {
        self.compile().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RuleInput;

    #[test]
    fn test_parse_rules() {
        let config = SymbolSpecConfig::from_json(
            r#"{
                "geometry": "line",
                "rules": [
                    {"attribute": "LENGTH", "attribute_value": [0, 10], "property": "LineWidth", "property_value": [1, 4]},
                    {"attribute": "Default", "property": "Color", "property_value": [0, 0, 1]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.geometry, GeometryType::Line);
        assert_eq!(
            config.rules[0].attribute_value,
            Some(RuleInput::Vector(vec![0.0, 10.0]))
        );
        assert!(config.rules[1].is_default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_json() {
        let err = SymbolSpecConfig::from_json("{\"geometry\": \"Cube\"}").unwrap_err();
        assert_eq!(err.code(), "ConfigError");
    }
}
