//! Feature collections and attribute extraction.
//!
//! Attribute values are read once per collection into typed arrays
//! ([`AttributeArray`]) keyed by attribute name. The pseudo-attribute
//! [`INDEX_ATTRIBUTE`] is synthesized as the 1-based feature position.

use std::collections::HashMap;
use std::path::Path;

use map_common::{GeometryType, MapError, MapResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pseudo-attribute holding the 1-based position of each feature.
pub const INDEX_ATTRIBUTE: &str = "INDEX";

/// Class of an attribute referenced by a symbol spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeClass {
    Numeric,
    Text,
}

/// An attribute referenced by a compiled symbol spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub name: String,
    pub class: AttributeClass,
}

/// Values of one attribute for every feature, in feature order.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArray {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl AttributeArray {
    pub fn len(&self) -> usize {
        match self {
            AttributeArray::Numeric(v) => v.len(),
            AttributeArray::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn class(&self) -> AttributeClass {
        match self {
            AttributeArray::Numeric(_) => AttributeClass::Numeric,
            AttributeArray::Text(_) => AttributeClass::Text,
        }
    }
}

/// Attribute name to typed values.
pub type AttributeTable = HashMap<String, AttributeArray>;

/// Raw attribute value stored on a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeData {
    /// Missing numeric sample (JSON `null`); read as NaN.
    Null,
    Double(f64),
    Logical(bool),
    Text(String),
    DoubleArray(Vec<f64>),
    TextArray(Vec<String>),
    Complex { re: f64, im: f64 },
    Integer(i64),
}

impl From<f64> for AttributeData {
    fn from(v: f64) -> Self {
        AttributeData::Double(v)
    }
}

impl From<&str> for AttributeData {
    fn from(s: &str) -> Self {
        AttributeData::Text(s.to_string())
    }
}

impl From<String> for AttributeData {
    fn from(s: String) -> Self {
        AttributeData::Text(s)
    }
}

/// One vector feature: a geometry tag and its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: GeometryType,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeData>,
}

impl Feature {
    pub fn new(geometry: GeometryType) -> Self {
        Self {
            geometry,
            attributes: HashMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeData>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeData> {
        self.attributes.get(name)
    }
}

/// An ordered collection of features sharing one geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Parse a feature collection from a JSON string.
    pub fn from_json(json: &str) -> MapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a feature collection from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The shared geometry of the collection, `None` if it is empty.
    pub fn geometry(&self) -> MapResult<Option<GeometryType>> {
        let Some(first) = self.features.first() else {
            return Ok(None);
        };
        for feature in &self.features[1..] {
            if feature.geometry != first.geometry {
                return Err(MapError::GeometryMismatch {
                    expected: first.geometry,
                    found: feature.geometry,
                });
            }
        }
        Ok(Some(first.geometry))
    }
}

/// Read every referenced attribute out of the collection.
///
/// Fails on the first feature that violates the numeric or string scalar
/// contract; no partial table is returned.
pub fn extract_attributes(
    attributes: &[AttributeInfo],
    collection: &FeatureCollection,
) -> MapResult<AttributeTable> {
    let mut table = AttributeTable::with_capacity(attributes.len());

    for info in attributes {
        let array = if info.name == INDEX_ATTRIBUTE {
            AttributeArray::Numeric((1..=collection.len()).map(|k| k as f64).collect())
        } else {
            match info.class {
                AttributeClass::Numeric => {
                    AttributeArray::Numeric(extract_numeric(&info.name, collection)?)
                }
                AttributeClass::Text => AttributeArray::Text(extract_text(&info.name, collection)?),
            }
        };
        table.insert(info.name.clone(), array);
    }

    debug!(
        attributes = attributes.len(),
        features = collection.len(),
        "Extracted feature attributes"
    );

    Ok(table)
}

fn extract_numeric(name: &str, collection: &FeatureCollection) -> MapResult<Vec<f64>> {
    let mut values = Vec::with_capacity(collection.len());
    for (k, feature) in collection.features.iter().enumerate() {
        let data = feature
            .attribute(name)
            .ok_or_else(|| MapError::MissingAttribute(name.to_string()))?;
        let value = match data {
            AttributeData::Null => f64::NAN,
            AttributeData::Double(v) => *v,
            AttributeData::DoubleArray(vs) => match vs.as_slice() {
                [v] => *v,
                _ => {
                    return Err(MapError::NonScalarAttribute {
                        attribute: name.to_string(),
                        feature: k,
                    })
                }
            },
            AttributeData::Complex { .. } => {
                return Err(MapError::NonFiniteAttribute {
                    attribute: name.to_string(),
                    feature: k,
                })
            }
            AttributeData::Integer(_)
            | AttributeData::Logical(_)
            | AttributeData::Text(_)
            | AttributeData::TextArray(_) => {
                return Err(MapError::NonDoubleAttribute {
                    attribute: name.to_string(),
                    feature: k,
                })
            }
        };
        if value.is_infinite() {
            return Err(MapError::NonFiniteAttribute {
                attribute: name.to_string(),
                feature: k,
            });
        }
        values.push(value);
    }
    Ok(values)
}

fn extract_text(name: &str, collection: &FeatureCollection) -> MapResult<Vec<String>> {
    let mut values = Vec::with_capacity(collection.len());
    for (k, feature) in collection.features.iter().enumerate() {
        let data = feature
            .attribute(name)
            .ok_or_else(|| MapError::MissingAttribute(name.to_string()))?;
        let value = match data {
            AttributeData::Text(s) => s.clone(),
            AttributeData::TextArray(v) if v.len() == 1 => v[0].clone(),
            _ => {
                return Err(MapError::InconsistentAttributeType {
                    attribute: name.to_string(),
                    feature: k,
                })
            }
        };
        values.push(value);
    }
    Ok(values)
}
