//! Compiled symbolization rules.
//!
//! Each conditional rule of a symbol spec compiles into one of five
//! [`RuleKind`] variants. A rule selects features by the value of one
//! attribute and yields the property value for every selected feature.

use map_common::{MapError, MapResult};
use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeArray, AttributeClass};
use crate::value::PropertyValue;

/// The matching behaviour of a compiled rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Features whose text attribute equals `value` exactly.
    StringMatch {
        value: String,
        property_value: PropertyValue,
    },

    /// Features whose numeric attribute equals `value` exactly.
    ScalarMatch {
        value: f64,
        property_value: PropertyValue,
    },

    /// Features whose numeric attribute lies in `[min, max]`.
    RangeMatch {
        min: f64,
        max: f64,
        property_value: PropertyValue,
    },

    /// Features in `[min, max]` get the property range interpolated linearly
    /// at their attribute value.
    Interpolate {
        min: f64,
        max: f64,
        property_min: f64,
        property_max: f64,
    },

    /// Features in `[min, max]` get the colormap row of their bin; the range
    /// is split into `colormap.len()` equal-width bins.
    ColormapBucket {
        min: f64,
        max: f64,
        colormap: Vec<[f64; 3]>,
    },
}

impl RuleKind {
    /// Class of attribute the rule reads.
    pub fn attribute_class(&self) -> AttributeClass {
        match self {
            RuleKind::StringMatch { .. } => AttributeClass::Text,
            _ => AttributeClass::Numeric,
        }
    }

    /// Select features and their property values.
    ///
    /// Returns `None` if the attribute array has the wrong class for this rule.
    pub fn evaluate(&self, values: &AttributeArray) -> Option<Vec<(usize, PropertyValue)>> {
        match (self, values) {
            (
                RuleKind::StringMatch {
                    value,
                    property_value,
                },
                AttributeArray::Text(strings),
            ) => Some(
                strings
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| *s == value)
                    .map(|(k, _)| (k, property_value.clone()))
                    .collect(),
            ),
            (RuleKind::StringMatch { .. }, AttributeArray::Numeric(_)) => None,
            (_, AttributeArray::Text(_)) => None,
            (kind, AttributeArray::Numeric(numbers)) => Some(
                numbers
                    .iter()
                    .enumerate()
                    .filter_map(|(k, &a)| kind.numeric_value(a).map(|v| (k, v)))
                    .collect(),
            ),
        }
    }

    /// Property value for one numeric attribute value, `None` if unmatched.
    /// NaN never matches.
    fn numeric_value(&self, a: f64) -> Option<PropertyValue> {
        if a.is_nan() {
            return None;
        }
        match self {
            RuleKind::StringMatch { .. } => None,
            RuleKind::ScalarMatch {
                value,
                property_value,
            } => (a == *value).then(|| property_value.clone()),
            RuleKind::RangeMatch {
                min,
                max,
                property_value,
            } => (*min <= a && a <= *max).then(|| property_value.clone()),
            RuleKind::Interpolate {
                min,
                max,
                property_min,
                property_max,
            } => {
                if a < *min || a > *max {
                    return None;
                }
                let t = if max > min { (a - min) / (max - min) } else { 0.0 };
                Some(PropertyValue::Number(
                    property_min + t * (property_max - property_min),
                ))
            }
            RuleKind::ColormapBucket { min, max, colormap } => {
                if a < *min || a > *max || colormap.is_empty() {
                    return None;
                }
                let bins = colormap.len();
                let bin = if max > min {
                    ((a - min) * bins as f64 / (max - min)).floor() as usize
                } else {
                    0
                };
                // The upper edge belongs to the last bin
                Some(PropertyValue::Rgb(colormap[bin.min(bins - 1)]))
            }
        }
    }
}

/// A conditional rule bound to the attribute it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub attribute: String,
    pub kind: RuleKind,
}

impl RuleSpec {
    /// Evaluate the rule against the attribute's values.
    pub fn evaluate(&self, values: &AttributeArray) -> MapResult<Vec<(usize, PropertyValue)>> {
        self.kind
            .evaluate(values)
            .ok_or_else(|| MapError::InconsistentAttributeClass(self.attribute.clone()))
    }
}
