//! Symbol spec compilation.
//!
//! A symbol spec is written as a flat list of [`RuleTuple`]s. Compilation
//! groups them by graphics property, collapses default rows, classifies every
//! conditional row into a [`RuleKind`] and builds the table of attributes the
//! rules read.

use map_common::{GeometryType, MapError, MapResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::{AttributeClass, AttributeInfo, INDEX_ATTRIBUTE};
use crate::rule::{RuleKind, RuleSpec};
use crate::value::{PropertyValue, RuleInput};

const DEFAULT_KEYWORD: &str = "default";

/// One row of a symbol spec: `(attribute, value or range, property, property value)`.
///
/// Default rows name the attribute `"Default"` (any non-empty prefix, any
/// case) and carry no attribute value. Attributes named `D`, `De` and so on
/// therefore cannot be matched by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTuple {
    pub attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_value: Option<RuleInput>,
    pub property: String,
    pub property_value: RuleInput,
}

impl RuleTuple {
    /// A conditional rule.
    pub fn new(
        attribute: impl Into<String>,
        attribute_value: impl Into<RuleInput>,
        property: impl Into<String>,
        property_value: impl Into<RuleInput>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            attribute_value: Some(attribute_value.into()),
            property: property.into(),
            property_value: property_value.into(),
        }
    }

    /// A default rule for `property`.
    pub fn default_value(property: impl Into<String>, property_value: impl Into<RuleInput>) -> Self {
        Self {
            attribute: "Default".to_string(),
            attribute_value: None,
            property: property.into(),
            property_value: property_value.into(),
        }
    }

    /// True if the attribute names the default keyword.
    pub fn is_default(&self) -> bool {
        is_default_keyword(&self.attribute)
    }
}

fn is_default_keyword(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= DEFAULT_KEYWORD.len()
        && DEFAULT_KEYWORD.starts_with(&name.to_ascii_lowercase())
}

/// Compiled rules for one graphics property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub default: Option<PropertyValue>,
    pub rules: Vec<RuleSpec>,
}

/// A compiled symbol spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub geometry: GeometryType,
    pub properties: Vec<PropertySpec>,
    pub attributes: Vec<AttributeInfo>,
}

impl SymbolSpec {
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn property_names(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }
}

/// Compile a list of rule tuples into a [`SymbolSpec`].
pub fn compile_symbol_spec(geometry: GeometryType, tuples: &[RuleTuple]) -> MapResult<SymbolSpec> {
    let mut properties: Vec<PropertySpec> = Vec::new();

    for tuple in tuples {
        let idx = match properties
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(&tuple.property))
        {
            Some(idx) => idx,
            None => {
                properties.push(PropertySpec {
                    name: tuple.property.clone(),
                    default: None,
                    rules: Vec::new(),
                });
                properties.len() - 1
            }
        };
        let property = &mut properties[idx];

        if tuple.is_default() {
            if tuple.attribute_value.is_some() {
                return Err(MapError::invalid_rule(
                    &tuple.property,
                    "default rule must not carry an attribute value",
                ));
            }
            property.default = Some(fixed_value(&tuple.property, &tuple.property_value)?);
        } else {
            property.rules.push(classify(tuple)?);
        }
    }

    let attributes = attribute_table(&properties)?;

    debug!(
        geometry = %geometry,
        properties = properties.len(),
        attributes = attributes.len(),
        "Compiled symbol spec"
    );

    Ok(SymbolSpec {
        geometry,
        properties,
        attributes,
    })
}

/// Property value assigned as-is to a feature.
fn fixed_value(property: &str, input: &RuleInput) -> MapResult<PropertyValue> {
    PropertyValue::from_input(input).ok_or_else(|| {
        MapError::invalid_rule(
            property,
            format!("{} is not a single property value", input.shape_name()),
        )
    })
}

fn classify(tuple: &RuleTuple) -> MapResult<RuleSpec> {
    let property = tuple.property.as_str();

    if tuple.attribute.is_empty() {
        return Err(MapError::invalid_rule(property, "empty attribute name"));
    }
    let Some(attribute_value) = &tuple.attribute_value else {
        return Err(MapError::invalid_rule(
            property,
            format!("rule on '{}' has no attribute value", tuple.attribute),
        ));
    };

    let kind = if let Some(text) = attribute_value.as_text() {
        RuleKind::StringMatch {
            value: text.to_string(),
            property_value: fixed_value(property, &tuple.property_value)?,
        }
    } else if let Some(value) = attribute_value.as_scalar() {
        RuleKind::ScalarMatch {
            value,
            property_value: fixed_value(property, &tuple.property_value)?,
        }
    } else if let Some((lo, hi)) = attribute_value.as_range() {
        classify_range(property, lo, hi, &tuple.property_value)?
    } else {
        return Err(MapError::invalid_rule(
            property,
            format!(
                "attribute value for '{}' is a {}; expected text, a number or a 2-element range",
                tuple.attribute,
                attribute_value.shape_name()
            ),
        ));
    };

    Ok(RuleSpec {
        attribute: tuple.attribute.clone(),
        kind,
    })
}

fn classify_range(property: &str, lo: f64, hi: f64, value: &RuleInput) -> MapResult<RuleKind> {
    let reversed = lo > hi;
    let (min, max) = if reversed { (hi, lo) } else { (lo, hi) };

    if let Some(text) = value.as_text() {
        return Ok(RuleKind::RangeMatch {
            min,
            max,
            property_value: PropertyValue::Text(text.to_string()),
        });
    }
    if let Some(colormap) = value.as_colormap() {
        let colormap = if reversed {
            colormap.into_iter().rev().collect()
        } else {
            colormap
        };
        return Ok(RuleKind::ColormapBucket { min, max, colormap });
    }

    match value.as_row() {
        Some([v]) => Ok(RuleKind::RangeMatch {
            min,
            max,
            property_value: PropertyValue::Number(*v),
        }),
        Some([r, g, b]) => Ok(RuleKind::RangeMatch {
            min,
            max,
            property_value: PropertyValue::Rgb([*r, *g, *b]),
        }),
        Some([p_lo, p_hi]) => {
            let (property_min, property_max) = if reversed {
                (*p_hi, *p_lo)
            } else {
                (*p_lo, *p_hi)
            };
            Ok(RuleKind::Interpolate {
                min,
                max,
                property_min,
                property_max,
            })
        }
        _ => Err(MapError::invalid_rule(
            property,
            format!(
                "a range rule cannot assign a {}; expected a scalar, text, a color, a colormap or a 2-element range",
                value.shape_name()
            ),
        )),
    }
}

/// Deduplicated attributes in first-use order, with consistent classes.
fn attribute_table(properties: &[PropertySpec]) -> MapResult<Vec<AttributeInfo>> {
    let mut attributes: Vec<AttributeInfo> = Vec::new();

    for rule in properties.iter().flat_map(|p| &p.rules) {
        let class = rule.kind.attribute_class();
        if rule.attribute == INDEX_ATTRIBUTE && class == AttributeClass::Text {
            return Err(MapError::InconsistentAttributeClass(rule.attribute.clone()));
        }
        match attributes.iter().find(|a| a.name == rule.attribute) {
            Some(existing) if existing.class != class => {
                return Err(MapError::InconsistentAttributeClass(rule.attribute.clone()));
            }
            Some(_) => {}
            None => attributes.push(AttributeInfo {
                name: rule.attribute.clone(),
                class,
            }),
        }
    }

    Ok(attributes)
}
