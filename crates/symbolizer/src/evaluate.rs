//! Rule evaluation into a per-feature property table.

use map_common::{MapError, MapResult};
use serde::Serialize;
use tracing::{debug, trace};

use crate::attributes::{extract_attributes, AttributeTable, FeatureCollection};
use crate::compile::SymbolSpec;
use crate::value::PropertyValue;

/// Property values for every feature.
///
/// Cells are `None` when no default and no rule set them. Unset cells are
/// never reported by [`PropertyTable::properties_for`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyTable {
    names: Vec<String>,
    values: Vec<Vec<Option<PropertyValue>>>,
}

impl PropertyTable {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn feature_count(&self) -> usize {
        self.values.len()
    }

    pub fn property_count(&self) -> usize {
        self.names.len()
    }

    /// Cell for feature `k` and property column `j`.
    pub fn get(&self, k: usize, j: usize) -> Option<&PropertyValue> {
        self.values.get(k)?.get(j)?.as_ref()
    }

    /// Cell for feature `k` and property `name` (case-insensitive).
    pub fn value(&self, k: usize, name: &str) -> Option<&PropertyValue> {
        let j = self.names.iter().position(|n| n.eq_ignore_ascii_case(name))?;
        self.get(k, j)
    }

    /// The set `(name, value)` pairs for feature `k`, in declared property
    /// order. `None` if `k` is out of range.
    pub fn properties_for(&self, k: usize) -> Option<Vec<(&str, &PropertyValue)>> {
        let row = self.values.get(k)?;
        Some(
            self.names
                .iter()
                .zip(row)
                .filter_map(|(name, cell)| cell.as_ref().map(|v| (name.as_str(), v)))
                .collect(),
        )
    }
}

/// Apply every property's default and rules to `feature_count` features.
pub fn evaluate_rules(
    spec: &SymbolSpec,
    attributes: &AttributeTable,
    feature_count: usize,
) -> MapResult<PropertyTable> {
    let names = spec.property_names();
    let mut values = vec![vec![None; names.len()]; feature_count];

    for (j, property) in spec.properties.iter().enumerate() {
        if property.default.is_some() {
            for row in values.iter_mut() {
                row[j] = property.default.clone();
            }
        }

        for rule in &property.rules {
            let array = attributes
                .get(&rule.attribute)
                .ok_or_else(|| MapError::MissingAttribute(rule.attribute.clone()))?;
            if array.len() != feature_count {
                return Err(MapError::config(format!(
                    "attribute '{}' has {} values for {} features",
                    rule.attribute,
                    array.len(),
                    feature_count
                )));
            }

            let selected = rule.evaluate(array)?;
            trace!(
                property = %property.name,
                attribute = %rule.attribute,
                matched = selected.len(),
                "Applied rule"
            );
            for (k, value) in selected {
                values[k][j] = Some(value);
            }
        }
    }

    Ok(PropertyTable { names, values })
}

/// Symbolize a feature collection: check geometry, extract attributes and
/// evaluate the rules.
pub fn symbolize(spec: &SymbolSpec, collection: &FeatureCollection) -> MapResult<PropertyTable> {
    if let Some(found) = collection.geometry()? {
        if found != spec.geometry {
            return Err(MapError::GeometryMismatch {
                expected: spec.geometry,
                found,
            });
        }
    }

    if collection.is_empty() {
        return Ok(PropertyTable {
            names: spec.property_names(),
            values: Vec::new(),
        });
    }

    let attributes = extract_attributes(&spec.attributes, collection)?;
    let table = evaluate_rules(spec, &attributes, collection.len())?;

    debug!(
        features = table.feature_count(),
        properties = table.property_count(),
        "Symbolized feature collection"
    );

    Ok(table)
}
