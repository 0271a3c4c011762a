//! Rule inputs and graphics property values.

use serde::{Deserialize, Serialize};

/// A shaped value as written in a rule: number, text, numeric vector or
/// numeric matrix (list of rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleInput {
    Number(f64),
    Text(String),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl RuleInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RuleInput::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a single row of numbers, if it has exactly one row.
    pub fn as_row(&self) -> Option<&[f64]> {
        match self {
            RuleInput::Number(v) => Some(std::slice::from_ref(v)),
            RuleInput::Vector(v) => Some(v),
            RuleInput::Matrix(rows) if rows.len() == 1 => Some(&rows[0]),
            _ => None,
        }
    }

    /// A single number (scalar, 1-vector or 1x1 matrix).
    pub fn as_scalar(&self) -> Option<f64> {
        match self.as_row() {
            Some([v]) => Some(*v),
            _ => None,
        }
    }

    /// A two-element numeric range.
    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self.as_row() {
            Some([lo, hi]) => Some((*lo, *hi)),
            _ => None,
        }
    }

    /// Rows of a matrix with more than one row and three columns.
    pub fn as_colormap(&self) -> Option<Vec<[f64; 3]>> {
        match self {
            RuleInput::Matrix(rows) if rows.len() > 1 => rows
                .iter()
                .map(|row| match row.as_slice() {
                    [r, g, b] => Some([*r, *g, *b]),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Short description of the shape, used in error messages.
    pub fn shape_name(&self) -> String {
        match self {
            RuleInput::Number(_) => "scalar".to_string(),
            RuleInput::Text(_) => "text".to_string(),
            RuleInput::Vector(v) => format!("1x{} vector", v.len()),
            RuleInput::Matrix(rows) => format!(
                "{}x{} matrix",
                rows.len(),
                rows.first().map(|r| r.len()).unwrap_or(0)
            ),
        }
    }
}

impl From<f64> for RuleInput {
    fn from(v: f64) -> Self {
        RuleInput::Number(v)
    }
}

impl From<i32> for RuleInput {
    fn from(v: i32) -> Self {
        RuleInput::Number(v as f64)
    }
}

impl From<&str> for RuleInput {
    fn from(s: &str) -> Self {
        RuleInput::Text(s.to_string())
    }
}

impl From<String> for RuleInput {
    fn from(s: String) -> Self {
        RuleInput::Text(s)
    }
}

impl From<[f64; 2]> for RuleInput {
    fn from(v: [f64; 2]) -> Self {
        RuleInput::Vector(v.to_vec())
    }
}

impl From<[f64; 3]> for RuleInput {
    fn from(v: [f64; 3]) -> Self {
        RuleInput::Vector(v.to_vec())
    }
}

impl From<Vec<f64>> for RuleInput {
    fn from(v: Vec<f64>) -> Self {
        RuleInput::Vector(v)
    }
}

impl From<Vec<[f64; 3]>> for RuleInput {
    fn from(rows: Vec<[f64; 3]>) -> Self {
        RuleInput::Matrix(rows.into_iter().map(|r| r.to_vec()).collect())
    }
}

/// A graphics property value assigned to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Rgb([f64; 3]),
    Vector(Vec<f64>),
}

impl PropertyValue {
    /// Convert a single-row rule input into a fixed property value.
    ///
    /// Returns `None` for multi-row matrices, which cannot be assigned to a
    /// single feature.
    pub fn from_input(input: &RuleInput) -> Option<Self> {
        if let RuleInput::Text(s) = input {
            return Some(PropertyValue::Text(s.clone()));
        }
        let row = input.as_row()?;
        Some(match row {
            [v] => PropertyValue::Number(*v),
            [r, g, b] => PropertyValue::Rgb([*r, *g, *b]),
            other => PropertyValue::Vector(other.to_vec()),
        })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Number(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<[f64; 3]> for PropertyValue {
    fn from(rgb: [f64; 3]) -> Self {
        PropertyValue::Rgb(rgb)
    }
}
