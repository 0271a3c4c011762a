//! Geometry primitives shared by both engines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry tag of a feature or symbol spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    #[serde(alias = "point")]
    Point,
    #[serde(alias = "line")]
    Line,
    #[serde(alias = "polygon")]
    Polygon,
}

impl GeometryType {
    /// Parse a geometry name, case-insensitively. Accepts the common aliases
    /// `multipoint`, `linestring`/`polyline` and `patch`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "point" | "multipoint" => Some(GeometryType::Point),
            "line" | "linestring" | "polyline" => Some(GeometryType::Line),
            "polygon" | "patch" => Some(GeometryType::Polygon),
            _ => None,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryType::Point => "Point",
            GeometryType::Line => "Line",
            GeometryType::Polygon => "Polygon",
        };
        f.write_str(name)
    }
}

/// A point in intrinsic grid coordinates (x = column, y = row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_from_name() {
        assert_eq!(GeometryType::from_name("LINE"), Some(GeometryType::Line));
        assert_eq!(GeometryType::from_name("patch"), Some(GeometryType::Polygon));
        assert_eq!(GeometryType::from_name("surface"), None);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }
}
