//! Common test fixtures for symbolization and contouring tests.
//!
//! Fixtures are JSON documents so that they exercise the same loading path
//! as configuration files.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

/// Three line features with `CLASS = [2, 3, 5]`.
pub const CLASS_FEATURES_JSON: &str = r#"{
    "features": [
        {"geometry": "Line", "attributes": {"CLASS": 2.0, "NAME": "Main St"}},
        {"geometry": "Line", "attributes": {"CLASS": 3.0, "NAME": "Oak Ave"}},
        {"geometry": "Line", "attributes": {"CLASS": 5.0, "NAME": "Elm Rd"}}
    ]
}"#;

/// Symbol spec: `CLASS == 2 -> Color 'r'`, `CLASS == 3 -> LineWidth 2`,
/// `Default Color 'k'`.
pub const CLASS_SPEC_JSON: &str = r#"{
    "geometry": "Line",
    "rules": [
        {"attribute": "CLASS", "attribute_value": 2, "property": "Color", "property_value": "r"},
        {"attribute": "CLASS", "attribute_value": 3, "property": "LineWidth", "property_value": 2},
        {"attribute": "Default", "property": "Color", "property_value": "k"}
    ]
}"#;

/// Point features with a population attribute, one of them missing (null).
pub const CITY_FEATURES_JSON: &str = r#"{
    "features": [
        {"geometry": "Point", "attributes": {"POP": 1500.0, "NAME": "Ashford"}},
        {"geometry": "Point", "attributes": {"POP": null, "NAME": "Brill"}},
        {"geometry": "Point", "attributes": {"POP": 52000.0, "NAME": "Carlow"}},
        {"geometry": "Point", "attributes": {"POP": 250000.0, "NAME": "Dunmore"}}
    ]
}"#;

/// Symbol spec over [`CITY_FEATURES_JSON`] exercising ranges, interpolation
/// and a colormap.
pub const CITY_SPEC_JSON: &str = r#"{
    "geometry": "Point",
    "rules": [
        {"attribute": "Default", "property": "MarkerSize", "property_value": 3},
        {"attribute": "POP", "attribute_value": [0, 300000], "property": "MarkerSize", "property_value": [4, 16]},
        {"attribute": "POP", "attribute_value": [0, 300000], "property": "MarkerFaceColor",
         "property_value": [[0, 0, 1], [0, 1, 0], [1, 0, 0]]},
        {"attribute": "NAME", "attribute_value": "Carlow", "property": "Marker", "property_value": "s"}
    ]
}"#;

/// Contour configuration with explicit levels on cells.
pub const CONTOUR_CONFIG_JSON: &str = r#"{
    "levels": {"levels": [5.0]},
    "interpretation": "cells",
    "edge_fix": {"average_first_row": false, "average_last_row": false, "average_first_and_last_columns": false}
}"#;

/// The 3x3 peak grid in its JSON form.
pub const PEAK_GRID_JSON: &str = r#"{"rows": [[0, 0, 0], [0, 10, 0], [0, 0, 0]]}"#;

/// Writes `content` into a fresh temporary directory and returns the
/// directory guard with the file path.
pub fn write_temp_file(name: &str, content: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok((dir, path))
}
