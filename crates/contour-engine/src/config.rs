//! Contouring configuration and automatic level selection.

use std::path::Path;

use map_common::{EdgeFix, MapError, MapResult, RasterInterpretation};
use serde::{Deserialize, Serialize};

/// How the contour levels are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSpec {
    /// Explicit levels, in any order.
    Levels(Vec<f64>),
    /// Every multiple of the interval within the data range.
    Interval(f64),
    /// This many evenly spaced levels strictly inside the data range.
    Count(usize),
}

impl Default for LevelSpec {
    fn default() -> Self {
        LevelSpec::Count(10)
    }
}

/// Upper bound on the number of levels a single request may produce.
pub const MAX_LEVELS: usize = 10_000;

impl LevelSpec {
    /// Concrete levels for data spanning `min..=max`.
    ///
    /// Fails with a configuration error when the request would produce more
    /// than [`MAX_LEVELS`] levels.
    pub fn resolve(&self, min: f64, max: f64) -> MapResult<Vec<f64>> {
        match self {
            LevelSpec::Levels(levels) => {
                check_level_count(levels.len())?;
                Ok(levels.clone())
            }
            LevelSpec::Interval(interval) => generate_contour_levels(min, max, *interval),
            LevelSpec::Count(n) => {
                check_level_count(*n)?;
                if *n == 0 || !(max > min) {
                    return Ok(vec![]);
                }
                let step = (max - min) / (*n as f64 + 1.0);
                Ok((1..=*n).map(|k| min + step * k as f64).collect())
            }
        }
    }
}

fn check_level_count(count: usize) -> MapResult<()> {
    if count > MAX_LEVELS {
        return Err(MapError::config(format!(
            "{count} levels requested, at most {MAX_LEVELS} are allowed"
        )));
    }
    Ok(())
}

/// Generate contour levels automatically based on data range and interval
pub fn generate_contour_levels(
    min_value: f64,
    max_value: f64,
    interval: f64,
) -> MapResult<Vec<f64>> {
    if !(interval > 0.0) || !interval.is_finite() || !(max_value > min_value) {
        return Ok(vec![]);
    }

    // First multiple of interval at or above min_value
    let first = (min_value / interval).ceil();
    let last = (max_value / interval).floor();
    if !(last >= first) {
        return Ok(vec![]);
    }

    let count = last - first + 1.0;
    if !count.is_finite() || count > MAX_LEVELS as f64 {
        return Err(MapError::config(format!(
            "interval {interval} over {min_value}..{max_value} gives {count} levels, \
             at most {MAX_LEVELS} are allowed"
        )));
    }

    Ok((0..count as usize)
        .map(|k| (first + k as f64) * interval)
        .collect())
}

/// Settings for [`crate::contour_grid`].
///
/// ```json
/// {
///   "levels": {"interval": 5.0},
///   "interpretation": "postings",
///   "edge_fix": {"average_first_and_last_columns": true}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    pub levels: LevelSpec,
    pub interpretation: RasterInterpretation,
    pub edge_fix: EdgeFix,
}

impl ContourConfig {
    pub fn new(levels: LevelSpec) -> Self {
        Self {
            levels,
            ..Default::default()
        }
    }

    pub fn with_interpretation(mut self, interpretation: RasterInterpretation) -> Self {
        self.interpretation = interpretation;
        self
    }

    pub fn with_edge_fix(mut self, edge_fix: EdgeFix) -> Self {
        self.edge_fix = edge_fix;
        self
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> MapResult<()> {
        match &self.levels {
            LevelSpec::Interval(interval) if !(interval.is_finite() && *interval > 0.0) => Err(
                MapError::config(format!("level interval must be positive, got {interval}")),
            ),
            LevelSpec::Count(0) => Err(MapError::config("level count must be at least 1")),
            LevelSpec::Count(n) => check_level_count(*n),
            LevelSpec::Levels(levels) if levels.len() > MAX_LEVELS => {
                check_level_count(levels.len())
            }
            LevelSpec::Levels(levels) if levels.iter().any(|l| !l.is_finite()) => {
                Err(MapError::config("levels must be finite"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_contour_levels() {
        let levels = generate_contour_levels(0.0, 20.0, 5.0).unwrap();
        assert_eq!(levels, vec![0.0, 5.0, 10.0, 15.0, 20.0]);

        let levels = generate_contour_levels(2.0, 18.0, 5.0).unwrap();
        assert_eq!(levels, vec![5.0, 10.0, 15.0]);

        let levels = generate_contour_levels(-7.0, 3.0, 2.5).unwrap();
        assert_eq!(levels, vec![-5.0, -2.5, 0.0, 2.5]);
    }

    #[test]
    fn test_generate_contour_levels_invalid() {
        assert!(generate_contour_levels(0.0, 20.0, 0.0).unwrap().is_empty());
        assert!(generate_contour_levels(0.0, 20.0, -1.0).unwrap().is_empty());
        assert!(generate_contour_levels(5.0, 5.0, 1.0).unwrap().is_empty());
        assert!(generate_contour_levels(1.1, 1.9, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_too_many_interval_levels() {
        let err = generate_contour_levels(0.0, 1e6, 1e-9).unwrap_err();
        assert_eq!(err.code(), "ConfigError");

        let err = generate_contour_levels(-f64::MAX, f64::MAX, 1.0).unwrap_err();
        assert_eq!(err.code(), "ConfigError");

        // Exactly at the limit is fine
        let levels = generate_contour_levels(1.0, MAX_LEVELS as f64, 1.0).unwrap();
        assert_eq!(levels.len(), MAX_LEVELS);
    }

    #[test]
    fn test_count_levels() {
        let levels = LevelSpec::Count(3).resolve(0.0, 8.0).unwrap();
        assert_eq!(levels, vec![2.0, 4.0, 6.0]);
        assert!(LevelSpec::Count(3).resolve(1.0, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_too_many_counted_levels() {
        let spec = LevelSpec::Count(MAX_LEVELS + 1);
        assert_eq!(spec.resolve(0.0, 1.0).unwrap_err().code(), "ConfigError");

        let config = ContourConfig::new(spec);
        assert_eq!(config.validate().unwrap_err().code(), "ConfigError");

        let config = ContourConfig::new(LevelSpec::Levels(vec![1.0; MAX_LEVELS + 1]));
        assert_eq!(config.validate().unwrap_err().code(), "ConfigError");

        assert!(ContourConfig::new(LevelSpec::Count(MAX_LEVELS))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_parse_config() {
        let config = ContourConfig::from_json(
            r#"{"levels": {"levels": [5.0, 1.0]}, "interpretation": "postings"}"#,
        )
        .unwrap();
        assert_eq!(config.levels, LevelSpec::Levels(vec![5.0, 1.0]));
        assert_eq!(config.interpretation, RasterInterpretation::Postings);
        assert_eq!(config.edge_fix, EdgeFix::none());

        let config = ContourConfig::from_json("{}").unwrap();
        assert_eq!(config.levels, LevelSpec::Count(10));
        assert_eq!(config.interpretation, RasterInterpretation::Cells);
    }

    #[test]
    fn test_validate() {
        let err = ContourConfig::from_json(r#"{"levels": {"interval": 0}}"#).unwrap_err();
        assert_eq!(err.code(), "ConfigError");

        let err = ContourConfig::from_json(r#"{"levels": {"count": 0}}"#).unwrap_err();
        assert_eq!(err.code(), "ConfigError");

        assert!(ContourConfig::from_json(r#"{"levels": "bogus"}"#).is_err());
        assert!(ContourConfig::new(LevelSpec::Interval(2.0)).validate().is_ok());
    }
}
