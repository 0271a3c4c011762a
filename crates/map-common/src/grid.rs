//! Gridded data and raster interpretation.

use serde::{Deserialize, Serialize};

use crate::{MapError, MapResult};

/// A 2-D grid of samples stored in row-major order.
///
/// Non-finite values (NaN, ±Inf) mark null cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRows", into = "GridRows")]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Create a grid from row-major data.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> MapResult<Self> {
        if data.len() != rows * cols {
            return Err(MapError::invalid_grid(format!(
                "expected {} values for a {}x{} grid, got {}",
                rows * cols,
                rows,
                cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a grid from a list of equally long rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> MapResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(MapError::invalid_grid(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }
        Self::new(n_rows, n_cols, data)
    }

    /// A grid with every value set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Value at (row, col), 0-based.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Slice of one row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Apply `f` to every value.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Minimum and maximum of the finite values.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Location (row, col) of the first maximum in row-major order.
    pub fn max_location(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &v) in self.data.iter().enumerate() {
            if !v.is_finite() {
                continue;
            }
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((idx, v)),
            }
        }
        best.map(|(idx, _)| (idx / self.cols, idx % self.cols))
    }

    /// True if any value is non-finite.
    pub fn has_nulls(&self) -> bool {
        self.data.iter().any(|v| !v.is_finite())
    }
}

/// Serialized form of a grid: nested rows, `null` for missing samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridRows {
    rows: Vec<Vec<Option<f64>>>,
}

impl TryFrom<GridRows> for Grid {
    type Error = MapError;

    fn try_from(value: GridRows) -> Result<Self, Self::Error> {
        Grid::from_rows(
            value
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                .collect(),
        )
    }
}

impl From<Grid> for GridRows {
    fn from(grid: Grid) -> Self {
        let rows = (0..grid.rows)
            .map(|r| {
                grid.row(r)
                    .iter()
                    .map(|&v| if v.is_finite() { Some(v) } else { None })
                    .collect()
            })
            .collect();
        GridRows { rows }
    }
}

/// Whether grid samples are areal cells or point postings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterInterpretation {
    /// Areal cells; data are extended half a cell beyond the outer samples.
    #[default]
    Cells,
    /// Point samples; no extension beyond the outer samples.
    Postings,
}

/// Edge handling when padding a grid (pole and meridian-wrap fixes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFix {
    /// Replace the first row's padding by its mean (pole).
    pub average_first_row: bool,
    /// Replace the last row's padding by its mean (pole).
    pub average_last_row: bool,
    /// Average the first and last columns (wrapping meridian).
    pub average_first_and_last_columns: bool,
}

impl EdgeFix {
    /// No averaging; padding replicates edge values.
    pub fn none() -> Self {
        Self::default()
    }

    /// Global lat/lon grid: both poles and the wrapping meridian.
    pub fn global() -> Self {
        Self {
            average_first_row: true,
            average_last_row: true,
            average_first_and_last_columns: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Grid::new(2, 2, vec![1.0; 3]).is_err());
        assert!(Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_finite_range_and_max_location() {
        let grid = Grid::from_rows(vec![
            vec![1.0, f64::NAN, 7.0],
            vec![7.0, -2.0, f64::INFINITY],
        ])
        .unwrap();
        assert_eq!(grid.finite_range(), Some((-2.0, 7.0)));
        // First maximum in row-major order
        assert_eq!(grid.max_location(), Some((0, 2)));
        assert!(grid.has_nulls());
    }

    #[test]
    fn test_all_nan_has_no_range() {
        let grid = Grid::filled(2, 2, f64::NAN);
        assert_eq!(grid.finite_range(), None);
        assert_eq!(grid.max_location(), None);
    }

    #[test]
    fn test_json_round_trip_with_nulls() {
        let grid: Grid = serde_json::from_str(r#"{"rows": [[1, null], [3, 4]]}"#).unwrap();
        assert_eq!(grid.rows(), 2);
        assert!(grid.get(0, 1).is_nan());
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"{"rows":[[1.0,null],[3.0,4.0]]}"#);
    }

    #[test]
    fn test_edge_fix_defaults() {
        let fix: EdgeFix = serde_json::from_str(r#"{"average_first_row": true}"#).unwrap();
        assert!(fix.average_first_row);
        assert!(!fix.average_last_row);
        assert_eq!(EdgeFix::none(), EdgeFix::default());
    }
}
