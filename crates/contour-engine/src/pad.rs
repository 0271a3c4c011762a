//! Grid padding according to raster interpretation and edge handling.
//!
//! Cells are extended by half a cell on every side: one padding row above and
//! below, one padding column left and right. The half-cell extension lives in
//! the node coordinates (`xs`, `ys`), so every traced vertex is already in the
//! original grid's intrinsic space. Postings are never padded; edge fixes
//! overwrite the outer rows and columns in place.

use map_common::{BoundingBox, EdgeFix, Grid, RasterInterpretation};
use tracing::debug;

/// A grid ready for tracing.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedGrid {
    /// Node values, `ys.len()` rows by `xs.len()` columns.
    pub z: Grid,
    /// Intrinsic x coordinate of every node column, ascending.
    pub xs: Vec<f64>,
    /// Intrinsic y coordinate of every node row, ascending.
    pub ys: Vec<f64>,
    /// Outer rectangle used to close fill bands.
    pub limits: BoundingBox,
}

impl PaddedGrid {
    pub fn rows(&self) -> usize {
        self.z.rows()
    }

    pub fn cols(&self) -> usize {
        self.z.cols()
    }

    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.z.get(i, j)
    }
}

/// Mean of the finite values, `None` if there are none.
pub(crate) fn finite_mean<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Pad `grid` for tracing. Returns `None` for degenerate input: an empty
/// grid, a grid without finite values, or postings smaller than 2x2.
pub fn pad_grid(
    grid: &Grid,
    interpretation: RasterInterpretation,
    edge_fix: EdgeFix,
) -> Option<PaddedGrid> {
    if grid.is_empty() || grid.finite_range().is_none() {
        debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            "Degenerate grid, nothing to contour"
        );
        return None;
    }

    match interpretation {
        RasterInterpretation::Cells => pad_cells(grid, edge_fix),
        RasterInterpretation::Postings => {
            if grid.rows() < 2 || grid.cols() < 2 {
                debug!(
                    rows = grid.rows(),
                    cols = grid.cols(),
                    "Postings grid smaller than 2x2, nothing to contour"
                );
                return None;
            }
            Some(fix_postings(grid, edge_fix))
        }
    }
}

fn pad_cells(grid: &Grid, edge_fix: EdgeFix) -> Option<PaddedGrid> {
    let (m, n) = (grid.rows(), grid.cols());

    let edge_row = |r: usize, average: bool| -> Vec<f64> {
        let row = grid.row(r);
        match finite_mean(row) {
            Some(mean) if average => vec![mean; n],
            _ => row.to_vec(),
        }
    };

    // Rows first, so that the corner nodes take part in column padding
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(m + 2);
    rows.push(edge_row(0, edge_fix.average_first_row));
    rows.extend((0..m).map(|r| grid.row(r).to_vec()));
    rows.push(edge_row(m - 1, edge_fix.average_last_row));

    let mut data = Vec::with_capacity((m + 2) * (n + 2));
    for row in &rows {
        let (first, last) = (row[0], row[n - 1]);
        let (left, right) = match finite_mean(&[first, last]) {
            Some(mean) if edge_fix.average_first_and_last_columns => (mean, mean),
            _ => (first, last),
        };
        data.push(left);
        data.extend_from_slice(row);
        data.push(right);
    }

    Some(PaddedGrid {
        z: Grid::new(m + 2, n + 2, data).ok()?,
        xs: cell_nodes(n),
        ys: cell_nodes(m),
        limits: BoundingBox::new(0.5, 0.5, n as f64 + 0.5, m as f64 + 0.5),
    })
}

/// `[0.5, 1, 2, ..., n, n + 0.5]`
fn cell_nodes(n: usize) -> Vec<f64> {
    let mut nodes = Vec::with_capacity(n + 2);
    nodes.push(0.5);
    nodes.extend((1..=n).map(|k| k as f64));
    nodes.push(n as f64 + 0.5);
    nodes
}

fn fix_postings(grid: &Grid, edge_fix: EdgeFix) -> PaddedGrid {
    let (m, n) = (grid.rows(), grid.cols());
    let mut z = grid.clone();

    if edge_fix.average_first_and_last_columns {
        for r in 0..m {
            if let Some(mean) = finite_mean(&[z.get(r, 0), z.get(r, n - 1)]) {
                z.set(r, 0, mean);
                z.set(r, n - 1, mean);
            }
        }
    }
    for (r, average) in [
        (0, edge_fix.average_first_row),
        (m - 1, edge_fix.average_last_row),
    ] {
        if !average {
            continue;
        }
        if let Some(mean) = finite_mean(z.row(r)) {
            for c in 0..n {
                z.set(r, c, mean);
            }
        }
    }

    PaddedGrid {
        z,
        xs: (1..=n).map(|k| k as f64).collect(),
        ys: (1..=m).map(|k| k as f64).collect(),
        limits: BoundingBox::new(1.0, 1.0, n as f64, m as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<f64>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_cells_replicate_edges() {
        let g = grid(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let padded = pad_grid(&g, RasterInterpretation::Cells, EdgeFix::none()).unwrap();

        assert_eq!(padded.rows(), 4);
        assert_eq!(padded.cols(), 4);
        assert_eq!(padded.z.row(0), &[1.0, 1.0, 2.0, 2.0]);
        assert_eq!(padded.z.row(1), &[1.0, 1.0, 2.0, 2.0]);
        assert_eq!(padded.z.row(3), &[3.0, 3.0, 4.0, 4.0]);
        assert_eq!(padded.xs, vec![0.5, 1.0, 2.0, 2.5]);
        assert_eq!(padded.limits, BoundingBox::new(0.5, 0.5, 2.5, 2.5));
    }

    #[test]
    fn test_cells_average_edges() {
        let g = grid(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, f64::NAN, 9.0],
        ]);
        let padded = pad_grid(&g, RasterInterpretation::Cells, EdgeFix::global()).unwrap();

        // First row mean 2, last row mean over finite values 8
        assert_eq!(padded.z.row(0), &[2.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(padded.z.get(4, 1), 8.0);
        // Columns wrap: mean of first and last column per row
        assert_eq!(padded.z.row(2), &[5.0, 4.0, 5.0, 6.0, 5.0]);
        assert!(padded.z.get(3, 2).is_nan());
    }

    #[test]
    fn test_postings_overwrite_in_place() {
        let g = grid(vec![vec![1.0, 2.0, 5.0], vec![3.0, 4.0, 7.0]]);
        let fix = EdgeFix {
            average_first_and_last_columns: true,
            ..EdgeFix::none()
        };
        let padded = pad_grid(&g, RasterInterpretation::Postings, fix).unwrap();

        assert_eq!(padded.z.row(0), &[3.0, 2.0, 3.0]);
        assert_eq!(padded.z.row(1), &[5.0, 4.0, 5.0]);
        assert_eq!(padded.ys, vec![1.0, 2.0]);
        assert_eq!(padded.limits, BoundingBox::new(1.0, 1.0, 3.0, 2.0));
    }

    #[test]
    fn test_postings_pole_rows() {
        let g = grid(vec![vec![1.0, 3.0], vec![5.0, 9.0]]);
        let fix = EdgeFix {
            average_first_row: true,
            ..EdgeFix::none()
        };
        let padded = pad_grid(&g, RasterInterpretation::Postings, fix).unwrap();
        assert_eq!(padded.z.row(0), &[2.0, 2.0]);
        assert_eq!(padded.z.row(1), &[5.0, 9.0]);
    }

    #[test]
    fn test_degenerate_input() {
        let empty = Grid::filled(0, 0, 0.0);
        assert!(pad_grid(&empty, RasterInterpretation::Cells, EdgeFix::none()).is_none());

        let all_nan = Grid::filled(3, 3, f64::NAN);
        assert!(pad_grid(&all_nan, RasterInterpretation::Cells, EdgeFix::none()).is_none());

        let thin = Grid::filled(1, 5, 1.0);
        assert!(pad_grid(&thin, RasterInterpretation::Postings, EdgeFix::none()).is_none());
        assert!(pad_grid(&thin, RasterInterpretation::Cells, EdgeFix::none()).is_some());
    }
}
