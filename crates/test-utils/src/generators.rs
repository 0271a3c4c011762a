//! Grid generators for contouring tests.
//!
//! These generators create predictable, verifiable surfaces. Every function
//! returns a [`Grid`] in row-major order with `rows x cols` samples.

use map_common::Grid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a grid from a function of the 1-based intrinsic coordinates
/// `(x = column, y = row)`.
pub fn grid_from_fn(rows: usize, cols: usize, f: impl Fn(f64, f64) -> f64) -> Grid {
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            data.push(f((c + 1) as f64, (r + 1) as f64));
        }
    }
    Grid::new(rows, cols, data).expect("generator produces rows * cols values")
}

/// A grid of zeros with a single peak of `height` in the centre cell.
///
/// `peak_grid(3, 10.0)` is `[0 0 0; 0 10 0; 0 0 0]`.
pub fn peak_grid(size: usize, height: f64) -> Grid {
    let mut grid = Grid::filled(size, size, 0.0);
    if size > 0 {
        grid.set(size / 2, size / 2, height);
    }
    grid
}

/// A plane rising left to right: `z = x` (column index, 1-based).
pub fn ramp_grid(rows: usize, cols: usize) -> Grid {
    grid_from_fn(rows, cols, |x, _| x)
}

/// A smooth radial hill centred on the grid, `amplitude` at the centre and
/// falling off with a Gaussian profile.
pub fn gaussian_hill(rows: usize, cols: usize, amplitude: f64) -> Grid {
    let cx = (cols as f64 + 1.0) / 2.0;
    let cy = (rows as f64 + 1.0) / 2.0;
    let sigma = (rows.min(cols) as f64 / 4.0).max(1.0);
    grid_from_fn(rows, cols, |x, y| {
        let d2 = (x - cx).powi(2) + (y - cy).powi(2);
        amplitude * (-d2 / (2.0 * sigma * sigma)).exp()
    })
}

/// Two separated hills with a valley between them, which produces several
/// closed contours at mid levels.
pub fn twin_hills(rows: usize, cols: usize) -> Grid {
    let c1 = (cols as f64 * 0.3, rows as f64 * 0.5);
    let c2 = (cols as f64 * 0.7, rows as f64 * 0.5);
    let sigma = (cols as f64 / 8.0).max(1.0);
    grid_from_fn(rows, cols, |x, y| {
        let h1 = (-((x - c1.0).powi(2) + (y - c1.1).powi(2)) / (2.0 * sigma * sigma)).exp();
        let h2 = (-((x - c2.0).powi(2) + (y - c2.1).powi(2)) / (2.0 * sigma * sigma)).exp();
        100.0 * h1 + 80.0 * h2
    })
}

/// Gaussian hill plus uniform noise in `[-noise, noise]`, deterministic per seed.
pub fn noisy_field(rows: usize, cols: usize, noise: f64, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let hill = gaussian_hill(rows, cols, 100.0);
    let data = hill
        .data()
        .iter()
        .map(|v| {
            if noise > 0.0 {
                v + rng.gen_range(-noise..=noise)
            } else {
                *v
            }
        })
        .collect();
    Grid::new(rows, cols, data).expect("noise preserves grid shape")
}

/// Constant grid.
pub fn flat_grid(rows: usize, cols: usize, value: f64) -> Grid {
    Grid::filled(rows, cols, value)
}

/// Copy of `grid` with NaN at the given 0-based `(row, col)` positions.
pub fn with_nans(grid: &Grid, positions: &[(usize, usize)]) -> Grid {
    let mut out = grid.clone();
    for &(r, c) in positions {
        if r < out.rows() && c < out.cols() {
            out.set(r, c, f64::NAN);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_grid() {
        let grid = peak_grid(3, 10.0);
        assert_eq!(grid.data(), &[0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_ramp_grid() {
        let grid = ramp_grid(2, 4);
        assert_eq!(grid.row(1), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_noisy_field_is_deterministic() {
        let a = noisy_field(8, 8, 1.0, 42);
        let b = noisy_field(8, 8, 1.0, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_nans() {
        let grid = with_nans(&flat_grid(3, 3, 1.0), &[(1, 1), (5, 5)]);
        assert!(grid.get(1, 1).is_nan());
        assert_eq!(grid.get(0, 0), 1.0);
    }

    #[test]
    fn test_gaussian_hill_peaks_in_centre() {
        let grid = gaussian_hill(5, 5, 50.0);
        assert_eq!(grid.max_location(), Some((2, 2)));
        assert_eq!(grid.get(2, 2), 50.0);
    }
}
