//! Contour lines and filled bands with planar topology.
//!
//! [`contour_grid`] runs the full pipeline on a [`Grid`]:
//!
//! 1. [`pad_grid`] extends cells by half a cell and applies edge fixes
//! 2. [`trace_levels`] runs marching squares for every level
//! 3. [`fix_topology`] orients every part so higher values lie on its right
//!    and joins parts that meet
//! 4. [`build_bands`] closes the regions between consecutive levels
//! 5. missing data is traced as a [`null_region`] and removed from the output
//!
//! All output coordinates are intrinsic grid coordinates (x = column,
//! y = row, both 1-based), oriented with y up.

pub mod band;
pub mod config;
pub mod null_region;
pub mod pad;
pub mod ring;
pub mod topology;
pub mod trace;
pub mod types;

pub use band::{band_polygons, build_bands};
pub use config::{generate_contour_levels, ContourConfig, LevelSpec, MAX_LEVELS};
pub use null_region::{clip_line, null_region, subtract_region};
pub use pad::{pad_grid, PaddedGrid};
pub use topology::fix_topology;
pub use trace::{normalize_levels, trace_levels, RawContour, TraceOutput, PERTURBATION_DIVISOR};
pub use types::{ContourBand, ContourLine, ContourResult, Polyline};

use map_common::{Grid, MapResult, Point};
use tracing::{debug, instrument};

/// Contour `grid` with the given configuration.
///
/// Degenerate grids (empty, all missing, postings smaller than 2x2) give an
/// empty result rather than an error. Levels outside the finite data range
/// are dropped, except on a flat grid.
#[instrument(skip_all, fields(rows = grid.rows(), cols = grid.cols()))]
pub fn contour_grid(grid: &Grid, config: &ContourConfig) -> MapResult<ContourResult> {
    config.validate()?;

    let Some((dmin, dmax)) = grid.finite_range() else {
        debug!("No finite data, returning empty contour result");
        return Ok(ContourResult::empty());
    };
    let Some(padded) = pad_grid(grid, config.interpretation, config.edge_fix) else {
        return Ok(ContourResult::empty());
    };

    let mut requested = config.levels.resolve(dmin, dmax)?;
    // Levels outside the data would only split off empty bands. A flat grid
    // keeps its levels so it still reports which side of them it lies on.
    if dmin < dmax {
        requested.retain(|level| (dmin..=dmax).contains(level));
    }
    let traced = trace_levels(&padded, &requested, (dmin, dmax));

    let anchor = grid
        .max_location()
        .map(|(row, col)| Point::new(col as f64 + 1.0, row as f64 + 1.0))
        .unwrap_or_else(|| Point::new(1.0, 1.0));

    let mut lines: Vec<ContourLine> = traced
        .contours
        .iter()
        .map(|raw| fix_topology(raw, &traced.surface, anchor))
        .collect();

    let sample = traced.surface.value(0, 0);
    let mut bands = build_bands(
        &lines,
        &padded.limits,
        &traced.levels,
        (dmin, dmax),
        sample,
    );

    if let Some(region) = null_region(grid, config.interpretation) {
        lines = lines.iter().map(|line| clip_line(line, &region)).collect();
        bands = bands
            .iter()
            .map(|band| subtract_region(band, &region))
            .collect();
    }
    lines.retain(|line| !line.is_empty());

    debug!(
        levels = traced.levels.len(),
        lines = lines.len(),
        bands = bands.len(),
        "Contoured grid"
    );

    Ok(ContourResult {
        lines,
        bands,
        limits: Some(padded.limits),
    })
}
