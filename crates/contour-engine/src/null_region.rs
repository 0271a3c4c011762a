//! Regions of missing data.
//!
//! The null region is traced like any other surface: an indicator grid that
//! is 0 on finite samples and 2 on missing ones is contoured at 1, and the
//! band above that level becomes the region. Lines lose their vertices inside
//! the region and bands have it subtracted.

use geo::orient::Direction;
use geo::{BooleanOps, Contains, MultiPolygon, Orient};
use map_common::{EdgeFix, Grid, Point, RasterInterpretation};
use tracing::debug;

use crate::band::band_polygons;
use crate::pad::pad_grid;
use crate::ring::{assemble_polygons, rings_from_polygons};
use crate::topology::fix_topology;
use crate::trace::trace_levels;
use crate::types::{ContourBand, ContourLine, Polyline};

const NULL_MARK: f64 = 2.0;
const NULL_LEVEL: f64 = 1.0;

/// Polygons covering the missing samples of `grid`, `None` if there are none.
pub fn null_region(
    grid: &Grid,
    interpretation: RasterInterpretation,
) -> Option<MultiPolygon<f64>> {
    if !grid.has_nulls() {
        return None;
    }

    let indicator = grid.map(|v| if v.is_finite() { 0.0 } else { NULL_MARK });
    let padded = pad_grid(&indicator, interpretation, EdgeFix::none())?;
    let traced = trace_levels(&padded, &[NULL_LEVEL], (0.0, NULL_MARK));
    let raw = traced.contours.first()?;

    let (row, col) = indicator.max_location()?;
    let anchor = Point::new(col as f64 + 1.0, row as f64 + 1.0);
    let line = fix_topology(raw, &traced.surface, anchor);

    let sample = traced.surface.value(0, 0);
    let region = band_polygons(&[line], &traced.levels, 1, &padded.limits, sample);

    debug!(polygons = region.0.len(), "Traced null region");
    (!region.0.is_empty()).then_some(region)
}

/// Remove line vertices strictly inside `region`, splitting parts where
/// vertices were removed.
pub fn clip_line(line: &ContourLine, region: &MultiPolygon<f64>) -> ContourLine {
    let mut parts = Vec::with_capacity(line.parts.len());
    for part in &line.parts {
        let mut current: Vec<Point> = Vec::new();
        let mut touched = false;
        for &p in &part.points {
            if region.contains(&geo::Point::new(p.x, p.y)) {
                touched = true;
                if current.len() >= 2 {
                    parts.push(Polyline::new(std::mem::take(&mut current)));
                } else {
                    current.clear();
                }
            } else {
                current.push(p);
            }
        }
        if !touched {
            parts.push(part.clone());
        } else if current.len() >= 2 {
            parts.push(Polyline::new(current));
        }
    }
    ContourLine::new(line.level, parts)
}

/// Subtract `region` from a band, keeping outer rings clockwise.
pub fn subtract_region(band: &ContourBand, region: &MultiPolygon<f64>) -> ContourBand {
    if band.is_empty() {
        return band.clone();
    }
    let polygons = assemble_polygons(band.rings.clone())
        .difference(region)
        .orient(Direction::Reversed);
    ContourBand::new(band.min_level, band.max_level, rings_from_polygons(&polygons))
}
