//! Filled bands between consecutive contour levels.
//!
//! A band is bounded by the oriented line below it (kept as is) and the
//! oriented line above it (reversed), so the band interior is always on the
//! right. Open parts end on the grid rectangle and are stitched together by
//! walking the rectangle clockwise.

use geo::MultiPolygon;
use map_common::{BoundingBox, Point};
use tracing::debug;

use crate::ring::{assemble_polygons, is_closed, rings_from_polygons, signed_area};
use crate::types::{ContourBand, ContourLine};

/// Build `levels.len() + 1` bands from the oriented lines of each level.
///
/// `lines[k]` belongs to `levels[k]`. `sample` is the traced surface value at
/// a corner of `limits`; it decides whether a band without any boundary
/// covers the whole rectangle.
pub fn build_bands(
    lines: &[ContourLine],
    limits: &BoundingBox,
    levels: &[f64],
    data_range: (f64, f64),
    sample: f64,
) -> Vec<ContourBand> {
    let (dmin, dmax) = data_range;
    let count = levels.len();

    let bands: Vec<ContourBand> = (0..=count)
        .map(|k| {
            let (min_level, max_level) = match (k.checked_sub(1), levels.get(k)) {
                (None, None) => (dmin, dmax),
                (None, Some(&hi)) => (dmin.min(hi), hi),
                (Some(p), None) => (levels[p], dmax.max(levels[p])),
                (Some(p), Some(&hi)) => (levels[p], hi),
            };
            let polygons = band_polygons(lines, levels, k, limits, sample);
            ContourBand::new(min_level, max_level, rings_from_polygons(&polygons))
        })
        .collect();

    debug!(
        bands = bands.len(),
        empty = bands.iter().filter(|b| b.is_empty()).count(),
        "Built contour bands"
    );
    bands
}

/// Polygons of band `k`: the region above `levels[k - 1]` and at or below
/// `levels[k]`.
pub fn band_polygons(
    lines: &[ContourLine],
    levels: &[f64],
    k: usize,
    limits: &BoundingBox,
    sample: f64,
) -> MultiPolygon<f64> {
    let mut closed: Vec<Vec<Point>> = Vec::new();
    let mut open: Vec<Vec<Point>> = Vec::new();
    let mut sort = |points: Vec<Point>| {
        if is_closed(&points) {
            closed.push(points);
        } else if points.len() >= 2 {
            open.push(points);
        }
    };

    if let Some(below) = k.checked_sub(1).and_then(|p| lines.get(p)) {
        for part in &below.parts {
            sort(part.points.clone());
        }
    }
    if let Some(above) = lines.get(k) {
        for part in &above.parts {
            let mut points = part.points.clone();
            points.reverse();
            sort(points);
        }
    }

    if closed.is_empty() && open.is_empty() {
        let lo = k.checked_sub(1).map_or(f64::NEG_INFINITY, |p| levels[p]);
        let hi = levels.get(k).copied().unwrap_or(f64::INFINITY);
        return if lo < sample && sample <= hi {
            assemble_polygons(vec![rectangle(limits)])
        } else {
            MultiPolygon::new(vec![])
        };
    }

    let mut rings = close_along_boundary(&open, limits);
    rings.extend(closed);

    let total: f64 = rings.iter().map(|r| signed_area(r)).sum();
    if total < 0.0 {
        rings.push(rectangle(limits));
    }

    assemble_polygons(rings)
}

/// The rectangle as a closed clockwise ring.
fn rectangle(limits: &BoundingBox) -> Vec<Point> {
    let corners = limits.clockwise_corners();
    let mut ring = corners.to_vec();
    ring.push(corners[0]);
    ring
}

/// Position of `p` along the rectangle perimeter, measured clockwise from
/// the top-left corner. Points are snapped to the nearest side.
fn perimeter_position(p: Point, r: &BoundingBox) -> f64 {
    let (w, h) = (r.width(), r.height());
    let sides = [
        (r.max_y - p.y).abs(),
        (r.max_x - p.x).abs(),
        (p.y - r.min_y).abs(),
        (p.x - r.min_x).abs(),
    ];
    let side = (0..4)
        .min_by(|&a, &b| sides[a].total_cmp(&sides[b]))
        .unwrap_or(0);

    match side {
        0 => (p.x - r.min_x).clamp(0.0, w),
        1 => w + (r.max_y - p.y).clamp(0.0, h),
        2 => w + h + (r.max_x - p.x).clamp(0.0, w),
        _ => 2.0 * w + h + (p.y - r.min_y).clamp(0.0, h),
    }
}

/// Chain open parts into closed rings by following the rectangle clockwise
/// from each end to the nearest start.
fn close_along_boundary(open: &[Vec<Point>], limits: &BoundingBox) -> Vec<Vec<Point>> {
    if open.is_empty() {
        return Vec::new();
    }

    let (w, h) = (limits.width(), limits.height());
    let perimeter = 2.0 * (w + h);
    let corners = limits.clockwise_corners();
    let corner_positions = [0.0, w, w + h, 2.0 * w + h];

    let position = |p: Option<&Point>| p.map_or(0.0, |&p| perimeter_position(p, limits));
    let starts: Vec<f64> = open.iter().map(|part| position(part.first())).collect();
    let ends: Vec<f64> = open.iter().map(|part| position(part.last())).collect();

    let mut used = vec![false; open.len()];
    let mut rings = Vec::new();

    for first in 0..open.len() {
        if used[first] {
            continue;
        }
        let mut ring: Vec<Point> = Vec::new();
        let mut current = first;
        loop {
            used[current] = true;
            ring.extend_from_slice(&open[current]);

            let from = ends[current];
            let distance = |j: usize| (starts[j] - from).rem_euclid(perimeter);
            let next = (0..open.len())
                .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))
                .unwrap_or(first);
            let travel = distance(next);

            let mut passed: Vec<(f64, Point)> = corner_positions
                .iter()
                .zip(corners)
                .map(|(&c, corner)| ((c - from).rem_euclid(perimeter), corner))
                .filter(|&(d, _)| d > 0.0 && d < travel)
                .collect();
            passed.sort_by(|a, b| a.0.total_cmp(&b.0));
            ring.extend(passed.into_iter().map(|(_, corner)| corner));

            if next == first || used[next] {
                break;
            }
            current = next;
        }
        if let Some(&start) = ring.first() {
            ring.push(start);
        }
        rings.push(ring);
    }

    rings
}
