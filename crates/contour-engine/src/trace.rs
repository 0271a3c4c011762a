//! Marching squares contour tracing.
//!
//! Tracing works on a prepared copy of the padded grid: null nodes are filled
//! from their neighbours and nodes lying exactly on a level are nudged off it.
//! Each level is traced independently (in parallel) into polylines whose
//! vertices are already in original intrinsic coordinates.

use std::collections::HashMap;

use map_common::{BoundingBox, Point};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::pad::{finite_mean, PaddedGrid};

/// Exact-level nodes move by the level gap divided by this.
pub const PERTURBATION_DIVISOR: f64 = 20.0;

/// Raw polylines for one level, not yet oriented.
#[derive(Debug, Clone, PartialEq)]
pub struct RawContour {
    pub level: f64,
    pub parts: Vec<Vec<Point>>,
}

/// Output of [`trace_levels`].
#[derive(Debug, Clone)]
pub struct TraceOutput {
    /// The surface that was traced: nulls filled, exact-level nodes perturbed.
    pub surface: PaddedGrid,
    /// Normalized levels in ascending order.
    pub levels: Vec<f64>,
    /// One entry per level, in level order.
    pub contours: Vec<RawContour>,
}

/// Sort ascending, drop non-finite values and duplicates.
pub fn normalize_levels(levels: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = levels.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Trace every level of `padded`. `data_range` is the finite range of the
/// original data.
pub fn trace_levels(padded: &PaddedGrid, levels: &[f64], data_range: (f64, f64)) -> TraceOutput {
    let levels = normalize_levels(levels);

    let mut surface = padded.clone();
    fill_nulls(&mut surface);
    perturb_exact_levels(&mut surface, &levels, data_range);

    let contours: Vec<RawContour> = levels
        .par_iter()
        .map(|&level| trace_level(&surface, level))
        .collect();

    debug!(
        levels = levels.len(),
        parts = contours.iter().map(|c| c.parts.len()).sum::<usize>(),
        "Traced contour levels"
    );

    TraceOutput {
        surface,
        levels,
        contours,
    }
}

/// Replace non-finite nodes by the mean of their finite 4-neighbours,
/// repeating until every node is finite.
pub fn fill_nulls(grid: &mut PaddedGrid) {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut pending: Vec<(usize, usize)> = (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .filter(|&(i, j)| !grid.value(i, j).is_finite())
        .collect();
    let mut passes = 0;

    while !pending.is_empty() {
        let updates: Vec<(usize, usize, f64)> = pending
            .iter()
            .filter_map(|&(i, j)| {
                let mut neighbours = Vec::with_capacity(4);
                if i > 0 {
                    neighbours.push(grid.value(i - 1, j));
                }
                if i + 1 < rows {
                    neighbours.push(grid.value(i + 1, j));
                }
                if j > 0 {
                    neighbours.push(grid.value(i, j - 1));
                }
                if j + 1 < cols {
                    neighbours.push(grid.value(i, j + 1));
                }
                finite_mean(&neighbours).map(|v| (i, j, v))
            })
            .collect();

        // No finite value reachable
        if updates.is_empty() {
            break;
        }
        for &(i, j, v) in &updates {
            grid.z.set(i, j, v);
        }
        pending.retain(|&(i, j)| !grid.value(i, j).is_finite());
        passes += 1;
    }

    if passes > 0 {
        trace!(passes, "Filled null nodes before tracing");
    }
}

/// Move nodes that equal a level by a fraction of the level gap, towards the
/// nearer data extremum (down on ties).
pub fn perturb_exact_levels(grid: &mut PaddedGrid, levels: &[f64], data_range: (f64, f64)) {
    let (dmin, dmax) = data_range;
    let mut moved = 0usize;

    for (k, &level) in levels.iter().enumerate() {
        let gap = if levels.len() == 1 {
            dmax - dmin
        } else {
            let below = k.checked_sub(1).map(|p| level - levels[p]);
            let above = levels.get(k + 1).map(|n| n - level);
            match (below, above) {
                (Some(b), Some(a)) => b.min(a),
                (Some(b), None) => b,
                (None, Some(a)) => a,
                (None, None) => dmax - dmin,
            }
        };
        let delta = gap / PERTURBATION_DIVISOR;
        if delta == 0.0 {
            continue;
        }
        let shift = if level - dmin <= dmax - level {
            -delta
        } else {
            delta
        };

        for i in 0..grid.rows() {
            for j in 0..grid.cols() {
                if grid.value(i, j) == level {
                    grid.z.set(i, j, level + shift);
                    moved += 1;
                }
            }
        }
    }

    if moved > 0 {
        debug!(nodes = moved, "Perturbed nodes lying exactly on a level");
    }
}

/// Grid edge identity: horizontal edges join (i, j)-(i, j+1), vertical edges
/// join (i, j)-(i+1, j).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    H(usize, usize),
    V(usize, usize),
}

/// Location of the level crossing on an edge, interpolated from the
/// lower-index node.
fn edge_point(grid: &PaddedGrid, level: f64, edge: Edge) -> Point {
    match edge {
        Edge::H(i, j) => {
            let (z0, z1) = (grid.value(i, j), grid.value(i, j + 1));
            let t = (level - z0) / (z1 - z0);
            Point::new(grid.xs[j] + t * (grid.xs[j + 1] - grid.xs[j]), grid.ys[i])
        }
        Edge::V(i, j) => {
            let (z0, z1) = (grid.value(i, j), grid.value(i + 1, j));
            let t = (level - z0) / (z1 - z0);
            Point::new(grid.xs[j], grid.ys[i] + t * (grid.ys[i + 1] - grid.ys[i]))
        }
    }
}

/// Marching squares over every cell. Returns segments as pairs of edges.
fn march_squares(grid: &PaddedGrid, level: f64) -> Vec<(Edge, Edge)> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut segments = Vec::new();
    if rows < 2 || cols < 2 {
        return segments;
    }

    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let tl = grid.value(i, j);
            let tr = grid.value(i, j + 1);
            let br = grid.value(i + 1, j + 1);
            let bl = grid.value(i + 1, j);

            let mut case = 0u8;
            if tl > level {
                case |= 1;
            }
            if tr > level {
                case |= 2;
            }
            if br > level {
                case |= 4;
            }
            if bl > level {
                case |= 8;
            }

            let top = Edge::H(i, j);
            let right = Edge::V(i, j + 1);
            let bottom = Edge::H(i + 1, j);
            let left = Edge::V(i, j);

            match case {
                0 | 15 => {}
                1 | 14 => segments.push((left, top)),
                2 | 13 => segments.push((top, right)),
                3 | 12 => segments.push((left, right)),
                4 | 11 => segments.push((right, bottom)),
                6 | 9 => segments.push((top, bottom)),
                7 | 8 => segments.push((left, bottom)),
                5 | 10 => {
                    // Saddle: the cell centre decides which corners connect
                    let centre_above = (tl + tr + br + bl) / 4.0 > level;
                    if (case == 5) == centre_above {
                        segments.push((top, right));
                        segments.push((left, bottom));
                    } else {
                        segments.push((left, top));
                        segments.push((right, bottom));
                    }
                }
                _ => {}
            }
        }
    }

    segments
}

/// Chain segments sharing an edge into polylines: open chains first, then
/// closed cycles (which repeat their first vertex).
fn chain_segments(segments: &[(Edge, Edge)]) -> Vec<Vec<Edge>> {
    let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (s, &(a, b)) in segments.iter().enumerate() {
        by_edge.entry(a).or_default().push(s);
        by_edge.entry(b).or_default().push(s);
    }

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    let walk = |start: Edge, first: usize, used: &mut Vec<bool>| -> Vec<Edge> {
        let mut chain = vec![start];
        let mut edge = start;
        let mut seg = first;
        loop {
            used[seg] = true;
            let (a, b) = segments[seg];
            edge = if a == edge { b } else { a };
            chain.push(edge);
            let next = by_edge
                .get(&edge)
                .and_then(|list| list.iter().copied().find(|&s| !used[s]));
            match next {
                Some(s) => seg = s,
                None => break,
            }
        }
        chain
    };

    // Open chains start at edges touched by a single segment
    let mut ends: Vec<Edge> = by_edge
        .iter()
        .filter(|(_, list)| list.len() == 1)
        .map(|(&edge, _)| edge)
        .collect();
    ends.sort_by_key(edge_order);
    for start in ends {
        let Some(&first) = by_edge.get(&start).and_then(|l| l.first()) else {
            continue;
        };
        if used[first] {
            continue;
        }
        chains.push(walk(start, first, &mut used));
    }

    for s in 0..segments.len() {
        if !used[s] {
            chains.push(walk(segments[s].0, s, &mut used));
        }
    }

    chains
}

fn edge_order(edge: &Edge) -> (usize, usize, u8) {
    match *edge {
        Edge::H(i, j) => (i, j, 0),
        Edge::V(i, j) => (i, j, 1),
    }
}

/// Split polylines wherever a segment runs along one side of `limits`.
pub fn remove_boundary_segments(parts: Vec<Vec<Point>>, limits: &BoundingBox) -> Vec<Vec<Point>> {
    let same_side = |a: &Point, b: &Point| {
        (a.x == limits.min_x && b.x == limits.min_x)
            || (a.x == limits.max_x && b.x == limits.max_x)
            || (a.y == limits.min_y && b.y == limits.min_y)
            || (a.y == limits.max_y && b.y == limits.max_y)
    };

    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        let mut current: Vec<Point> = Vec::with_capacity(part.len());
        for p in part {
            if let Some(prev) = current.last() {
                if same_side(prev, &p) {
                    if current.len() >= 2 {
                        out.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
            current.push(p);
        }
        if current.len() >= 2 {
            out.push(current);
        }
    }
    out
}

/// Trace a single level of a prepared surface.
pub fn trace_level(surface: &PaddedGrid, level: f64) -> RawContour {
    let segments = march_squares(surface, level);
    let parts: Vec<Vec<Point>> = chain_segments(&segments)
        .into_iter()
        .map(|chain| {
            chain
                .into_iter()
                .map(|edge| edge_point(surface, level, edge))
                .collect()
        })
        .collect();
    let parts = remove_boundary_segments(parts, &surface.limits);

    trace!(level, segments = segments.len(), parts = parts.len(), "Traced level");

    RawContour { level, parts }
}
