//! Orientation and joining of traced contour parts.
//!
//! Every part is oriented so that higher values lie on its right. The exact
//! test uses the grid edge a vertex was interpolated on: one node of that
//! edge is above the level, and it must be on the right of the traversal
//! direction. Parts without a usable vertex fall back to the position of the
//! grid maximum.

use map_common::Point;
use tracing::trace;

use crate::pad::PaddedGrid;
use crate::ring::{cross, is_closed, ring_contains, signed_area};
use crate::trace::RawContour;
use crate::types::{ContourLine, Polyline};

/// Orient, join and close the parts of one level.
///
/// `anchor` is the location of the grid maximum in intrinsic coordinates.
pub fn fix_topology(raw: &RawContour, surface: &PaddedGrid, anchor: Point) -> ContourLine {
    let mut reversed = 0usize;
    let oriented: Vec<Vec<Point>> = raw
        .parts
        .iter()
        .map(|part| {
            let mut part = part.clone();
            if needs_reversal(&part, surface, raw.level, anchor) {
                part.reverse();
                reversed += 1;
            }
            part
        })
        .collect();

    let parts: Vec<Polyline> = join_parts(oriented).into_iter().map(Polyline::new).collect();

    trace!(
        level = raw.level,
        parts = parts.len(),
        reversed,
        "Fixed contour topology"
    );

    ContourLine::new(raw.level, parts)
}

fn needs_reversal(part: &[Point], surface: &PaddedGrid, level: f64, anchor: Point) -> bool {
    match uphill_on_right(part, surface, level) {
        Some(ok) => !ok,
        None => {
            if !is_closed(part) || part.len() < 4 {
                return false;
            }
            let area = signed_area(part);
            if ring_contains(part, anchor) {
                area < 0.0
            } else {
                area > 0.0
            }
        }
    }
}

/// `Some(true)` if the higher edge node lies right of the traversal at the
/// first usable vertex, `Some(false)` if it lies left, `None` if no vertex
/// sits on exactly one grid line.
fn uphill_on_right(part: &[Point], surface: &PaddedGrid, level: f64) -> Option<bool> {
    for (k, &v) in part.iter().enumerate() {
        let Some(high) = high_node(surface, level, v) else {
            continue;
        };
        let next = part.get(k + 1).filter(|&&p| p != v);
        let d = match (next, k.checked_sub(1).map(|p| part[p])) {
            (Some(n), _) => (n.x - v.x, n.y - v.y),
            (None, Some(prev)) if prev != v => (v.x - prev.x, v.y - prev.y),
            _ => continue,
        };
        let c = cross(d, (high.x - v.x, high.y - v.y));
        if c < 0.0 {
            return Some(true);
        }
        if c > 0.0 {
            return Some(false);
        }
    }
    None
}

/// The node above `level` of the grid edge that `v` lies on.
fn high_node(surface: &PaddedGrid, level: f64, v: Point) -> Option<Point> {
    let col = exact_index(&surface.xs, v.x);
    let row = exact_index(&surface.ys, v.y);

    let (a, b) = match (row, col) {
        // On a vertical grid line, between two rows
        (None, Some(j)) => {
            let i = bracket(&surface.ys, v.y)?;
            ((i, j), (i + 1, j))
        }
        // On a horizontal grid line, between two columns
        (Some(i), None) => {
            let j = bracket(&surface.xs, v.x)?;
            ((i, j), (i, j + 1))
        }
        _ => return None,
    };

    let above = |(i, j): (usize, usize)| surface.value(i, j) > level;
    let node = match (above(a), above(b)) {
        (true, false) => a,
        (false, true) => b,
        _ => return None,
    };
    Some(Point::new(surface.xs[node.1], surface.ys[node.0]))
}

fn exact_index(nodes: &[f64], value: f64) -> Option<usize> {
    nodes.binary_search_by(|p| p.total_cmp(&value)).ok()
}

/// Index `k` with `nodes[k] < value < nodes[k + 1]`.
fn bracket(nodes: &[f64], value: f64) -> Option<usize> {
    let k = nodes.partition_point(|&p| p < value);
    (k > 0 && k < nodes.len()).then(|| k - 1)
}

/// Join open parts where one ends at another's start.
fn join_parts(mut parts: Vec<Vec<Point>>) -> Vec<Vec<Point>> {
    loop {
        let pair = (0..parts.len())
            .filter(|&a| !is_closed(&parts[a]))
            .find_map(|a| {
                let end = parts[a].last().copied()?;
                (0..parts.len())
                    .find(|&b| b != a && !is_closed(&parts[b]) && parts[b].first() == Some(&end))
                    .map(|b| (a, b))
            });
        let Some((a, b)) = pair else {
            break;
        };
        let tail = parts.remove(b);
        let a = if b < a { a - 1 } else { a };
        parts[a].extend_from_slice(&tail[1..]);
    }
    parts.retain(|p| p.len() >= 2);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::pad_grid;
    use crate::trace::trace_level;
    use map_common::{EdgeFix, Grid, RasterInterpretation};

    fn surface(rows: Vec<Vec<f64>>, interpretation: RasterInterpretation) -> PaddedGrid {
        pad_grid(
            &Grid::from_rows(rows).unwrap(),
            interpretation,
            EdgeFix::none(),
        )
        .unwrap()
    }

    #[test]
    fn test_peak_ring_is_clockwise() {
        let s = surface(
            vec![
                vec![0.0, 0.0, 0.0],
                vec![0.0, 10.0, 0.0],
                vec![0.0, 0.0, 0.0],
            ],
            RasterInterpretation::Cells,
        );
        let mut raw = trace_level(&s, 5.0);
        // Orientation must not depend on how the tracer happened to chain
        raw.parts[0].reverse();
        let line = fix_topology(&raw, &s, Point::new(2.0, 2.0));

        assert_eq!(line.parts.len(), 1);
        assert!(line.parts[0].closed);
        assert!(signed_area(&line.parts[0].points) > 0.0);
    }

    #[test]
    fn test_pit_ring_is_counter_clockwise() {
        let s = surface(
            vec![
                vec![10.0, 10.0, 10.0],
                vec![10.0, 0.0, 10.0],
                vec![10.0, 10.0, 10.0],
            ],
            RasterInterpretation::Postings,
        );
        let raw = trace_level(&s, 5.0);
        let line = fix_topology(&raw, &s, Point::new(1.0, 1.0));
        assert!(signed_area(&line.parts[0].points) < 0.0);
    }

    #[test]
    fn test_open_line_keeps_high_side_right() {
        // z = x: the line at 2.5 must run upwards (+y) to keep +x on the right
        let s = surface(
            vec![vec![1.0, 2.0, 3.0, 4.0]; 3],
            RasterInterpretation::Postings,
        );
        for flip in [false, true] {
            let mut raw = trace_level(&s, 2.5);
            if flip {
                raw.parts[0].reverse();
            }
            let line = fix_topology(&raw, &s, Point::new(4.0, 1.0));
            let part = &line.parts[0];
            assert!(!part.closed);
            assert!(part.last().unwrap().y > part.first().unwrap().y);
        }
    }

    #[test]
    fn test_anchor_fallback() {
        let s = surface(vec![vec![0.0, 1.0], vec![1.0, 2.0]], RasterInterpretation::Postings);
        // A ring away from any grid line cannot use the edge rule
        let ring = vec![
            Point::new(1.2, 1.2),
            Point::new(1.2, 1.8),
            Point::new(1.8, 1.8),
            Point::new(1.8, 1.2),
            Point::new(1.2, 1.2),
        ];
        assert!(signed_area(&ring) > 0.0);
        let raw = RawContour {
            level: 0.5,
            parts: vec![ring.clone()],
        };

        let inside = fix_topology(&raw, &s, Point::new(1.5, 1.5));
        assert!(signed_area(&inside.parts[0].points) > 0.0);

        let outside = fix_topology(&raw, &s, Point::new(2.0, 2.0));
        assert!(signed_area(&outside.parts[0].points) < 0.0);
    }

    #[test]
    fn test_join_parts() {
        let a = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let b = vec![Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let c = vec![Point::new(5.0, 5.0), Point::new(6.0, 6.0)];
        let joined = join_parts(vec![b, c, a]);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[1].len(), 3);
        assert_eq!(joined[1][0], Point::new(0.0, 0.0));
    }
}
