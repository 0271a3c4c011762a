//! Ring geometry helpers and conversions to `geo` types.

use geo::{Contains, Coord, LineString, MultiPolygon, Polygon};
use map_common::Point;

/// True if the ring has at least two points and ends where it starts.
pub fn is_closed(points: &[Point]) -> bool {
    points.len() > 1 && points.first() == points.last()
}

/// Signed area with clockwise rings positive (y up).
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for k in 0..n {
        let a = points[k];
        let b = points[(k + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    -0.5 * twice
}

/// Cross product of `d` with `v`: negative when `v` points to the right of `d`.
pub fn cross(d: (f64, f64), v: (f64, f64)) -> f64 {
    d.0 * v.1 - d.1 * v.0
}

pub fn to_line_string(points: &[Point]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>(),
    )
}

pub fn from_line_string(line: &LineString<f64>) -> Vec<Point> {
    line.coords().map(|c| Point::new(c.x, c.y)).collect()
}

/// True if `p` lies strictly inside the closed ring.
pub fn ring_contains(points: &[Point], p: Point) -> bool {
    Polygon::new(to_line_string(points), vec![]).contains(&geo::Point::new(p.x, p.y))
}

/// Group oriented rings into polygons.
///
/// Rings with non-negative signed area are outer rings; every other ring
/// becomes a hole of the smallest outer ring containing one of its vertices.
pub fn assemble_polygons(rings: Vec<Vec<Point>>) -> MultiPolygon<f64> {
    let (outers, holes): (Vec<_>, Vec<_>) = rings
        .into_iter()
        .filter(|r| r.len() >= 4)
        .partition(|r| signed_area(r) >= 0.0);

    let mut order: Vec<usize> = (0..outers.len()).collect();
    order.sort_by(|&a, &b| signed_area(&outers[a]).total_cmp(&signed_area(&outers[b])));

    let mut interiors: Vec<Vec<LineString<f64>>> = vec![Vec::new(); outers.len()];
    for hole in holes {
        let owner = order
            .iter()
            .copied()
            .find(|&k| hole.iter().any(|&p| ring_contains(&outers[k], p)))
            .or_else(|| order.last().copied());
        if let Some(k) = owner {
            interiors[k].push(to_line_string(&hole));
        }
    }

    MultiPolygon::new(
        outers
            .iter()
            .zip(interiors)
            .map(|(outer, holes)| Polygon::new(to_line_string(outer), holes))
            .collect(),
    )
}

/// Flatten polygons back into rings: each exterior followed by its holes.
pub fn rings_from_polygons(polygons: &MultiPolygon<f64>) -> Vec<Vec<Point>> {
    let mut rings = Vec::new();
    for polygon in polygons.0.iter() {
        rings.push(from_line_string(polygon.exterior()));
        rings.extend(polygon.interiors().iter().map(from_line_string));
    }
    rings.retain(|r| r.len() >= 4);
    rings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        // Clockwise with y up: top-left, top-right, bottom-right, bottom-left
        vec![
            Point::new(x0, y0 + size),
            Point::new(x0 + size, y0 + size),
            Point::new(x0 + size, y0),
            Point::new(x0, y0),
            Point::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_signed_area_clockwise_positive() {
        let ring = square(0.0, 0.0, 2.0);
        assert_eq!(signed_area(&ring), 4.0);
        let mut reversed = ring.clone();
        reversed.reverse();
        assert_eq!(signed_area(&reversed), -4.0);
    }

    #[test]
    fn test_cross_right_is_negative() {
        // Heading up (+y), +x is on the right
        assert!(cross((0.0, 1.0), (1.0, 0.0)) < 0.0);
        assert!(cross((0.0, 1.0), (-1.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_assemble_assigns_holes() {
        let mut hole = square(1.0, 1.0, 1.0);
        hole.reverse();
        let mut far_hole = square(11.0, 11.0, 1.0);
        far_hole.reverse();
        let polygons = assemble_polygons(vec![
            square(0.0, 0.0, 4.0),
            hole,
            square(10.0, 10.0, 5.0),
            far_hole,
        ]);

        assert_eq!(polygons.0.len(), 2);
        assert_eq!(polygons.0[0].interiors().len(), 1);
        assert_eq!(polygons.0[1].interiors().len(), 1);

        let rings = rings_from_polygons(&polygons);
        let total: f64 = rings.iter().map(|r| signed_area(r)).sum();
        assert_eq!(total, 16.0 - 1.0 + 25.0 - 1.0);
    }
}
