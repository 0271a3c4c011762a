//! Contour output types.
//!
//! All coordinates are intrinsic grid coordinates (x = column, y = row,
//! 1-based). Orientation is taken in the mathematical sense with y up:
//! a clockwise ring has its interior on the right.

use map_common::{BoundingBox, Point};
use serde::Serialize;

use crate::ring;

/// One part of a contour line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    /// Closed parts repeat their first point at the end.
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        let closed = ring::is_closed(&points);
        Self { points, closed }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Total length along the vertices.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// All parts traced at one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourLine {
    pub level: f64,
    pub parts: Vec<Polyline>,
    pub bbox: Option<BoundingBox>,
}

impl ContourLine {
    pub fn new(level: f64, parts: Vec<Polyline>) -> Self {
        let bbox = BoundingBox::from_points(parts.iter().flat_map(|p| p.points.iter()));
        Self { level, parts, bbox }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }
}

/// Filled region between two consecutive levels.
///
/// Rings are closed. Outer rings are clockwise and each is followed by its
/// counter-clockwise holes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourBand {
    pub min_level: f64,
    pub max_level: f64,
    pub rings: Vec<Vec<Point>>,
    pub bbox: Option<BoundingBox>,
}

impl ContourBand {
    pub fn new(min_level: f64, max_level: f64, rings: Vec<Vec<Point>>) -> Self {
        let bbox = BoundingBox::from_points(rings.iter().flatten());
        Self {
            min_level,
            max_level,
            rings,
            bbox,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Area covered by the band (outer rings minus holes).
    pub fn area(&self) -> f64 {
        self.rings.iter().map(|r| ring::signed_area(r)).sum()
    }
}

/// Lines and bands computed from one grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContourResult {
    /// One entry per level that produced geometry, ascending by level.
    pub lines: Vec<ContourLine>,
    /// One more band than there are levels, ascending.
    pub bands: Vec<ContourBand>,
    /// Outer rectangle of the traced grid, `None` for degenerate input.
    pub limits: Option<BoundingBox>,
}

impl ContourResult {
    /// Result for a grid with nothing to contour.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.bands.is_empty()
    }

    pub fn line_at(&self, level: f64) -> Option<&ContourLine> {
        self.lines.iter().find(|l| l.level == level)
    }
}
