//! Shared geometry types and utilities.

use kurbo::{Point, Rect};
use serde::Serialize;

/// An ordered, conceptually closed sequence of points.
///
/// No winding direction is implied. The last point may or may not repeat
/// the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace signed area, treating the contour as closed.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Bounding box, or `None` for an empty contour.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let init = Rect::from_points(*first, *first);
        Some(self.points.iter().fold(init, |r, p| r.union_pt(*p)))
    }

    /// Uniformly scale every point about the origin.
    pub fn scaled(&self, factor: f64) -> Contour {
        Contour {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x * factor, p.y * factor))
                .collect(),
        }
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl From<Vec<(f64, f64)>> for Contour {
    fn from(points: Vec<(f64, f64)>) -> Self {
        Self {
            points: points.into_iter().map(Point::from).collect(),
        }
    }
}

/// Signed area via the shoelace formula, implicitly closing the ring.
///
/// Positive = counter-clockwise in a y-up frame.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

/// Drop a trailing point that repeats the first one.
pub fn open_ring(points: &[Point]) -> &[Point] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first == last => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}
