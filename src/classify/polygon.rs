//! Contour → validated simple polygon.
//!
//! Cleans a raw ring (closing duplicate, repeated points, zero-width
//! spikes), splits it at self-intersections into simple loops, and keeps
//! the loops with enough area to matter as the rings of one polygon.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Contains, Coord, InteriorPoint, Line, LineString};
use kurbo::Point;
use serde::Serialize;
use thiserror::Error;

use crate::geom::{open_ring, signed_area};

/// A closed ring needs four coordinates: three distinct vertices plus the
/// closing one.
const MIN_VERTICES: usize = 3;

/// Upper bound on crossing splits for one contour. Each split strictly
/// shortens both halves, so this only caps the cost of pathological rings.
const MAX_REPAIR_SPLITS: usize = 4096;

/// Why a contour was left out of classification.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum DropReason {
    #[error("too few distinct points ({count})")]
    TooFewPoints { count: usize },

    #[error("area {area:.4} below threshold")]
    AreaBelowThreshold { area: f64 },

    #[error("self-intersections could not be repaired")]
    Unrepairable,
}

/// The region covered by one input contour.
///
/// Usually a single simple ring. A self-intersecting contour is split into
/// several simple rings, but it still counts as one polygon: one area, one
/// representative point, one place in the containment forest.
#[derive(Debug, Clone, Serialize)]
pub struct Polygon {
    source: usize,
    /// Largest ring first.
    rings: Vec<Vec<Point>>,
    area: f64,
    #[serde(skip)]
    interior: Point,
    #[serde(skip)]
    geometry: geo::MultiPolygon<f64>,
}

impl Polygon {
    /// Validate contour `source` and turn it into a polygon.
    ///
    /// A self-intersecting ring is split at its crossings; the loops with
    /// at least `min_area` become the rings of the polygon.
    pub fn from_contour(source: usize, points: &[Point], min_area: f64) -> Result<Polygon, DropReason> {
        let ring = remove_spikes(open_ring(points));
        if ring.len() < MIN_VERTICES {
            return Err(DropReason::TooFewPoints { count: ring.len() });
        }

        let mut loops: Vec<(f64, Vec<Point>)> = split_self_intersections(ring)?
            .into_iter()
            .map(|ring| (to_geo(&ring).unsigned_area(), ring))
            .collect();
        let largest = loops.iter().map(|(a, _)| *a).fold(0.0, f64::max);
        loops.retain(|(area, _)| *area >= min_area);
        loops.sort_by(|a, b| b.0.total_cmp(&a.0));

        let rings: Vec<Vec<Point>> = loops.into_iter().map(|(_, ring)| ring).collect();
        let geometry = to_geo_multi(&rings);
        let Some(interior) = geometry.0.first().and_then(|p| p.interior_point()) else {
            return Err(DropReason::AreaBelowThreshold { area: largest });
        };
        Ok(Polygon {
            source,
            area: geometry.0.iter().map(|p| p.unsigned_area()).sum(),
            rings,
            interior: Point::new(interior.x(), interior.y()),
            geometry,
        })
    }

    /// Index of the contour this polygon came from.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Every ring, largest first, without closing duplicates.
    pub fn rings(&self) -> &[Vec<Point>] {
        &self.rings
    }

    /// Vertices of the largest ring.
    pub fn points(&self) -> &[Point] {
        &self.rings[0]
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Sum over rings. Once oriented, every ring has the same sign.
    pub fn signed_area(&self) -> f64 {
        self.rings.iter().map(|r| signed_area(r)).sum()
    }

    /// A point guaranteed to lie in the interior (of the largest ring).
    pub fn representative_point(&self) -> Point {
        self.interior
    }

    /// Strict interior containment (boundary points are outside).
    pub fn contains(&self, p: Point) -> bool {
        self.geometry.contains(&geo::Point::new(p.x, p.y))
    }

    /// Reverse rings as needed so each signed area has the requested sign.
    pub(crate) fn oriented(mut self, positive: bool) -> Polygon {
        for ring in &mut self.rings {
            if (signed_area(ring) > 0.0) != positive {
                ring.reverse();
            }
        }
        self.geometry = to_geo_multi(&self.rings);
        self
    }
}

fn to_geo_multi(rings: &[Vec<Point>]) -> geo::MultiPolygon<f64> {
    geo::MultiPolygon::new(rings.iter().map(|r| to_geo(r)).collect())
}

fn to_geo(ring: &[Point]) -> geo::Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|&p| coord(p)).collect();
    geo::Polygon::new(LineString::from(coords), vec![])
}

fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Drop repeated points and zero-width spikes (`a, b, a` back-tracks),
/// including ones that wrap around the ring's start.
fn remove_spikes(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() == Some(&p) {
            continue;
        }
        if out.len() >= 2 && out[out.len() - 2] == p {
            out.pop();
            continue;
        }
        out.push(p);
    }

    loop {
        let n = out.len();
        if n < 3 {
            break;
        }
        if out[0] == out[n - 1] || out[n - 2] == out[0] {
            out.pop();
        } else if out[n - 1] == out[1] {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

/// Zero-width repair: split the ring at each crossing until every loop is
/// simple. Loops that collapse below three vertices vanish.
fn split_self_intersections(ring: Vec<Point>) -> Result<Vec<Vec<Point>>, DropReason> {
    let mut done = Vec::new();
    let mut pending = vec![ring];
    let mut splits = 0usize;

    while let Some(ring) = pending.pop() {
        if ring.len() < MIN_VERTICES {
            continue;
        }
        match first_crossing(&ring) {
            None => done.push(ring),
            Some((i, j, x)) => {
                splits += 1;
                if splits > MAX_REPAIR_SPLITS {
                    return Err(DropReason::Unrepairable);
                }
                let (inner, outer) = split_at(&ring, i, j, x);
                pending.push(outer);
                pending.push(inner);
            }
        }
    }

    if splits > 0 {
        log::debug!("repair: {} splits → {} simple loops", splits, done.len());
    }
    Ok(done)
}

/// First pair of non-adjacent edges `(i, j)` that touch, with a shared point.
fn first_crossing(ring: &[Point]) -> Option<(usize, usize, Point)> {
    let n = ring.len();
    let edge = |k: usize| Line::new(coord(ring[k]), coord(ring[(k + 1) % n]));
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let Some(hit) = line_intersection(edge(i), edge(j)) else {
                continue;
            };
            let hit = match hit {
                LineIntersection::SinglePoint { intersection, .. } => intersection,
                LineIntersection::Collinear { intersection } => intersection.start,
            };
            return Some((i, j, Point::new(hit.x, hit.y)));
        }
    }
    None
}

/// Split at crossing point `x` of edges `i` and `j` (`i < j`).
///
/// `inner` walks `x → ring[i+1..=j]`, `outer` walks the rest. Both are
/// strictly shorter than `ring`.
fn split_at(ring: &[Point], i: usize, j: usize, x: Point) -> (Vec<Point>, Vec<Point>) {
    let mut inner = Vec::with_capacity(j - i + 1);
    inner.push(x);
    inner.extend_from_slice(&ring[i + 1..=j]);

    let mut outer = Vec::with_capacity(ring.len() - (j - i) + 1);
    outer.extend_from_slice(&ring[..=i]);
    outer.push(x);
    outer.extend_from_slice(&ring[j + 1..]);

    (remove_spikes(&inner), remove_spikes(&outer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    #[test]
    fn square_is_valid() {
        let square = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let poly = Polygon::from_contour(7, &square, 0.01).unwrap();
        assert_eq!(poly.rings().len(), 1);
        assert_eq!(poly.source(), 7);
        assert_relative_eq!(poly.area(), 16.0);
        assert!(poly.contains(poly.representative_point()));
        assert!(!poly.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn closing_duplicate_is_ignored() {
        let closed = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 0.0)]);
        let poly = Polygon::from_contour(0, &closed, 0.01).unwrap();
        assert_eq!(poly.points().len(), 3);
    }

    #[test]
    fn too_few_points_dropped() {
        let line = pts(&[(0.0, 0.0), (3.0, 3.0)]);
        assert_eq!(
            Polygon::from_contour(0, &line, 0.01).unwrap_err(),
            DropReason::TooFewPoints { count: 2 }
        );
        // Back-and-forth trace of a one-pixel-wide line has no width.
        let spike = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (1.0, 0.0)]);
        assert!(matches!(
            Polygon::from_contour(0, &spike, 0.01),
            Err(DropReason::TooFewPoints { .. })
        ));
    }

    #[test]
    fn zero_area_dropped() {
        let flat = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(matches!(
            Polygon::from_contour(0, &flat, 0.01),
            Err(DropReason::AreaBelowThreshold { .. })
        ));
    }

    #[test]
    fn bowtie_becomes_one_polygon_with_two_lobes() {
        let bowtie = pts(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let poly = Polygon::from_contour(3, &bowtie, 0.01).unwrap();
        assert_eq!(poly.source(), 3);
        assert_eq!(poly.rings().len(), 2);
        assert_relative_eq!(poly.area(), 2.0, epsilon = 1e-9);
        for ring in poly.rings() {
            assert_relative_eq!(signed_area(ring).abs(), 1.0, epsilon = 1e-9);
            assert!(first_crossing(ring).is_none());
        }
        // Both lobes are inside, the wedges between them are not.
        assert!(poly.contains(Point::new(0.5, 1.0)));
        assert!(poly.contains(Point::new(1.5, 1.0)));
        assert!(!poly.contains(Point::new(1.0, 0.5)));
    }

    #[test]
    fn pinched_ring_splits_at_the_shared_vertex() {
        // Two squares meeting at (2, 2), traced as one contour.
        let pinched = pts(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (4.0, 2.0),
            (4.0, 4.0),
            (2.0, 4.0),
            (2.0, 2.0),
            (0.0, 2.0),
        ]);
        let poly = Polygon::from_contour(0, &pinched, 0.01).unwrap();
        assert_eq!(poly.rings().len(), 2);
        assert_relative_eq!(poly.area(), 8.0, epsilon = 1e-9);
        assert!(poly.rings().iter().all(|r| r.len() == 4));
    }

    #[test]
    fn orientation_applies_to_every_ring() {
        let bowtie = pts(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let poly = Polygon::from_contour(0, &bowtie, 0.01).unwrap();
        for positive in [true, false] {
            let oriented = poly.clone().oriented(positive);
            for ring in oriented.rings() {
                assert_eq!(signed_area(ring) > 0.0, positive);
            }
        }
    }

    #[test]
    fn spikes_wrapping_the_start_are_removed() {
        let ring = pts(&[(5.0, 0.0), (0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]);
        let cleaned = remove_spikes(&ring);
        assert_eq!(cleaned, pts(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]));
    }

    #[test]
    fn orientation_flips_winding_only() {
        let ccw = pts(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
        let poly = Polygon::from_contour(0, &ccw, 0.01).unwrap();
        let cw = poly.clone().oriented(false);
        assert!(cw.signed_area() < 0.0);
        assert_relative_eq!(cw.area(), poly.area());
        assert!(cw.contains(Point::new(1.5, 1.5)));
        assert!(poly.oriented(true).signed_area() > 0.0);
    }
}
