//! Closed-curve fitting through simplified contour points.
//!
//! Each span between consecutive points becomes one cubic whose handles
//! come from the Catmull-Rom tangent at either end, so the curve passes
//! through every input point with C¹ continuity and closes seamlessly.

use kurbo::{BezPath, CubicBez, Line, ParamCurve, PathSeg, Point};
use serde::Serialize;

use crate::geom::open_ring;

/// At or below this many points the contour is emitted as straight lines.
/// Smoothing that few points overshoots visibly (a square turns into a
/// blob).
pub const STRAIGHT_MAX_POINTS: usize = 4;

/// A closed curve as a cyclic sequence of segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClosedCurve {
    #[serde(serialize_with = "serialize_segments")]
    pub segments: Vec<PathSeg>,
}

impl ClosedCurve {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the curve is made of cubics rather than straight lines.
    pub fn is_smooth(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, PathSeg::Cubic(_)))
    }

    /// MoveTo, one element per segment, ClosePath.
    ///
    /// A final straight segment back to the start is left to the
    /// ClosePath. An empty curve gives an empty path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        self.append_to(&mut path);
        path
    }

    /// Append this curve as a new closed subpath of `path`.
    pub fn append_to(&self, path: &mut BezPath) {
        let Some(first) = self.segments.first() else {
            return;
        };
        let start = first.start();
        path.move_to(start);
        let last = self.segments.len() - 1;
        for (i, seg) in self.segments.iter().enumerate() {
            match *seg {
                PathSeg::Line(line) if i == last && line.p1 == start => {}
                PathSeg::Line(line) => path.line_to(line.p1),
                PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
                PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
            }
        }
        path.close_path();
    }
}

/// Fit a closed curve through `points`.
///
/// A trailing point equal to the first is ignored. Fewer than three points
/// give an empty curve; up to [`STRAIGHT_MAX_POINTS`] give straight lines;
/// anything larger gives one cubic per point.
pub fn fit_closed(points: &[Point]) -> ClosedCurve {
    let pts = open_ring(points);
    let n = pts.len();
    if n < 3 {
        return ClosedCurve::default();
    }

    let segments = if n <= STRAIGHT_MAX_POINTS {
        (0..n)
            .map(|i| PathSeg::Line(Line::new(pts[i], pts[(i + 1) % n])))
            .collect()
    } else {
        (0..n)
            .map(|i| {
                let p0 = pts[(i + n - 1) % n];
                let p1 = pts[i];
                let p2 = pts[(i + 1) % n];
                let p3 = pts[(i + 2) % n];
                PathSeg::Cubic(catmull_rom(p0, p1, p2, p3))
            })
            .collect()
    };

    ClosedCurve { segments }
}

/// Catmull-Rom span p1 → p2 as a cubic Bezier.
fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point) -> CubicBez {
    let ctrl1 = p1 + (p2 - p0) / 6.0;
    let ctrl2 = p2 - (p3 - p1) / 6.0;
    CubicBez::new(p1, ctrl1, ctrl2, p2)
}

fn serialize_segments<S: serde::Serializer>(segs: &[PathSeg], s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = s.serialize_seq(Some(segs.len()))?;
    for seg in segs {
        let points: Vec<Point> = match *seg {
            PathSeg::Line(l) => vec![l.p0, l.p1],
            PathSeg::Quad(q) => vec![q.p0, q.p1, q.p2],
            PathSeg::Cubic(c) => vec![c.p0, c.p1, c.p2, c.p3],
        };
        seq.serialize_element(&points)?;
    }
    seq.end()
}
