//! Contours from glyph outlines and vector path data.
//!
//! These sources skip the tracer: their curves are sampled into point
//! rings and go straight to simplification and classification.

use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, Point, QuadBez};

use crate::error::RegionizeError;
use crate::geom::Contour;

/// Samples per quadratic or cubic segment. High enough that large letters
/// (hundreds of millimetres) stay visibly smooth.
pub const DEFAULT_CURVE_STEPS: usize = 64;

/// Flatten every subpath of `path` into a closed contour.
///
/// Curves are sampled uniformly in `t` with `steps` intervals. Closed
/// subpaths get an explicit closing point; subpaths with fewer than three
/// points are skipped. An unterminated trailing subpath is kept too.
pub fn contours_from_path(path: &BezPath, steps: usize) -> Vec<Contour> {
    let steps = steps.max(1);
    let mut contours = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut pos = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish(&mut contours, &mut current, false);
                current.push(p);
                pos = p;
            }
            PathEl::LineTo(p) => {
                current.push(p);
                pos = p;
            }
            PathEl::QuadTo(c, p) => {
                sample(&mut current, &QuadBez::new(pos, c, p), steps);
                pos = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                sample(&mut current, &CubicBez::new(pos, c1, c2, p), steps);
                pos = p;
            }
            PathEl::ClosePath => finish(&mut contours, &mut current, true),
        }
    }
    finish(&mut contours, &mut current, false);

    contours
}

/// Parse SVG path data (`d` attribute) and flatten it.
pub fn contours_from_svg(d: &str, steps: usize) -> Result<Vec<Contour>, RegionizeError> {
    let path = BezPath::from_svg(d).map_err(|e| RegionizeError::InvalidPath(e.to_string()))?;
    Ok(contours_from_path(&path, steps))
}

/// Append the samples at t = 1/steps ..= 1 (the start is already present).
fn sample(out: &mut Vec<Point>, curve: &impl ParamCurve, steps: usize) {
    out.extend((1..=steps).map(|i| curve.eval(i as f64 / steps as f64)));
}

fn finish(contours: &mut Vec<Contour>, current: &mut Vec<Point>, close: bool) {
    let mut points = std::mem::take(current);
    if points.len() < 3 {
        return;
    }
    if close && points.first() != points.last() {
        points.push(points[0]);
    }
    contours.push(Contour::new(points));
}
