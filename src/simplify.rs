//! Douglas-Peucker polyline simplification.
//!
//! Runs on an explicit work stack instead of recursion, so the stack depth
//! stays constant no matter how adversarial the input is.

use kurbo::Point;

/// Reduce `points` to the subsequence that stays within `epsilon` of the
/// original polyline.
///
/// The first and last points are always kept, retained points keep their
/// original order, and inputs of two points or fewer come back unchanged.
/// A negative `epsilon` behaves like zero.
pub fn simplify(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }
    let epsilon = epsilon.max(0.0);

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (a, b) = (points[start], points[end]);

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = point_segment_distance(p, a, b);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > epsilon {
            keep[max_idx] = true;
            stack.push((max_idx, end));
            stack.push((start, max_idx));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect()
}

/// Distance from `p` to the finite segment `a`–`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond an
/// endpoint measure to that endpoint. A zero-length segment degrades to
/// point distance.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
