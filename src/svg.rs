//! SVG emission for fitted shape groups.
//!
//! One `<path>` per shape group: the outer curve followed by its holes as
//! further subpaths. The even-odd fill rule makes the holes cut out, and
//! because holes wind opposite to their outer the nonzero rule agrees.

use std::fmt::Write;

use kurbo::BezPath;

use crate::{FittedGroup, Vectorized};

/// Outer curves then hole curves, each a closed subpath.
pub fn group_path(group: &FittedGroup) -> BezPath {
    let mut path = BezPath::new();
    for curve in group.outer.iter().chain(&group.holes) {
        curve.append_to(&mut path);
    }
    path
}

/// A standalone SVG document sized to the vectorized output.
pub fn document(result: &Vectorized) -> String {
    let (w, h) = (result.width, result.height);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w:.2} {h:.2}\" width=\"{w:.2}\" height=\"{h:.2}\">\n"
    );
    for group in &result.groups {
        let d = group_path(group).to_svg();
        if d.is_empty() {
            continue;
        }
        // Writing to a String cannot fail.
        let _ = writeln!(svg, "  <path d=\"{d}\" fill=\"black\" fill-rule=\"evenodd\"/>");
    }
    svg.push_str("</svg>");
    svg
}
