//! Shell/hole classification of an unordered set of closed contours.
//!
//! Polygons are sorted by area (largest first) and each one is attached
//! to the smallest earlier polygon that contains its representative point.
//! That gives a containment forest. Even depth means material (the outer of
//! a new shape group), odd depth means a cut-out of the parent's group, so
//! an island inside a hole becomes a shape of its own. This is the even-odd
//! fill rule expressed as a grouping.

mod polygon;

pub use polygon::{DropReason, Polygon};

use serde::Serialize;

use crate::config::ClassifyConfig;
use crate::geom::Contour;

/// One outer polygon plus the holes cut out of it.
///
/// The outer ring always has a positive signed area and every hole ring a
/// negative one.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeGroup {
    pub outer: Polygon,
    pub holes: Vec<Polygon>,
}

impl ShapeGroup {
    fn new(outer: Polygon, holes: Vec<Polygon>) -> Self {
        Self {
            outer: outer.oriented(true),
            holes: holes.into_iter().map(|h| h.oriented(false)).collect(),
        }
    }

    /// Outer followed by holes.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(&self.outer).chain(&self.holes)
    }

    /// Material area: outer minus holes.
    pub fn net_area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(Polygon::area).sum::<f64>()
    }
}

/// A contour left out of classification, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dropped {
    pub contour: usize,
    pub reason: DropReason,
}

/// Result of [`classify`]: the shape groups plus every skipped contour.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classification {
    pub groups: Vec<ShapeGroup>,
    pub dropped: Vec<Dropped>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn hole_count(&self) -> usize {
        self.groups.iter().map(|g| g.holes.len()).sum()
    }

    /// Number of polygons across all groups (outers and holes).
    pub fn polygon_count(&self) -> usize {
        self.groups.len() + self.hole_count()
    }
}

/// Classify with default thresholds.
pub fn classify(contours: &[Contour]) -> Classification {
    classify_with(contours, &ClassifyConfig::default())
}

/// Group `contours` into shells and holes.
///
/// Never fails. Degenerate or unrepairable contours land in
/// [`Classification::dropped`]; everything else appears in exactly one
/// group, as an outer or as a hole.
pub fn classify_with(contours: &[Contour], config: &ClassifyConfig) -> Classification {
    let mut polygons = Vec::with_capacity(contours.len());
    let mut dropped = Vec::new();

    for (i, contour) in contours.iter().enumerate() {
        match Polygon::from_contour(i, &contour.points, config.min_area) {
            Ok(polygon) => polygons.push(polygon),
            Err(reason) => {
                log::debug!("classify: dropping contour {}: {}", i, reason);
                dropped.push(Dropped { contour: i, reason });
            }
        }
    }

    // Stable: equal areas keep input order.
    polygons.sort_by(|a, b| b.area().total_cmp(&a.area()));
    let forest = ContainmentForest::build(&polygons);

    let mut group_of: Vec<Option<usize>> = vec![None; polygons.len()];
    let mut slots: Vec<(Polygon, Vec<Polygon>)> = Vec::new();
    for (i, polygon) in polygons.into_iter().enumerate() {
        if forest.depth[i] % 2 == 0 {
            group_of[i] = Some(slots.len());
            slots.push((polygon, Vec::new()));
        } else if let Some(g) = forest.parent[i].and_then(|p| group_of[p]) {
            slots[g].1.push(polygon);
        }
    }

    let groups: Vec<ShapeGroup> = slots
        .into_iter()
        .map(|(outer, holes)| ShapeGroup::new(outer, holes))
        .collect();

    log::debug!(
        "classify: {} contours → {} groups, {} holes, {} dropped (max depth {})",
        contours.len(),
        groups.len(),
        groups.iter().map(|g| g.holes.len()).sum::<usize>(),
        dropped.len(),
        forest.depth.iter().max().copied().unwrap_or(0),
    );

    Classification { groups, dropped }
}

/// Parent pointers over polygons sorted by descending area.
///
/// A parent always precedes its child, so the structure is a forest and
/// depths can be filled in a single forward pass.
struct ContainmentForest {
    parent: Vec<Option<usize>>,
    depth: Vec<usize>,
}

impl ContainmentForest {
    fn build(sorted: &[Polygon]) -> Self {
        let n = sorted.len();
        let mut parent = vec![None; n];
        let mut depth = vec![0usize; n];

        for i in 0..n {
            let probe = sorted[i].representative_point();
            // Nearest enclosing ancestor: smallest containing candidate.
            parent[i] = (0..i)
                .rev()
                .filter(|&j| sorted[j].contains(probe))
                .min_by(|&a, &b| sorted[a].area().total_cmp(&sorted[b].area()));
            depth[i] = parent[i].map_or(0, |p| depth[p] + 1);
        }

        Self { parent, depth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use test_log::test;

    fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Contour {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                Point::new(cx + r * t.cos(), cy + r * t.sin())
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Contour {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)].into()
    }

    fn sources(group: &ShapeGroup) -> (usize, Vec<usize>) {
        (
            group.outer.source(),
            group.holes.iter().map(Polygon::source).collect(),
        )
    }

    #[test]
    fn single_contour_is_one_group() {
        let result = classify(&[circle(0.0, 0.0, 5.0, 32)]);
        assert_eq!(result.groups.len(), 1);
        assert!(result.groups[0].holes.is_empty());
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn concentric_pair_is_outer_with_hole() {
        // Smaller listed first: input order must not matter.
        let result = classify(&[circle(0.0, 0.0, 4.0, 32), circle(0.0, 0.0, 8.0, 32)]);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(sources(&result.groups[0]), (1, vec![0]));
    }

    #[test]
    fn island_in_hole_is_its_own_group() {
        let result = classify(&[
            circle(0.0, 0.0, 10.0, 48),
            circle(0.0, 0.0, 6.0, 48),
            circle(0.0, 0.0, 3.0, 48),
        ]);
        assert_eq!(result.groups.len(), 2);
        assert_eq!(sources(&result.groups[0]), (0, vec![1]));
        assert_eq!(sources(&result.groups[1]), (2, vec![]));
    }

    #[test]
    fn disjoint_contours_are_separate_groups() {
        let result = classify(&[rect(0.0, 0.0, 2.0, 2.0), rect(5.0, 0.0, 8.0, 3.0)]);
        assert_eq!(result.groups.len(), 2);
        assert!(result.groups.iter().all(|g| g.holes.is_empty()));
        // Larger first.
        assert_eq!(result.groups[0].outer.source(), 1);
    }

    #[test]
    fn figure_eight_has_two_holes() {
        let result = classify(&[
            rect(0.0, 0.0, 10.0, 20.0),
            rect(2.0, 2.0, 8.0, 8.0),
            rect(2.0, 11.0, 8.0, 18.0),
        ]);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(sources(&result.groups[0]), (0, vec![2, 1]));
        assert!((result.groups[0].net_area() - (200.0 - 42.0 - 36.0)).abs() < 1e-9);
    }

    #[test]
    fn nearest_ancestor_wins() {
        // Four nested squares: depths 0, 1, 2, 3.
        let result = classify(&[
            rect(3.0, 3.0, 7.0, 7.0),
            rect(0.0, 0.0, 10.0, 10.0),
            rect(4.0, 4.0, 6.0, 6.0),
            rect(1.0, 1.0, 9.0, 9.0),
        ]);
        assert_eq!(result.groups.len(), 2);
        assert_eq!(sources(&result.groups[0]), (1, vec![3]));
        assert_eq!(sources(&result.groups[1]), (0, vec![2]));
    }

    #[test]
    fn every_valid_contour_appears_once() {
        let contours = vec![
            rect(0.0, 0.0, 30.0, 30.0),
            vec![(1.0, 1.0), (2.0, 2.0)].into(),
            rect(2.0, 2.0, 12.0, 12.0),
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)].into(),
            rect(4.0, 4.0, 6.0, 6.0),
            rect(40.0, 0.0, 50.0, 10.0),
            rect(15.0, 15.0, 25.0, 25.0),
            Contour::default(),
            vec![(60.0, 0.0), (64.0, 4.0), (64.0, 0.0), (60.0, 4.0)].into(),
            vec![
                (70.0, 0.0),
                (72.0, 0.0),
                (72.0, 2.0),
                (74.0, 2.0),
                (74.0, 4.0),
                (72.0, 4.0),
                (72.0, 2.0),
                (70.0, 2.0),
            ]
            .into(),
        ];
        let result = classify(&contours);

        let mut seen: Vec<usize> = result
            .groups
            .iter()
            .flat_map(|g| g.polygons().map(Polygon::source))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 2, 4, 5, 6, 8, 9]);

        let dropped: Vec<usize> = result.dropped.iter().map(|d| d.contour).collect();
        assert_eq!(dropped, vec![1, 3, 7]);
        assert_eq!(result.polygon_count(), 7);
    }

    #[test]
    fn rings_are_oriented() {
        // Outer given clockwise, hole counter-clockwise.
        let mut outer = rect(0.0, 0.0, 10.0, 10.0);
        outer.points.reverse();
        let result = classify(&[outer, rect(2.0, 2.0, 4.0, 4.0)]);
        let group = &result.groups[0];
        assert!(group.outer.signed_area() > 0.0);
        assert!(group.holes[0].signed_area() < 0.0);
    }

    #[test]
    fn self_intersecting_contour_stays_one_unit() {
        let bowtie: Contour = vec![(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 4.0)].into();
        let result = classify(&[bowtie]);
        assert_eq!(result.groups.len(), 1);
        assert!(result.dropped.is_empty());
        let outer = &result.groups[0].outer;
        assert_eq!(outer.rings().len(), 2);
        assert!(outer.rings().iter().all(|r| crate::geom::signed_area(r) > 0.0));
    }

    #[test]
    fn repaired_hole_lands_in_one_group() {
        // A bowtie hole inside a square: both lobes cut out of the same shape.
        let result = classify(&[
            rect(0.0, 0.0, 10.0, 10.0),
            vec![(2.0, 2.0), (8.0, 8.0), (8.0, 2.0), (2.0, 8.0)].into(),
        ]);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(sources(&result.groups[0]), (0, vec![1]));
        assert_eq!(result.groups[0].holes[0].rings().len(), 2);
        assert!((result.groups[0].net_area() - (100.0 - 18.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_empty_result() {
        let result = classify(&[]);
        assert!(result.is_empty());
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn min_area_is_configurable() {
        let config = ClassifyConfig { min_area: 5.0 };
        let result = classify_with(&[rect(0.0, 0.0, 2.0, 2.0), rect(10.0, 0.0, 13.0, 3.0)], &config);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].outer.source(), 1);
        assert!(matches!(
            result.dropped[0].reason,
            DropReason::AreaBelowThreshold { .. }
        ));
    }
}
