//! regionize: bitmaps and outlines → classified shell + hole regions.
//!
//! Traces the boundaries of a binary raster (or samples the curves of a
//! glyph outline), simplifies them, works out which closed contours are
//! solid material and which are holes cut out of it, and fits a smooth
//! closed curve through every ring. The result is ready for extrusion or
//! CNC export: one outer curve per shape group plus its holes.
//!
//! # Example
//!
//! ```no_run
//! use regionize::{vectorize_image, VectorizeConfig};
//! use std::path::Path;
//!
//! let config = VectorizeConfig::default();
//! let result = vectorize_image(Path::new("letter.png"), &config)?;
//! for group in &result.groups {
//!     println!("shape with {} holes", group.shape.holes.len());
//! }
//! # Ok::<(), regionize::RegionizeError>(())
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;
mod raster;

pub mod bitmap;
pub mod classify;
pub mod curve;
pub mod error;
pub mod outline;
pub mod simplify;
pub mod svg;
pub mod trace;

// Re-export kurbo so downstream users get the same version used by
// Contour and ClosedCurve.
pub use kurbo;

pub use classify::{classify, classify_with, Classification, DropReason, Dropped, Polygon, ShapeGroup};
pub use config::{ClassifyConfig, ThresholdMethod, VectorizeConfig};
pub use curve::{fit_closed, ClosedCurve};
pub use error::RegionizeError;
pub use geom::Contour;
pub use raster::Raster;
pub use simplify::simplify;
pub use trace::trace;

use std::path::Path;
use std::time::Instant;

use kurbo::Rect;
use rayon::prelude::*;
use serde::Serialize;

/// A shape group with a fitted curve for every ring.
///
/// Almost always one curve per polygon; a repaired self-intersecting
/// contour contributes one curve per loop.
#[derive(Debug, Clone, Serialize)]
pub struct FittedGroup {
    /// The classified polygons the curves were fitted through.
    pub shape: ShapeGroup,
    pub outer: Vec<ClosedCurve>,
    /// Rings of every hole, in `shape.holes` order.
    pub holes: Vec<ClosedCurve>,
}

/// Output of the full pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Vectorized {
    pub groups: Vec<FittedGroup>,
    /// Indices refer to the contours handed to the classifier, i.e. after
    /// the speckle filter.
    pub dropped: Vec<Dropped>,
    /// Output extent in output units (pixels or millimetres).
    pub width: f64,
    pub height: f64,
    /// Contours found before any filtering.
    pub contour_count: usize,
}

impl Vectorized {
    pub fn hole_count(&self) -> usize {
        self.groups.iter().map(|g| g.shape.holes.len()).sum()
    }
}

/// Raster pipeline: trace → speckle filter → simplify → scale →
/// classify → fit.
pub fn vectorize(raster: &Raster, config: &VectorizeConfig) -> Vectorized {
    let t_start = Instant::now();

    // ── Trace ─────────────────────────────────────────────
    let traced = trace::trace(raster);
    let contour_count = traced.len();
    let kept: Vec<Contour> = traced
        .into_iter()
        .filter(|c| c.signed_area().abs() >= config.min_contour_area)
        .collect();
    log::info!(
        "trace: {}x{} px, {} contours, {} above {} px\u{00b2}",
        raster.width(),
        raster.height(),
        contour_count,
        kept.len(),
        config.min_contour_area,
    );

    // ── Simplify & scale ──────────────────────────────────
    let (scale, width, height) =
        config.output_scale(raster.width() as f64, raster.height() as f64);
    let contours = simplify_all(&kept, config.simplify_tolerance, scale);

    let mut result = classify_and_fit(&contours, config, width, height);
    result.contour_count = contour_count;
    log::info!(
        "result: {} groups, {} holes, {} dropped ({}ms)",
        result.groups.len(),
        result.hole_count(),
        result.dropped.len(),
        t_start.elapsed().as_millis(),
    );
    result
}

/// Contour pipeline for sources that skip the tracer (glyph outlines,
/// SVG paths): simplify → scale → classify → fit.
///
/// No speckle filter is applied. The output extent runs from the origin
/// to the far corner of the contours' bounding box.
pub fn vectorize_contours(contours: &[Contour], config: &VectorizeConfig) -> Vectorized {
    let bounds = contours
        .iter()
        .filter_map(Contour::bounds)
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO);
    let (scale, width, height) = config.output_scale(bounds.x1.max(0.0), bounds.y1.max(0.0));

    let simplified = simplify_all(contours, config.simplify_tolerance, scale);
    let mut result = classify_and_fit(&simplified, config, width, height);
    result.contour_count = contours.len();
    log::info!(
        "result: {} groups, {} holes, {} dropped",
        result.groups.len(),
        result.hole_count(),
        result.dropped.len(),
    );
    result
}

/// Load an image, binarize it and run [`vectorize`].
pub fn vectorize_image(image_path: &Path, config: &VectorizeConfig) -> Result<Vectorized, RegionizeError> {
    let raster = bitmap::load(image_path, config)?;
    let result = vectorize(&raster, config);
    if result.groups.is_empty() {
        return Err(RegionizeError::NoShapes);
    }
    Ok(result)
}

/// Simplify in pixel space, then scale to output units.
fn simplify_all(contours: &[Contour], tolerance: f64, scale: f64) -> Vec<Contour> {
    contours
        .par_iter()
        .map(|c| Contour::new(simplify(&c.points, tolerance)).scaled(scale))
        .collect()
}

fn classify_and_fit(contours: &[Contour], config: &VectorizeConfig, width: f64, height: f64) -> Vectorized {
    let Classification { groups, dropped } = classify_with(contours, &config.classify);
    for d in &dropped {
        log::debug!("classify: dropped contour {}: {}", d.contour, d.reason);
    }

    let groups = groups
        .into_par_iter()
        .map(|shape| FittedGroup {
            outer: fit_rings(&shape.outer),
            holes: shape.holes.iter().flat_map(fit_rings).collect(),
            shape,
        })
        .collect();

    Vectorized {
        groups,
        dropped,
        width,
        height,
        contour_count: contours.len(),
    }
}

fn fit_rings(polygon: &Polygon) -> Vec<ClosedCurve> {
    polygon.rings().iter().map(|r| fit_closed(r)).collect()
}
