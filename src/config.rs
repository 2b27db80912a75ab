use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegionizeError;

/// All vectorization parameters in one struct.
/// Serializable so presets can be saved and loaded as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizeConfig {
    // -- Bitmap stage --
    /// Threshold method for converting to binary.
    pub threshold: ThresholdMethod,
    /// If true, swap foreground/background before tracing.
    pub invert: bool,
    /// Flip foreground/background when the image border is dark
    /// (light artwork on a dark background).
    pub auto_invert: bool,
    /// Gaussian blur sigma applied before thresholding. 0 = off.
    pub blur_radius: f32,
    /// Crop to the foreground bounding box plus this many pixels. None = off.
    pub autocrop_padding: Option<u32>,

    // -- Contour stage --
    /// Minimum traced contour area in pixels (filter speckles).
    pub min_contour_area: f64,
    /// Douglas-Peucker tolerance in pixels, applied before scaling.
    pub simplify_tolerance: f64,

    // -- Scaling / output --
    /// Output width in millimetres. Aspect ratio is always preserved.
    pub target_width_mm: Option<f64>,
    /// Output height in millimetres.
    pub target_height_mm: Option<f64>,

    // -- Classification --
    pub classify: ClassifyConfig,
}

/// Threshold method for converting a grayscale image to binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Fixed brightness threshold (0-255).
    Fixed(u8),
    /// Otsu's method (automatic).
    Otsu,
}

/// Parameters for shell/hole classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Polygons (or repaired loops) with less area than this are dropped.
    pub min_area: f64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self { min_area: 0.01 }
    }
}

impl Default for VectorizeConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Fixed(128),
            invert: false,
            auto_invert: true,
            blur_radius: 1.0,
            autocrop_padding: Some(5),
            min_contour_area: 100.0,
            simplify_tolerance: 1.0,
            target_width_mm: None,
            target_height_mm: None,
            classify: ClassifyConfig::default(),
        }
    }
}

impl VectorizeConfig {
    /// Load a preset. Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, RegionizeError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Uniform pixel → output scale and the resulting output size.
    ///
    /// With both targets set the smaller scale wins so the shape fits
    /// inside the requested box. With neither, output stays in pixels.
    pub fn output_scale(&self, width: f64, height: f64) -> (f64, f64, f64) {
        let w = width.max(f64::EPSILON);
        let h = height.max(f64::EPSILON);
        let scale = match (self.target_width_mm, self.target_height_mm) {
            (Some(tw), Some(th)) => (tw / w).min(th / h),
            (None, Some(th)) => th / h,
            (Some(tw), None) => tw / w,
            (None, None) => 1.0,
        };
        (scale, width * scale, height * scale)
    }
}
