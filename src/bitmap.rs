use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgba, RgbaImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;

use crate::config::{ThresholdMethod, VectorizeConfig};
use crate::error::RegionizeError;
use crate::raster::Raster;

/// Mean border brightness below this counts as a dark background.
const DARK_BORDER_LEVEL: f64 = 128.0;

/// Load an image and binarize it into an occupancy raster.
pub fn load(path: &Path, config: &VectorizeConfig) -> Result<Raster, RegionizeError> {
    let img = ImageReader::open(path)
        .map_err(|e| RegionizeError::ImageLoad(e.to_string()))?
        .decode()
        .map_err(|e| RegionizeError::ImageLoad(e.to_string()))?;
    Ok(binarize(&img, config))
}

/// Convert a decoded image to a raster. Dark pixels are foreground unless
/// inverted.
///
/// Transparent areas count as white paper. With `auto_invert`, an image
/// whose border is dark is treated as light artwork on a dark background.
pub fn binarize(img: &DynamicImage, config: &VectorizeConfig) -> Raster {
    let mut gray = flatten_to_luma(img);

    if config.blur_radius > 0.0 {
        gray = gaussian_blur_f32(&gray, config.blur_radius);
    }

    let mut invert = config.invert;
    if config.auto_invert && border_mean(&gray) < DARK_BORDER_LEVEL {
        log::debug!("bitmap: dark border, inverting");
        invert = !invert;
    }

    let level = match config.threshold {
        ThresholdMethod::Fixed(t) => t,
        ThresholdMethod::Otsu => {
            let t = otsu_level(&gray);
            log::debug!("bitmap: Otsu level {}", t);
            t
        }
    };

    let mut binary = threshold(&gray, level, ThresholdType::BinaryInverted);
    if invert {
        for pixel in binary.pixels_mut() {
            pixel.0[0] = 255 - pixel.0[0];
        }
    }

    let raster = Raster::from_gray(&binary);
    match config.autocrop_padding {
        Some(padding) => autocrop(&raster, padding as usize),
        None => raster,
    }
}

/// Composite onto white and drop to 8-bit luma.
fn flatten_to_luma(img: &DynamicImage) -> GrayImage {
    if !img.color().has_alpha() {
        return img.to_luma8();
    }
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let flat = RgbaImage::from_fn(w, h, |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let blend = |c: u8| {
            let alpha = a as f32 / 255.0;
            (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8
        };
        Rgba([blend(r), blend(g), blend(b), 255])
    });
    DynamicImage::ImageRgba8(flat).to_luma8()
}

/// Average of the mean brightness of each of the four edges.
fn border_mean(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return 255.0;
    }
    let mean = |pixels: &mut dyn Iterator<Item = u8>| {
        let (sum, count) = pixels.fold((0u64, 0u64), |(s, c), v| (s + v as u64, c + 1));
        sum as f64 / count.max(1) as f64
    };
    let px = |x: u32, y: u32| {
        let Luma([v]) = *gray.get_pixel(x, y);
        v
    };
    let top = mean(&mut (0..w).map(|x| px(x, 0)));
    let bottom = mean(&mut (0..w).map(|x| px(x, h - 1)));
    let left = mean(&mut (0..h).map(|y| px(0, y)));
    let right = mean(&mut (0..h).map(|y| px(w - 1, y)));
    (top + bottom + left + right) / 4.0
}

/// Crop to the foreground bounding box grown by `padding` (clamped to the
/// image). An all-background raster is returned as-is.
pub fn autocrop(raster: &Raster, padding: usize) -> Raster {
    let (w, h) = (raster.width(), raster.height());
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for y in 0..h {
        for x in 0..w {
            if raster.get(x as i64, y as i64) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return raster.clone();
    };

    let x0 = x0.saturating_sub(padding);
    let y0 = y0.saturating_sub(padding);
    let x1 = (x1 + padding).min(w - 1);
    let y1 = (y1 + padding).min(h - 1);
    Raster::from_fn(x1 - x0 + 1, y1 - y0 + 1, |x, y| {
        raster.get((x0 + x) as i64, (y0 + y) as i64)
    })
}
