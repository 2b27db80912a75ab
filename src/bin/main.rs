use clap::Parser;
use regionize::outline::{contours_from_svg, DEFAULT_CURVE_STEPS};
use regionize::{RegionizeError, ThresholdMethod, VectorizeConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "regionize", about = "Bitmap or outline to classified shell + hole regions")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long, required_unless_present = "path_data")]
    input: Option<PathBuf>,

    /// SVG path data to use instead of an image (e.g. a glyph outline)
    #[arg(long, conflicts_with = "input")]
    path_data: Option<String>,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the classified groups and fitted curves as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// JSON preset; command-line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed brightness threshold (0-255)
    #[arg(long, conflicts_with = "otsu")]
    threshold: Option<u8>,

    /// Pick the threshold automatically (Otsu's method)
    #[arg(long)]
    otsu: bool,

    /// Invert the image before tracing
    #[arg(long)]
    invert: bool,

    /// Gaussian blur sigma before thresholding (0 = off)
    #[arg(long)]
    blur: Option<f32>,

    /// Douglas-Peucker tolerance in pixels
    #[arg(long)]
    tolerance: Option<f64>,

    /// Minimum traced contour area in pixels
    #[arg(long)]
    min_area: Option<f64>,

    /// Autocrop padding in pixels
    #[arg(long)]
    padding: Option<u32>,

    /// Disable autocrop
    #[arg(long, conflicts_with = "padding")]
    no_crop: bool,

    /// Output width in millimetres
    #[arg(long)]
    width_mm: Option<f64>,

    /// Output height in millimetres
    #[arg(long)]
    height_mm: Option<f64>,

    /// Samples per curve segment for --path-data
    #[arg(long, default_value_t = DEFAULT_CURVE_STEPS)]
    curve_steps: usize,
}

impl Cli {
    fn config(&self) -> Result<VectorizeConfig, RegionizeError> {
        let mut config = match &self.config {
            Some(path) => VectorizeConfig::from_json_file(path)?,
            None => VectorizeConfig::default(),
        };
        if let Some(t) = self.threshold {
            config.threshold = ThresholdMethod::Fixed(t);
        }
        if self.otsu {
            config.threshold = ThresholdMethod::Otsu;
        }
        if self.invert {
            config.invert = true;
        }
        if let Some(b) = self.blur {
            config.blur_radius = b;
        }
        if let Some(t) = self.tolerance {
            config.simplify_tolerance = t;
        }
        if let Some(a) = self.min_area {
            config.min_contour_area = a;
        }
        if let Some(p) = self.padding {
            config.autocrop_padding = Some(p);
        }
        if self.no_crop {
            config.autocrop_padding = None;
        }
        if self.width_mm.is_some() {
            config.target_width_mm = self.width_mm;
        }
        if self.height_mm.is_some() {
            config.target_height_mm = self.height_mm;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.config()?;

    let result = match (&cli.input, &cli.path_data) {
        (_, Some(d)) => {
            let contours = contours_from_svg(d, cli.curve_steps)?;
            regionize::vectorize_contours(&contours, &config)
        }
        (Some(input), None) => regionize::vectorize_image(input, &config)?,
        (None, None) => unreachable!("clap requires --input or --path-data"),
    };
    if result.groups.is_empty() {
        return Err(RegionizeError::NoShapes.into());
    }

    std::fs::write(&cli.output, regionize::svg::document(&result))?;
    if let Some(json) = &cli.json {
        std::fs::write(json, serde_json::to_string_pretty(&result)?)?;
    }

    eprintln!(
        "  Result      {} contours \u{2192} {} groups ({} holes) \u{00b7} {} dropped \u{00b7} {:.1} \u{00d7} {:.1}",
        result.contour_count,
        result.groups.len(),
        result.hole_count(),
        result.dropped.len(),
        result.width,
        result.height,
    );
    eprintln!("Wrote {}", cli.output.display());
    Ok(())
}
