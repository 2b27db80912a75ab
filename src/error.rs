use thiserror::Error;

/// Errors raised at the edges of the pipeline (loading, parsing, writing).
///
/// The core tracing and classification stages never fail; they drop bad
/// contours and report them through [`crate::DropReason`] instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegionizeError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("no shapes found")]
    NoShapes,

    #[error("invalid SVG path data: {0}")]
    InvalidPath(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
