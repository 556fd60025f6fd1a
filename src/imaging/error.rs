use thiserror::Error;

/// Fatal precondition violations. A filter that returns one of these has
/// left the grid untouched; the caller must not go on to save it.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Image data is empty")]
    EmptyImage,

    #[error("Blur level {level} is outside 1..={max} for a {height}x{width} image")]
    InvalidBlurLevel {
        level: usize,
        height: usize,
        width: usize,
        max: usize,
    },

    #[error("Contour requires at least 2 columns, image has {width}")]
    TooNarrow { width: usize },
}

/// Recoverable concatenation failures. These are reported back to the
/// request layer as a message plus failure status instead of aborting,
/// so the caller can answer the user and keep serving.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConcatError {
    #[error("Images must have the same height for horizontal concatenation ({left} vs {right})")]
    HeightMismatch { left: usize, right: usize },

    #[error("Images must have the same width for vertical concatenation ({left} vs {right})")]
    WidthMismatch { left: usize, right: usize },

    #[error("Invalid direction for concatenation: '{0}'. Must be 'horizontal' or 'vertical'")]
    InvalidDirection(String),
}
