//! Error type for construction and configuration failures.
//!
//! Span generation itself never fails: out-of-range indices and channel
//! values are clamped in the hot path. Errors only surface when a caller
//! builds an image view, a perspective mapping, a contour field, or a
//! configuration value from bad input.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SpanError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpanError {
    /// Zero-sized image view or scratch buffer.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Byte slice shorter than `height` rows of `stride` bytes.
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Row stride smaller than one row of pixels.
    #[error("row stride {stride} is smaller than the minimum {min}")]
    InvalidStride { stride: usize, min: usize },

    #[error("path has no drawable vertices")]
    EmptyPath,

    /// Perspective mapping could not be solved or inverted.
    #[error("degenerate perspective transform")]
    DegenerateTransform,

    #[error("unknown image filter: {0}")]
    UnknownFilter(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
