//! # agg-span
//!
//! Span generators and coordinate interpolators in the style of Anti-Grain
//! Geometry 2.6. This is the layer of an AGG pipeline that decides what color
//! each pixel of a horizontal run gets once the rasterizer has decided which
//! pixels are covered.
//!
//! It provides:
//!
//! - Integer DDA line interpolators
//! - Span interpolators (affine, subdivided, perspective, distortion)
//! - Gradients (linear, radial, focal, conic, contour, image-sampled)
//! - Gouraud-shaded triangles
//! - Image filtering and resampling for gray, RGB and RGBA sources
//! - Pattern fills
//!
//! ## Pipeline
//!
//! Every generator implements [`span_generator::SpanGenerator`]:
//!
//! 1. **Prepare** is called once before a batch of spans
//! 2. **Generate** fills `span[..len]` for the run starting at `(x, y)`
//!
//! Generators are pure per-call computations over immutable configuration,
//! so one instance per thread is all that is needed for parallel rendering.
//!
//! Errors only come out of constructors and configuration
//! ([`error::SpanError`]); the per-pixel paths clamp instead of failing.

// Foundation types and math
pub mod basics;
pub mod color;
pub mod error;
pub mod math;

// Configuration and logging
pub mod config;
#[cfg(feature = "logging")]
pub mod logging;

// Geometry and pixel access
pub mod dda_line;
pub mod image_accessors;
pub mod rendering_buffer;
pub mod trans_affine;
pub mod trans_perspective;

// Span plumbing
pub mod span_allocator;
pub mod span_converter;
pub mod span_generator;
pub mod span_solid;

// Interpolators
pub mod span_interpolator_adaptor;
pub mod span_interpolator_linear;
pub mod span_interpolator_persp;
pub mod span_interpolator_trans;
pub mod span_subdiv_adaptor;

// Gradients
pub mod gradient_lut;
pub mod span_gradient;
pub mod span_gradient_alpha;
pub mod span_gradient_contour;
pub mod span_gradient_image;

// Gouraud shading
pub mod span_gouraud;
pub mod span_gouraud_gray;
pub mod span_gouraud_rgba;

// Image filters and patterns
pub mod image_filters;
pub mod span_image_filter;
pub mod span_image_filter_gray;
pub mod span_image_filter_rgb;
pub mod span_image_filter_rgba;
pub mod span_pattern_gray;
pub mod span_pattern_rgb;
pub mod span_pattern_rgba;
