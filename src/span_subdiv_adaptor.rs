//! Subdivision adaptor.
//!
//! Splits a span into chunks of `2^subdiv_shift` pixels and resynchronizes
//! the wrapped interpolator at every chunk boundary, which bounds the error
//! of linear walking over a non-linear mapping.

use crate::basics::iround;
use crate::span_interpolator_linear::{InterpolatorTransformer, SpanInterpolator};

#[derive(Debug, Clone)]
pub struct SpanSubdivAdaptor<I> {
    subdiv_shift: u32,
    subdiv_size: u32,
    interpolator: I,
    src_x: i32,
    src_y: f64,
    pos: u32,
    len: u32,
}

impl<I: SpanInterpolator> SpanSubdivAdaptor<I> {
    /// Chunks of 16 pixels.
    pub fn new(interpolator: I) -> Self {
        Self::new_with_shift(interpolator, 4)
    }

    pub fn new_with_shift(interpolator: I, subdiv_shift: u32) -> Self {
        Self {
            subdiv_shift,
            subdiv_size: 1 << subdiv_shift,
            interpolator,
            src_x: 0,
            src_y: 0.0,
            pos: 0,
            len: 0,
        }
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn subdiv_shift(&self) -> u32 {
        self.subdiv_shift
    }

    pub fn set_subdiv_shift(&mut self, shift: u32) {
        self.subdiv_shift = shift;
        self.subdiv_size = 1 << shift;
    }

    #[inline]
    fn scale(&self) -> i32 {
        1 << self.interpolator.subpixel_shift()
    }
}

impl<I: SpanInterpolator> SpanInterpolator for SpanSubdivAdaptor<I> {
    fn begin(&mut self, x: f64, y: f64, len: u32) {
        let scale = self.scale();
        self.pos = 1;
        self.src_x = iround(x * scale as f64) + scale;
        self.src_y = y;
        self.len = len;
        self.interpolator.begin(x, y, len.min(self.subdiv_size));
    }

    fn next(&mut self) {
        self.interpolator.next();
        let scale = self.scale();
        if self.pos >= self.subdiv_size {
            let sub_len = self.len.min(self.subdiv_size);
            self.interpolator.resynchronize(
                self.src_x as f64 / scale as f64 + sub_len as f64,
                self.src_y,
                sub_len,
            );
            self.pos = 0;
        }
        self.src_x += scale;
        self.pos += 1;
        self.len = self.len.saturating_sub(1);
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        self.interpolator.coordinates(x, y);
    }

    /// Restarts chunking so that the span ends at `(xe, ye)` after `len`
    /// more pixels.
    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        let scale = self.scale();
        let x = xe - len as f64;
        self.pos = 1;
        self.src_x = iround(x * scale as f64) + scale;
        self.src_y = ye;
        self.len = len;
        let sub_len = len.min(self.subdiv_size);
        self.interpolator
            .resynchronize(x + sub_len as f64, ye, sub_len);
    }

    fn subpixel_shift(&self) -> u32 {
        self.interpolator.subpixel_shift()
    }

    fn local_scale(&self) -> Option<(i32, i32)> {
        self.interpolator.local_scale()
    }
}

impl<I: InterpolatorTransformer> InterpolatorTransformer for SpanSubdivAdaptor<I> {
    type Transformer = I::Transformer;

    fn transformer(&self) -> &I::Transformer {
        self.interpolator.transformer()
    }

    fn set_transformer(&mut self, trans: I::Transformer) {
        self.interpolator.set_transformer(trans);
    }
}

// ============================================================================
// Tests
// ============================================================================
