//! Per-pixel transform span interpolator.
//!
//! Calls the transformer for every pixel instead of walking between span
//! ends, so it is exact for any mapping at the cost of one transform per
//! pixel.

use crate::basics::iround;
use crate::span_interpolator_linear::{
    InterpolatorTransformer, SpanInterpolator, Transformer, SUBPIXEL_SCALE,
};

// ============================================================================
// SpanInterpolatorTrans
// ============================================================================

#[derive(Debug, Clone)]
pub struct SpanInterpolatorTrans<T> {
    trans: T,
    x: f64,
    y: f64,
    ix: i32,
    iy: i32,
}

impl<T: Transformer> SpanInterpolatorTrans<T> {
    pub fn new(trans: T) -> Self {
        Self {
            trans,
            x: 0.0,
            y: 0.0,
            ix: 0,
            iy: 0,
        }
    }

    pub fn new_begin(trans: T, x: f64, y: f64, len: u32) -> Self {
        let mut s = Self::new(trans);
        s.begin(x, y, len);
        s
    }

    #[inline]
    fn update(&mut self) {
        let (mut tx, mut ty) = (self.x, self.y);
        self.trans.transform(&mut tx, &mut ty);
        self.ix = iround(tx * SUBPIXEL_SCALE as f64);
        self.iy = iround(ty * SUBPIXEL_SCALE as f64);
    }
}

impl<T: Transformer> SpanInterpolator for SpanInterpolatorTrans<T> {
    fn begin(&mut self, x: f64, y: f64, _len: u32) {
        self.x = x;
        self.y = y;
        self.update();
    }

    #[inline]
    fn next(&mut self) {
        self.x += 1.0;
        self.update();
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        *x = self.ix;
        *y = self.iy;
    }

    /// Nothing accumulates between pixels, so there is nothing to correct.
    fn resynchronize(&mut self, _xe: f64, _ye: f64, _len: u32) {}
}

impl<T: Transformer> InterpolatorTransformer for SpanInterpolatorTrans<T> {
    type Transformer = T;

    fn transformer(&self) -> &T {
        &self.trans
    }

    fn set_transformer(&mut self, trans: T) {
        self.trans = trans;
    }
}

// ============================================================================
// Tests
// ============================================================================
