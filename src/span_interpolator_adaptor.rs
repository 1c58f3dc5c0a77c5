//! Distortion adaptor.
//!
//! Wraps any `SpanInterpolator` and passes its coordinates through a
//! caller-supplied `Distortion` (wave, lens and similar effects).

use crate::span_interpolator_linear::{InterpolatorTransformer, SpanInterpolator};

/// Per-pixel coordinate post-processing, in subpixel units.
pub trait Distortion {
    fn calculate(&self, x: &mut i32, y: &mut i32);
}

impl<F: Fn(&mut i32, &mut i32)> Distortion for F {
    #[inline]
    fn calculate(&self, x: &mut i32, y: &mut i32) {
        self(x, y)
    }
}

#[derive(Debug, Clone)]
pub struct SpanInterpolatorAdaptor<I, D> {
    interp: I,
    distortion: D,
}

impl<I: SpanInterpolator, D: Distortion> SpanInterpolatorAdaptor<I, D> {
    pub fn new(interp: I, distortion: D) -> Self {
        Self { interp, distortion }
    }

    pub fn interpolator(&self) -> &I {
        &self.interp
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interp
    }

    pub fn distortion(&self) -> &D {
        &self.distortion
    }

    pub fn set_distortion(&mut self, distortion: D) {
        self.distortion = distortion;
    }
}

impl<I: SpanInterpolator, D: Distortion> SpanInterpolator for SpanInterpolatorAdaptor<I, D> {
    fn begin(&mut self, x: f64, y: f64, len: u32) {
        self.interp.begin(x, y, len);
    }

    #[inline]
    fn next(&mut self) {
        self.interp.next();
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        self.interp.coordinates(x, y);
        self.distortion.calculate(x, y);
    }

    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        self.interp.resynchronize(xe, ye, len);
    }

    fn subpixel_shift(&self) -> u32 {
        self.interp.subpixel_shift()
    }

    fn local_scale(&self) -> Option<(i32, i32)> {
        self.interp.local_scale()
    }
}

impl<I: InterpolatorTransformer, D> InterpolatorTransformer for SpanInterpolatorAdaptor<I, D> {
    type Transformer = I::Transformer;

    fn transformer(&self) -> &I::Transformer {
        self.interp.transformer()
    }

    fn set_transformer(&mut self, trans: I::Transformer) {
        self.interp.set_transformer(trans);
    }
}
