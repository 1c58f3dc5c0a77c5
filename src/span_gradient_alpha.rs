//! Alpha gradients.
//!
//! `SpanGradientAlpha` evaluates a gradient shape exactly like
//! `SpanGradient` but only overwrites the alpha of colors already in the
//! span. It is normally chained after a color generator through
//! `SpanConverter`.

use std::marker::PhantomData;

use crate::basics::iround;
use crate::color::{AlphaColor, IntChannel};
use crate::gradient_lut::ColorFunction;
use crate::span_converter::SpanConverterFunction;
use crate::span_generator::SpanGenerator;
use crate::span_gradient::{downscale_shift, gradient_index, GradientFunction, GRADIENT_SUBPIXEL_SCALE};
use crate::span_interpolator_linear::SpanInterpolator;

// ============================================================================
// Alpha functions
// ============================================================================

/// Identity ramp: index `i` is alpha `i`, over the full channel range.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientAlphaX<V> {
    _value: PhantomData<V>,
}

impl<V: IntChannel> GradientAlphaX<V> {
    pub fn new() -> Self {
        Self { _value: PhantomData }
    }
}

impl<V: IntChannel> ColorFunction for GradientAlphaX<V> {
    type Color = V;

    #[inline]
    fn size(&self) -> usize {
        V::MAX as usize + 1
    }

    #[inline]
    fn get(&self, index: usize) -> V {
        V::from_i32(index.min(V::MAX as usize) as i32)
    }
}

/// Inverted ramp: index `i` is alpha `MAX - i`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientAlphaOneMinusX<V> {
    _value: PhantomData<V>,
}

impl<V: IntChannel> GradientAlphaOneMinusX<V> {
    pub fn new() -> Self {
        Self { _value: PhantomData }
    }
}

impl<V: IntChannel> ColorFunction for GradientAlphaOneMinusX<V> {
    type Color = V;

    #[inline]
    fn size(&self) -> usize {
        V::MAX as usize + 1
    }

    #[inline]
    fn get(&self, index: usize) -> V {
        V::from_i32(V::MAX - index.min(V::MAX as usize) as i32)
    }
}

// ============================================================================
// SpanGradientAlpha
// ============================================================================

pub struct SpanGradientAlpha<'a, C, I, G, A: ?Sized> {
    interpolator: I,
    gradient_function: G,
    alpha_function: &'a A,
    d1: i32,
    d2: i32,
    _color: PhantomData<C>,
}

impl<'a, C, I, G, A> SpanGradientAlpha<'a, C, I, G, A>
where
    C: AlphaColor,
    I: SpanInterpolator,
    G: GradientFunction,
    A: ColorFunction<Color = C::Alpha> + ?Sized,
{
    pub fn new(interpolator: I, gradient_function: G, alpha_function: &'a A, d1: f64, d2: f64) -> Self {
        Self {
            interpolator,
            gradient_function,
            alpha_function,
            d1: iround(d1 * GRADIENT_SUBPIXEL_SCALE as f64),
            d2: iround(d2 * GRADIENT_SUBPIXEL_SCALE as f64),
            _color: PhantomData,
        }
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn set_alpha_function(&mut self, alpha_function: &'a A) {
        self.alpha_function = alpha_function;
    }

    pub fn d1(&self) -> f64 {
        self.d1 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn d2(&self) -> f64 {
        self.d2 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn set_d1(&mut self, v: f64) {
        self.d1 = iround(v * GRADIENT_SUBPIXEL_SCALE as f64);
    }

    pub fn set_d2(&mut self, v: f64) {
        self.d2 = iround(v * GRADIENT_SUBPIXEL_SCALE as f64);
    }

    fn apply(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let size = self.alpha_function.size();
        if len == 0 || size == 0 {
            return;
        }
        let shift = downscale_shift(&self.interpolator);
        self.interpolator.begin(x as f64 + 0.5, y as f64 + 0.5, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (mut ix, mut iy) = (0, 0);
            self.interpolator.coordinates(&mut ix, &mut iy);
            let d = self
                .gradient_function
                .calculate(ix >> shift, iy >> shift, self.d2);
            pixel.set_alpha(
                self.alpha_function
                    .get(gradient_index(d, self.d1, self.d2, size)),
            );
            self.interpolator.next();
        }
    }
}

impl<'a, C, I, G, A> SpanGenerator for SpanGradientAlpha<'a, C, I, G, A>
where
    C: AlphaColor,
    I: SpanInterpolator,
    G: GradientFunction,
    A: ColorFunction<Color = C::Alpha> + ?Sized,
{
    type Color = C;

    fn prepare(&mut self) {}

    /// Only the alpha of `span[..len]` changes.
    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.apply(span, x, y, len);
    }
}

impl<'a, C, I, G, A> SpanConverterFunction for SpanGradientAlpha<'a, C, I, G, A>
where
    C: AlphaColor,
    I: SpanInterpolator,
    G: GradientFunction,
    A: ColorFunction<Color = C::Alpha> + ?Sized,
{
    type Color = C;

    fn convert(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.apply(span, x, y, len);
    }
}
