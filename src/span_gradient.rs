//! Gradient shapes and the gradient span generator.
//!
//! A gradient function maps a point, in gradient subpixels (1/16 pixel),
//! to a scalar distance. `SpanGradient` rebases the interpolator's
//! coordinates into that domain, evaluates the shape and turns the
//! distance into an index of its color function.

use crate::basics::{iround, uround};
use crate::gradient_lut::ColorFunction;
use crate::math::fast_sqrt;
use crate::span_generator::SpanGenerator;
use crate::span_interpolator_linear::SpanInterpolator;

pub const GRADIENT_SUBPIXEL_SHIFT: u32 = 4;
pub const GRADIENT_SUBPIXEL_SCALE: i32 = 1 << GRADIENT_SUBPIXEL_SHIFT;
pub const GRADIENT_SUBPIXEL_MASK: i32 = GRADIENT_SUBPIXEL_SCALE - 1;

/// Shape of a gradient. `d` is the gradient's far distance `d2`, which
/// some shapes use for normalization.
pub trait GradientFunction {
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32;
}

impl<G: GradientFunction + ?Sized> GradientFunction for &G {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        (**self).calculate(x, y, d)
    }
}

/// Right shift that takes interpolator subpixels to gradient subpixels.
#[inline]
pub fn downscale_shift<I: SpanInterpolator + ?Sized>(interp: &I) -> u32 {
    interp.subpixel_shift().saturating_sub(GRADIENT_SUBPIXEL_SHIFT)
}

/// Maps distance `d` into `[0, size - 1]` given the `[d1, d2]` range.
/// `size` must be non-zero.
#[inline]
pub fn gradient_index(d: i32, d1: i32, d2: i32, size: usize) -> usize {
    let dd = (d2 as i64 - d1 as i64).max(1);
    let idx = (d as i64 - d1 as i64) * size as i64 / dd;
    idx.clamp(0, size as i64 - 1) as usize
}

#[inline]
fn to_gradient_subpixel(v: f64) -> i32 {
    iround(v * GRADIENT_SUBPIXEL_SCALE as f64)
}

// ============================================================================
// Shapes
// ============================================================================

/// Linear along X.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientX;

impl GradientFunction for GradientX {
    #[inline]
    fn calculate(&self, x: i32, _y: i32, _d: i32) -> i32 {
        x
    }
}

/// Linear along Y.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientY;

impl GradientFunction for GradientY {
    #[inline]
    fn calculate(&self, _x: i32, y: i32, _d: i32) -> i32 {
        y
    }
}

/// Circle around the origin, table square root.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRadial;

impl GradientFunction for GradientRadial {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let r2 = (x as i64 * x as i64 + y as i64 * y as i64) as u64;
        match u32::try_from(r2) {
            Ok(v) => fast_sqrt(v) as i32,
            Err(_) => (r2 as f64).sqrt().round() as i32,
        }
    }
}

/// Circle around the origin, exact square root.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRadialD;

impl GradientFunction for GradientRadialD {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (x, y) = (x as f64, y as f64);
        uround((x * x + y * y).sqrt()) as i32
    }
}

/// `max(|x|, |y|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientDiamond;

impl GradientFunction for GradientDiamond {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        x.saturating_abs().max(y.saturating_abs())
    }
}

/// `|x| * |y| / d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientXY;

impl GradientFunction for GradientXY {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        let p = (x as i64).abs() * (y as i64).abs() / (d as i64).max(1);
        p.min(i32::MAX as i64) as i32
    }
}

/// `sqrt(|x| * |y|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientSqrtXY;

impl GradientFunction for GradientSqrtXY {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let p = (x as i64).unsigned_abs() * (y as i64).unsigned_abs();
        match u32::try_from(p) {
            Ok(v) => fast_sqrt(v) as i32,
            Err(_) => (p as f64).sqrt().round() as i32,
        }
    }
}

/// Angle from the positive X axis, `|atan2(y, x)| * d / pi`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientConic;

impl GradientFunction for GradientConic {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        uround((y as f64).atan2(x as f64).abs() * d as f64 / std::f64::consts::PI) as i32
    }
}

// ----------------------------------------------------------------------------
// Radial with focus
// ----------------------------------------------------------------------------

/// Circle of radius `r` seen from a focal point `(fx, fy)` inside it.
///
/// The distance is measured along the ray from the focus through the
/// sample, normalized so that the circle itself is at `r`.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadialFocus {
    r: i32,
    fx: i32,
    fy: i32,
    r2: f64,
    mul: f64,
}

impl GradientRadialFocus {
    /// Radius 100, centered focus.
    pub fn new_default() -> Self {
        Self::new(100.0, 0.0, 0.0)
    }

    pub fn new(r: f64, fx: f64, fy: f64) -> Self {
        let mut g = Self {
            r: 0,
            fx: 0,
            fy: 0,
            r2: 0.0,
            mul: 0.0,
        };
        g.init(r, fx, fy);
        g
    }

    pub fn init(&mut self, r: f64, fx: f64, fy: f64) {
        self.r = to_gradient_subpixel(r);
        self.fx = to_gradient_subpixel(fx);
        self.fy = to_gradient_subpixel(fy);
        self.update_values();
    }

    pub fn radius(&self) -> f64 {
        self.r as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_x(&self) -> f64 {
        self.fx as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_y(&self) -> f64 {
        self.fy as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    /// A focus exactly on the circle makes the denominator zero; it is
    /// then pulled one subpixel toward the center.
    fn update_values(&mut self) {
        self.r2 = self.r as f64 * self.r as f64;
        let mut d = self.r2 - self.focus_norm2();
        if d == 0.0 {
            self.fx -= self.fx.signum();
            self.fy -= self.fy.signum();
            d = self.r2 - self.focus_norm2();
        }
        self.mul = self.r as f64 / d;
    }

    fn focus_norm2(&self) -> f64 {
        let (fx, fy) = (self.fx as f64, self.fy as f64);
        fx * fx + fy * fy
    }
}

impl Default for GradientRadialFocus {
    fn default() -> Self {
        Self::new_default()
    }
}

impl GradientFunction for GradientRadialFocus {
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (fx, fy) = (self.fx as f64, self.fy as f64);
        let dx = x as f64 - fx;
        let dy = y as f64 - fy;
        let cross = dx * fy - dy * fx;
        let disc = self.r2 * (dx * dx + dy * dy) - cross * cross;
        iround((dx * fx + dy * fy + disc.abs().sqrt()) * self.mul)
    }
}

// ----------------------------------------------------------------------------
// Adaptors
// ----------------------------------------------------------------------------

/// Tiles the wrapped shape every `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRepeatAdaptor<G> {
    gradient: G,
}

impl<G: GradientFunction> GradientRepeatAdaptor<G> {
    pub fn new(gradient: G) -> Self {
        Self { gradient }
    }
}

impl<G: GradientFunction> GradientFunction for GradientRepeatAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        if d <= 0 {
            return 0;
        }
        self.gradient.calculate(x, y, d).rem_euclid(d)
    }
}

/// Mirrors the wrapped shape at every multiple of `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientReflectAdaptor<G> {
    gradient: G,
}

impl<G: GradientFunction> GradientReflectAdaptor<G> {
    pub fn new(gradient: G) -> Self {
        Self { gradient }
    }
}

impl<G: GradientFunction> GradientFunction for GradientReflectAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        if d <= 0 {
            return 0;
        }
        let period = d as i64 * 2;
        let v = (self.gradient.calculate(x, y, d) as i64).rem_euclid(period);
        (if v >= d as i64 { period - v } else { v }) as i32
    }
}

// ============================================================================
// SpanGradient
// ============================================================================

/// Color gradient span generator.
///
/// `d1` and `d2` are the distances, in pixels, mapped to the first and
/// the last entry of the color function.
#[derive(Debug, Clone)]
pub struct SpanGradient<'a, I, G, F: ?Sized> {
    interpolator: I,
    gradient_function: G,
    color_function: &'a F,
    d1: i32,
    d2: i32,
}

impl<'a, I, G, F> SpanGradient<'a, I, G, F>
where
    I: SpanInterpolator,
    G: GradientFunction,
    F: ColorFunction + ?Sized,
{
    pub fn new(interpolator: I, gradient_function: G, color_function: &'a F, d1: f64, d2: f64) -> Self {
        Self {
            interpolator,
            gradient_function,
            color_function,
            d1: to_gradient_subpixel(d1),
            d2: to_gradient_subpixel(d2),
        }
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn gradient_function(&self) -> &G {
        &self.gradient_function
    }

    pub fn color_function(&self) -> &F {
        self.color_function
    }

    pub fn set_color_function(&mut self, color_function: &'a F) {
        self.color_function = color_function;
    }

    pub fn d1(&self) -> f64 {
        self.d1 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn d2(&self) -> f64 {
        self.d2 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn set_d1(&mut self, v: f64) {
        self.d1 = to_gradient_subpixel(v);
    }

    pub fn set_d2(&mut self, v: f64) {
        self.d2 = to_gradient_subpixel(v);
    }
}

impl<'a, I, G, F> SpanGenerator for SpanGradient<'a, I, G, F>
where
    I: SpanInterpolator,
    G: GradientFunction,
    F: ColorFunction + ?Sized,
{
    type Color = F::Color;

    fn prepare(&mut self) {}

    /// An empty color function leaves the span untouched.
    fn generate(&mut self, span: &mut [F::Color], x: i32, y: i32, len: u32) {
        let size = self.color_function.size();
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
            *pixel = self
                .color_function
                .get(gradient_index(d, self.d1, self.d2, size));
            self.interpolator.next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::gradient_lut::{GradientLinearColor, GradientLut};
    use crate::span_interpolator_linear::SpanInterpolatorLinear;
    use crate::trans_affine::TransAffine;
    use std::cell::Cell;

    #[test]
    fn test_linear_shapes() {
        assert_eq!(GradientX.calculate(100, 200, 500), 100);
        assert_eq!(GradientX.calculate(-50, 200, 500), -50);
        assert_eq!(GradientY.calculate(100, -50, 500), -50);
    }

    #[test]
    fn test_radial_shapes() {
        assert_eq!(GradientRadial.calculate(3, 4, 100), 5);
        assert_eq!(GradientRadial.calculate(0, 0, 100), 0);
        assert_eq!(GradientRadialD.calculate(3, 4, 100), 5);
        assert_eq!(GradientRadialD.calculate(-300, 400, 100), 500);
        let far = GradientRadial.calculate(60000, 80000, 100);
        assert_eq!(far, 100000);
    }

    #[test]
    fn test_diamond_xy_sqrt_xy() {
        assert_eq!(GradientDiamond.calculate(3, -8, 100), 8);
        assert_eq!(GradientDiamond.calculate(-7, 5, 100), 7);
        assert_eq!(GradientXY.calculate(-10, 20, 100), 2);
        assert_eq!(GradientXY.calculate(10, 20, 0), 200);
        assert_eq!(GradientSqrtXY.calculate(100, -100, 500), 100);
    }

    #[test]
    fn test_conic() {
        assert_eq!(GradientConic.calculate(1, 0, 100), 0);
        assert_eq!(GradientConic.calculate(0, 1, 100), 50);
        assert_eq!(GradientConic.calculate(-1, 0, 100), 100);
        assert_eq!(GradientConic.calculate(0, -1, 100), 50);
    }

    #[test]
    fn test_radial_focus_centered_matches_radial() {
        let g = GradientRadialFocus::new(100.0, 0.0, 0.0);
        assert_eq!(g.calculate(0, 0, 1600), 0);
        for (x, y) in [(1600, 0), (0, -800), (300, 400)] {
            let d = g.calculate(x, y, 1600);
            assert!((d - GradientRadialD.calculate(x, y, 0)).abs() <= 1);
        }
    }

    #[test]
    fn test_radial_focus_reaches_circle() {
        let g = GradientRadialFocus::new(100.0, 40.0, 0.0);
        // Every point of the circle is at distance r.
        for (x, y) in [(1600, 0), (-1600, 0), (0, 1600)] {
            assert!((g.calculate(x, y, 1600) - 1600).abs() <= 2);
        }
        // The focus itself is at distance 0.
        assert_eq!(g.calculate(640, 0, 1600), 0);
    }

    #[test]
    fn test_radial_focus_on_circle_is_nudged() {
        let g = GradientRadialFocus::new(10.0, 10.0, 0.0);
        assert_eq!(g.focus_x(), 10.0 - 1.0 / 16.0);
        assert!(g.calculate(0, 0, 160).abs() < i32::MAX);
        assert!(g.mul.is_finite());
        assert_eq!(GradientRadialFocus::default().radius(), 100.0);
    }

    #[test]
    fn test_repeat_and_reflect() {
        let rep = GradientRepeatAdaptor::new(GradientX);
        assert_eq!(rep.calculate(250, 0, 100), 50);
        assert_eq!(rep.calculate(-30, 0, 100), 70);
        assert_eq!(rep.calculate(5, 0, 0), 0);

        let refl = GradientReflectAdaptor::new(GradientX);
        assert_eq!(refl.calculate(30, 0, 100), 30);
        assert_eq!(refl.calculate(130, 0, 100), 70);
        assert_eq!(refl.calculate(-30, 0, 100), 30);
        assert_eq!(refl.calculate(200, 0, 100), 0);
    }

    #[test]
    fn test_gradient_index_bounds() {
        assert_eq!(gradient_index(0, 0, 1600, 256), 0);
        assert_eq!(gradient_index(800, 0, 1600, 256), 128);
        assert_eq!(gradient_index(-5000, 0, 1600, 256), 0);
        assert_eq!(gradient_index(i32::MAX, 0, 1600, 256), 255);
        assert_eq!(gradient_index(i32::MIN, i32::MAX, i32::MIN, 256), 0);
        assert_eq!(gradient_index(7, 7, 7, 1), 0);
    }

    /// Records every index the generator asks for.
    struct Probe {
        size: usize,
        seen: Cell<(usize, usize)>,
    }

    impl ColorFunction for Probe {
        type Color = usize;

        fn size(&self) -> usize {
            self.size
        }

        fn get(&self, index: usize) -> usize {
            let (lo, hi) = self.seen.get();
            self.seen.set((lo.min(index), hi.max(index)));
            index
        }
    }

    #[test]
    fn test_generated_indices_stay_in_range() {
        let probe = Probe {
            size: 64,
            seen: Cell::new((usize::MAX, 0)),
        };
        let shapes: [&dyn GradientFunction; 5] = [
            &GradientX,
            &GradientRadial,
            &GradientXY,
            &GradientConic,
            &GradientReflectAdaptor::new(GradientY),
        ];
        let mut span = vec![0usize; 400];
        for shape in shapes {
            let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(7.0, 3.0));
            let mut sg = SpanGradient::new(interp, shape, &probe, 10.0, 50.0);
            sg.generate(&mut span, -200, -37, 400);
            sg.generate(&mut span, 0, 90, 400);
        }
        let (lo, hi) = probe.seen.get();
        assert_eq!((lo, hi), (0, 63));
    }

    #[test]
    fn test_horizontal_black_to_white() {
        let gc = GradientLinearColor::new(Rgba8::new(0, 0, 0, 255), Rgba8::new(255, 255, 255, 255), 256);
        let interp = SpanInterpolatorLinear::new(TransAffine::new());
        let mut sg = SpanGradient::new(interp, GradientX, &gc, 0.0, 100.0);
        let mut span = vec![Rgba8::default(); 100];
        sg.generate(&mut span, 0, 0, 100);
        assert!(span[0].r <= 2);
        assert!(span[99].r >= 250);
        assert!(span.windows(2).all(|w| w[1].r >= w[0].r));
    }

    #[test]
    fn test_zero_length_and_partial_write() {
        let mut lut = GradientLut::new_default();
        lut.add_color(0.0, Rgba8::new(255, 0, 0, 255));
        lut.add_color(1.0, Rgba8::new(0, 0, 255, 255));
        lut.build_lut();
        let interp = SpanInterpolatorLinear::new(TransAffine::new());
        let mut sg = SpanGradient::new(interp, GradientX, &lut, 0.0, 10.0);
        let sentinel = Rgba8::new(1, 2, 3, 4);
        let mut span = vec![sentinel; 8];
        sg.generate(&mut span, 0, 0, 0);
        assert!(span.iter().all(|c| *c == sentinel));
        sg.generate(&mut span, 20, 0, 4);
        assert!(span[..4].iter().all(|c| *c == Rgba8::new(0, 0, 255, 255)));
        assert!(span[4..].iter().all(|c| *c == sentinel));
    }

    #[test]
    fn test_d1_d2_accessors() {
        let lut = GradientLut::<Rgba8>::new_default();
        let interp = SpanInterpolatorLinear::new(TransAffine::new());
        let mut sg = SpanGradient::new(interp, GradientX, &lut, 1.5, 20.0);
        assert_eq!((sg.d1(), sg.d2()), (1.5, 20.0));
        sg.set_d2(40.0);
        assert_eq!(sg.d2(), 40.0);
    }
}
