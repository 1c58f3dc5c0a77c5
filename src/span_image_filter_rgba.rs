//! RGBA image transformation span generators.
//!
//! Nearest neighbor, bilinear, bilinear with background, 2x2 kernel,
//! general N-tap kernel, and the two resamplers. Source pixels are
//! premultiplied; every weighted sum is clamped so that no color channel
//! exceeds alpha.

use std::marker::PhantomData;

use crate::color::{clamp_to_alpha, ChannelOrder, ChannelValue, RgbaColor};
use crate::config::ResampleConfig;
use crate::error::Result;
use crate::image_accessors::ImageSource;
use crate::image_filters::ImageFilterLut;
use crate::rendering_buffer::RowAccessor;
use crate::span_generator::SpanGenerator;
use crate::span_image_filter::{
    sample_2x2, sample_bilinear, sample_bilinear_clip, sample_general, sample_nn,
    sample_resample, ChannelReader, SpanImageFilterBase, SpanImageResample,
    SpanImageResampleAffine,
};
use crate::span_interpolator_linear::{InterpolatorTransformer, ScalingAbs, SpanInterpolator};

type Calc<C> = <<C as RgbaColor>::Value as ChannelValue>::Calc;

fn rgba_reader<V: ChannelValue>(order: ChannelOrder) -> ChannelReader<V, 4> {
    ChannelReader::new([Some(order.r), Some(order.g), Some(order.b), Some(order.a)])
}

#[inline]
fn rgba_color<C: RgbaColor>(fg: [Calc<C>; 4]) -> C {
    let [r, g, b, a] = clamp_to_alpha::<C::Value>(fg);
    C::from_channels(r, g, b, a)
}

// ============================================================================
// SpanImageFilterRgbaNn
// ============================================================================

/// Nearest-neighbor sampling: copies the source pixel under each mapped
/// position.
pub struct SpanImageFilterRgbaNn<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgbaNn<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageFilterBase::new(interpolator, None),
            source,
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S, I, C> SpanGenerator for SpanImageFilterRgbaNn<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.source.order());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let [r, g, b, a] = sample_nn(&mut self.source, &reader, cx, cy);
            *pixel = C::from_channels(r, g, b, a);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgbaBilinear
// ============================================================================

/// Bilinear blend of the 2x2 neighborhood. Boundary handling is the
/// source accessor's job.
pub struct SpanImageFilterRgbaBilinear<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgbaBilinear<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageFilterBase::new(interpolator, None),
            source,
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S, I, C> SpanGenerator for SpanImageFilterRgbaBilinear<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.source.order());
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            *pixel = rgba_color::<C>(sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgbaBilinearClip
// ============================================================================

/// Bilinear blend read straight from a row buffer, with a background color
/// for samples outside the image.
pub struct SpanImageFilterRgbaBilinearClip<'a, I, C> {
    base: SpanImageFilterBase<'a, I>,
    rbuf: RowAccessor<'a>,
    background: C,
}

impl<'a, I, C: RgbaColor> SpanImageFilterRgbaBilinearClip<'a, I, C> {
    pub fn new(rbuf: RowAccessor<'a>, background: C, interpolator: I) -> Self {
        debug_assert!(rbuf.pix_width() >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageFilterBase::new(interpolator, None),
            rbuf,
            background,
        }
    }

    pub fn background_color(&self) -> C {
        self.background
    }

    pub fn set_background_color(&mut self, v: C) {
        self.background = v;
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }
}

impl<I, C> SpanGenerator for SpanImageFilterRgbaBilinearClip<'_, I, C>
where
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.rbuf.order());
        let back = self.background.channels().map(ChannelValue::to_calc);
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            *pixel = rgba_color::<C>(sample_bilinear_clip(&self.rbuf, &reader, back, cx - dx, cy - dy));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgba2x2
// ============================================================================

/// 2x2 footprint weighted by the central taps of a kernel table. Falls back
/// to bilinear when the table is empty.
pub struct SpanImageFilterRgba2x2<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgba2x2<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageFilterBase::new(interpolator, Some(filter)),
            source,
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S, I, C> SpanGenerator for SpanImageFilterRgba2x2<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.source.order());
        let kernel = self.base.kernel();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = match kernel {
                Some(lut) => sample_2x2(&mut self.source, &reader, lut, cx - dx, cy - dy),
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = rgba_color::<C>(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgba
// ============================================================================

/// General `diameter x diameter` convolution. Kernels with negative lobes
/// can overshoot; results are clamped to `[0, alpha]`.
pub struct SpanImageFilterRgba<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgba<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageFilterBase::new(interpolator, Some(filter)),
            source,
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S, I, C> SpanGenerator for SpanImageFilterRgba<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.source.order());
        let kernel = self.base.kernel();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = match kernel {
                Some(lut) => sample_general(&mut self.source, &reader, lut, cx - dx, cy - dy),
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = rgba_color::<C>(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleRgbaAffine
// ============================================================================

/// Resampler for affine interpolators: the kernel is stretched over the
/// footprint computed in `prepare`.
pub struct SpanImageResampleRgbaAffine<'a, S, I, C> {
    base: SpanImageResampleAffine<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageResampleRgbaAffine<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageResampleAffine::new(interpolator, filter),
            source,
            _color: PhantomData,
        }
    }

    pub fn resample_base(&self) -> &SpanImageResampleAffine<'a, I> {
        &self.base
    }

    pub fn resample_base_mut(&mut self) -> &mut SpanImageResampleAffine<'a, I> {
        &mut self.base
    }

    pub fn apply_config(&mut self, config: &ResampleConfig) -> Result<()> {
        self.base.apply_config(config)
    }
}

impl<S, I, C> SpanGenerator for SpanImageResampleRgbaAffine<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator + InterpolatorTransformer,
    I::Transformer: ScalingAbs,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {
        self.base.prepare();
    }

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.source.order());
        let footprint = self.base.footprint();
        let base = self.base.base_mut();
        let kernel = base.kernel();
        let (dx, dy) = (base.filter_dx_int(), base.filter_dy_int());
        base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = base.coordinates();
            let fg = match kernel {
                Some(lut) => {
                    sample_resample(&mut self.source, &reader, lut, footprint, cx + dx, cy + dy)
                }
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = rgba_color::<C>(fg);
            base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleRgba
// ============================================================================

/// Resampler for interpolators with a per-pixel scale estimate, such as
/// the perspective ones.
pub struct SpanImageResampleRgba<'a, S, I, C> {
    base: SpanImageResample<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageResampleRgba<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            base: SpanImageResample::new(interpolator, filter),
            source,
            _color: PhantomData,
        }
    }

    pub fn resample_base(&self) -> &SpanImageResample<'a, I> {
        &self.base
    }

    pub fn resample_base_mut(&mut self) -> &mut SpanImageResample<'a, I> {
        &mut self.base
    }

    pub fn apply_config(&mut self, config: &ResampleConfig) -> Result<()> {
        self.base.apply_config(config)
    }
}

impl<S, I, C> SpanGenerator for SpanImageResampleRgba<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgba_reader::<C::Value>(self.source.order());
        let kernel = self.base.base().kernel();
        let (dx, dy) = (self.base.base().filter_dx_int(), self.base.base().filter_dy_int());
        self.base.base_mut().begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.base().coordinates();
            let fg = match kernel {
                Some(lut) => {
                    let fp = self.base.local_footprint();
                    sample_resample(&mut self.source, &reader, lut, fp, cx + dx, cy + dy)
                }
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = rgba_color::<C>(fg);
            self.base.base_mut().next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgba16, Rgba32, Rgba8};
    use crate::image_accessors::ImageAccessorClone;
    use crate::image_filters::{ImageFilterBicubic, ImageFilterBilinear, ImageFilterSinc};
    use crate::span_interpolator_linear::SpanInterpolatorLinear;
    use crate::trans_affine::TransAffine;

    type Clone4<'a> = ImageAccessorClone<'a, 4>;

    fn image(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        data
    }

    fn linear(trans: TransAffine) -> SpanInterpolatorLinear<TransAffine> {
        SpanInterpolatorLinear::new(trans)
    }

    fn pattern(x: u32, y: u32) -> [u8; 4] {
        let v = (x * 40 + y * 7) as u8;
        [v / 2, v / 3, v / 4, v]
    }

    #[test]
    fn test_nn_identity() {
        let data = image(4, 4, pattern);
        let rbuf = RowAccessor::packed(&data, 4, 4, 4).unwrap();
        let mut sg: SpanImageFilterRgbaNn<_, _, Rgba8> =
            SpanImageFilterRgbaNn::new(Clone4::new(rbuf), linear(TransAffine::new()));
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 0, 2, 4);
        for (x, p) in span.iter().enumerate() {
            assert_eq!(p.channels(), pattern(x as u32, 2));
        }
    }

    #[test]
    fn test_nn_translation_and_order() {
        let data = image(4, 4, |x, y| if (x, y) == (2, 2) { [9, 8, 7, 255] } else { [0; 4] });
        let rbuf = RowAccessor::packed(&data, 4, 4, 4)
            .unwrap()
            .with_order(ChannelOrder::BGRA);
        let mut sg: SpanImageFilterRgbaNn<_, _, Rgba8> =
            SpanImageFilterRgbaNn::new(Clone4::new(rbuf), linear(TransAffine::new_translation(2.0, 2.0)));
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(7, 8, 9, 255));
    }

    #[test]
    fn test_bilinear_identity_reproduces_source() {
        let data = image(6, 5, pattern);
        let rbuf = RowAccessor::packed(&data, 6, 5, 4).unwrap();
        let mut sg: SpanImageFilterRgbaBilinear<_, _, Rgba8> =
            SpanImageFilterRgbaBilinear::new(Clone4::new(rbuf), linear(TransAffine::new()));
        let mut span = [Rgba8::default(); 6];
        for y in 0..5 {
            sg.generate(&mut span, 0, y, 6);
            for (x, p) in span.iter().enumerate() {
                assert_eq!(p.channels(), pattern(x as u32, y as u32), "({x},{y})");
            }
        }
    }

    #[test]
    fn test_bilinear_half_pixel_blend() {
        let data = image(2, 1, |x, _| if x == 0 { [0, 0, 0, 255] } else { [200, 100, 50, 255] });
        let rbuf = RowAccessor::packed(&data, 2, 1, 4).unwrap();
        let mut sg: SpanImageFilterRgbaBilinear<_, _, Rgba8> = SpanImageFilterRgbaBilinear::new(
            Clone4::new(rbuf),
            linear(TransAffine::new_translation(0.5, 0.0)),
        );
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(100, 50, 25, 255));
    }

    #[test]
    fn test_bilinear_float_source() {
        let mut data = Vec::new();
        for px in [[0.0f32, 0.0, 0.0, 1.0], [1.0, 0.5, 0.25, 1.0]] {
            for c in px {
                data.extend_from_slice(&c.to_ne_bytes());
            }
        }
        let rbuf = RowAccessor::packed(&data, 2, 1, 16).unwrap();
        let mut sg: SpanImageFilterRgbaBilinear<_, _, Rgba32> = SpanImageFilterRgbaBilinear::new(
            ImageAccessorClone::<16>::new(rbuf),
            linear(TransAffine::new_translation(0.5, 0.0)),
        );
        let mut span = [Rgba32::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba32::new(0.5, 0.25, 0.125, 1.0));
    }

    #[test]
    fn test_bilinear_clip_background() {
        let data = image(4, 4, |_, _| [100, 100, 100, 255]);
        let rbuf = RowAccessor::packed(&data, 4, 4, 4).unwrap();
        let bg = Rgba8::new(55, 66, 77, 88);
        let mut sg = SpanImageFilterRgbaBilinearClip::new(rbuf, bg, linear(TransAffine::new()));
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, -10, -10, 1);
        assert_eq!(span[0], bg);
        sg.generate(&mut span, 1, 1, 1);
        assert_eq!(span[0], Rgba8::new(100, 100, 100, 255));

        sg.set_background_color(Rgba8::new(0, 0, 0, 0));
        assert_eq!(sg.background_color(), Rgba8::default());
    }

    #[test]
    fn test_bilinear_clip_fades_at_edge() {
        let data = image(4, 4, |_, _| [200, 200, 200, 200]);
        let rbuf = RowAccessor::packed(&data, 4, 4, 4).unwrap();
        let mut sg = SpanImageFilterRgbaBilinearClip::new(
            rbuf,
            Rgba8::default(),
            linear(TransAffine::new_translation(-0.5, 0.0)),
        );
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 1, 1);
        assert_eq!(span[0], Rgba8::new(100, 100, 100, 100));
    }

    #[test]
    fn test_2x2_uniform_region() {
        let data = image(4, 4, |_, _| [120, 60, 30, 200]);
        let rbuf = RowAccessor::packed(&data, 4, 4, 4).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBilinear, true);
        let mut sg: SpanImageFilterRgba2x2<_, _, Rgba8> =
            SpanImageFilterRgba2x2::new(Clone4::new(rbuf), linear(TransAffine::new_translation(0.3, 0.7)), &lut);
        let mut span = [Rgba8::default(); 3];
        sg.generate(&mut span, 0, 1, 3);
        for p in span {
            assert!((p.r as i32 - 120).abs() <= 1);
            assert!((p.a as i32 - 200).abs() <= 1);
        }
    }

    #[test]
    fn test_general_clamps_to_alpha() {
        // Sharp opaque-to-transparent step; sinc rings past both sides.
        let data = image(8, 1, |x, _| if x < 4 { [255, 255, 255, 255] } else { [0, 0, 0, 0] });
        let rbuf = RowAccessor::packed(&data, 8, 1, 4).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterSinc::new(3.0), true);
        let mut sg: SpanImageFilterRgba<_, _, Rgba8> =
            SpanImageFilterRgba::new(Clone4::new(rbuf), linear(TransAffine::new_translation(0.4, 0.0)), &lut);
        let mut span = [Rgba8::default(); 8];
        sg.generate(&mut span, 0, 0, 8);
        for p in span {
            assert!(p.r <= p.a && p.g <= p.a && p.b <= p.a, "{p:?}");
        }
        assert!(span[0].a >= 250);
        assert_eq!(span[7].a, 0);
    }

    #[test]
    fn test_general_empty_table_falls_back_to_bilinear() {
        let data = image(5, 3, pattern);
        let rbuf = RowAccessor::packed(&data, 5, 3, 4).unwrap();
        let empty = ImageFilterLut::new();
        let trans = TransAffine::new_translation(0.25, 0.5);
        let mut general: SpanImageFilterRgba<_, _, Rgba8> =
            SpanImageFilterRgba::new(Clone4::new(rbuf), linear(trans), &empty);
        let mut bilinear: SpanImageFilterRgbaBilinear<_, _, Rgba8> =
            SpanImageFilterRgbaBilinear::new(Clone4::new(rbuf), linear(trans));
        let mut a = [Rgba8::default(); 5];
        let mut b = [Rgba8::default(); 5];
        general.generate(&mut a, 0, 1, 5);
        bilinear.generate(&mut b, 0, 1, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_resample_affine_uniform_minification() {
        let data = image(16, 16, |_, _| [60, 120, 180, 255]);
        let rbuf = RowAccessor::packed(&data, 16, 16, 4).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBicubic, true);
        let mut sg: SpanImageResampleRgbaAffine<_, _, Rgba8> = SpanImageResampleRgbaAffine::new(
            Clone4::new(rbuf),
            linear(TransAffine::new_scaling(2.0, 2.0)),
            &lut,
        );
        sg.prepare();
        assert_eq!(sg.resample_base().rx(), 512);
        let mut span = [Rgba8::default(); 8];
        sg.generate(&mut span, 0, 3, 8);
        assert!(span.iter().all(|p| *p == Rgba8::new(60, 120, 180, 255)));
    }

    #[test]
    fn test_resample_affine_sixteen_bit() {
        let mut data = Vec::new();
        for _ in 0..64 {
            for c in [1000u16, 2000, 3000, 65535] {
                data.extend_from_slice(&c.to_ne_bytes());
            }
        }
        let rbuf = RowAccessor::packed(&data, 8, 8, 8).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBilinear, true);
        let mut sg: SpanImageResampleRgbaAffine<_, _, Rgba16> = SpanImageResampleRgbaAffine::new(
            ImageAccessorClone::<8>::new(rbuf),
            linear(TransAffine::new_scaling(3.0, 1.5)),
            &lut,
        );
        sg.apply_config(&ResampleConfig::default()).unwrap();
        sg.prepare();
        let mut span = [Rgba16::default(); 2];
        sg.generate(&mut span, 0, 2, 2);
        assert!(span.iter().all(|p| *p == Rgba16::new(1000, 2000, 3000, 65535)));
    }

    #[test]
    fn test_resample_general_uniform() {
        let data = image(8, 8, |_, _| [10, 20, 30, 40]);
        let rbuf = RowAccessor::packed(&data, 8, 8, 4).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBicubic, true);
        let mut sg: SpanImageResampleRgba<_, _, Rgba8> =
            SpanImageResampleRgba::new(Clone4::new(rbuf), linear(TransAffine::new()), &lut);
        sg.prepare();
        let mut span = [Rgba8::default(); 8];
        sg.generate(&mut span, 0, 4, 8);
        assert!(span.iter().all(|p| *p == Rgba8::new(10, 20, 30, 40)));
    }
}
