//! RGB image transformation span generators.
//!
//! The same filter family as the RGBA generators, for three-channel
//! sources. The produced alpha is always full, except where the clipping
//! generator blends in its background color.

use std::marker::PhantomData;

use crate::color::{ChannelOrder, ChannelValue, RgbaColor};
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

fn rgb_reader<V: ChannelValue>(order: ChannelOrder) -> ChannelReader<V, 4> {
    ChannelReader::new([Some(order.r), Some(order.g), Some(order.b), None])
}

#[inline]
fn rgb_color<C: RgbaColor>(fg: [Calc<C>; 4]) -> C {
    C::from_channels(
        C::Value::from_calc(fg[0]),
        C::Value::from_calc(fg[1]),
        C::Value::from_calc(fg[2]),
        C::Value::FULL,
    )
}

#[inline]
fn rgb_clip_color<C: RgbaColor>(fg: [Calc<C>; 4]) -> C {
    let [r, g, b, a] = fg.map(C::Value::from_calc);
    C::from_channels(r, g, b, a)
}

// ============================================================================
// SpanImageFilterRgbNn
// ============================================================================

/// Nearest-neighbor sampling: copies the source pixel under each mapped
/// position.
pub struct SpanImageFilterRgbNn<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgbNn<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterRgbNn<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgb_reader::<C::Value>(self.source.order());
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
// SpanImageFilterRgbBilinear
// ============================================================================

/// Bilinear blend of the 2x2 neighborhood. Boundary handling is the
/// source accessor's job.
pub struct SpanImageFilterRgbBilinear<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgbBilinear<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterRgbBilinear<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgb_reader::<C::Value>(self.source.order());
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            *pixel = rgb_color::<C>(sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgbBilinearClip
// ============================================================================

/// Bilinear blend read straight from a row buffer, with a background color
/// for samples outside the image. Alpha is full inside the image and blends
/// toward the background alpha across the edge.
pub struct SpanImageFilterRgbBilinearClip<'a, I, C> {
    base: SpanImageFilterBase<'a, I>,
    rbuf: RowAccessor<'a>,
    background: C,
}

impl<'a, I, C: RgbaColor> SpanImageFilterRgbBilinearClip<'a, I, C> {
    pub fn new(rbuf: RowAccessor<'a>, background: C, interpolator: I) -> Self {
        debug_assert!(rbuf.pix_width() >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<I, C> SpanGenerator for SpanImageFilterRgbBilinearClip<'_, I, C>
where
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgb_reader::<C::Value>(self.rbuf.order());
        let back = self.background.channels().map(ChannelValue::to_calc);
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            *pixel = rgb_clip_color::<C>(sample_bilinear_clip(&self.rbuf, &reader, back, cx - dx, cy - dy));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgb2x2
// ============================================================================

/// 2x2 footprint weighted by the central taps of a kernel table. Falls back
/// to bilinear when the table is empty.
pub struct SpanImageFilterRgb2x2<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgb2x2<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterRgb2x2<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgb_reader::<C::Value>(self.source.order());
        let kernel = self.base.kernel();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = match kernel {
                Some(lut) => sample_2x2(&mut self.source, &reader, lut, cx - dx, cy - dy),
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = rgb_color::<C>(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterRgb
// ============================================================================

/// General `diameter x diameter` convolution. Kernels with negative lobes
/// can overshoot; results are clamped to the channel range.
pub struct SpanImageFilterRgb<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageFilterRgb<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterRgb<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgb_reader::<C::Value>(self.source.order());
        let kernel = self.base.kernel();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = match kernel {
                Some(lut) => sample_general(&mut self.source, &reader, lut, cx - dx, cy - dy),
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = rgb_color::<C>(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleRgbAffine
// ============================================================================

/// Resampler for affine interpolators: the kernel is stretched over the
/// footprint computed in `prepare`.
pub struct SpanImageResampleRgbAffine<'a, S, I, C> {
    base: SpanImageResampleAffine<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageResampleRgbAffine<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageResampleRgbAffine<'_, S, I, C>
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
        let reader = rgb_reader::<C::Value>(self.source.order());
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
            *pixel = rgb_color::<C>(fg);
            base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleRgb
// ============================================================================

/// Resampler for interpolators with a per-pixel scale estimate, such as
/// the perspective ones.
pub struct SpanImageResampleRgb<'a, S, I, C> {
    base: SpanImageResample<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: RgbaColor> SpanImageResampleRgb<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageResampleRgb<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: RgbaColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = rgb_reader::<C::Value>(self.source.order());
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
            *pixel = rgb_color::<C>(fg);
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
    use crate::color::{Rgba16, Rgba8};
    use crate::image_accessors::{ImageAccessorClip, ImageAccessorClone};
    use crate::image_filters::{ImageFilterBilinear, ImageFilterSpline16};
    use crate::span_interpolator_linear::SpanInterpolatorLinear;
    use crate::trans_affine::TransAffine;

    type Clone3<'a> = ImageAccessorClone<'a, 3>;

    fn image(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
        let f = &f;
        (0..height)
            .flat_map(|y| (0..width).flat_map(move |x| f(x, y)))
            .collect()
    }

    fn linear(trans: TransAffine) -> SpanInterpolatorLinear<TransAffine> {
        SpanInterpolatorLinear::new(trans)
    }

    #[test]
    fn test_nn_bgr_source_is_opaque() {
        let data = image(3, 1, |x, _| [x as u8 * 10, 100, 200]);
        let rbuf = RowAccessor::packed(&data, 3, 1, 3)
            .unwrap()
            .with_order(ChannelOrder::BGR);
        let mut sg: SpanImageFilterRgbNn<_, _, Rgba8> =
            SpanImageFilterRgbNn::new(Clone3::new(rbuf), linear(TransAffine::new()));
        let mut span = [Rgba8::default(); 3];
        sg.generate(&mut span, 0, 0, 3);
        assert_eq!(span[2], Rgba8::new(200, 100, 20, 255));
    }

    #[test]
    fn test_bilinear_identity_reproduces_source() {
        let data = image(5, 4, |x, y| [(x * 50) as u8, (y * 60) as u8, (x * y * 10) as u8]);
        let rbuf = RowAccessor::packed(&data, 5, 4, 3).unwrap();
        let mut sg: SpanImageFilterRgbBilinear<_, _, Rgba8> =
            SpanImageFilterRgbBilinear::new(Clone3::new(rbuf), linear(TransAffine::new()));
        let mut span = [Rgba8::default(); 5];
        for y in 0..4 {
            sg.generate(&mut span, 0, y, 5);
            for (x, p) in span.iter().enumerate() {
                let (x, y) = (x as u32, y as u32);
                assert_eq!(*p, Rgba8::new(x * 50, y * 60, x * y * 10, 255));
            }
        }
    }

    #[test]
    fn test_bilinear_through_clip_accessor() {
        let data = image(2, 2, |_, _| [250, 250, 250]);
        let rbuf = RowAccessor::packed(&data, 2, 2, 3).unwrap();
        let src = ImageAccessorClip::<3>::new(rbuf, &[0, 0, 0]);
        let mut sg: SpanImageFilterRgbBilinear<_, _, Rgba8> =
            SpanImageFilterRgbBilinear::new(src, linear(TransAffine::new_translation(0.5, 0.0)));
        let mut span = [Rgba8::default(); 2];
        sg.generate(&mut span, 0, 0, 2);
        assert_eq!(span[0], Rgba8::new(250, 250, 250, 255));
        // Half of the right-hand sample reads the black background.
        assert_eq!(span[1], Rgba8::new(125, 125, 125, 255));
    }

    #[test]
    fn test_bilinear_clip_blends_background_alpha() {
        let data = image(2, 2, |_, _| [200, 200, 200]);
        let rbuf = RowAccessor::packed(&data, 2, 2, 3).unwrap();
        let mut sg = SpanImageFilterRgbBilinearClip::new(
            rbuf,
            Rgba8::new(0, 0, 0, 0),
            linear(TransAffine::new_translation(-0.5, 0.0)),
        );
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(100, 100, 100, 128));
        sg.generate(&mut span, 50, 50, 1);
        assert_eq!(span[0], Rgba8::default());
    }

    #[test]
    fn test_general_overshoot_is_clamped() {
        let data = image(8, 1, |x, _| if x < 4 { [255, 0, 255] } else { [0, 255, 0] });
        let rbuf = RowAccessor::packed(&data, 8, 1, 3).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterSpline16, true);
        let mut sg: SpanImageFilterRgb<_, _, Rgba8> =
            SpanImageFilterRgb::new(Clone3::new(rbuf), linear(TransAffine::new_translation(0.5, 0.0)), &lut);
        let mut span = [Rgba8::default(); 8];
        sg.generate(&mut span, 0, 0, 8);
        assert!(span.iter().all(|p| p.a == 255));
        assert!(span[0].r >= 250 && span[0].g <= 5);
        assert!(span[7].g >= 250 && span[7].r <= 5);
    }

    #[test]
    fn test_2x2_sixteen_bit() {
        let mut data = Vec::new();
        for _ in 0..16 {
            for c in [40000u16, 20000, 10000] {
                data.extend_from_slice(&c.to_ne_bytes());
            }
        }
        let rbuf = RowAccessor::packed(&data, 4, 4, 6).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBilinear, true);
        let mut sg: SpanImageFilterRgb2x2<_, _, Rgba16> = SpanImageFilterRgb2x2::new(
            ImageAccessorClone::<6>::new(rbuf),
            linear(TransAffine::new_translation(0.25, 0.25)),
            &lut,
        );
        let mut span = [Rgba16::default(); 2];
        sg.generate(&mut span, 1, 1, 2);
        for p in span {
            assert!((p.r as i32 - 40000).abs() <= 8, "{p:?}");
            assert!((p.b as i32 - 10000).abs() <= 8, "{p:?}");
            assert_eq!(p.a, 65535);
        }
    }

    #[test]
    fn test_resample_affine_averages_stripes() {
        let data = image(16, 4, |x, _| if x % 2 == 1 { [200, 200, 200] } else { [0, 0, 0] });
        let rbuf = RowAccessor::packed(&data, 16, 4, 3).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBilinear, true);
        let mut sg: SpanImageResampleRgbAffine<_, _, Rgba8> = SpanImageResampleRgbAffine::new(
            Clone3::new(rbuf),
            linear(TransAffine::new_scaling(2.0, 1.0)),
            &lut,
        );
        sg.prepare();
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 1, 1, 4);
        for p in span {
            assert!((p.r as i32 - 100).abs() <= 3, "{p:?}");
            assert_eq!(p.a, 255);
        }
    }

    #[test]
    fn test_resample_general_blur_config() {
        let data = image(8, 8, |_, _| [30, 60, 90]);
        let rbuf = RowAccessor::packed(&data, 8, 8, 3).unwrap();
        let lut = ImageFilterLut::new_with_filter(&ImageFilterBilinear, true);
        let mut sg: SpanImageResampleRgb<_, _, Rgba8> =
            SpanImageResampleRgb::new(Clone3::new(rbuf), linear(TransAffine::new()), &lut);
        sg.apply_config(&ResampleConfig::new(10.0, 3.0, 3.0).unwrap())
            .unwrap();
        assert_eq!(sg.resample_base().scale_limit(), 10);
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 2, 2, 4);
        assert!(span.iter().all(|p| *p == Rgba8::new(30, 60, 90, 255)));
    }
}
