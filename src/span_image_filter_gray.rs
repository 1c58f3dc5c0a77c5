//! Grayscale image transformation span generators.
//!
//! Single-channel sources; the produced alpha is full except where the
//! clipping generator blends in its background.

use std::marker::PhantomData;

use crate::color::{ChannelValue, GrayColor};
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

type Calc<C> = <<C as GrayColor>::Value as ChannelValue>::Calc;

fn gray_reader<V: ChannelValue>() -> ChannelReader<V, 2> {
    ChannelReader::new([Some(0), None])
}

#[inline]
fn gray_color<C: GrayColor>(fg: [Calc<C>; 2]) -> C {
    C::from_channels(C::Value::from_calc(fg[0]), C::Value::FULL)
}

#[inline]
fn gray_clip_color<C: GrayColor>(fg: [Calc<C>; 2]) -> C {
    let [v, a] = fg.map(C::Value::from_calc);
    C::from_channels(v, a)
}

// ============================================================================
// SpanImageFilterGrayNn
// ============================================================================

/// Nearest-neighbor sampling: copies the source pixel under each mapped
/// position.
pub struct SpanImageFilterGrayNn<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: GrayColor> SpanImageFilterGrayNn<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterGrayNn<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let [v, a] = sample_nn(&mut self.source, &reader, cx, cy);
            *pixel = C::from_channels(v, a);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterGrayBilinear
// ============================================================================

/// Bilinear blend of the 2x2 neighborhood. Boundary handling is the
/// source accessor's job.
pub struct SpanImageFilterGrayBilinear<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: GrayColor> SpanImageFilterGrayBilinear<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterGrayBilinear<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            *pixel = gray_color::<C>(sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterGrayBilinearClip
// ============================================================================

/// Bilinear blend read straight from a row buffer, with a background color
/// for samples outside the image.
pub struct SpanImageFilterGrayBilinearClip<'a, I, C> {
    base: SpanImageFilterBase<'a, I>,
    rbuf: RowAccessor<'a>,
    background: C,
}

impl<'a, I, C: GrayColor> SpanImageFilterGrayBilinearClip<'a, I, C> {
    pub fn new(rbuf: RowAccessor<'a>, background: C, interpolator: I) -> Self {
        debug_assert!(rbuf.pix_width() >= <C::Value as ChannelValue>::BYTES);
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

impl<I, C> SpanGenerator for SpanImageFilterGrayBilinearClip<'_, I, C>
where
    I: SpanInterpolator,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
        let back = self.background.channels().map(ChannelValue::to_calc);
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            *pixel = gray_clip_color::<C>(sample_bilinear_clip(&self.rbuf, &reader, back, cx - dx, cy - dy));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterGray2x2
// ============================================================================

/// 2x2 footprint weighted by the central taps of a kernel table. Falls back
/// to bilinear when the table is empty.
pub struct SpanImageFilterGray2x2<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: GrayColor> SpanImageFilterGray2x2<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterGray2x2<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
        let kernel = self.base.kernel();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = match kernel {
                Some(lut) => sample_2x2(&mut self.source, &reader, lut, cx - dx, cy - dy),
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = gray_color::<C>(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterGray
// ============================================================================

/// General `diameter x diameter` convolution, clamped to the channel range.
pub struct SpanImageFilterGray<'a, S, I, C> {
    base: SpanImageFilterBase<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: GrayColor> SpanImageFilterGray<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageFilterGray<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
        let kernel = self.base.kernel();
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = match kernel {
                Some(lut) => sample_general(&mut self.source, &reader, lut, cx - dx, cy - dy),
                None => sample_bilinear(&mut self.source, &reader, cx - dx, cy - dy),
            };
            *pixel = gray_color::<C>(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleGrayAffine
// ============================================================================

/// Resampler for affine interpolators: the kernel is stretched over the
/// footprint computed in `prepare`.
pub struct SpanImageResampleGrayAffine<'a, S, I, C> {
    base: SpanImageResampleAffine<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: GrayColor> SpanImageResampleGrayAffine<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageResampleGrayAffine<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator + InterpolatorTransformer,
    I::Transformer: ScalingAbs,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {
        self.base.prepare();
    }

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
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
            *pixel = gray_color::<C>(fg);
            base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleGray
// ============================================================================

/// Resampler for interpolators with a per-pixel scale estimate, such as
/// the perspective ones.
pub struct SpanImageResampleGray<'a, S, I, C> {
    base: SpanImageResample<'a, I>,
    source: S,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I, C: GrayColor> SpanImageResampleGray<'a, S, I, C> {
    pub fn new(source: S, interpolator: I, filter: &'a ImageFilterLut) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S, I, C> SpanGenerator for SpanImageResampleGray<'_, S, I, C>
where
    S: ImageSource,
    I: SpanInterpolator,
    C: GrayColor,
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let reader = gray_reader::<C::Value>();
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
            *pixel = gray_color::<C>(fg);
            self.base.base_mut().next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
