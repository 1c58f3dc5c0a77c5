//! Shared state and sampling kernels of the image span generators.
//!
//! Every image generator owns a `SpanImageFilterBase` (interpolator,
//! optional kernel table, subpixel filter offset) and a pixel source. The
//! per-format modules only decide how raw pixel bytes become accumulator
//! channels and how the sums become a color; the weighted sums themselves
//! are computed here, once, for any channel type.

use std::marker::PhantomData;

use crate::basics::{iround, uround};
use crate::color::ChannelValue;
use crate::config::ResampleConfig;
use crate::error::Result;
use crate::image_accessors::ImageSource;
use crate::image_filters::{
    ImageFilterLut, IMAGE_FILTER_SCALE, IMAGE_FILTER_SHIFT, IMAGE_SUBPIXEL_MASK,
    IMAGE_SUBPIXEL_SCALE, IMAGE_SUBPIXEL_SHIFT,
};
use crate::rendering_buffer::RowAccessor;
use crate::span_interpolator_linear::{InterpolatorTransformer, ScalingAbs, SpanInterpolator};

// ============================================================================
// SpanImageFilterBase
// ============================================================================

/// Interpolator, kernel table and filter offset of an image generator.
///
/// The offset `(dx, dy)` is added to each pixel position before it is
/// mapped. The default `(0.5, 0.5)` samples at pixel centers.
#[derive(Debug, Clone)]
pub struct SpanImageFilterBase<'a, I> {
    interpolator: I,
    filter: Option<&'a ImageFilterLut>,
    dx_dbl: f64,
    dy_dbl: f64,
    dx_int: i32,
    dy_int: i32,
}

impl<'a, I> SpanImageFilterBase<'a, I> {
    pub fn new(interpolator: I, filter: Option<&'a ImageFilterLut>) -> Self {
        Self {
            interpolator,
            filter,
            dx_dbl: 0.5,
            dy_dbl: 0.5,
            dx_int: IMAGE_SUBPIXEL_SCALE / 2,
            dy_int: IMAGE_SUBPIXEL_SCALE / 2,
        }
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn filter(&self) -> Option<&'a ImageFilterLut> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: &'a ImageFilterLut) {
        self.filter = Some(filter);
    }

    /// The attached table, unless it is missing or empty.
    #[inline]
    pub fn kernel(&self) -> Option<&'a ImageFilterLut> {
        self.filter.filter(|f| !f.is_empty())
    }

    pub fn filter_dx_int(&self) -> i32 {
        self.dx_int
    }

    pub fn filter_dy_int(&self) -> i32 {
        self.dy_int
    }

    pub fn filter_dx_dbl(&self) -> f64 {
        self.dx_dbl
    }

    pub fn filter_dy_dbl(&self) -> f64 {
        self.dy_dbl
    }

    pub fn set_filter_offset(&mut self, dx: f64, dy: f64) {
        self.dx_dbl = dx;
        self.dy_dbl = dy;
        self.dx_int = iround(dx * IMAGE_SUBPIXEL_SCALE as f64);
        self.dy_int = iround(dy * IMAGE_SUBPIXEL_SCALE as f64);
    }

    pub fn set_filter_offset_uniform(&mut self, d: f64) {
        self.set_filter_offset(d, d);
    }
}

impl<'a, I: SpanInterpolator> SpanImageFilterBase<'a, I> {
    /// Starts the interpolator on pixel `(x, y)` shifted by the filter offset.
    #[inline]
    pub fn begin(&mut self, x: i32, y: i32, len: u32) {
        self.interpolator
            .begin(x as f64 + self.dx_dbl, y as f64 + self.dy_dbl, len);
    }

    #[inline]
    pub fn coordinates(&self) -> (i32, i32) {
        let (mut x, mut y) = (0, 0);
        self.interpolator.coordinates(&mut x, &mut y);
        (x, y)
    }

    #[inline]
    pub fn next(&mut self) {
        self.interpolator.next();
    }
}

// ============================================================================
// ChannelReader
// ============================================================================

/// Decodes one raw source pixel into `N` accumulator channels.
///
/// Each slot names the channel index inside the pixel, or `None` for a
/// channel the source lacks, which reads as full intensity (the alpha of
/// RGB and gray sources).
#[derive(Debug, Clone, Copy)]
pub struct ChannelReader<V, const N: usize> {
    slots: [Option<usize>; N],
    _value: PhantomData<V>,
}

impl<V: ChannelValue, const N: usize> ChannelReader<V, N> {
    pub fn new(slots: [Option<usize>; N]) -> Self {
        Self {
            slots,
            _value: PhantomData,
        }
    }

    #[inline]
    pub fn read(&self, pixel: &[u8]) -> [V::Calc; N] {
        self.slots.map(|slot| match slot {
            Some(i) => V::read_at(pixel, i).to_calc(),
            None => V::full_calc(),
        })
    }

    /// Reads without weighting, straight into channel values.
    #[inline]
    pub fn read_values(&self, pixel: &[u8]) -> [V; N] {
        self.slots.map(|slot| match slot {
            Some(i) => V::read_at(pixel, i),
            None => V::FULL,
        })
    }
}

#[inline]
fn accumulate<V: ChannelValue, const N: usize>(
    fg: &mut [V::Calc; N],
    px: [V::Calc; N],
    weight: i32,
) {
    let w = V::Calc::from(weight);
    for (acc, v) in fg.iter_mut().zip(px) {
        *acc += v * w;
    }
}

#[inline]
fn kernel_weight(wy: i32, wx: i32) -> i32 {
    (wy * wx + IMAGE_FILTER_SCALE / 2) >> IMAGE_FILTER_SHIFT
}

// ============================================================================
// Sampling kernels
// ============================================================================

/// Nearest source pixel of subpixel position `(x_hr, y_hr)`.
#[inline]
pub fn sample_nn<S, V, const N: usize>(
    source: &mut S,
    reader: &ChannelReader<V, N>,
    x_hr: i32,
    y_hr: i32,
) -> [V; N]
where
    S: ImageSource,
    V: ChannelValue,
{
    reader.read_values(source.span(
        x_hr >> IMAGE_SUBPIXEL_SHIFT,
        y_hr >> IMAGE_SUBPIXEL_SHIFT,
        1,
    ))
}

/// Bilinear blend of the 2x2 neighborhood whose top-left pixel contains
/// `(x_hr, y_hr)`. The position is already corrected by the filter offset.
#[inline]
pub fn sample_bilinear<S, V, const N: usize>(
    source: &mut S,
    reader: &ChannelReader<V, N>,
    x_hr: i32,
    y_hr: i32,
) -> [V::Calc; N]
where
    S: ImageSource,
    V: ChannelValue,
{
    let shift = IMAGE_SUBPIXEL_SHIFT * 2;
    let one = IMAGE_SUBPIXEL_SCALE;
    let mut fg = [V::round_bias(shift); N];

    let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
    let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
    let xf = x_hr & IMAGE_SUBPIXEL_MASK;
    let yf = y_hr & IMAGE_SUBPIXEL_MASK;

    accumulate::<V, N>(&mut fg, reader.read(source.span(x_lr, y_lr, 2)), (one - xf) * (one - yf));
    accumulate::<V, N>(&mut fg, reader.read(source.next_x()), xf * (one - yf));
    accumulate::<V, N>(&mut fg, reader.read(source.next_y()), (one - xf) * yf);
    accumulate::<V, N>(&mut fg, reader.read(source.next_x()), xf * yf);

    fg.map(|v| V::downshift(v, shift))
}

/// Bilinear blend straight from a row buffer. Samples outside the image
/// take the `background` channels; a neighborhood entirely outside returns
/// `background` unchanged.
#[inline]
pub fn sample_bilinear_clip<V, const N: usize>(
    rbuf: &RowAccessor<'_>,
    reader: &ChannelReader<V, N>,
    background: [V::Calc; N],
    x_hr: i32,
    y_hr: i32,
) -> [V::Calc; N]
where
    V: ChannelValue,
{
    let maxx = rbuf.width() as i32 - 1;
    let maxy = rbuf.height() as i32 - 1;
    let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
    let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;

    if x_lr < -1 || y_lr < -1 || x_lr > maxx || y_lr > maxy {
        return background;
    }

    let fetch = |x: i32, y: i32| {
        if x >= 0 && y >= 0 && x <= maxx && y <= maxy {
            reader.read(rbuf.pixel(x as u32, y as u32))
        } else {
            background
        }
    };

    let shift = IMAGE_SUBPIXEL_SHIFT * 2;
    let one = IMAGE_SUBPIXEL_SCALE;
    let xf = x_hr & IMAGE_SUBPIXEL_MASK;
    let yf = y_hr & IMAGE_SUBPIXEL_MASK;
    let mut fg = [V::round_bias(shift); N];

    accumulate::<V, N>(&mut fg, fetch(x_lr, y_lr), (one - xf) * (one - yf));
    accumulate::<V, N>(&mut fg, fetch(x_lr + 1, y_lr), xf * (one - yf));
    accumulate::<V, N>(&mut fg, fetch(x_lr, y_lr + 1), (one - xf) * yf);
    accumulate::<V, N>(&mut fg, fetch(x_lr + 1, y_lr + 1), xf * yf);

    fg.map(|v| V::downshift(v, shift))
}

/// 2x2 footprint with weights from the central taps of `lut`.
#[inline]
pub fn sample_2x2<S, V, const N: usize>(
    source: &mut S,
    reader: &ChannelReader<V, N>,
    lut: &ImageFilterLut,
    x_hr: i32,
    y_hr: i32,
) -> [V::Calc; N]
where
    S: ImageSource,
    V: ChannelValue,
{
    let weights = lut.weight_array();
    let offset = ((lut.diameter() / 2 - 1) << IMAGE_SUBPIXEL_SHIFT) as usize;
    let one = IMAGE_SUBPIXEL_SCALE as usize;
    let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
    let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
    let xf = (x_hr & IMAGE_SUBPIXEL_MASK) as usize;
    let yf = (y_hr & IMAGE_SUBPIXEL_MASK) as usize;

    let w = |i: usize| weights[offset + i] as i32;
    let (wx0, wx1) = (w(xf + one), w(xf));
    let (wy0, wy1) = (w(yf + one), w(yf));

    let mut fg = [V::Calc::from(0); N];
    accumulate::<V, N>(&mut fg, reader.read(source.span(x_lr, y_lr, 2)), kernel_weight(wy0, wx0));
    accumulate::<V, N>(&mut fg, reader.read(source.next_x()), kernel_weight(wy0, wx1));
    accumulate::<V, N>(&mut fg, reader.read(source.next_y()), kernel_weight(wy1, wx0));
    accumulate::<V, N>(&mut fg, reader.read(source.next_x()), kernel_weight(wy1, wx1));

    fg.map(|v| V::downshift(v, IMAGE_FILTER_SHIFT))
}

/// `diameter x diameter` convolution with the separable kernel in `lut`.
pub fn sample_general<S, V, const N: usize>(
    source: &mut S,
    reader: &ChannelReader<V, N>,
    lut: &ImageFilterLut,
    x_hr: i32,
    y_hr: i32,
) -> [V::Calc; N]
where
    S: ImageSource,
    V: ChannelValue,
{
    let weights = lut.weight_array();
    let diameter = lut.diameter();
    let start = lut.start();
    let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
    let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
    let x_wa0 = IMAGE_SUBPIXEL_MASK - (x_hr & IMAGE_SUBPIXEL_MASK);
    let mut y_wa = IMAGE_SUBPIXEL_MASK - (y_hr & IMAGE_SUBPIXEL_MASK);

    let mut fg = [V::Calc::from(0); N];
    let mut px = reader.read(source.span(x_lr + start, y_lr + start, diameter));
    for row in 0..diameter {
        let wy = weights[y_wa as usize] as i32;
        let mut x_wa = x_wa0;
        for col in 0..diameter {
            accumulate::<V, N>(&mut fg, px, kernel_weight(wy, weights[x_wa as usize] as i32));
            if col + 1 < diameter {
                x_wa += IMAGE_SUBPIXEL_SCALE;
                px = reader.read(source.next_x());
            }
        }
        if row + 1 < diameter {
            y_wa += IMAGE_SUBPIXEL_SCALE;
            px = reader.read(source.next_y());
        }
    }

    fg.map(|v| V::downshift(v, IMAGE_FILTER_SHIFT))
}

/// Kernel footprint of one resampled pixel, in image subpixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleFootprint {
    pub rx: i32,
    pub ry: i32,
    pub rx_inv: i32,
    pub ry_inv: i32,
}

impl ResampleFootprint {
    /// Footprint for scales `rx`, `ry`, both at least one pixel.
    pub fn from_scale(rx: i32, ry: i32) -> Self {
        let sq = IMAGE_SUBPIXEL_SCALE * IMAGE_SUBPIXEL_SCALE;
        Self {
            rx,
            ry,
            rx_inv: sq / rx.max(1),
            ry_inv: sq / ry.max(1),
        }
    }
}

impl Default for ResampleFootprint {
    fn default() -> Self {
        Self::from_scale(IMAGE_SUBPIXEL_SCALE, IMAGE_SUBPIXEL_SCALE)
    }
}

/// Kernel stretched over a footprint of `fp.rx x fp.ry` subpixels and
/// renormalized by its total weight. `(x_hr, y_hr)` is the footprint
/// center, already shifted by the filter offset.
pub fn sample_resample<S, V, const N: usize>(
    source: &mut S,
    reader: &ChannelReader<V, N>,
    lut: &ImageFilterLut,
    fp: ResampleFootprint,
    x_hr: i32,
    y_hr: i32,
) -> [V::Calc; N]
where
    S: ImageSource,
    V: ChannelValue,
{
    let weights = lut.weight_array();
    let diameter = lut.diameter() as i32;
    let filter_scale = diameter << IMAGE_SUBPIXEL_SHIFT;
    let radius_x = (diameter * fp.rx) >> 1;
    let radius_y = (diameter * fp.ry) >> 1;
    let len_x_lr = (diameter * fp.rx + IMAGE_SUBPIXEL_MASK) >> IMAGE_SUBPIXEL_SHIFT;

    let cx = x_hr - radius_x;
    let cy = y_hr - radius_y;
    let x_lr = cx >> IMAGE_SUBPIXEL_SHIFT;
    let y_lr = cy >> IMAGE_SUBPIXEL_SHIFT;
    let x_wa0 = ((IMAGE_SUBPIXEL_MASK - (cx & IMAGE_SUBPIXEL_MASK)) * fp.rx_inv)
        >> IMAGE_SUBPIXEL_SHIFT;
    let mut y_wa = ((IMAGE_SUBPIXEL_MASK - (cy & IMAGE_SUBPIXEL_MASK)) * fp.ry_inv)
        >> IMAGE_SUBPIXEL_SHIFT;

    let mut fg = [V::Calc::from(0); N];
    let mut total_weight = 0i32;
    let mut px = reader.read(source.span(x_lr, y_lr, len_x_lr.max(1) as u32));
    loop {
        let wy = weights[y_wa as usize] as i32;
        let mut x_wa = x_wa0;
        loop {
            let weight = kernel_weight(wy, weights[x_wa as usize] as i32);
            accumulate::<V, N>(&mut fg, px, weight);
            total_weight += weight;
            x_wa += fp.rx_inv;
            if x_wa >= filter_scale {
                break;
            }
            px = reader.read(source.next_x());
        }
        y_wa += fp.ry_inv;
        if y_wa >= filter_scale {
            break;
        }
        px = reader.read(source.next_y());
    }

    if total_weight > 0 {
        let total = V::Calc::from(total_weight);
        fg.map(|v| v / total)
    } else {
        fg.map(|v| V::downshift(v, IMAGE_FILTER_SHIFT))
    }
}

// ============================================================================
// SpanImageResampleAffine
// ============================================================================

/// Resampling state for affine interpolators.
///
/// `prepare` reads the absolute scale of the interpolator's transformer
/// once per frame and turns it into a kernel footprint.
#[derive(Debug, Clone)]
pub struct SpanImageResampleAffine<'a, I> {
    base: SpanImageFilterBase<'a, I>,
    scale_limit: f64,
    blur_x: f64,
    blur_y: f64,
    footprint: ResampleFootprint,
}

impl<'a, I> SpanImageResampleAffine<'a, I> {
    pub fn new(interpolator: I, filter: &'a ImageFilterLut) -> Self {
        let config = ResampleConfig::default();
        Self {
            base: SpanImageFilterBase::new(interpolator, Some(filter)),
            scale_limit: config.scale_limit,
            blur_x: config.blur_x,
            blur_y: config.blur_y,
            footprint: ResampleFootprint::default(),
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }

    pub fn scale_limit(&self) -> u32 {
        uround(self.scale_limit)
    }

    pub fn set_scale_limit(&mut self, v: f64) {
        self.scale_limit = v;
    }

    pub fn blur_x(&self) -> f64 {
        self.blur_x
    }

    pub fn blur_y(&self) -> f64 {
        self.blur_y
    }

    pub fn set_blur_x(&mut self, v: f64) {
        self.blur_x = v;
    }

    pub fn set_blur_y(&mut self, v: f64) {
        self.blur_y = v;
    }

    pub fn set_blur(&mut self, v: f64) {
        self.blur_x = v;
        self.blur_y = v;
    }

    /// Takes the scale limit and blur factors from `config`.
    pub fn apply_config(&mut self, config: &ResampleConfig) -> Result<()> {
        config.validate()?;
        self.scale_limit = config.scale_limit;
        self.blur_x = config.blur_x;
        self.blur_y = config.blur_y;
        Ok(())
    }

    /// Footprint computed by the last `prepare`.
    pub fn footprint(&self) -> ResampleFootprint {
        self.footprint
    }

    pub fn rx(&self) -> i32 {
        self.footprint.rx
    }

    pub fn ry(&self) -> i32 {
        self.footprint.ry
    }

    pub fn rx_inv(&self) -> i32 {
        self.footprint.rx_inv
    }

    pub fn ry_inv(&self) -> i32 {
        self.footprint.ry_inv
    }

    /// Turns absolute transform scales into a footprint: the product is
    /// limited by `scale_limit`, blur widens each axis, and neither axis
    /// drops below one pixel.
    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
        let (mut sx, mut sy) = (scale_x, scale_y);
        let product = sx * sy;
        if product > self.scale_limit {
            sx = sx * self.scale_limit / product;
            sy = sy * self.scale_limit / product;
        }
        sx = sx.max(1.0).min(self.scale_limit.max(1.0));
        sy = sy.max(1.0).min(self.scale_limit.max(1.0));
        sx = (sx * self.blur_x).max(1.0);
        sy = (sy * self.blur_y).max(1.0);

        let one = IMAGE_SUBPIXEL_SCALE as f64;
        self.footprint = ResampleFootprint {
            rx: iround(sx * one),
            ry: iround(sy * one),
            rx_inv: iround(one / sx),
            ry_inv: iround(one / sy),
        };
    }
}

impl<'a, I> SpanImageResampleAffine<'a, I>
where
    I: InterpolatorTransformer,
    I::Transformer: ScalingAbs,
{
    pub fn prepare(&mut self) {
        let (sx, sy) = self.base.interpolator().transformer().scaling_abs();
        self.set_scale(sx, sy);
        log::trace!(
            "affine resample: scale ({sx:.3}, {sy:.3}) -> footprint {}x{} subpixels",
            self.footprint.rx,
            self.footprint.ry
        );
    }
}

// ============================================================================
// SpanImageResample
// ============================================================================

/// Resampling state for interpolators whose scale varies across a span.
///
/// The footprint is derived per pixel from the interpolator's local scale
/// through `adjust_scale`.
#[derive(Debug, Clone)]
pub struct SpanImageResample<'a, I> {
    base: SpanImageFilterBase<'a, I>,
    scale_limit: i32,
    blur_x: i32,
    blur_y: i32,
}

impl<'a, I> SpanImageResample<'a, I> {
    pub fn new(interpolator: I, filter: &'a ImageFilterLut) -> Self {
        Self {
            base: SpanImageFilterBase::new(interpolator, Some(filter)),
            scale_limit: 20,
            blur_x: IMAGE_SUBPIXEL_SCALE,
            blur_y: IMAGE_SUBPIXEL_SCALE,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, I> {
        &mut self.base
    }

    pub fn scale_limit(&self) -> i32 {
        self.scale_limit
    }

    pub fn set_scale_limit(&mut self, v: i32) {
        self.scale_limit = v.max(1);
    }

    pub fn blur_x(&self) -> f64 {
        self.blur_x as f64 / IMAGE_SUBPIXEL_SCALE as f64
    }

    pub fn blur_y(&self) -> f64 {
        self.blur_y as f64 / IMAGE_SUBPIXEL_SCALE as f64
    }

    pub fn set_blur_x(&mut self, v: f64) {
        self.blur_x = iround(v * IMAGE_SUBPIXEL_SCALE as f64);
    }

    pub fn set_blur_y(&mut self, v: f64) {
        self.blur_y = iround(v * IMAGE_SUBPIXEL_SCALE as f64);
    }

    pub fn set_blur(&mut self, v: f64) {
        self.set_blur_x(v);
        self.set_blur_y(v);
    }

    /// Takes the scale limit (rounded to a whole factor) and blur from
    /// `config`.
    pub fn apply_config(&mut self, config: &ResampleConfig) -> Result<()> {
        config.validate()?;
        self.set_scale_limit(iround(config.scale_limit));
        self.set_blur_x(config.blur_x);
        self.set_blur_y(config.blur_y);
        Ok(())
    }

    /// Limits a local scale to `[1, scale_limit]` pixels, applies blur,
    /// and floors the result at one pixel again.
    #[inline]
    pub fn adjust_scale(&self, rx: i32, ry: i32) -> (i32, i32) {
        let one = IMAGE_SUBPIXEL_SCALE;
        let limit = one * self.scale_limit;
        let rx = rx.clamp(one, limit);
        let ry = ry.clamp(one, limit);
        let rx = ((rx * self.blur_x) >> IMAGE_SUBPIXEL_SHIFT).max(one);
        let ry = ((ry * self.blur_y) >> IMAGE_SUBPIXEL_SHIFT).max(one);
        (rx, ry)
    }
}

impl<'a, I: SpanInterpolator> SpanImageResample<'a, I> {
    /// Footprint at the interpolator's current pixel.
    #[inline]
    pub fn local_footprint(&self) -> ResampleFootprint {
        let (rx, ry) =
            crate::span_interpolator_linear::local_scale_or_identity(self.base.interpolator());
        let (rx, ry) = self.adjust_scale(rx, ry);
        ResampleFootprint::from_scale(rx, ry)
    }
}

// ============================================================================
// Tests
// ============================================================================
