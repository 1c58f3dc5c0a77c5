//! Gradient color functions.
//!
//! `GradientLut` turns a list of color stops into a fixed-size table.
//! Integer colors are walked with 14-bit DDA interpolators per channel,
//! float colors with their own linear mix. `GradientLinearColor` is the
//! two-color table-free variant.

use crate::basics::uround;
use crate::color::{
    GradientColor, GrayColor, IntChannel, Gray16, Gray8, Rgba, Rgba16, Rgba32, Rgba8, RgbaColor,
};
use crate::config::GradientConfig;
use crate::dda_line::DdaLineInterpolator;
use crate::error::Result;

/// Indexed color palette consumed by the gradient generators.
pub trait ColorFunction {
    type Color;

    fn size(&self) -> usize;
    fn get(&self, index: usize) -> Self::Color;
}

/// A plain table is its own color function.
impl<T: Copy> ColorFunction for [T] {
    type Color = T;

    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    fn get(&self, index: usize) -> T {
        self[index]
    }
}

// ============================================================================
// Color interpolators
// ============================================================================

/// Steps from one color to another over `len` increments.
pub trait ColorInterpolator<C> {
    fn new(c1: &C, c2: &C, len: u32) -> Self;
    fn inc(&mut self);
    fn color(&self) -> C;
}

/// Colors that can be stored in a `GradientLut`.
pub trait LutColor: Copy + Default {
    type Interpolator: ColorInterpolator<Self>;
}

type ChannelDda = DdaLineInterpolator<14, 0>;

/// Per-channel DDA walk for integer RGBA.
#[derive(Debug, Clone)]
pub struct RgbaDdaInterpolator<C> {
    ch: [ChannelDda; 4],
    _color: std::marker::PhantomData<C>,
}

impl<C> ColorInterpolator<C> for RgbaDdaInterpolator<C>
where
    C: RgbaColor,
    C::Value: IntChannel,
{
    fn new(c1: &C, c2: &C, len: u32) -> Self {
        let (a, b) = (c1.channels(), c2.channels());
        Self {
            ch: std::array::from_fn(|i| ChannelDda::new(a[i].to_i32(), b[i].to_i32(), len)),
            _color: std::marker::PhantomData,
        }
    }

    #[inline]
    fn inc(&mut self) {
        self.ch.iter_mut().for_each(ChannelDda::inc);
    }

    #[inline]
    fn color(&self) -> C {
        let v = |i: usize| <C::Value as IntChannel>::from_i32(self.ch[i].y());
        C::from_channels(v(0), v(1), v(2), v(3))
    }
}

/// Per-channel DDA walk for integer gray.
#[derive(Debug, Clone)]
pub struct GrayDdaInterpolator<C> {
    v: ChannelDda,
    a: ChannelDda,
    _color: std::marker::PhantomData<C>,
}

impl<C> ColorInterpolator<C> for GrayDdaInterpolator<C>
where
    C: GrayColor,
    C::Value: IntChannel,
{
    fn new(c1: &C, c2: &C, len: u32) -> Self {
        let ([v1, a1], [v2, a2]) = (c1.channels(), c2.channels());
        Self {
            v: ChannelDda::new(v1.to_i32(), v2.to_i32(), len),
            a: ChannelDda::new(a1.to_i32(), a2.to_i32(), len),
            _color: std::marker::PhantomData,
        }
    }

    #[inline]
    fn inc(&mut self) {
        self.v.inc();
        self.a.inc();
    }

    #[inline]
    fn color(&self) -> C {
        C::from_channels(
            <C::Value as IntChannel>::from_i32(self.v.y()),
            <C::Value as IntChannel>::from_i32(self.a.y()),
        )
    }
}

/// `count / len` mix through `GradientColor`, for float colors.
#[derive(Debug, Clone)]
pub struct LerpInterpolator<C> {
    c1: C,
    c2: C,
    len: u32,
    count: u32,
}

impl<C: GradientColor> ColorInterpolator<C> for LerpInterpolator<C> {
    fn new(c1: &C, c2: &C, len: u32) -> Self {
        Self {
            c1: *c1,
            c2: *c2,
            len: len.max(1),
            count: 0,
        }
    }

    #[inline]
    fn inc(&mut self) {
        self.count += 1;
    }

    #[inline]
    fn color(&self) -> C {
        self.c1
            .gradient(&self.c2, self.count as f64 / self.len as f64)
    }
}

impl LutColor for Rgba8 {
    type Interpolator = RgbaDdaInterpolator<Rgba8>;
}

impl LutColor for Rgba16 {
    type Interpolator = RgbaDdaInterpolator<Rgba16>;
}

impl LutColor for Gray8 {
    type Interpolator = GrayDdaInterpolator<Gray8>;
}

impl LutColor for Gray16 {
    type Interpolator = GrayDdaInterpolator<Gray16>;
}

impl LutColor for Rgba32 {
    type Interpolator = LerpInterpolator<Rgba32>;
}

impl LutColor for Rgba {
    type Interpolator = LerpInterpolator<Rgba>;
}

// ============================================================================
// GradientLut
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ColorStop<C> {
    offset: f64,
    color: C,
}

/// Color table built from stops at offsets in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct GradientLut<C = Rgba8> {
    stops: Vec<ColorStop<C>>,
    lut: Vec<C>,
}

impl<C: LutColor> GradientLut<C> {
    /// Table of `lut_size` entries (at least one), all default-colored
    /// until `build_lut` runs.
    pub fn new(lut_size: usize) -> Self {
        Self {
            stops: Vec::new(),
            lut: vec![C::default(); lut_size.max(1)],
        }
    }

    /// 256 entries.
    pub fn new_default() -> Self {
        Self::new(GradientConfig::default().lut_size)
    }

    pub fn with_config(config: &GradientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.lut_size))
    }

    pub fn remove_all(&mut self) {
        self.stops.clear();
    }

    /// Adds a stop; the offset is clamped to `[0, 1]`.
    pub fn add_color(&mut self, offset: f64, color: C) {
        self.stops.push(ColorStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Rebuilds the table. Stops are sorted by offset; of several stops at
    /// the same offset only the first added is kept. Without stops the
    /// table is left as it was.
    pub fn build_lut(&mut self) {
        self.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.stops.dedup_by(|later, earlier| later.offset == earlier.offset);

        let size = self.lut.len();
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return,
        };
        if self.stops.len() == 1 {
            self.lut.fill(first.color);
            log::debug!("gradient table: {} entries, single stop", size);
            return;
        }

        let index = |offset: f64| (uround(offset * size as f64) as usize).min(size);
        let mut start = index(first.offset);
        self.lut[..start].fill(first.color);

        for pair in self.stops.windows(2) {
            let end = index(pair[1].offset);
            let steps = (end.saturating_sub(start) + 1) as u32;
            let mut ci = C::Interpolator::new(&pair[0].color, &pair[1].color, steps);
            while start < end {
                self.lut[start] = ci.color();
                ci.inc();
                start += 1;
            }
        }

        self.lut[start..].fill(last.color);
        self.lut[size - 1] = last.color;
        log::debug!(
            "gradient table: {} entries from {} stops",
            size,
            self.stops.len()
        );
    }

    pub fn as_slice(&self) -> &[C] {
        &self.lut
    }
}

impl<C: LutColor> ColorFunction for GradientLut<C> {
    type Color = C;

    #[inline]
    fn size(&self) -> usize {
        self.lut.len()
    }

    #[inline]
    fn get(&self, index: usize) -> C {
        self.lut[index]
    }
}

// ============================================================================
// GradientLinearColor
// ============================================================================

/// Two-color gradient evaluated on the fly over `size` steps.
#[derive(Debug, Clone, Copy)]
pub struct GradientLinearColor<C = Rgba8> {
    c1: C,
    c2: C,
    size: usize,
}

impl<C: GradientColor> GradientLinearColor<C> {
    pub fn new(c1: C, c2: C, size: usize) -> Self {
        Self {
            c1,
            c2,
            size: size.max(1),
        }
    }

    pub fn colors(&mut self, c1: C, c2: C) {
        self.c1 = c1;
        self.c2 = c2;
    }
}

impl<C: GradientColor> ColorFunction for GradientLinearColor<C> {
    type Color = C;

    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, index: usize) -> C {
        let span = (self.size - 1).max(1);
        self.c1.gradient(&self.c2, index as f64 / span as f64)
    }
}

// ============================================================================
// Tests
// ============================================================================
