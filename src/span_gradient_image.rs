//! Image-sampled gradient.
//!
//! The "gradient" is a private copy of a color raster; every pixel of a
//! span takes the color of the raster at its transformed position, tiled
//! in both directions.

use crate::color::{ChannelValue, RgbaColor};
use crate::error::{Result, SpanError};
use crate::rendering_buffer::RowAccessor;
use crate::span_generator::SpanGenerator;
use crate::span_interpolator_linear::SpanInterpolator;

/// Owned color raster sampled with wraparound.
#[derive(Debug, Clone, Default)]
pub struct GradientImage<C> {
    buffer: Vec<C>,
    width: usize,
    height: usize,
}

impl<C: RgbaColor> GradientImage<C> {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Allocates a `width x height` raster of default (transparent) colors.
    /// An existing raster of the same size is only cleared.
    pub fn image_create(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(SpanError::InvalidDimensions { width, height });
        }
        let len = width as usize * height as usize;
        self.buffer.clear();
        self.buffer.resize(len, C::default());
        self.width = width as usize;
        self.height = height as usize;
        Ok(())
    }

    /// Row-major pixels of the raster, for the caller to paint into.
    pub fn image_buffer_mut(&mut self) -> &mut [C] {
        &mut self.buffer
    }

    pub fn image_buffer(&self) -> &[C] {
        &self.buffer
    }

    pub fn image_width(&self) -> usize {
        self.width
    }

    pub fn image_height(&self) -> usize {
        self.height
    }

    /// Copies an RGB or RGBA raster. Three-channel sources become opaque.
    pub fn load_from(&mut self, src: &RowAccessor<'_>) -> Result<()> {
        let bytes = <C::Value as ChannelValue>::BYTES;
        let channels = src.pix_width() / bytes;
        if src.pix_width() % bytes != 0 || !(channels == 3 || channels == 4) {
            return Err(SpanError::InvalidConfig(format!(
                "cannot load {}-byte pixels as {bytes}-byte RGB(A) channels",
                src.pix_width()
            )));
        }
        self.image_create(src.width(), src.height())?;
        let order = src.order();
        for y in 0..src.height() {
            let row = src.row_slice(y);
            let dst = &mut self.buffer[y as usize * self.width..(y as usize + 1) * self.width];
            for (c, pix) in dst.iter_mut().zip(row.chunks_exact(src.pix_width())) {
                let a = if channels == 4 {
                    C::Value::read_at(pix, order.a)
                } else {
                    C::Value::FULL
                };
                *c = C::from_channels(
                    C::Value::read_at(pix, order.r),
                    C::Value::read_at(pix, order.g),
                    C::Value::read_at(pix, order.b),
                    a,
                );
            }
        }
        log::debug!("gradient image loaded, {}x{}", self.width, self.height);
        Ok(())
    }

    /// Color at pixel `(x, y)`, tiled. An empty raster yields the default
    /// color.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> C {
        if self.buffer.is_empty() {
            return C::default();
        }
        let px = x.rem_euclid(self.width as i32) as usize;
        let py = y.rem_euclid(self.height as i32) as usize;
        self.buffer[py * self.width + px]
    }
}

// ============================================================================
// SpanGradientImage
// ============================================================================

/// Span generator that paints the transformed, tiled raster.
pub struct SpanGradientImage<'a, I, C> {
    interpolator: I,
    image: &'a GradientImage<C>,
}

impl<'a, I: SpanInterpolator, C: RgbaColor> SpanGradientImage<'a, I, C> {
    pub fn new(interpolator: I, image: &'a GradientImage<C>) -> Self {
        Self { interpolator, image }
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn set_image(&mut self, image: &'a GradientImage<C>) {
        self.image = image;
    }
}

impl<'a, I: SpanInterpolator, C: RgbaColor> SpanGenerator for SpanGradientImage<'a, I, C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        if len == 0 {
            return;
        }
        let shift = self.interpolator.subpixel_shift();
        self.interpolator.begin(x as f64 + 0.5, y as f64 + 0.5, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (mut ix, mut iy) = (0, 0);
            self.interpolator.coordinates(&mut ix, &mut iy);
            *pixel = self.image.pixel(ix >> shift, iy >> shift);
            self.interpolator.next();
        }
    }
}
