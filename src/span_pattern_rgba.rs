//! RGBA pattern span generator.
//!
//! Copies pixels from a source image shifted by an offset. Tiling is the
//! source's job: pair it with `ImageAccessorWrap` for a repeating fill.

use std::marker::PhantomData;

use crate::color::{ChannelValue, RgbaColor};
use crate::image_accessors::ImageSource;
use crate::span_generator::SpanGenerator;
use crate::span_image_filter::ChannelReader;

/// Fills spans from `(x + offset_x, y + offset_y)` of the source, keeping
/// the source's own alpha.
pub struct SpanPatternRgba<S, C> {
    source: S,
    offset_x: u32,
    offset_y: u32,
    _color: PhantomData<C>,
}

impl<S: ImageSource, C: RgbaColor> SpanPatternRgba<S, C> {
    pub fn new(source: S, offset_x: u32, offset_y: u32) -> Self {
        debug_assert!(S::PIX_WIDTH >= 4 * <C::Value as ChannelValue>::BYTES);
        Self {
            source,
            offset_x,
            offset_y,
            _color: PhantomData,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn offset_x(&self) -> u32 {
        self.offset_x
    }

    pub fn set_offset_x(&mut self, v: u32) {
        self.offset_x = v;
    }

    pub fn offset_y(&self) -> u32 {
        self.offset_y
    }

    pub fn set_offset_y(&mut self, v: u32) {
        self.offset_y = v;
    }

    /// Always full: RGBA patterns use the alpha stored in the source.
    pub fn alpha(&self) -> C::Value {
        C::Value::FULL
    }

    /// Has no effect on RGBA patterns.
    pub fn set_alpha(&mut self, _alpha: C::Value) {}
}

impl<S: ImageSource, C: RgbaColor> SpanGenerator for SpanPatternRgba<S, C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let len = (len as usize).min(span.len());
        if len == 0 {
            return;
        }
        let order = self.source.order();
        let reader: ChannelReader<C::Value, 4> =
            ChannelReader::new([Some(order.r), Some(order.g), Some(order.b), Some(order.a)]);
        let sx = x.wrapping_add(self.offset_x as i32);
        let sy = y.wrapping_add(self.offset_y as i32);

        let [r, g, b, a] = reader.read_values(self.source.span(sx, sy, len as u32));
        span[0] = C::from_channels(r, g, b, a);
        for pixel in span[1..len].iter_mut() {
            let [r, g, b, a] = reader.read_values(self.source.next_x());
            *pixel = C::from_channels(r, g, b, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ChannelOrder, Rgba8};
    use crate::image_accessors::{ImageAccessorWrap, WrapModeReflect, WrapModeRepeat};
    use crate::rendering_buffer::RowAccessor;

    /// A source that returns one fixed pixel everywhere.
    struct ConstantSource {
        pixel: [u8; 4],
    }

    impl ImageSource for ConstantSource {
        const PIX_WIDTH: usize = 4;

        fn width(&self) -> u32 {
            1
        }

        fn height(&self) -> u32 {
            1
        }

        fn order(&self) -> ChannelOrder {
            ChannelOrder::RGBA
        }

        fn row(&self, _y: u32) -> &[u8] {
            &self.pixel
        }

        fn span(&mut self, _x: i32, _y: i32, _len: u32) -> &[u8] {
            &self.pixel
        }

        fn next_x(&mut self) -> &[u8] {
            &self.pixel
        }

        fn next_y(&mut self) -> &[u8] {
            &self.pixel
        }
    }

    #[test]
    fn test_constant_pattern() {
        let src = ConstantSource {
            pixel: [255, 0, 0, 128],
        };
        let mut pattern: SpanPatternRgba<_, Rgba8> = SpanPatternRgba::new(src, 0, 0);
        pattern.prepare();
        let mut span = vec![Rgba8::default(); 5];
        pattern.generate(&mut span, 0, 0, 5);
        assert!(span.iter().all(|c| *c == Rgba8::new(255, 0, 0, 128)));
    }

    #[test]
    fn test_alpha_is_not_applied() {
        let src = ConstantSource {
            pixel: [10, 20, 30, 40],
        };
        let mut pattern: SpanPatternRgba<_, Rgba8> = SpanPatternRgba::new(src, 0, 0);
        pattern.set_alpha(3);
        assert_eq!(pattern.alpha(), 255);
        let mut span = [Rgba8::default(); 2];
        pattern.generate(&mut span, 0, 0, 2);
        assert_eq!(span[1].a, 40);
    }

    #[test]
    fn test_offsets_with_wrapped_source() {
        let data: Vec<u8> = (0..3u8).flat_map(|i| [i * 10, 0, 0, 255]).collect();
        let rbuf = RowAccessor::packed(&data, 3, 1, 4).unwrap();
        let src = ImageAccessorWrap::<4, WrapModeRepeat, WrapModeRepeat>::new(rbuf);
        let mut pattern: SpanPatternRgba<_, Rgba8> = SpanPatternRgba::new(src, 10, 20);
        assert_eq!((pattern.offset_x(), pattern.offset_y()), (10, 20));
        pattern.set_offset_x(1);
        pattern.set_offset_y(0);
        let mut span = [Rgba8::default(); 4];
        pattern.generate(&mut span, 0, 5, 4);
        let reds: Vec<u8> = span.iter().map(|c| c.r).collect();
        assert_eq!(reds, [10, 20, 0, 10]);
    }

    #[test]
    fn test_alpha_first_orders() {
        for (order, pixel) in [
            (ChannelOrder::ARGB, [40u8, 10, 20, 30]),
            (ChannelOrder::ABGR, [40u8, 30, 20, 10]),
        ] {
            let rbuf = RowAccessor::packed(&pixel, 1, 1, 4).unwrap().with_order(order);
            let src = ImageAccessorWrap::<4, WrapModeRepeat, WrapModeRepeat>::new(rbuf);
            let mut pattern: SpanPatternRgba<_, Rgba8> = SpanPatternRgba::new(src, 0, 0);
            let mut span = [Rgba8::default(); 3];
            pattern.generate(&mut span, 7, 2, 3);
            assert!(span.iter().all(|c| *c == Rgba8::new(10, 20, 30, 40)), "{:?}", order);
        }
    }

    #[test]
    fn test_reflected_tiles_and_zero_length() {
        let data: Vec<u8> = (0..2u8).flat_map(|i| [0, i * 100, 0, 255]).collect();
        let rbuf = RowAccessor::packed(&data, 2, 1, 4).unwrap();
        let src = ImageAccessorWrap::<4, WrapModeReflect, WrapModeReflect>::new(rbuf);
        let mut pattern: SpanPatternRgba<_, Rgba8> = SpanPatternRgba::new(src, 0, 0);
        let mut span = [Rgba8::default(); 4];
        pattern.generate(&mut span, 0, 0, 4);
        let greens: Vec<u8> = span.iter().map(|c| c.g).collect();
        assert_eq!(greens, [0, 100, 100, 0]);

        let mut untouched = [Rgba8::new(1, 2, 3, 4); 1];
        pattern.generate(&mut untouched, 0, 0, 0);
        assert_eq!(untouched[0], Rgba8::new(1, 2, 3, 4));
    }
}
