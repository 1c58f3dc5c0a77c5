//! RGB pattern span generator.

use crate::color::{ChannelValue, RgbaColor};
use crate::image_accessors::ImageSource;
use crate::span_generator::SpanGenerator;
use crate::span_image_filter::ChannelReader;

/// Fills spans from an offset RGB source. Every produced pixel carries the
/// configured alpha, full by default.
pub struct SpanPatternRgb<S, C: RgbaColor> {
    source: S,
    offset_x: u32,
    offset_y: u32,
    alpha: C::Value,
}

impl<S: ImageSource, C: RgbaColor> SpanPatternRgb<S, C> {
    pub fn new(source: S, offset_x: u32, offset_y: u32) -> Self {
        debug_assert!(S::PIX_WIDTH >= 3 * <C::Value as ChannelValue>::BYTES);
        Self {
            source,
            offset_x,
            offset_y,
            alpha: C::Value::FULL,
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

    pub fn alpha(&self) -> C::Value {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: C::Value) {
        self.alpha = alpha;
    }
}

impl<S: ImageSource, C: RgbaColor> SpanGenerator for SpanPatternRgb<S, C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let len = (len as usize).min(span.len());
        if len == 0 {
            return;
        }
        let order = self.source.order();
        let reader: ChannelReader<C::Value, 3> =
            ChannelReader::new([Some(order.r), Some(order.g), Some(order.b)]);
        let sx = x.wrapping_add(self.offset_x as i32);
        let sy = y.wrapping_add(self.offset_y as i32);

        let [r, g, b] = reader.read_values(self.source.span(sx, sy, len as u32));
        span[0] = C::from_channels(r, g, b, self.alpha);
        for pixel in span[1..len].iter_mut() {
            let [r, g, b] = reader.read_values(self.source.next_x());
            *pixel = C::from_channels(r, g, b, self.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ChannelOrder, Rgba16, Rgba8};
    use crate::image_accessors::{ImageAccessorClip, ImageAccessorWrap, WrapModeRepeatPow2};
    use crate::rendering_buffer::RowAccessor;

    #[test]
    fn test_default_alpha_is_full() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let rbuf = RowAccessor::packed(&data, 2, 1, 3).unwrap();
        let src = ImageAccessorWrap::<3, WrapModeRepeatPow2, WrapModeRepeatPow2>::new(rbuf);
        let mut pattern: SpanPatternRgb<_, Rgba8> = SpanPatternRgb::new(src, 0, 0);
        let mut span = [Rgba8::default(); 3];
        pattern.generate(&mut span, 1, 0, 3);
        assert_eq!(span, [Rgba8::new(4, 5, 6, 255), Rgba8::new(1, 2, 3, 255), Rgba8::new(4, 5, 6, 255)]);
    }

    #[test]
    fn test_configured_alpha_and_order() {
        let data = [10u8, 20, 30];
        let rbuf = RowAccessor::packed(&data, 1, 1, 3)
            .unwrap()
            .with_order(ChannelOrder::BGR);
        let src = ImageAccessorClip::<3>::new(rbuf, &[0, 0, 0]);
        let mut pattern: SpanPatternRgb<_, Rgba8> = SpanPatternRgb::new(src, 0, 0);
        pattern.set_alpha(77);
        assert_eq!(pattern.alpha(), 77);
        let mut span = [Rgba8::default(); 2];
        pattern.generate(&mut span, 0, 0, 2);
        assert_eq!(span[0], Rgba8::new(30, 20, 10, 77));
        // Outside the clip accessor: background color, configured alpha.
        assert_eq!(span[1], Rgba8::new(0, 0, 0, 77));
    }

    #[test]
    fn test_sixteen_bit_offsets() {
        let data: Vec<u8> = [100u16, 200, 300, 400, 500, 600]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let rbuf = RowAccessor::packed(&data, 2, 1, 6).unwrap();
        let src = ImageAccessorWrap::<6, WrapModeRepeatPow2, WrapModeRepeatPow2>::new(rbuf);
        let mut pattern: SpanPatternRgb<_, Rgba16> = SpanPatternRgb::new(src, 3, 9);
        let mut span = [Rgba16::default(); 1];
        pattern.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba16::new(400, 500, 600, 65535));
    }
}
