//! Grayscale pattern span generator.

use crate::color::{ChannelValue, GrayColor};
use crate::image_accessors::ImageSource;
use crate::span_generator::SpanGenerator;

/// Fills spans from an offset gray source with a constant alpha.
pub struct SpanPatternGray<S, C: GrayColor> {
    source: S,
    offset_x: u32,
    offset_y: u32,
    alpha: C::Value,
}

impl<S: ImageSource, C: GrayColor> SpanPatternGray<S, C> {
    pub fn new(source: S, offset_x: u32, offset_y: u32) -> Self {
        debug_assert!(S::PIX_WIDTH >= <C::Value as ChannelValue>::BYTES);
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

impl<S: ImageSource, C: GrayColor> SpanGenerator for SpanPatternGray<S, C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let len = (len as usize).min(span.len());
        if len == 0 {
            return;
        }
        let sx = x.wrapping_add(self.offset_x as i32);
        let sy = y.wrapping_add(self.offset_y as i32);

        span[0] = C::from_channels(C::Value::read(self.source.span(sx, sy, len as u32)), self.alpha);
        for pixel in span[1..len].iter_mut() {
            *pixel = C::from_channels(C::Value::read(self.source.next_x()), self.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Gray16, Gray8};
    use crate::image_accessors::{ImageAccessorClone, ImageAccessorWrap, WrapModeReflectAutoPow2};
    use crate::rendering_buffer::RowAccessor;

    #[test]
    fn test_tiled_rows_and_alpha() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let rbuf = RowAccessor::packed(&data, 3, 2, 1).unwrap();
        let src = ImageAccessorWrap::<1, WrapModeReflectAutoPow2, WrapModeReflectAutoPow2>::new(rbuf);
        let mut pattern: SpanPatternGray<_, Gray8> = SpanPatternGray::new(src, 0, 1);
        pattern.set_alpha(128);
        let mut span = [Gray8::default(); 3];
        pattern.generate(&mut span, 0, 0, 3);
        assert_eq!(span, [Gray8::new(4, 128), Gray8::new(5, 128), Gray8::new(6, 128)]);
    }

    #[test]
    fn test_clone_edges_sixteen_bit() {
        let data: Vec<u8> = [7u16, 9].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let rbuf = RowAccessor::packed(&data, 2, 1, 2).unwrap();
        let mut pattern: SpanPatternGray<_, Gray16> =
            SpanPatternGray::new(ImageAccessorClone::<2>::new(rbuf), 0, 0);
        assert_eq!(pattern.alpha(), 65535);
        let mut span = [Gray16::default(); 4];
        pattern.generate(&mut span, -1, 0, 4);
        let v: Vec<u16> = span.iter().map(|p| p.v).collect();
        assert_eq!(v, [7, 7, 9, 9]);
    }
}
