//! Single-color span generator.

use crate::span_generator::SpanGenerator;

/// Paints every pixel with one color.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanSolid<C> {
    color: C,
}

impl<C: Copy> SpanSolid<C> {
    pub fn new(color: C) -> Self {
        Self { color }
    }

    pub fn set_color(&mut self, c: C) {
        self.color = c;
    }

    pub fn color(&self) -> &C {
        &self.color
    }
}

impl<C: Copy> SpanGenerator for SpanSolid<C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], _x: i32, _y: i32, len: u32) {
        for c in span.iter_mut().take(len as usize) {
            *c = self.color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgba32, Rgba8};

    #[test]
    fn test_default_is_transparent() {
        let gen = SpanSolid::<Rgba8>::default();
        assert_eq!(*gen.color(), Rgba8::new(0, 0, 0, 0));
    }

    #[test]
    fn test_fills_only_len() {
        let mut gen = SpanSolid::new(Rgba8::new(100, 150, 200, 255));
        let mut span = vec![Rgba8::default(); 5];
        gen.generate(&mut span, 10, 20, 3);
        assert!(span[..3].iter().all(|c| *c == Rgba8::new(100, 150, 200, 255)));
        assert!(span[3..].iter().all(|c| *c == Rgba8::default()));
        gen.generate(&mut span, 0, 0, 0);
        assert_eq!(span[4], Rgba8::default());
    }

    #[test]
    fn test_float_color() {
        let mut gen = SpanSolid::new(Rgba32::new(0.0, 0.0, 0.0, 1.0));
        gen.set_color(Rgba32::new(0.25, 0.5, 0.75, 1.0));
        let mut span = [Rgba32::default(); 2];
        gen.generate(&mut span, 0, 0, 2);
        assert_eq!(span[1], Rgba32::new(0.25, 0.5, 0.75, 1.0));
    }
}
