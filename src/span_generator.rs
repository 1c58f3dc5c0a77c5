//! The span generator contract.
//!
//! A rasterizer drives every paint source through this trait: `prepare`
//! once before a frame, then `generate` once per scanline span.

/// Produces the colors of one horizontal pixel run.
pub trait SpanGenerator {
    type Color;

    /// One-time setup before rendering begins.
    fn prepare(&mut self);

    /// Fills `span[..len]` with the colors of pixels `(x..x+len, y)`.
    ///
    /// A zero `len` writes nothing. `span` must hold at least `len` items.
    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32);
}

impl<G: SpanGenerator + ?Sized> SpanGenerator for &mut G {
    type Color = G::Color;

    fn prepare(&mut self) {
        (**self).prepare();
    }

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        (**self).generate(span, x, y, len);
    }
}
