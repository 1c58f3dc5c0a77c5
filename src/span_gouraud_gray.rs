//! Gray Gouraud shading.

use crate::basics::VertexSource;
use crate::color::{GrayColor, IntChannel};
use crate::span_generator::SpanGenerator;
use crate::span_gouraud::{GouraudEdges, SpanGouraud};

/// Interpolates gray value and alpha across a triangle.
#[derive(Debug, Clone)]
pub struct SpanGouraudGray<C> {
    base: SpanGouraud<C>,
    edges: GouraudEdges<2>,
}

impl<C> SpanGouraudGray<C>
where
    C: GrayColor,
    C::Value: IntChannel,
{
    pub fn new() -> Self {
        Self {
            base: SpanGouraud::new(),
            edges: GouraudEdges::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_with_triangle(
        c1: C,
        c2: C,
        c3: C,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        d: f64,
    ) -> Self {
        Self {
            base: SpanGouraud::new_with_triangle(c1, c2, c3, x1, y1, x2, y2, x3, y3, d),
            edges: GouraudEdges::new(),
        }
    }

    pub fn colors(&mut self, c1: C, c2: C, c3: C) {
        self.base.colors(c1, c2, c3);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn triangle(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, d: f64) {
        self.base.triangle(x1, y1, x2, y2, x3, y3, d);
    }
}

impl<C> Default for SpanGouraudGray<C>
where
    C: GrayColor,
    C::Value: IntChannel,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> VertexSource for SpanGouraudGray<C>
where
    C: GrayColor,
    C::Value: IntChannel,
{
    fn rewind(&mut self, path_id: u32) {
        self.base.rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        self.base.vertex(x, y)
    }
}

impl<C> SpanGenerator for SpanGouraudGray<C>
where
    C: GrayColor,
    C::Value: IntChannel,
{
    type Color = C;

    fn prepare(&mut self) {
        let v = self.base.arrange_vertices();
        self.edges
            .prepare(&v, |c: &C| c.channels().map(IntChannel::to_i32));
    }

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let len = len.min(span.len() as u32);
        self.edges
            .generate(x, y, len, <C::Value as IntChannel>::MAX, |i, [v, a]| {
                span[i] = C::from_channels(IntChannel::from_i32(v), IntChannel::from_i32(a));
            });
    }
}
