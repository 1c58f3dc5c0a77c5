//! RGBA Gouraud shading.

use crate::basics::VertexSource;
use crate::color::{IntChannel, RgbaColor};
use crate::span_generator::SpanGenerator;
use crate::span_gouraud::{GouraudEdges, SpanGouraud};

/// Interpolates integer RGBA colors across a triangle, one scanline at a
/// time, with 14-bit DDA interpolators per channel.
#[derive(Debug, Clone)]
pub struct SpanGouraudRgba<C> {
    base: SpanGouraud<C>,
    edges: GouraudEdges<4>,
}

impl<C> SpanGouraudRgba<C>
where
    C: RgbaColor,
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

    pub fn base(&self) -> &SpanGouraud<C> {
        &self.base
    }
}

impl<C> Default for SpanGouraudRgba<C>
where
    C: RgbaColor,
    C::Value: IntChannel,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> VertexSource for SpanGouraudRgba<C>
where
    C: RgbaColor,
    C::Value: IntChannel,
{
    fn rewind(&mut self, path_id: u32) {
        self.base.rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        self.base.vertex(x, y)
    }
}

impl<C> SpanGenerator for SpanGouraudRgba<C>
where
    C: RgbaColor,
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
            .generate(x, y, len, <C::Value as IntChannel>::MAX, |i, [r, g, b, a]| {
                span[i] = C::from_channels(
                    IntChannel::from_i32(r),
                    IntChannel::from_i32(g),
                    IntChannel::from_i32(b),
                    IntChannel::from_i32(a),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgba16, Rgba8};

    fn inside_with_margin(p: (f64, f64), tri: &[(f64, f64); 3], margin: f64) -> bool {
        let mut sign = 0.0;
        for i in 0..3 {
            let (a, b) = (tri[i], tri[(i + 1) % 3]);
            let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
            let dist = cross / (b.0 - a.0).hypot(b.1 - a.1);
            if sign == 0.0 {
                sign = dist.signum();
            }
            if dist * sign < margin {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_uniform_color() {
        let c = Rgba8::new(100, 150, 200, 255);
        let mut sg = SpanGouraudRgba::new_with_triangle(c, c, c, 0.0, 0.0, 100.0, 0.0, 50.0, 100.0, 0.0);
        sg.prepare();
        let mut span = vec![Rgba8::default(); 200];
        sg.generate(&mut span, -50, 25, 200);
        assert!(span.iter().all(|p| *p == c));
    }

    #[test]
    fn test_interior_stays_within_vertex_colors() {
        let tri = [(10.0, 10.0), (90.0, 25.0), (35.0, 90.0)];
        let cols = [
            Rgba8::new(250, 10, 40, 255),
            Rgba8::new(20, 230, 90, 128),
            Rgba8::new(60, 70, 200, 30),
        ];
        let mut sg = SpanGouraudRgba::new_with_triangle(
            cols[0], cols[1], cols[2], tri[0].0, tri[0].1, tri[1].0, tri[1].1, tri[2].0, tri[2].1, 0.0,
        );
        sg.prepare();

        let bounds = |ch: usize| {
            let vals = cols.map(|c| c.channels()[ch] as i32);
            (*vals.iter().min().unwrap(), *vals.iter().max().unwrap())
        };
        let mut span = vec![Rgba8::default(); 100];
        let mut checked = 0;
        for y in (12..88).step_by(3) {
            sg.generate(&mut span, 0, y, 100);
            for (x, p) in span.iter().enumerate() {
                if !inside_with_margin((x as f64 + 0.5, y as f64 + 0.5), &tri, 2.0) {
                    continue;
                }
                for (ch, v) in p.channels().iter().enumerate() {
                    let (lo, hi) = bounds(ch);
                    let v = *v as i32;
                    assert!(v >= lo - 1 && v <= hi + 1, "pixel ({x},{y}) ch {ch} = {v}");
                }
                checked += 1;
            }
        }
        assert!(checked > 300);
    }

    #[test]
    fn test_extrapolation_clamps() {
        let black = Rgba8::new(0, 0, 0, 255);
        let white = Rgba8::new(255, 255, 255, 255);
        let mut sg = SpanGouraudRgba::new_with_triangle(
            black, white, white, 0.0, 0.0, 10.0, 0.0, 10.0, 100.0, 0.0,
        );
        sg.prepare();
        let mut span = vec![Rgba8::default(); 1000];
        sg.generate(&mut span, -500, 50, 1000);
        assert_eq!(span[0].r, 0);
        assert_eq!(span[999].r, 255);
        assert!(span.windows(2).all(|w| w[1].r >= w[0].r));
    }

    #[test]
    fn test_dilated_corners_do_not_wrap() {
        let black = Rgba8::new(0, 0, 0, 255);
        let white = Rgba8::new(255, 255, 255, 255);
        let mut sg = SpanGouraudRgba::new_with_triangle(
            black, white, white, 10.0, 10.0, 90.0, 10.0, 50.0, 90.0, 2.0,
        );
        sg.prepare();
        let mut span = vec![Rgba8::default(); 100];
        for y in 7..=13 {
            sg.generate(&mut span, 0, y, 100);
            for x in 6..=14 {
                assert!(span[x].r <= 80, "dark corner ({x},{y}) = {}", span[x].r);
            }
            for x in 86..=94 {
                assert!(span[x].r >= 175, "light corner ({x},{y}) = {}", span[x].r);
            }
        }
    }

    #[test]
    fn test_sixteen_bit() {
        let lo = Rgba16::new(0, 0, 0, 65535);
        let hi = Rgba16::new(65535, 0, 0, 65535);
        let mut sg = SpanGouraudRgba::new();
        sg.colors(lo, hi, hi);
        sg.triangle(0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0);
        sg.prepare();
        let mut span = vec![Rgba16::default(); 300];
        sg.generate(&mut span, -100, 99, 300);
        assert_eq!(span[0].r, 0);
        assert_eq!(span[299].r, 65535);
        assert!(span.iter().all(|p| p.a == 65535));
    }

    #[test]
    fn test_outline_forwarded() {
        let c = Rgba8::default();
        let mut sg = SpanGouraudRgba::new_with_triangle(c, c, c, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0);
        sg.rewind(0);
        let (mut x, mut y) = (0.0, 0.0);
        assert_eq!(sg.vertex(&mut x, &mut y), crate::basics::PATH_CMD_MOVE_TO);
        assert_eq!((x, y), (1.0, 2.0));
        assert_eq!(sg.base().vertices()[2].x, 5.0);
    }
}
