//! Gouraud shading base: a triangle with one color per vertex.
//!
//! `SpanGouraud` stores the triangle and yields its outline as a vertex
//! source. `GouraudEdges` is the per-scanline machinery shared by the RGBA
//! and gray shaders: three edge calculators (the long edge from the top
//! vertex to the bottom one, and the two short edges meeting at the middle
//! vertex) plus the three-phase span loop.

use crate::basics::{
    iround, VertexSource, PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP,
    PATH_FLAGS_CLOSE,
};
use crate::dda_line::DdaLineInterpolator;
use crate::math::{calc_intersection, cross_product, dilate_triangle};

/// Horizontal precision of the edge positions.
pub const GOURAUD_SUBPIXEL_SHIFT: i32 = 4;
pub const GOURAUD_SUBPIXEL_SCALE: i32 = 1 << GOURAUD_SUBPIXEL_SHIFT;

/// Reciprocal used for edges flatter than `1e-5` pixels.
const FLAT_EDGE_INV_DY: f64 = 1e5;

// ============================================================================
// Triangle storage
// ============================================================================

/// Triangle corner with its color.
#[derive(Debug, Clone, Copy, Default)]
pub struct GouraudVertex<C> {
    pub x: f64,
    pub y: f64,
    pub color: C,
}

/// Triangle with per-vertex colors.
///
/// With a non-zero dilation the outline becomes a six-point polygon made of
/// the three edges pushed outward, while the color geometry uses the miter
/// points where consecutive pushed edges meet. Neighbouring triangles then
/// overlap slightly instead of leaving seams.
#[derive(Debug, Clone)]
pub struct SpanGouraud<C> {
    coord: [GouraudVertex<C>; 3],
    x: [f64; 8],
    y: [f64; 8],
    cmd: [u32; 8],
    vertex: usize,
}

impl<C: Copy + Default> SpanGouraud<C> {
    pub fn new() -> Self {
        Self {
            coord: [GouraudVertex::default(); 3],
            x: [0.0; 8],
            y: [0.0; 8],
            cmd: [PATH_CMD_STOP; 8],
            vertex: 0,
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
        let mut s = Self::new();
        s.colors(c1, c2, c3);
        s.triangle(x1, y1, x2, y2, x3, y3, d);
        s
    }

    pub fn colors(&mut self, c1: C, c2: C, c3: C) {
        self.coord[0].color = c1;
        self.coord[1].color = c2;
        self.coord[2].color = c3;
    }

    /// Sets the corners. `d` is the dilation in pixels, 0 for none.
    #[allow(clippy::too_many_arguments)]
    pub fn triangle(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, d: f64) {
        let corners = [(x1, y1), (x2, y2), (x3, y3)];
        for (v, &(x, y)) in self.coord.iter_mut().zip(&corners) {
            v.x = x;
            v.y = y;
        }

        if d == 0.0 {
            for (i, &(x, y)) in corners.iter().enumerate() {
                self.x[i] = x;
                self.y[i] = y;
            }
            self.set_commands(3);
            return;
        }

        let pts = dilate_triangle(x1, y1, x2, y2, x3, y3, d);
        for (i, &(x, y)) in pts.iter().enumerate() {
            self.x[i] = x;
            self.y[i] = y;
        }
        // Corner k sits where offset edge k-1 meets offset edge k.
        for (k, (a, b)) in [(4, 0), (0, 2), (2, 4)].into_iter().enumerate() {
            if let Some((ix, iy)) = calc_intersection(
                pts[a].0,
                pts[a].1,
                pts[a + 1].0,
                pts[a + 1].1,
                pts[b].0,
                pts[b].1,
                pts[b + 1].0,
                pts[b + 1].1,
            ) {
                self.coord[k].x = ix;
                self.coord[k].y = iy;
            }
        }
        self.set_commands(6);
    }

    fn set_commands(&mut self, points: usize) {
        self.cmd = [PATH_CMD_STOP; 8];
        self.cmd[0] = PATH_CMD_MOVE_TO;
        for c in &mut self.cmd[1..points] {
            *c = PATH_CMD_LINE_TO;
        }
        self.cmd[points] = PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
        self.x[points] = 0.0;
        self.y[points] = 0.0;
    }

    /// Color geometry corners, after dilation.
    pub fn vertices(&self) -> &[GouraudVertex<C>; 3] {
        &self.coord
    }

    /// Corners sorted by ascending `y`.
    pub fn arrange_vertices(&self) -> [GouraudVertex<C>; 3] {
        let mut coord = self.coord;
        if coord[0].y > coord[2].y {
            coord.swap(0, 2);
        }
        if coord[0].y > coord[1].y {
            coord.swap(0, 1);
        }
        if coord[1].y > coord[2].y {
            coord.swap(1, 2);
        }
        coord
    }
}

impl<C: Copy + Default> Default for SpanGouraud<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Copy + Default> VertexSource for SpanGouraud<C> {
    fn rewind(&mut self, _path_id: u32) {
        self.vertex = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        let Some(&cmd) = self.cmd.get(self.vertex) else {
            return PATH_CMD_STOP;
        };
        *x = self.x[self.vertex];
        *y = self.y[self.vertex];
        if cmd != PATH_CMD_STOP {
            self.vertex += 1;
        }
        cmd
    }
}

// ============================================================================
// Edge calculators
// ============================================================================

/// Position and `N` channel values along one edge at a given scanline.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeCalc<const N: usize> {
    x1: f64,
    y1: f64,
    dx: f64,
    inv_dy: f64,
    c1: [i32; N],
    dc: [i32; N],
    c: [i32; N],
    x: i32,
}

impl<const N: usize> EdgeCalc<N> {
    fn new() -> Self {
        Self {
            x1: 0.0,
            y1: 0.0,
            dx: 0.0,
            inv_dy: 0.0,
            c1: [0; N],
            dc: [0; N],
            c: [0; N],
            x: 0,
        }
    }

    fn init(&mut self, p1: (f64, f64), c1: [i32; N], p2: (f64, f64), c2: [i32; N]) {
        self.x1 = p1.0 - 0.5;
        self.y1 = p1.1 - 0.5;
        self.dx = p2.0 - p1.0;
        let dy = p2.1 - p1.1;
        self.inv_dy = if dy < 1e-5 { FLAT_EDGE_INV_DY } else { 1.0 / dy };
        self.c1 = c1;
        for i in 0..N {
            self.dc[i] = c2[i] - c1[i];
        }
    }

    fn calc(&mut self, y: f64) {
        let k = ((y - self.y1) * self.inv_dy).clamp(0.0, 1.0);
        for i in 0..N {
            self.c[i] = self.c1[i] + iround(self.dc[i] as f64 * k);
        }
        self.x = iround((self.x1 + self.dx * k) * GOURAUD_SUBPIXEL_SCALE as f64);
    }
}

type ChannelDda = DdaLineInterpolator<14, 0>;

/// Scanline driver shared by the Gouraud color variants.
#[derive(Debug, Clone)]
pub(crate) struct GouraudEdges<const N: usize> {
    swap: bool,
    y2: i32,
    long_edge: EdgeCalc<N>,
    upper_edge: EdgeCalc<N>,
    lower_edge: EdgeCalc<N>,
}

impl<const N: usize> GouraudEdges<N> {
    pub(crate) fn new() -> Self {
        Self {
            swap: false,
            y2: 0,
            long_edge: EdgeCalc::new(),
            upper_edge: EdgeCalc::new(),
            lower_edge: EdgeCalc::new(),
        }
    }

    /// Sets up the edges of the y-sorted corners `v`.
    pub(crate) fn prepare<C>(&mut self, v: &[GouraudVertex<C>; 3], channels: impl Fn(&C) -> [i32; N]) {
        let p = |i: usize| (v[i].x, v[i].y);
        let c = |i: usize| channels(&v[i].color);
        self.y2 = v[1].y as i32;
        self.swap = cross_product(v[0].x, v[0].y, v[2].x, v[2].y, v[1].x, v[1].y) < 0.0;
        self.long_edge.init(p(0), c(0), p(2), c(2));
        self.upper_edge.init(p(0), c(0), p(1), c(1));
        self.lower_edge.init(p(1), c(1), p(2), c(2));
        log::trace!(
            "gouraud edges: middle y {}, {} winding",
            self.y2,
            if self.swap { "swapped" } else { "direct" }
        );
    }

    /// Emits `len` pixels of row `y` from `x` through `put(index, channels)`.
    ///
    /// Pixels left of the left edge and right of the right edge are
    /// extrapolated and clamped to `[0, lim]`; the pixels in between are
    /// passed on unclamped.
    pub(crate) fn generate(
        &mut self,
        x: i32,
        y: i32,
        len: u32,
        lim: i32,
        mut put: impl FnMut(usize, [i32; N]),
    ) {
        if len == 0 {
            return;
        }
        self.long_edge.calc(y as f64);
        let short_edge = if y <= self.y2 {
            self.upper_edge.calc(y as f64 + self.upper_edge.inv_dy);
            &self.upper_edge
        } else {
            self.lower_edge.calc(y as f64 - self.lower_edge.inv_dy);
            &self.lower_edge
        };
        let (pc1, pc2) = if self.swap {
            (short_edge, &self.long_edge)
        } else {
            (&self.long_edge, short_edge)
        };

        let mut nlen = (pc2.x - pc1.x).abs().max(1);
        let mut dda: [ChannelDda; N] =
            std::array::from_fn(|i| ChannelDda::new(pc1.c[i], pc2.c[i], nlen as u32));

        // Roll the interpolators back to the first requested pixel.
        let mut start = pc1.x - (x << GOURAUD_SUBPIXEL_SHIFT);
        for d in dda.iter_mut() {
            if start >= 0 {
                d.dec_by(start as u32);
            } else {
                d.inc_by(start.unsigned_abs());
            }
        }
        nlen += start;

        let step = GOURAUD_SUBPIXEL_SCALE as u32;
        let values = |dda: &[ChannelDda; N], clamp: bool| -> [i32; N] {
            std::array::from_fn(|i| {
                let v = dda[i].y();
                if clamp {
                    v.clamp(0, lim)
                } else {
                    v
                }
            })
        };

        let len = len as usize;
        let mut idx = 0usize;

        // Leading pixels, usually one or two.
        while idx < len && start > 0 {
            put(idx, values(&dda, true));
            dda.iter_mut().for_each(|d| d.inc_by(step));
            nlen -= GOURAUD_SUBPIXEL_SCALE;
            start -= GOURAUD_SUBPIXEL_SCALE;
            idx += 1;
        }

        while idx < len && nlen > 0 {
            put(idx, values(&dda, false));
            dda.iter_mut().for_each(|d| d.inc_by(step));
            nlen -= GOURAUD_SUBPIXEL_SCALE;
            idx += 1;
        }

        // Trailing pixels past the right edge.
        while idx < len {
            put(idx, values(&dda, true));
            dda.iter_mut().for_each(|d| d.inc_by(step));
            idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;

    fn drain(sg: &mut SpanGouraud<Rgba8>) -> Vec<(u32, f64, f64)> {
        sg.rewind(0);
        let mut out = Vec::new();
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = sg.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                return out;
            }
            out.push((cmd, x, y));
        }
    }

    #[test]
    fn test_outline_without_dilation() {
        let mut sg = SpanGouraud::<Rgba8>::new();
        sg.triangle(10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 0.0);
        let close = PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
        assert_eq!(
            drain(&mut sg),
            vec![
                (PATH_CMD_MOVE_TO, 10.0, 20.0),
                (PATH_CMD_LINE_TO, 30.0, 40.0),
                (PATH_CMD_LINE_TO, 50.0, 60.0),
                (close, 0.0, 0.0),
            ]
        );
        // Rewinding replays the outline.
        assert_eq!(drain(&mut sg).len(), 4);
    }

    #[test]
    fn test_empty_outline() {
        let mut sg = SpanGouraud::<Rgba8>::default();
        assert!(drain(&mut sg).is_empty());
    }

    #[test]
    fn test_dilation_grows_triangle() {
        let mut sg = SpanGouraud::<Rgba8>::new();
        sg.triangle(0.0, 0.0, 100.0, 0.0, 50.0, 100.0, 2.0);
        let outline = drain(&mut sg);
        assert_eq!(outline.len(), 7);
        assert_eq!(outline[0].0, PATH_CMD_MOVE_TO);
        assert!(outline[1..6].iter().all(|p| p.0 == PATH_CMD_LINE_TO));

        // Miter corners move away from the centroid.
        let (cx, cy): (f64, f64) = (50.0, 100.0 / 3.0);
        let orig: [(f64, f64); 3] = [(0.0, 0.0), (100.0, 0.0), (50.0, 100.0)];
        for (v, o) in sg.vertices().iter().zip(orig) {
            let before = (o.0 - cx).hypot(o.1 - cy);
            let after = (v.x - cx).hypot(v.y - cy);
            assert!(after > before + 1.0, "{after} vs {before}");
        }
        // The top edge was pushed up by the dilation distance.
        assert!((sg.vertices()[0].y + 2.0).abs() < 1e-9);
        assert!((sg.vertices()[1].y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrange_vertices() {
        let red = Rgba8::new(255, 0, 0, 255);
        let green = Rgba8::new(0, 255, 0, 255);
        let blue = Rgba8::new(0, 0, 255, 255);
        let sg = SpanGouraud::new_with_triangle(red, green, blue, 50.0, 100.0, 0.0, 0.0, 100.0, 50.0, 0.0);
        let sorted = sg.arrange_vertices();
        assert_eq!([sorted[0].y, sorted[1].y, sorted[2].y], [0.0, 50.0, 100.0]);
        assert_eq!(sorted[0].color, green);
        assert_eq!(sorted[1].color, blue);
        assert_eq!(sorted[2].color, red);
    }

    #[test]
    fn test_flat_edge_uses_sentinel() {
        let mut e = EdgeCalc::<1>::new();
        e.init((0.0, 5.0), [0], (10.0, 5.0), [100]);
        assert_eq!(e.inv_dy, FLAT_EDGE_INV_DY);
        e.calc(5.0);
        assert_eq!(e.c[0], 100);
    }

    #[test]
    fn test_edges_zero_len_is_noop() {
        let sg = SpanGouraud::new_with_triangle(0u8, 0, 0, 0.0, 0.0, 10.0, 0.0, 5.0, 10.0, 0.0);
        let mut edges = GouraudEdges::<1>::new();
        edges.prepare(&sg.arrange_vertices(), |c| [*c as i32]);
        let mut calls = 0;
        edges.generate(0, 5, 0, 255, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }
}
