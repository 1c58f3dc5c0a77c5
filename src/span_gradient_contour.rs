//! Contour gradient.
//!
//! The gradient value of a point is its distance to the outline of a path.
//! `contour_create` draws the outline one pixel wide into a scratch raster,
//! runs the Felzenszwalb-Huttenlocher squared distance transform over it
//! and stores the square root, rescaled to 0..=255. Sampling tiles the
//! raster in both directions.

use crate::basics::{iround, is_close, is_move_to, is_stop, is_vertex, VertexSource};
use crate::dda_line::{LineBresenhamInterpolator, SUBPIXEL_SCALE};
use crate::error::{Result, SpanError};
use crate::span_gradient::{GradientFunction, GRADIENT_SUBPIXEL_SHIFT};

const FAR: f64 = 1e20;

/// Distance-field gradient shape.
#[derive(Debug, Clone)]
pub struct GradientContour {
    buffer: Vec<u8>,
    width: usize,
    height: usize,
    frame: u32,
    d1: f64,
    d2: f64,
}

impl Default for GradientContour {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientContour {
    /// `d1 = 0`, `d2 = 100`, a 10 pixel frame and no distance field yet.
    pub fn new() -> Self {
        Self::new_with_range(0.0, 100.0)
    }

    pub fn new_with_range(d1: f64, d2: f64) -> Self {
        Self {
            buffer: Vec::new(),
            width: 0,
            height: 0,
            frame: 10,
            d1,
            d2,
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Empty margin around the path's bounding box, in pixels.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    pub fn d1(&self) -> f64 {
        self.d1
    }

    pub fn d2(&self) -> f64 {
        self.d2
    }

    pub fn set_d1(&mut self, d: f64) {
        self.d1 = d;
    }

    pub fn set_d2(&mut self, d: f64) {
        self.d2 = d;
    }

    pub fn contour_width(&self) -> usize {
        self.width
    }

    pub fn contour_height(&self) -> usize {
        self.height
    }

    /// The 8-bit distance field, row by row. Empty until a contour exists.
    pub fn contour_buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Builds the distance field of `path`.
    ///
    /// Curves must already be flattened. On error the previous field is
    /// kept.
    pub fn contour_create<VS: VertexSource + ?Sized>(&mut self, path: &mut VS) -> Result<()> {
        let segments = collect_segments(path);
        let (x1, y1, x2, y2) = bounds(&segments).ok_or(SpanError::EmptyPath)?;

        let frame = self.frame as usize;
        let width = (x2 - x1).ceil() as usize + frame * 2 + 1;
        let height = (y2 - y1).ceil() as usize + frame * 2 + 1;

        let mut field = vec![FAR; width * height];
        let dx = frame as f64 - x1;
        let dy = frame as f64 - y1;
        let to_sub = |v: f64, d: f64| ((v + d) * SUBPIXEL_SCALE as f64) as i32;
        for &((ax, ay), (bx, by)) in &segments {
            let li = LineBresenhamInterpolator::new(
                to_sub(ax, dx),
                to_sub(ay, dy),
                to_sub(bx, dx),
                to_sub(by, dy),
            );
            li.walk(false, |px, py| {
                if px >= 0 && py >= 0 && (px as usize) < width && (py as usize) < height {
                    field[py as usize * width + px as usize] = 0.0;
                }
            });
        }

        squared_distance_2d(&mut field, width, height);

        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for v in field.iter_mut() {
            *v = v.sqrt();
            min = min.min(*v);
            max = max.max(*v);
        }

        let buffer = if min == max {
            vec![0u8; width * height]
        } else {
            let scale = 255.0 / (max - min);
            field
                .iter()
                .map(|v| ((v - min) * scale) as u8)
                .collect()
        };

        log::debug!(
            "contour distance field {width}x{height}, frame {}, max distance {max:.2}",
            self.frame
        );
        self.buffer = buffer;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

impl GradientFunction for GradientContour {
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        if self.buffer.is_empty() {
            return 0;
        }
        let px = (x >> GRADIENT_SUBPIXEL_SHIFT).rem_euclid(self.width as i32) as usize;
        let py = (y >> GRADIENT_SUBPIXEL_SHIFT).rem_euclid(self.height as i32) as usize;
        let v = self.buffer[py * self.width + px] as f64;
        iround(v * (self.d2 / 256.0) + self.d1) << GRADIENT_SUBPIXEL_SHIFT
    }
}

// ============================================================================
// Path flattening and bounds
// ============================================================================

type Segment = ((f64, f64), (f64, f64));

/// Turns the path into straight segments. Lone move_to points become
/// zero-length segments so they still count toward the bounds.
fn collect_segments<VS: VertexSource + ?Sized>(path: &mut VS) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = (0.0, 0.0);
    let mut last = (0.0, 0.0);
    let mut open = false;

    path.rewind(0);
    loop {
        let (mut x, mut y) = (0.0, 0.0);
        let cmd = path.vertex(&mut x, &mut y);
        if is_stop(cmd) {
            break;
        }
        if is_move_to(cmd) {
            start = (x, y);
            last = start;
            open = true;
            segments.push((start, start));
        } else if is_vertex(cmd) {
            if !open {
                start = last;
                open = true;
            }
            segments.push((last, (x, y)));
            last = (x, y);
        } else if is_close(cmd) && open {
            segments.push((last, start));
            last = start;
        }
    }
    segments
}

fn bounds(segments: &[Segment]) -> Option<(f64, f64, f64, f64)> {
    let mut it = segments.iter().flat_map(|&(a, b)| [a, b]);
    let (fx, fy) = it.next()?;
    Some(it.fold((fx, fy, fx, fy), |(x1, y1, x2, y2), (x, y)| {
        (x1.min(x), y1.min(y), x2.max(x), y2.max(y))
    }))
}

// ============================================================================
// Distance transform
// ============================================================================

/// Exact squared Euclidean distance transform, columns then rows.
fn squared_distance_2d(field: &mut [f64], width: usize, height: usize) {
    let n = width.max(height);
    let mut f = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    for x in 0..width {
        for y in 0..height {
            f[y] = field[y * width + x];
        }
        squared_distance_1d(&f[..height], &mut d, &mut v, &mut z);
        for y in 0..height {
            field[y * width + x] = d[y];
        }
    }

    for row in field.chunks_exact_mut(width) {
        f[..width].copy_from_slice(row);
        squared_distance_1d(&f[..width], &mut d, &mut v, &mut z);
        row.copy_from_slice(&d[..width]);
    }
}

/// Lower envelope of the parabolas `(q - p)^2 + f[p]`.
///
/// `v` holds the parabola apexes of the envelope, `z` the boundaries
/// between them.
fn squared_distance_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().take(n).enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PATH_FLAGS_CLOSE};

    struct Poly {
        points: Vec<(f64, f64)>,
        closed: bool,
        pos: usize,
    }

    impl Poly {
        fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
            Self {
                points: vec![(x1, y1), (x2, y1), (x2, y2), (x1, y2)],
                closed: true,
                pos: 0,
            }
        }
    }

    impl VertexSource for Poly {
        fn rewind(&mut self, _path_id: u32) {
            self.pos = 0;
        }

        fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
            let i = self.pos;
            self.pos += 1;
            if i < self.points.len() {
                (*x, *y) = self.points[i];
                return if i == 0 { PATH_CMD_MOVE_TO } else { PATH_CMD_LINE_TO };
            }
            if i == self.points.len() && self.closed {
                return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
            }
            PATH_CMD_STOP
        }
    }

    fn sample(g: &GradientContour, px: i32, py: i32) -> u8 {
        g.contour_buffer()[py as usize * g.contour_width() + px as usize]
    }

    #[test]
    fn test_rectangle_center_closer_than_frame_corner() {
        let mut g = GradientContour::new();
        g.contour_create(&mut Poly::rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        assert_eq!((g.contour_width(), g.contour_height()), (41, 41));
        let center = sample(&g, 20, 20);
        let corner = sample(&g, 0, 0);
        assert!(center < corner, "{center} vs {corner}");
        for (x, y) in [(10, 20), (20, 10), (30, 20), (20, 30)] {
            assert_eq!(sample(&g, x, y), 0, "outline midpoint ({x},{y})");
        }
        assert!(sample(&g, 12, 20) < center);
        assert!(corner >= 254);
    }

    #[test]
    fn test_outline_truncates_to_subpixel() {
        // 30.999 px lands on subpixel 7935, which is still pixel 30.
        let mut g = GradientContour::new();
        g.contour_create(&mut Poly::rect(0.0, 0.0, 20.999, 20.999)).unwrap();
        assert_eq!(g.contour_width(), 42);
        assert_eq!(sample(&g, 30, 20), 0);
        assert!(sample(&g, 31, 20) > 0);
    }

    #[test]
    fn test_calculate_scales_and_wraps() {
        let mut g = GradientContour::new_with_range(0.0, 256.0);
        g.contour_create(&mut Poly::rect(0.0, 0.0, 20.0, 20.0)).unwrap();
        let s = 1 << GRADIENT_SUBPIXEL_SHIFT;
        assert_eq!(g.calculate(0, 0, 0), sample(&g, 0, 0) as i32 * s);
        assert_eq!(g.calculate(10 * s, 15 * s, 0), 0);
        assert_eq!(g.calculate(41 * s, 41 * s, 0), g.calculate(0, 0, 0));
        assert_eq!(g.calculate(-s, 20 * s, 0), g.calculate(40 * s, 20 * s, 0));

        g.set_d1(10.0);
        assert_eq!(g.calculate(10 * s, 15 * s, 0), 10 * s);
    }

    #[test]
    fn test_distance_transform_1d() {
        let f = [FAR, FAR, 0.0, FAR, FAR, FAR, 0.0];
        let mut d = [0.0; 7];
        let mut v = [0usize; 7];
        let mut z = [0.0; 8];
        squared_distance_1d(&f, &mut d, &mut v, &mut z);
        assert_eq!(d, [4.0, 1.0, 0.0, 1.0, 4.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_path_keeps_previous_field() {
        let mut g = GradientContour::new();
        assert_eq!(g.calculate(5, 5, 0), 0);
        g.set_frame(2);
        g.contour_create(&mut Poly::rect(0.0, 0.0, 4.0, 4.0)).unwrap();
        let before = g.contour_buffer().to_vec();

        let mut empty = Poly {
            points: Vec::new(),
            closed: false,
            pos: 0,
        };
        assert_eq!(g.contour_create(&mut empty), Err(SpanError::EmptyPath));
        assert_eq!(g.contour_buffer(), &before[..]);
        assert_eq!(g.contour_width(), 9);
    }

    #[test]
    fn test_single_point_is_flat() {
        let mut g = GradientContour::new();
        g.set_frame(0);
        let mut dot = Poly {
            points: vec![(3.0, 3.0)],
            closed: false,
            pos: 0,
        };
        g.contour_create(&mut dot).unwrap();
        assert_eq!((g.contour_width(), g.contour_height()), (1, 1));
        assert_eq!(g.contour_buffer(), &[0]);
    }
}
