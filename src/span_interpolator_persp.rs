//! Perspective span interpolators.
//!
//! Both variants keep the direct and the inverse mapping. The inverse is
//! used to estimate the local magnification at the span ends: a source
//! point one subpixel away is mapped back and the reciprocal of the
//! distance becomes the scale, which is then walked across the span.
//!
//! - `SpanInterpolatorPerspExact` divides per pixel through
//!   `PerspectiveIteratorX`.
//! - `SpanInterpolatorPerspLerp` transforms the ends only and walks the
//!   transformed coordinates linearly.

use crate::basics::{iround, uround};
use crate::dda_line::Dda2LineInterpolator;
use crate::error::Result;
use crate::span_interpolator_linear::{SpanInterpolator, SUBPIXEL_SCALE, SUBPIXEL_SHIFT};
use crate::trans_perspective::{PerspectiveIteratorX, TransPerspective};

/// Rectangle corners in quad order.
fn rect_quad(x1: f64, y1: f64, x2: f64, y2: f64) -> [f64; 8] {
    [x1, y1, x2, y1, x2, y2, x1, y2]
}

// ============================================================================
// Shared direct/inverse pair
// ============================================================================

#[derive(Debug, Clone)]
struct PerspPair {
    dir: TransPerspective,
    inv: TransPerspective,
}

impl PerspPair {
    fn identity() -> Self {
        Self {
            dir: TransPerspective::new(),
            inv: TransPerspective::new(),
        }
    }

    /// Solves both directions first so a failure leaves the pair intact.
    fn quad_to_quad(&mut self, src: &[f64; 8], dst: &[f64; 8]) -> Result<()> {
        let dir = TransPerspective::new_quad_to_quad(src, dst)?;
        let inv = TransPerspective::new_quad_to_quad(dst, src)?;
        self.dir = dir;
        self.inv = inv;
        Ok(())
    }

    /// Scale at source point `(x, y)`, whose image is `(xt, yt)`, along
    /// the offset `(dx, dy)` given in source units.
    fn scale_at(&self, xt: f64, yt: f64, x: f64, y: f64, dx: f64, dy: f64) -> i32 {
        let mut px = xt + dx;
        let mut py = yt + dy;
        self.inv.transform(&mut px, &mut py);
        px -= x;
        py -= y;
        (uround(SUBPIXEL_SCALE as f64 / (px * px + py * py).sqrt()) >> SUBPIXEL_SHIFT) as i32
    }

    fn scales_at(&self, xt: f64, yt: f64, x: f64, y: f64) -> (i32, i32) {
        let delta = 1.0 / SUBPIXEL_SCALE as f64;
        (
            self.scale_at(xt, yt, x, y, delta, 0.0),
            self.scale_at(xt, yt, x, y, 0.0, delta),
        )
    }

    /// Scale walkers from the current scale toward the end point `(xe, ye)`.
    fn rescale(
        &self,
        sx: &mut Dda2LineInterpolator,
        sy: &mut Dda2LineInterpolator,
        xe: f64,
        ye: f64,
        len: u32,
    ) {
        let (mut xt, mut yt) = (xe, ye);
        self.dir.transform(&mut xt, &mut yt);
        let (sx2, sy2) = self.scales_at(xt, yt, xe, ye);
        *sx = Dda2LineInterpolator::new_forward(sx.y(), sx2, len as i32);
        *sy = Dda2LineInterpolator::new_forward(sy.y(), sy2, len as i32);
    }
}

macro_rules! persp_setup {
    ($name:ident) => {
        impl $name {
            pub fn new_quad_to_quad(src: &[f64; 8], dst: &[f64; 8]) -> Result<Self> {
                let mut s = Self::new();
                s.quad_to_quad(src, dst)?;
                Ok(s)
            }

            pub fn new_rect_to_quad(x1: f64, y1: f64, x2: f64, y2: f64, quad: &[f64; 8]) -> Result<Self> {
                Self::new_quad_to_quad(&rect_quad(x1, y1, x2, y2), quad)
            }

            pub fn new_quad_to_rect(quad: &[f64; 8], x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
                Self::new_quad_to_quad(quad, &rect_quad(x1, y1, x2, y2))
            }

            /// Fails with `DegenerateTransform` when either direction cannot
            /// be solved; the previous mapping is kept in that case.
            pub fn quad_to_quad(&mut self, src: &[f64; 8], dst: &[f64; 8]) -> Result<()> {
                self.pair.quad_to_quad(src, dst)
            }

            pub fn rect_to_quad(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, quad: &[f64; 8]) -> Result<()> {
                self.quad_to_quad(&rect_quad(x1, y1, x2, y2), quad)
            }

            pub fn quad_to_rect(&mut self, quad: &[f64; 8], x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
                self.quad_to_quad(quad, &rect_quad(x1, y1, x2, y2))
            }

            pub fn transform(&self, x: &mut f64, y: &mut f64) {
                self.pair.dir.transform(x, y);
            }

            pub fn trans_dir(&self) -> &TransPerspective {
                &self.pair.dir
            }

            pub fn trans_inv(&self) -> &TransPerspective {
                &self.pair.inv
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

// ============================================================================
// SpanInterpolatorPerspExact
// ============================================================================

/// Per-pixel projective divide with interpolated local scale.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorPerspExact {
    pair: PerspPair,
    iterator: PerspectiveIteratorX,
    scale_x: Dda2LineInterpolator,
    scale_y: Dda2LineInterpolator,
}

impl SpanInterpolatorPerspExact {
    /// Identity mapping.
    pub fn new() -> Self {
        let pair = PerspPair::identity();
        Self {
            iterator: pair.dir.begin(0.0, 0.0, 1.0),
            pair,
            scale_x: Dda2LineInterpolator::new_forward(0, 0, 1),
            scale_y: Dda2LineInterpolator::new_forward(0, 0, 1),
        }
    }
}

persp_setup!(SpanInterpolatorPerspExact);

impl SpanInterpolator for SpanInterpolatorPerspExact {
    fn begin(&mut self, x: f64, y: f64, len: u32) {
        self.iterator = self.pair.dir.begin(x, y, 1.0);
        let (sx1, sy1) = self.pair.scales_at(self.iterator.x, self.iterator.y, x, y);
        self.scale_x = Dda2LineInterpolator::new_forward(sx1, sx1, 1);
        self.scale_y = Dda2LineInterpolator::new_forward(sy1, sy1, 1);
        self.pair
            .rescale(&mut self.scale_x, &mut self.scale_y, x + len as f64, y, len);
    }

    #[inline]
    fn next(&mut self) {
        self.iterator.next();
        self.scale_x.inc();
        self.scale_y.inc();
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        *x = iround(self.iterator.x * SUBPIXEL_SCALE as f64);
        *y = iround(self.iterator.y * SUBPIXEL_SCALE as f64);
    }

    /// Only the scale walk is redirected; coordinates stay exact.
    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        self.pair
            .rescale(&mut self.scale_x, &mut self.scale_y, xe, ye, len);
    }

    fn local_scale(&self) -> Option<(i32, i32)> {
        Some((self.scale_x.y(), self.scale_y.y()))
    }
}

// ============================================================================
// SpanInterpolatorPerspLerp
// ============================================================================

/// Linear walk between perspective-transformed span ends.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorPerspLerp {
    pair: PerspPair,
    coord_x: Dda2LineInterpolator,
    coord_y: Dda2LineInterpolator,
    scale_x: Dda2LineInterpolator,
    scale_y: Dda2LineInterpolator,
}

impl SpanInterpolatorPerspLerp {
    /// Identity mapping.
    pub fn new() -> Self {
        Self {
            pair: PerspPair::identity(),
            coord_x: Dda2LineInterpolator::new_forward(0, 0, 1),
            coord_y: Dda2LineInterpolator::new_forward(0, 0, 1),
            scale_x: Dda2LineInterpolator::new_forward(0, 0, 1),
            scale_y: Dda2LineInterpolator::new_forward(0, 0, 1),
        }
    }

    fn retarget(&mut self, xe: f64, ye: f64, len: u32) {
        let (mut xt, mut yt) = (xe, ye);
        self.pair.dir.transform(&mut xt, &mut yt);
        self.coord_x = Dda2LineInterpolator::new_forward(
            self.coord_x.y(),
            iround(xt * SUBPIXEL_SCALE as f64),
            len as i32,
        );
        self.coord_y = Dda2LineInterpolator::new_forward(
            self.coord_y.y(),
            iround(yt * SUBPIXEL_SCALE as f64),
            len as i32,
        );
        self.pair
            .rescale(&mut self.scale_x, &mut self.scale_y, xe, ye, len);
    }
}

persp_setup!(SpanInterpolatorPerspLerp);

impl SpanInterpolator for SpanInterpolatorPerspLerp {
    fn begin(&mut self, x: f64, y: f64, len: u32) {
        let (mut xt, mut yt) = (x, y);
        self.pair.dir.transform(&mut xt, &mut yt);
        let x1 = iround(xt * SUBPIXEL_SCALE as f64);
        let y1 = iround(yt * SUBPIXEL_SCALE as f64);
        let (sx1, sy1) = self.pair.scales_at(xt, yt, x, y);

        self.coord_x = Dda2LineInterpolator::new_forward(x1, x1, 1);
        self.coord_y = Dda2LineInterpolator::new_forward(y1, y1, 1);
        self.scale_x = Dda2LineInterpolator::new_forward(sx1, sx1, 1);
        self.scale_y = Dda2LineInterpolator::new_forward(sy1, sy1, 1);
        self.retarget(x + len as f64, y, len);
    }

    #[inline]
    fn next(&mut self) {
        self.coord_x.inc();
        self.coord_y.inc();
        self.scale_x.inc();
        self.scale_y.inc();
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        *x = self.coord_x.y();
        *y = self.coord_y.y();
    }

    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        self.retarget(xe, ye, len);
    }

    fn local_scale(&self) -> Option<(i32, i32)> {
        Some((self.scale_x.y(), self.scale_y.y()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpanError;

    const SQUARE: [f64; 8] = [0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0];

    fn coords<I: SpanInterpolator>(interp: &I) -> (i32, i32) {
        let (mut x, mut y) = (0, 0);
        interp.coordinates(&mut x, &mut y);
        (x, y)
    }

    fn assert_identity_walk<I: SpanInterpolator>(interp: &mut I) {
        interp.begin(20.0, 30.0, 50);
        for i in 0..=50 {
            let (x, y) = coords(interp);
            assert!((x - (20 + i) * 256).abs() <= 2, "step {i}: x={x}");
            assert!((y - 30 * 256).abs() <= 2, "step {i}: y={y}");
            interp.next();
        }
    }

    #[test]
    fn test_exact_identity_quad() {
        let mut interp = SpanInterpolatorPerspExact::new_quad_to_quad(&SQUARE, &SQUARE).unwrap();
        assert_identity_walk(&mut interp);
    }

    #[test]
    fn test_lerp_identity_quad() {
        let mut interp = SpanInterpolatorPerspLerp::new_quad_to_quad(&SQUARE, &SQUARE).unwrap();
        assert_identity_walk(&mut interp);
    }

    #[test]
    fn test_identity_local_scale() {
        let mut interp = SpanInterpolatorPerspExact::new_quad_to_quad(&SQUARE, &SQUARE).unwrap();
        interp.begin(10.0, 10.0, 8);
        let (sx, sy) = interp.local_scale().unwrap();
        assert!((sx - 256).abs() <= 1, "sx={sx}");
        assert!((sy - 256).abs() <= 1, "sy={sy}");
    }

    #[test]
    fn test_magnified_local_scale() {
        // Each pixel covers two source units, so the scale doubles.
        let dst = [0.0, 0.0, 200.0, 0.0, 200.0, 200.0, 0.0, 200.0];
        let mut interp = SpanInterpolatorPerspLerp::new_quad_to_quad(&SQUARE, &dst).unwrap();
        interp.begin(10.0, 10.0, 4);
        let (sx, sy) = interp.local_scale().unwrap();
        assert!((sx - 512).abs() <= 2, "sx={sx}");
        assert!((sy - 512).abs() <= 2, "sy={sy}");
        assert_eq!(coords(&interp), (20 * 256, 20 * 256));
    }

    #[test]
    fn test_rect_to_quad_corner() {
        let quad = [10.0, 10.0, 110.0, 10.0, 110.0, 110.0, 10.0, 110.0];
        let mut exact = SpanInterpolatorPerspExact::new_rect_to_quad(0.0, 0.0, 100.0, 100.0, &quad).unwrap();
        let mut lerp = SpanInterpolatorPerspLerp::new_rect_to_quad(0.0, 0.0, 100.0, 100.0, &quad).unwrap();
        exact.begin(0.0, 0.0, 1);
        lerp.begin(0.0, 0.0, 1);
        for (x, y) in [coords(&exact), coords(&lerp)] {
            assert!((x - 10 * 256).abs() < 5, "x={x}");
            assert!((y - 10 * 256).abs() < 5, "y={y}");
        }
    }

    #[test]
    fn test_exact_follows_projective_curve() {
        let dst = [0.0, 0.0, 100.0, 20.0, 100.0, 80.0, 0.0, 100.0];
        let mut interp = SpanInterpolatorPerspExact::new_quad_to_quad(&SQUARE, &dst).unwrap();
        interp.begin(0.0, 50.0, 100);
        for i in 0..=100 {
            let (mut tx, mut ty) = (i as f64, 50.0);
            interp.transform(&mut tx, &mut ty);
            let (x, y) = coords(&interp);
            assert!((x - iround(tx * 256.0)).abs() <= 1);
            assert!((y - iround(ty * 256.0)).abs() <= 1);
            interp.next();
        }
    }

    #[test]
    fn test_degenerate_quad_keeps_previous_mapping() {
        let mut interp = SpanInterpolatorPerspLerp::new();
        let line = [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        assert_eq!(
            interp.quad_to_quad(&SQUARE, &line),
            Err(SpanError::DegenerateTransform)
        );
        assert!(interp.trans_dir().is_identity(1e-12));
    }

    #[test]
    fn test_lerp_resynchronize_lands_on_target() {
        let mut interp = SpanInterpolatorPerspLerp::new();
        interp.begin(0.0, 0.0, 10);
        for _ in 0..4 {
            interp.next();
        }
        interp.resynchronize(30.0, 0.0, 6);
        for _ in 0..6 {
            interp.next();
        }
        assert_eq!(coords(&interp), (30 * 256, 0));
    }
}
