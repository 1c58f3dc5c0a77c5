//! Perspective 2D transformations.
//!
//! A 3×3 projective matrix built from a pair of quadrilaterals, plus the
//! scanline walker the perspective interpolators step through.

use crate::error::{Result, SpanError};
use crate::span_interpolator_linear::{ScalingAbs, Transformer};

// ============================================================================
// TransPerspective
// ============================================================================

/// Perspective 2D transformation (3×3 projective matrix).
///
/// ```text
/// | sx  shy  w0 |
/// | shx  sy  w1 |
/// | tx   ty  w2 |
/// ```
///
/// A point maps as `m = 1/(x*w0 + y*w1 + w2)`, then
/// `x' = m*(x*sx + y*shx + tx)`, `y' = m*(x*shy + y*sy + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransPerspective {
    pub sx: f64,
    pub shy: f64,
    pub w0: f64,
    pub shx: f64,
    pub sy: f64,
    pub w1: f64,
    pub tx: f64,
    pub ty: f64,
    pub w2: f64,
}

impl TransPerspective {
    /// Identity matrix.
    pub const fn new() -> Self {
        Self {
            sx: 1.0,
            shy: 0.0,
            w0: 0.0,
            shx: 0.0,
            sy: 1.0,
            w1: 0.0,
            tx: 0.0,
            ty: 0.0,
            w2: 1.0,
        }
    }

    /// Mapping that sends the corners of `src` onto the corners of `dst`.
    ///
    /// Both quads are given as `x0,y0 .. x3,y3`. Fails with
    /// `DegenerateTransform` when either quad has collinear corners.
    pub fn new_quad_to_quad(src: &[f64; 8], dst: &[f64; 8]) -> Result<Self> {
        let to_square = Self::unit_square_to(src)?.inverted()?;
        let from_square = Self::unit_square_to(dst)?;
        Ok(to_square.then(&from_square))
    }

    /// In-place form of [`Self::new_quad_to_quad`]; `self` is kept on failure.
    pub fn quad_to_quad(&mut self, src: &[f64; 8], dst: &[f64; 8]) -> Result<()> {
        *self = Self::new_quad_to_quad(src, dst)?;
        Ok(())
    }

    /// Projective map of the unit square (0,0)-(1,1) onto `q`.
    fn unit_square_to(q: &[f64; 8]) -> Result<Self> {
        let [x0, y0, x1, y1, x2, y2, x3, y3] = *q;
        let ex = x0 - x1 + x2 - x3;
        let ey = y0 - y1 + y2 - y3;

        let (w0, w1) = if ex == 0.0 && ey == 0.0 {
            // Opposite sides are parallel.
            (0.0, 0.0)
        } else {
            let (ax, ay) = (x1 - x2, y1 - y2);
            let (bx, by) = (x3 - x2, y3 - y2);
            let den = ax * by - bx * ay;
            if den == 0.0 {
                return Err(SpanError::DegenerateTransform);
            }
            ((ex * by - ey * bx) / den, (ey * ax - ex * ay) / den)
        };

        Ok(Self {
            sx: x1 - x0 + w0 * x1,
            shy: y1 - y0 + w0 * y1,
            w0,
            shx: x3 - x0 + w1 * x3,
            sy: y3 - y0 + w1 * y3,
            w1,
            tx: x0,
            ty: y0,
            w2: 1.0,
        })
    }

    /// Adjugate over determinant. A singular or non-finite matrix fails.
    fn inverted(&self) -> Result<Self> {
        let m = self;
        let c0 = m.sy * m.w2 - m.w1 * m.ty;
        let c1 = m.w0 * m.ty - m.shy * m.w2;
        let c2 = m.shy * m.w1 - m.w0 * m.sy;
        let det = m.sx * c0 + m.shx * c1 + m.tx * c2;
        if det == 0.0 || !det.is_finite() {
            return Err(SpanError::DegenerateTransform);
        }
        let k = 1.0 / det;
        Ok(Self {
            sx: k * c0,
            shy: k * c1,
            w0: k * c2,
            shx: k * (m.w1 * m.tx - m.shx * m.w2),
            sy: k * (m.sx * m.w2 - m.w0 * m.tx),
            w1: k * (m.w0 * m.shx - m.sx * m.w1),
            tx: k * (m.shx * m.ty - m.sy * m.tx),
            ty: k * (m.shy * m.tx - m.sx * m.ty),
            w2: k * (m.sx * m.sy - m.shy * m.shx),
        })
    }

    /// `self` followed by `next`.
    fn then(&self, next: &Self) -> Self {
        let (a, b) = (next, self);
        Self {
            sx: a.sx * b.sx + a.shx * b.shy + a.tx * b.w0,
            shy: a.shy * b.sx + a.sy * b.shy + a.ty * b.w0,
            w0: a.w0 * b.sx + a.w1 * b.shy + a.w2 * b.w0,
            shx: a.sx * b.shx + a.shx * b.sy + a.tx * b.w1,
            sy: a.shy * b.shx + a.sy * b.sy + a.ty * b.w1,
            w1: a.w0 * b.shx + a.w1 * b.sy + a.w2 * b.w1,
            tx: a.sx * b.tx + a.shx * b.ty + a.tx * b.w2,
            ty: a.shy * b.tx + a.sy * b.ty + a.ty * b.w2,
            w2: a.w0 * b.tx + a.w1 * b.ty + a.w2 * b.w2,
        }
    }

    /// Forward mapping with perspective divide.
    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        let (px, py) = (*x, *y);
        let m = 1.0 / (px * self.w0 + py * self.w1 + self.w2);
        *x = m * (px * self.sx + py * self.shx + self.tx);
        *y = m * (px * self.shy + py * self.sy + self.ty);
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        let id = Self::new();
        [
            self.sx - id.sx,
            self.shy - id.shy,
            self.w0 - id.w0,
            self.shx - id.shx,
            self.sy - id.sy,
            self.w1 - id.w1,
            self.tx - id.tx,
            self.ty - id.ty,
            self.w2 - id.w2,
        ]
        .iter()
        .all(|d| d.abs() <= epsilon)
    }

    pub fn scaling_abs(&self) -> (f64, f64) {
        (self.sx.hypot(self.shx), self.shy.hypot(self.sy))
    }

    /// Scanline walker starting at `(x, y)` and advancing `step` in x.
    pub fn begin(&self, x: f64, y: f64, step: f64) -> PerspectiveIteratorX {
        PerspectiveIteratorX::new(x, y, step, self)
    }
}

impl Default for TransPerspective {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for TransPerspective {
    #[inline]
    fn transform(&self, x: &mut f64, y: &mut f64) {
        TransPerspective::transform(self, x, y);
    }
}

impl ScalingAbs for TransPerspective {
    fn scaling_abs(&self) -> (f64, f64) {
        TransPerspective::scaling_abs(self)
    }
}

// ============================================================================
// PerspectiveIteratorX
// ============================================================================

/// Walks a scanline through a perspective mapping, keeping running
/// numerators and denominator so each step costs one divide.
#[derive(Debug, Clone)]
pub struct PerspectiveIteratorX {
    den: f64,
    den_step: f64,
    nom_x: f64,
    nom_x_step: f64,
    nom_y: f64,
    nom_y_step: f64,
    pub x: f64,
    pub y: f64,
}

impl PerspectiveIteratorX {
    fn new(px: f64, py: f64, step: f64, m: &TransPerspective) -> Self {
        let den = px * m.w0 + py * m.w1 + m.w2;
        let nom_x = px * m.sx + py * m.shx + m.tx;
        let nom_y = px * m.shy + py * m.sy + m.ty;
        Self {
            den,
            den_step: m.w0 * step,
            nom_x,
            nom_x_step: step * m.sx,
            nom_y,
            nom_y_step: step * m.shy,
            x: nom_x / den,
            y: nom_y / den,
        }
    }

    #[inline]
    pub fn next(&mut self) {
        self.den += self.den_step;
        self.nom_x += self.nom_x_step;
        self.nom_y += self.nom_y_step;
        let d = 1.0 / self.den;
        self.x = self.nom_x * d;
        self.y = self.nom_y * d;
    }
}

// ============================================================================
// Tests
// ============================================================================
