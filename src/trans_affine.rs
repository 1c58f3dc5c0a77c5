//! Affine transformation matrix.
//!
//! Only the pieces the span interpolators consume live here: the three
//! basic builders, the forward mapping, and the per-axis scale query.

use crate::span_interpolator_linear::{ScalingAbs, Transformer};

/// 2D affine transformation matrix.
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

const IDENTITY: TransAffine = TransAffine {
    sx: 1.0,
    shy: 0.0,
    shx: 0.0,
    sy: 1.0,
    tx: 0.0,
    ty: 0.0,
};

impl TransAffine {
    pub const fn new() -> Self {
        IDENTITY
    }

    /// Counter-clockwise rotation by `a` radians.
    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self {
            sx: ca,
            shy: sa,
            shx: -sa,
            sy: ca,
            ..IDENTITY
        }
    }

    pub fn new_scaling(x: f64, y: f64) -> Self {
        Self {
            sx: x,
            sy: y,
            ..IDENTITY
        }
    }

    pub fn new_translation(x: f64, y: f64) -> Self {
        Self {
            tx: x,
            ty: y,
            ..IDENTITY
        }
    }

    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        let (px, py) = (*x, *y);
        *x = px * self.sx + py * self.shx + self.tx;
        *y = px * self.shy + py * self.sy + self.ty;
    }

    /// Length of each row of the 2x2 part.
    pub fn scaling_abs(&self) -> (f64, f64) {
        (self.sx.hypot(self.shx), self.shy.hypot(self.sy))
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for TransAffine {
    #[inline]
    fn transform(&self, x: &mut f64, y: &mut f64) {
        TransAffine::transform(self, x, y);
    }
}

impl ScalingAbs for TransAffine {
    fn scaling_abs(&self) -> (f64, f64) {
        TransAffine::scaling_abs(self)
    }
}
