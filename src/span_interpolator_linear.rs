//! Span interpolator contract and the linear interpolators.
//!
//! A span interpolator maps each pixel of a span into source space and
//! reports the result in subpixel units. The linear variants transform the
//! span endpoints once and let two `Dda2LineInterpolator`s walk between
//! them; the subdividing variant re-transforms every `2^shift` pixels to
//! bound the error of a non-affine transformer.

use crate::basics::iround;
use crate::dda_line::Dda2LineInterpolator;
use crate::trans_affine::TransAffine;

/// Image subsystem subpixel precision.
pub const SUBPIXEL_SHIFT: u32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

// ============================================================================
// Collaborator traits
// ============================================================================

/// Point mapping consumed by the interpolators.
pub trait Transformer {
    fn transform(&self, x: &mut f64, y: &mut f64);
}

/// Absolute X/Y scale of a transformer, consumed by affine resampling.
pub trait ScalingAbs {
    fn scaling_abs(&self) -> (f64, f64);
}

// ============================================================================
// SpanInterpolator trait
// ============================================================================

/// Per-span coordinate generator.
///
/// Call protocol: `begin`, then alternately `coordinates` and `next`, with
/// an optional `resynchronize` in between. Querying before `begin` yields
/// unspecified coordinates.
pub trait SpanInterpolator {
    /// Starts a span of `len` pixels at `(x, y)` (pixel centers).
    fn begin(&mut self, x: f64, y: f64, len: u32);

    fn next(&mut self);

    /// Current source coordinates in subpixels.
    fn coordinates(&self, x: &mut i32, y: &mut i32);

    /// Redirects the remaining `len` pixels toward `(xe, ye)`, continuing
    /// from the current position.
    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32);

    fn subpixel_shift(&self) -> u32 {
        SUBPIXEL_SHIFT
    }

    /// Local magnification at the current pixel, X and Y, in subpixels.
    /// `None` for interpolators that do not estimate it.
    fn local_scale(&self) -> Option<(i32, i32)> {
        None
    }
}

/// Local scale of `interp`, or the identity scale when it has none.
#[inline]
pub fn local_scale_or_identity<I: SpanInterpolator + ?Sized>(interp: &I) -> (i32, i32) {
    interp.local_scale().unwrap_or_else(|| {
        let one = 1 << interp.subpixel_shift();
        (one, one)
    })
}

/// Interpolators that expose their transformer.
pub trait InterpolatorTransformer {
    type Transformer;

    fn transformer(&self) -> &Self::Transformer;
    fn set_transformer(&mut self, trans: Self::Transformer);
}

#[inline]
fn to_subpixel(v: f64) -> i32 {
    iround(v * SUBPIXEL_SCALE as f64)
}

// ============================================================================
// SpanInterpolatorLinear
// ============================================================================

/// Transforms the span endpoints once and walks linearly between them.
/// Exact for affine transformers.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorLinear<T = TransAffine> {
    trans: T,
    li_x: Dda2LineInterpolator,
    li_y: Dda2LineInterpolator,
}

impl<T: Transformer> SpanInterpolatorLinear<T> {
    pub fn new(trans: T) -> Self {
        Self {
            trans,
            li_x: Dda2LineInterpolator::new_forward(0, 0, 1),
            li_y: Dda2LineInterpolator::new_forward(0, 0, 1),
        }
    }

    pub fn new_begin(trans: T, x: f64, y: f64, len: u32) -> Self {
        let mut s = Self::new(trans);
        s.begin(x, y, len);
        s
    }
}

impl<T: Transformer> SpanInterpolator for SpanInterpolatorLinear<T> {
    fn begin(&mut self, x: f64, y: f64, len: u32) {
        let (mut tx, mut ty) = (x, y);
        self.trans.transform(&mut tx, &mut ty);
        let x1 = to_subpixel(tx);
        let y1 = to_subpixel(ty);

        let (mut tx, mut ty) = (x + len as f64, y);
        self.trans.transform(&mut tx, &mut ty);
        let x2 = to_subpixel(tx);
        let y2 = to_subpixel(ty);

        self.li_x = Dda2LineInterpolator::new_forward(x1, x2, len as i32);
        self.li_y = Dda2LineInterpolator::new_forward(y1, y2, len as i32);
    }

    #[inline]
    fn next(&mut self) {
        self.li_x.inc();
        self.li_y.inc();
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        *x = self.li_x.y();
        *y = self.li_y.y();
    }

    fn resynchronize(&mut self, mut xe: f64, mut ye: f64, len: u32) {
        self.trans.transform(&mut xe, &mut ye);
        self.li_x = Dda2LineInterpolator::new_forward(self.li_x.y(), to_subpixel(xe), len as i32);
        self.li_y = Dda2LineInterpolator::new_forward(self.li_y.y(), to_subpixel(ye), len as i32);
    }
}

impl<T: Transformer> InterpolatorTransformer for SpanInterpolatorLinear<T> {
    type Transformer = T;

    fn transformer(&self) -> &T {
        &self.trans
    }

    fn set_transformer(&mut self, trans: T) {
        self.trans = trans;
    }
}

// ============================================================================
// SpanInterpolatorLinearSubdiv
// ============================================================================

/// Linear interpolation restarted every `2^subdiv_shift` pixels from a
/// freshly transformed endpoint.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorLinearSubdiv<T = TransAffine> {
    subdiv_shift: u32,
    subdiv_size: u32,
    trans: T,
    li_x: Dda2LineInterpolator,
    li_y: Dda2LineInterpolator,
    src_x: i32,
    src_y: f64,
    pos: u32,
    len: u32,
}

impl<T: Transformer> SpanInterpolatorLinearSubdiv<T> {
    pub fn new(trans: T, subdiv_shift: u32) -> Self {
        Self {
            subdiv_shift,
            subdiv_size: 1 << subdiv_shift,
            trans,
            li_x: Dda2LineInterpolator::new_forward(0, 0, 1),
            li_y: Dda2LineInterpolator::new_forward(0, 0, 1),
            src_x: 0,
            src_y: 0.0,
            pos: 1,
            len: 0,
        }
    }

    /// Chunks of 16 pixels.
    pub fn new_default(trans: T) -> Self {
        Self::new(trans, 4)
    }

    pub fn subdiv_shift(&self) -> u32 {
        self.subdiv_shift
    }

    pub fn set_subdiv_shift(&mut self, shift: u32) {
        self.subdiv_shift = shift;
        self.subdiv_size = 1 << shift;
    }

    /// Points the DDAs from `(x1, y1)` (subpixels) toward the transformed
    /// end of the next chunk and resets the chunk bookkeeping.
    fn start_chunk(&mut self, x1: i32, y1: i32, x: f64, y: f64, len: u32) {
        self.pos = 1;
        self.src_x = to_subpixel(x) + SUBPIXEL_SCALE;
        self.src_y = y;
        self.len = len;

        let sub_len = len.min(self.subdiv_size);
        let (mut tx, mut ty) = (x + sub_len as f64, y);
        self.trans.transform(&mut tx, &mut ty);
        self.li_x = Dda2LineInterpolator::new_forward(x1, to_subpixel(tx), sub_len as i32);
        self.li_y = Dda2LineInterpolator::new_forward(y1, to_subpixel(ty), sub_len as i32);
    }
}

impl<T: Transformer> SpanInterpolator for SpanInterpolatorLinearSubdiv<T> {
    fn begin(&mut self, x: f64, y: f64, len: u32) {
        let (mut tx, mut ty) = (x, y);
        self.trans.transform(&mut tx, &mut ty);
        self.start_chunk(to_subpixel(tx), to_subpixel(ty), x, y, len);
    }

    fn next(&mut self) {
        self.li_x.inc();
        self.li_y.inc();
        if self.pos >= self.subdiv_size {
            let sub_len = self.len.min(self.subdiv_size);
            let mut tx = self.src_x as f64 / SUBPIXEL_SCALE as f64 + sub_len as f64;
            let mut ty = self.src_y;
            self.trans.transform(&mut tx, &mut ty);
            self.li_x =
                Dda2LineInterpolator::new_forward(self.li_x.y(), to_subpixel(tx), sub_len as i32);
            self.li_y =
                Dda2LineInterpolator::new_forward(self.li_y.y(), to_subpixel(ty), sub_len as i32);
            self.pos = 0;
        }
        self.src_x += SUBPIXEL_SCALE;
        self.pos += 1;
        self.len = self.len.saturating_sub(1);
    }

    #[inline]
    fn coordinates(&self, x: &mut i32, y: &mut i32) {
        *x = self.li_x.y();
        *y = self.li_y.y();
    }

    /// `(xe, ye)` is the source-space end of the span; chunking restarts
    /// at `xe - len` from the current position.
    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        let (x1, y1) = (self.li_x.y(), self.li_y.y());
        self.start_chunk(x1, y1, xe - len as f64, ye, len);
    }
}

impl<T: Transformer> InterpolatorTransformer for SpanInterpolatorLinearSubdiv<T> {
    type Transformer = T;

    fn transformer(&self) -> &T {
        &self.trans
    }

    fn set_transformer(&mut self, trans: T) {
        self.trans = trans;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn coords<I: SpanInterpolator>(interp: &I) -> (i32, i32) {
        let (mut x, mut y) = (0, 0);
        interp.coordinates(&mut x, &mut y);
        (x, y)
    }

    #[test]
    fn test_identity_transform() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new());
        interp.begin(10.0, 20.0, 5);
        assert_eq!(coords(&interp), (10 * SUBPIXEL_SCALE, 20 * SUBPIXEL_SCALE));
    }

    #[test]
    fn test_translation_and_scaling() {
        let interp = SpanInterpolatorLinear::new_begin(TransAffine::new_translation(100.0, 200.0), 10.0, 20.0, 5);
        assert_eq!(coords(&interp), (110 * SUBPIXEL_SCALE, 220 * SUBPIXEL_SCALE));

        let interp = SpanInterpolatorLinear::new_begin(TransAffine::new_scaling(2.0, 3.0), 10.0, 20.0, 5);
        assert_eq!(coords(&interp), (20 * SUBPIXEL_SCALE, 60 * SUBPIXEL_SCALE));
    }

    #[test]
    fn test_lands_exactly_on_span_end() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(1.37, 0.5));
        interp.begin(3.0, 7.0, 333);
        let (x0, _) = coords(&interp);
        let mut prev = x0;
        for _ in 0..333 {
            interp.next();
            let (x, _) = coords(&interp);
            assert!(x >= prev);
            prev = x;
        }
        assert_eq!(coords(&interp), (iround(336.0 * 1.37 * 256.0), 7 * 128));
    }

    #[test]
    fn test_rotation_90_degrees() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new_rotation(PI / 2.0));
        interp.begin(10.0, 0.0, 1);
        let (x, y) = coords(&interp);
        assert!(x.abs() <= 1);
        assert!((y - 10 * SUBPIXEL_SCALE).abs() <= 1);
    }

    #[test]
    fn test_resynchronize() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new());
        interp.begin(0.0, 0.0, 10);
        for _ in 0..5 {
            interp.next();
        }
        interp.resynchronize(15.0, 0.0, 5);
        assert_eq!(coords(&interp).0, 5 * SUBPIXEL_SCALE);
        for _ in 0..5 {
            interp.next();
        }
        assert_eq!(coords(&interp).0, 15 * SUBPIXEL_SCALE);
    }

    #[test]
    fn test_default_capabilities() {
        let interp = SpanInterpolatorLinear::new(TransAffine::new());
        assert_eq!(interp.subpixel_shift(), 8);
        assert_eq!(interp.local_scale(), None);
        assert_eq!(local_scale_or_identity(&interp), (256, 256));
    }

    #[test]
    fn test_transformer_handle() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new());
        interp.set_transformer(TransAffine::new_translation(1.0, 2.0));
        assert_eq!(interp.transformer().tx, 1.0);
    }

    #[test]
    fn test_subdiv_tracks_identity() {
        let mut interp = SpanInterpolatorLinearSubdiv::new_default(TransAffine::new());
        interp.begin(10.0, 20.0, 100);
        assert_eq!(coords(&interp), (10 * SUBPIXEL_SCALE, 20 * SUBPIXEL_SCALE));
        for i in 1..=100 {
            interp.next();
            let (x, y) = coords(&interp);
            assert_eq!(x, (10 + i) * SUBPIXEL_SCALE);
            assert_eq!(y, 20 * SUBPIXEL_SCALE);
        }
    }

    #[test]
    fn test_subdiv_resynchronize() {
        let mut interp = SpanInterpolatorLinearSubdiv::new(TransAffine::new_scaling(2.0, 1.0), 2);
        interp.begin(0.0, 0.0, 40);
        for _ in 0..6 {
            interp.next();
        }
        interp.resynchronize(40.0, 0.0, 34);
        for _ in 0..34 {
            interp.next();
        }
        assert_eq!(coords(&interp).0, 80 * SUBPIXEL_SCALE);
    }

    #[test]
    fn test_subdiv_shift_setter() {
        let mut interp = SpanInterpolatorLinearSubdiv::new(TransAffine::new(), 4);
        assert_eq!(interp.subdiv_shift(), 4);
        interp.set_subdiv_shift(6);
        assert_eq!(interp.subdiv_shift(), 6);
    }
}
