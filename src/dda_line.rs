//! DDA (Digital Differential Analyzer) interpolators.
//!
//! Exact incremental interpolation of one integer quantity over `N` steps.
//! `Dda2LineInterpolator` drives span coordinates, `DdaLineInterpolator`
//! drives color channels at 14-bit fraction precision, and
//! `LineBresenhamInterpolator` walks one-pixel lines for the contour
//! gradient's outline pass.

// ============================================================================
// DDA line interpolator (fixed-point with configurable shift)
// ============================================================================

/// Fixed-point DDA interpolator with `FRACTION_SHIFT` bits of fraction.
///
/// The step is computed once as `((y2 - y1) << FRACTION_SHIFT) / count`;
/// the current value is the start plus the accumulated delta shifted back
/// down by `FRACTION_SHIFT - Y_SHIFT`. A `count` of zero is treated as one.
#[derive(Debug, Clone, Copy)]
pub struct DdaLineInterpolator<const FRACTION_SHIFT: i32, const Y_SHIFT: i32 = 0> {
    y: i32,
    inc: i64,
    dy: i64,
}

impl<const FRACTION_SHIFT: i32, const Y_SHIFT: i32> DdaLineInterpolator<FRACTION_SHIFT, Y_SHIFT> {
    pub fn new(y1: i32, y2: i32, count: u32) -> Self {
        let count = count.max(1) as i64;
        Self {
            y: y1,
            inc: ((y2 as i64 - y1 as i64) << FRACTION_SHIFT) / count,
            dy: 0,
        }
    }

    #[inline]
    pub fn inc(&mut self) {
        self.dy += self.inc;
    }

    #[inline]
    pub fn dec(&mut self) {
        self.dy -= self.inc;
    }

    #[inline]
    pub fn inc_by(&mut self, n: u32) {
        self.dy += self.inc * n as i64;
    }

    #[inline]
    pub fn dec_by(&mut self, n: u32) {
        self.dy -= self.inc * n as i64;
    }

    /// Current value, `Y_SHIFT` bits of fraction kept.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y + (self.dy >> (FRACTION_SHIFT - Y_SHIFT)) as i32
    }

    #[inline]
    pub fn dy(&self) -> i64 {
        self.dy
    }
}

// ============================================================================
// DDA2 line interpolator
// ============================================================================

/// Integer DDA that lands exactly on `y2` after `count` increments.
///
/// `y2 - y1` is split into an integer step `lft` and a remainder `rem`
/// carried in a modulo accumulator. The constructor normalizes the state so
/// that `rem > 0` and the accumulator sits in `(-count, 0]`; every `inc`
/// then adds at most one carry, which keeps the sequence monotone and the
/// error under one unit. `dec` is the exact inverse of `inc`.
#[derive(Debug, Clone, Copy)]
pub struct Dda2LineInterpolator {
    cnt: i32,
    lft: i64,
    rem: i32,
    mod_val: i32,
    y: i64,
}

impl Dda2LineInterpolator {
    /// Interpolator from `y1` to `y2` over `count` steps; `count <= 0` acts as 1.
    ///
    /// The step is kept in 64 bits so any pair of `i32` endpoints works.
    pub fn new_forward(y1: i32, y2: i32, count: i32) -> Self {
        let cnt = count.max(1);
        let delta = y2 as i64 - y1 as i64;
        let mut lft = delta / cnt as i64;
        // |rem| < cnt, so it fits back into i32.
        let mut rem = (delta % cnt as i64) as i32;
        let mut mod_val = rem;

        if mod_val <= 0 {
            mod_val += cnt;
            rem += cnt;
            lft -= 1;
        }
        mod_val -= cnt;

        Self {
            cnt,
            lft,
            rem,
            mod_val,
            y: y1 as i64,
        }
    }

    #[inline]
    pub fn inc(&mut self) {
        self.mod_val += self.rem;
        self.y += self.lft;
        if self.mod_val > 0 {
            self.mod_val -= self.cnt;
            self.y += 1;
        }
    }

    #[inline]
    pub fn dec(&mut self) {
        if self.mod_val + self.cnt <= self.rem {
            self.mod_val += self.cnt;
            self.y -= 1;
        }
        self.mod_val -= self.rem;
        self.y -= self.lft;
    }

    #[inline]
    pub fn mod_val(&self) -> i32 {
        self.mod_val
    }

    #[inline]
    pub fn rem(&self) -> i32 {
        self.rem
    }

    #[inline]
    pub fn lft(&self) -> i64 {
        self.lft
    }

    /// Current value. Stays between the endpoints while stepping inside
    /// `[0, count]`.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y as i32
    }
}

// ============================================================================
// Bresenham line interpolator
// ============================================================================

/// Subpixel precision of the Bresenham walker's input coordinates.
pub const SUBPIXEL_SHIFT: i32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

/// Subpixel to pixel.
#[inline]
pub fn line_lr(v: i32) -> i32 {
    v >> SUBPIXEL_SHIFT
}

/// One-pixel-wide line walker over subpixel endpoints.
///
/// Steps one pixel at a time along the dominant axis; a `Dda2LineInterpolator`
/// tracks the minor axis in subpixels.
#[derive(Debug, Clone)]
pub struct LineBresenhamInterpolator {
    x1_lr: i32,
    y1_lr: i32,
    ver: bool,
    len: u32,
    inc: i32,
    interpolator: Dda2LineInterpolator,
}

impl LineBresenhamInterpolator {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let x1_lr = line_lr(x1);
        let y1_lr = line_lr(y1);
        let x2_lr = line_lr(x2);
        let y2_lr = line_lr(y2);

        let ver = (x2_lr - x1_lr).abs() < (y2_lr - y1_lr).abs();
        let len = if ver {
            (y2_lr - y1_lr).unsigned_abs()
        } else {
            (x2_lr - x1_lr).unsigned_abs()
        };
        let inc = match (ver, y2 > y1, x2 > x1) {
            (true, true, _) | (false, _, true) => 1,
            _ => -1,
        };

        let interpolator = if ver {
            Dda2LineInterpolator::new_forward(x1, x2, len as i32)
        } else {
            Dda2LineInterpolator::new_forward(y1, y2, len as i32)
        };

        Self {
            x1_lr,
            y1_lr,
            ver,
            len,
            inc,
            interpolator,
        }
    }

    /// True when the line is steeper than 45 degrees.
    #[inline]
    pub fn is_ver(&self) -> bool {
        self.ver
    }

    /// Steps along the dominant axis.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub fn inc(&self) -> i32 {
        self.inc
    }

    #[inline]
    pub fn hstep(&mut self) {
        self.interpolator.inc();
        self.x1_lr += self.inc;
    }

    #[inline]
    pub fn vstep(&mut self) {
        self.interpolator.inc();
        self.y1_lr += self.inc;
    }

    #[inline]
    pub fn x1(&self) -> i32 {
        self.x1_lr
    }

    #[inline]
    pub fn y1(&self) -> i32 {
        self.y1_lr
    }

    /// Minor-axis position in pixels.
    #[inline]
    pub fn minor(&self) -> i32 {
        line_lr(self.interpolator.y())
    }

    /// Minor-axis position in subpixels.
    #[inline]
    pub fn minor_hr(&self) -> i32 {
        self.interpolator.y()
    }

    /// Visits every pixel of the line in order.
    ///
    /// The end pixel is included only when `last` is set, so consecutive
    /// segments of a polyline do not plot their shared vertex twice. A
    /// zero-length line plots its start pixel when `last` is set.
    pub fn walk<F: FnMut(i32, i32)>(mut self, last: bool, mut plot: F) {
        let mut len = self.len;
        if len == 0 {
            if last {
                plot(self.x1_lr, self.y1_lr);
            }
            return;
        }
        if last {
            len += 1;
        }
        for _ in 0..len {
            if self.ver {
                plot(self.minor(), self.y1_lr);
                self.vstep();
            } else {
                plot(self.x1_lr, self.minor());
                self.hstep();
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
