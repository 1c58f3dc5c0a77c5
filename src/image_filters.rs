//! Image resampling kernels and their weight table.
//!
//! A kernel is a symmetric function with a finite radius. `ImageFilterLut`
//! samples it at 1/256 pixel steps into 14-bit fixed-point weights, laid
//! out so that a tap `k` of a sample whose fractional offset is `f` reads
//! index `(255 - f) + 256 * k`.

use std::f64::consts::PI;

use crate::basics::{iround, uceil};
use crate::config::FilterKind;
use crate::math::besj;
use crate::span_interpolator_linear::SUBPIXEL_SHIFT;

pub const IMAGE_FILTER_SHIFT: u32 = 14;
pub const IMAGE_FILTER_SCALE: i32 = 1 << IMAGE_FILTER_SHIFT;
pub const IMAGE_FILTER_MASK: i32 = IMAGE_FILTER_SCALE - 1;

pub const IMAGE_SUBPIXEL_SHIFT: u32 = SUBPIXEL_SHIFT;
pub const IMAGE_SUBPIXEL_SCALE: i32 = 1 << IMAGE_SUBPIXEL_SHIFT;
pub const IMAGE_SUBPIXEL_MASK: i32 = IMAGE_SUBPIXEL_SCALE - 1;

/// A resampling kernel: `calc_weight` is evaluated on `[0, radius)`.
pub trait ImageFilterFunction {
    fn radius(&self) -> f64;
    fn calc_weight(&self, x: f64) -> f64;
}

// ============================================================================
// ImageFilterLut
// ============================================================================

/// Precomputed kernel weights, `diameter * 256` entries.
#[derive(Debug, Clone, Default)]
pub struct ImageFilterLut {
    radius: f64,
    diameter: u32,
    start: i32,
    weights: Vec<i16>,
}

impl ImageFilterLut {
    /// Empty table; generators treat it as "no kernel attached".
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_filter<F: ImageFilterFunction>(filter: &F, normalize: bool) -> Self {
        let mut lut = Self::new();
        lut.calculate(filter, normalize);
        lut
    }

    /// Builds the table for a kernel chosen at run time.
    pub fn from_kind(kind: FilterKind, normalize: bool) -> Self {
        match kind {
            FilterKind::Bilinear => Self::new_with_filter(&ImageFilterBilinear, normalize),
            FilterKind::Hanning => Self::new_with_filter(&ImageFilterHanning, normalize),
            FilterKind::Hamming => Self::new_with_filter(&ImageFilterHamming, normalize),
            FilterKind::Hermite => Self::new_with_filter(&ImageFilterHermite, normalize),
            FilterKind::Quadric => Self::new_with_filter(&ImageFilterQuadric, normalize),
            FilterKind::Bicubic => Self::new_with_filter(&ImageFilterBicubic, normalize),
            FilterKind::Kaiser => Self::new_with_filter(&ImageFilterKaiser::default(), normalize),
            FilterKind::Catrom => Self::new_with_filter(&ImageFilterCatrom, normalize),
            FilterKind::Mitchell => {
                Self::new_with_filter(&ImageFilterMitchell::default(), normalize)
            }
            FilterKind::Spline16 => Self::new_with_filter(&ImageFilterSpline16, normalize),
            FilterKind::Spline36 => Self::new_with_filter(&ImageFilterSpline36, normalize),
            FilterKind::Gaussian => Self::new_with_filter(&ImageFilterGaussian, normalize),
            FilterKind::Bessel => Self::new_with_filter(&ImageFilterBessel, normalize),
            FilterKind::Sinc(r) => Self::new_with_filter(&ImageFilterSinc::new(r), normalize),
            FilterKind::Lanczos(r) => Self::new_with_filter(&ImageFilterLanczos::new(r), normalize),
            FilterKind::Blackman(r) => {
                Self::new_with_filter(&ImageFilterBlackman::new(r), normalize)
            }
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of taps per axis.
    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    /// Offset of the first tap relative to the sample's integer pixel.
    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight_array(&self) -> &[i16] {
        &self.weights
    }

    #[inline]
    pub fn weight(&self, index: usize) -> i32 {
        self.weights[index] as i32
    }

    /// Samples `filter` into the table. The table is symmetric about its
    /// middle entry before normalization.
    pub fn calculate<F: ImageFilterFunction>(&mut self, filter: &F, normalize: bool) {
        let radius = filter.radius();
        self.radius = radius;
        self.diameter = uceil(radius).max(1) * 2;
        self.start = -((self.diameter / 2) as i32 - 1);
        let size = (self.diameter as usize) << IMAGE_SUBPIXEL_SHIFT;
        self.weights.clear();
        self.weights.resize(size, 0);

        let pivot = size / 2;
        for i in 0..pivot {
            let x = i as f64 / IMAGE_SUBPIXEL_SCALE as f64;
            let w = iround(filter.calc_weight(x) * IMAGE_FILTER_SCALE as f64) as i16;
            self.weights[pivot + i] = w;
            self.weights[pivot - i] = w;
        }
        self.weights[0] = self.weights[size - 1];

        if normalize {
            self.normalize();
        }
        log::debug!(
            "image filter table: radius {:.3}, diameter {}, normalized {}",
            radius,
            self.diameter,
            normalize
        );
    }

    /// Rescales every subpixel phase so its taps sum to exactly
    /// `IMAGE_FILTER_SCALE`. Rounding residue is pushed onto the taps
    /// nearest the center first, alternating sides.
    pub fn normalize(&mut self) {
        let phases = IMAGE_SUBPIXEL_SCALE as usize;
        let taps = self.diameter as usize;
        let center = taps / 2;
        let mut right = true;

        for phase in 0..phases {
            let idx = |tap: usize| tap * phases + phase;
            let sum: i32 = (0..taps).map(|t| self.weights[idx(t)] as i32).sum();
            if sum == IMAGE_FILTER_SCALE || sum == 0 {
                continue;
            }

            let k = IMAGE_FILTER_SCALE as f64 / sum as f64;
            let mut residue = -IMAGE_FILTER_SCALE;
            for t in 0..taps {
                let v = iround(self.weights[idx(t)] as f64 * k) as i16;
                self.weights[idx(t)] = v;
                residue += v as i32;
            }

            let step: i16 = if residue > 0 { -1 } else { 1 };
            while residue != 0 {
                let mut moved = false;
                for j in 0..taps {
                    if residue == 0 {
                        break;
                    }
                    right = !right;
                    let tap = if right { center + j / 2 } else { center.saturating_sub(j / 2) };
                    let tap = tap.min(taps - 1);
                    let w = &mut self.weights[idx(tap)];
                    if (*w as i32) < IMAGE_FILTER_SCALE || step < 0 {
                        *w += step;
                        residue += step as i32;
                        moved = true;
                    }
                }
                if !moved {
                    break;
                }
            }
        }
    }
}

// ============================================================================
// Kernels
// ============================================================================

macro_rules! fixed_kernel {
    ($(#[$doc:meta])* $name:ident, $radius:expr, |$x:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ImageFilterFunction for $name {
            fn radius(&self) -> f64 {
                $radius
            }

            fn calc_weight(&self, $x: f64) -> f64 {
                $body
            }
        }
    };
}

fixed_kernel!(
    /// Tent function.
    ImageFilterBilinear, 1.0, |x| 1.0 - x
);
fixed_kernel!(ImageFilterHanning, 1.0, |x| 0.5 + 0.5 * (PI * x).cos());
fixed_kernel!(ImageFilterHamming, 1.0, |x| 0.54 + 0.46 * (PI * x).cos());
fixed_kernel!(ImageFilterHermite, 1.0, |x| (2.0 * x - 3.0) * x * x + 1.0);
fixed_kernel!(ImageFilterQuadric, 1.5, |x| {
    if x < 0.5 {
        0.75 - x * x
    } else if x < 1.5 {
        0.5 * (x - 1.5) * (x - 1.5)
    } else {
        0.0
    }
});
fixed_kernel!(
    /// Cubic B-spline.
    ImageFilterBicubic, 2.0, |x| {
        let p = |v: f64| if v <= 0.0 { 0.0 } else { v * v * v };
        (p(x + 2.0) - 4.0 * p(x + 1.0) + 6.0 * p(x) - 4.0 * p(x - 1.0)) / 6.0
    }
);
fixed_kernel!(
    /// Catmull-Rom spline.
    ImageFilterCatrom, 2.0, |x| {
        if x < 1.0 {
            0.5 * (2.0 + x * x * (-5.0 + x * 3.0))
        } else if x < 2.0 {
            0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)))
        } else {
            0.0
        }
    }
);
fixed_kernel!(ImageFilterSpline16, 2.0, |x| {
    if x < 1.0 {
        ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
    } else {
        let t = x - 1.0;
        ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
    }
});
fixed_kernel!(ImageFilterSpline36, 3.0, |x| {
    if x < 1.0 {
        ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
    } else if x < 2.0 {
        let t = x - 1.0;
        ((-6.0 / 11.0 * t + 270.0 / 209.0) * t - 156.0 / 209.0) * t
    } else {
        let t = x - 2.0;
        ((1.0 / 11.0 * t - 45.0 / 209.0) * t + 26.0 / 209.0) * t
    }
});
fixed_kernel!(ImageFilterGaussian, 2.0, |x| (-2.0 * x * x).exp() * (2.0 / PI).sqrt());
fixed_kernel!(ImageFilterBessel, 3.2383, |x| {
    if x == 0.0 {
        PI / 4.0
    } else {
        besj(PI * x, 1) / (2.0 * x)
    }
});

/// Kaiser window, shape parameter `b` (6.33 by default).
#[derive(Debug, Clone, Copy)]
pub struct ImageFilterKaiser {
    a: f64,
    i0a: f64,
}

impl ImageFilterKaiser {
    const EPSILON: f64 = 1e-12;

    pub fn new(b: f64) -> Self {
        Self {
            a: b,
            i0a: 1.0 / Self::bessel_i0(b),
        }
    }

    /// Modified Bessel function of the first kind, order 0.
    fn bessel_i0(x: f64) -> f64 {
        let y = x * x / 4.0;
        let mut sum = 1.0;
        let mut t = y;
        let mut i = 2.0;
        while t > Self::EPSILON {
            sum += t;
            t *= y / (i * i);
            i += 1.0;
        }
        sum
    }
}

impl Default for ImageFilterKaiser {
    fn default() -> Self {
        Self::new(6.33)
    }
}

impl ImageFilterFunction for ImageFilterKaiser {
    fn radius(&self) -> f64 {
        1.0
    }

    fn calc_weight(&self, x: f64) -> f64 {
        Self::bessel_i0(self.a * (1.0 - x * x).sqrt()) * self.i0a
    }
}

/// Mitchell-Netravali cubic with parameters `b` and `c`.
#[derive(Debug, Clone, Copy)]
pub struct ImageFilterMitchell {
    p: [f64; 3],
    q: [f64; 4],
}

impl ImageFilterMitchell {
    pub fn new(b: f64, c: f64) -> Self {
        Self {
            p: [
                (6.0 - 2.0 * b) / 6.0,
                (-18.0 + 12.0 * b + 6.0 * c) / 6.0,
                (12.0 - 9.0 * b - 6.0 * c) / 6.0,
            ],
            q: [
                (8.0 * b + 24.0 * c) / 6.0,
                (-12.0 * b - 48.0 * c) / 6.0,
                (6.0 * b + 30.0 * c) / 6.0,
                (-b - 6.0 * c) / 6.0,
            ],
        }
    }
}

impl Default for ImageFilterMitchell {
    fn default() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0)
    }
}

impl ImageFilterFunction for ImageFilterMitchell {
    fn radius(&self) -> f64 {
        2.0
    }

    fn calc_weight(&self, x: f64) -> f64 {
        let (p, q) = (&self.p, &self.q);
        if x < 1.0 {
            p[0] + x * x * (p[1] + x * p[2])
        } else if x < 2.0 {
            q[0] + x * (q[1] + x * (q[2] + x * q[3]))
        } else {
            0.0
        }
    }
}

// ----------------------------------------------------------------------------
// Radius-parameterized kernels; the radius never drops below 2.
// ----------------------------------------------------------------------------

#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = x * PI;
        px.sin() / px
    }
}

macro_rules! windowed_kernel {
    ($(#[$doc:meta])* $name:ident, |$x:ident, $r:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            radius: f64,
        }

        impl $name {
            pub fn new(radius: f64) -> Self {
                Self {
                    radius: radius.max(2.0),
                }
            }
        }

        impl ImageFilterFunction for $name {
            fn radius(&self) -> f64 {
                self.radius
            }

            fn calc_weight(&self, $x: f64) -> f64 {
                let $r = self.radius;
                $body
            }
        }
    };
}

windowed_kernel!(
    /// Unwindowed sinc truncated at the radius.
    ImageFilterSinc, |x, _r| sinc(x)
);
windowed_kernel!(ImageFilterLanczos, |x, r| {
    if x > r {
        0.0
    } else {
        sinc(x) * sinc(x / r)
    }
});
windowed_kernel!(ImageFilterBlackman, |x, r| {
    if x == 0.0 {
        1.0
    } else if x > r {
        0.0
    } else {
        let xr = x * PI / r;
        sinc(x) * (0.42 + 0.5 * xr.cos() + 0.08 * (2.0 * xr).cos())
    }
});

// ============================================================================
// Tests
// ============================================================================
