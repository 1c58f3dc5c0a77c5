//! Color types and per-channel arithmetic.
//!
//! Color types at the depths the span generators produce:
//! - `Rgba`: f64 components (linear working space)
//! - `Rgba8`, `Rgba16`: integer RGBA
//! - `Rgba32`: f32 RGBA
//! - `Gray8`, `Gray16`: integer gray + alpha
//!
//! Image filters are written once over `ChannelValue`, which describes how a
//! channel is read from raw bytes, widened for weighted sums, and narrowed
//! back with clamping. `ChannelOrder` tells where each channel sits inside a
//! raw pixel.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, Sub};

use crate::basics::uround;

// ============================================================================
// Channel order
// ============================================================================

/// Byte-level position of each channel inside one raw pixel, in channel
/// units. Three-channel orders carry `a = 3`, which is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOrder {
    pub r: usize,
    pub g: usize,
    pub b: usize,
    pub a: usize,
}

impl ChannelOrder {
    pub const RGB: Self = Self::new(0, 1, 2, 3);
    pub const BGR: Self = Self::new(2, 1, 0, 3);
    pub const RGBA: Self = Self::new(0, 1, 2, 3);
    pub const BGRA: Self = Self::new(2, 1, 0, 3);
    pub const ARGB: Self = Self::new(1, 2, 3, 0);
    pub const ABGR: Self = Self::new(3, 2, 1, 0);

    pub const fn new(r: usize, g: usize, b: usize, a: usize) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for ChannelOrder {
    fn default() -> Self {
        Self::RGBA
    }
}

// ============================================================================
// Channel arithmetic
// ============================================================================

/// One color channel as stored in a source raster.
///
/// `Calc` is the accumulator used for weighted sums: `i64` for integer
/// channels, `f64` for float channels. Filter weights are fixed-point
/// integers; `downshift` divides a weighted sum by `2^shift`.
pub trait ChannelValue: Copy + Default + PartialEq + Debug + 'static {
    type Calc: Copy
        + Default
        + PartialOrd
        + Debug
        + Add<Output = Self::Calc>
        + Sub<Output = Self::Calc>
        + Mul<Output = Self::Calc>
        + Div<Output = Self::Calc>
        + AddAssign
        + From<i32>;

    /// Size of one channel in bytes.
    const BYTES: usize;
    const FULL: Self;

    /// Reads one channel from the start of `bytes` (native endian).
    fn read(bytes: &[u8]) -> Self;

    fn to_calc(self) -> Self::Calc;

    /// Narrows an accumulator. Integer channels clamp to `[0, FULL]`.
    fn from_calc(v: Self::Calc) -> Self;

    fn downshift(v: Self::Calc, shift: u32) -> Self::Calc;

    /// Rounding term added before `downshift`.
    fn round_bias(shift: u32) -> Self::Calc;

    /// Reads channel `index` of the pixel starting at `pixel`.
    #[inline]
    fn read_at(pixel: &[u8], index: usize) -> Self {
        Self::read(&pixel[index * Self::BYTES..])
    }

    #[inline]
    fn full_calc() -> Self::Calc {
        Self::FULL.to_calc()
    }
}

impl ChannelValue for u8 {
    type Calc = i64;
    const BYTES: usize = 1;
    const FULL: Self = u8::MAX;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn to_calc(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_calc(v: i64) -> Self {
        v.clamp(0, u8::MAX as i64) as u8
    }

    #[inline]
    fn downshift(v: i64, shift: u32) -> i64 {
        v >> shift
    }

    #[inline]
    fn round_bias(shift: u32) -> i64 {
        if shift == 0 {
            0
        } else {
            1 << (shift - 1)
        }
    }
}

impl ChannelValue for u16 {
    type Calc = i64;
    const BYTES: usize = 2;
    const FULL: Self = u16::MAX;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        u16::from_ne_bytes([bytes[0], bytes[1]])
    }

    #[inline]
    fn to_calc(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_calc(v: i64) -> Self {
        v.clamp(0, u16::MAX as i64) as u16
    }

    #[inline]
    fn downshift(v: i64, shift: u32) -> i64 {
        v >> shift
    }

    #[inline]
    fn round_bias(shift: u32) -> i64 {
        if shift == 0 {
            0
        } else {
            1 << (shift - 1)
        }
    }
}

impl ChannelValue for f32 {
    type Calc = f64;
    const BYTES: usize = 4;
    const FULL: Self = 1.0;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn to_calc(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_calc(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn downshift(v: f64, shift: u32) -> f64 {
        v / (1u64 << shift) as f64
    }

    #[inline]
    fn round_bias(_shift: u32) -> f64 {
        0.0
    }
}

/// Integer channels driven by the DDA color interpolators.
pub trait IntChannel: ChannelValue {
    const SHIFT: u32;
    const MAX: i32;

    fn to_i32(self) -> i32;

    /// Clamps into `[0, MAX]`.
    fn from_i32(v: i32) -> Self;

    /// Interpolates `p` toward `q` by `a / MAX`, rounded.
    #[inline]
    fn lerp(p: Self, q: Self, a: Self) -> Self {
        let msb = 1i64 << (Self::SHIFT - 1);
        let (p, q, a) = (p.to_i32() as i64, q.to_i32() as i64, a.to_i32() as i64);
        let t = (q - p) * a + msb - (p > q) as i64;
        Self::from_i32((p + (((t >> Self::SHIFT) + t) >> Self::SHIFT)) as i32)
    }
}

impl IntChannel for u8 {
    const SHIFT: u32 = 8;
    const MAX: i32 = u8::MAX as i32;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v.clamp(0, <Self as IntChannel>::MAX) as u8
    }
}

impl IntChannel for u16 {
    const SHIFT: u32 = 16;
    const MAX: i32 = u16::MAX as i32;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_i32(v: i32) -> Self {
        v.clamp(0, <Self as IntChannel>::MAX) as u16
    }
}

/// Narrows premultiplied RGBA sums: alpha into `[0, FULL]`, then each color
/// channel into `[0, alpha]`. Input and output are in `[r, g, b, a]` order.
#[inline]
pub fn clamp_to_alpha<V: ChannelValue>(fg: [V::Calc; 4]) -> [V; 4] {
    let zero = V::Calc::from(0);
    let full = V::full_calc();
    let mut a = fg[3];
    if a < zero {
        a = zero;
    }
    if a > full {
        a = full;
    }
    let clamp = |c: V::Calc| {
        if c < zero {
            zero
        } else if c > a {
            a
        } else {
            c
        }
    };
    [
        V::from_calc(clamp(fg[0])),
        V::from_calc(clamp(fg[1])),
        V::from_calc(clamp(fg[2])),
        V::from_calc(a),
    ]
}

// ============================================================================
// Color capabilities
// ============================================================================

/// RGBA color assembled from raw channels.
pub trait RgbaColor: Copy + Default {
    type Value: ChannelValue;

    fn from_channels(r: Self::Value, g: Self::Value, b: Self::Value, a: Self::Value) -> Self;

    /// `[r, g, b, a]`.
    fn channels(&self) -> [Self::Value; 4];
}

/// Gray + alpha color assembled from raw channels.
pub trait GrayColor: Copy + Default {
    type Value: ChannelValue;

    fn from_channels(v: Self::Value, a: Self::Value) -> Self;

    /// `[v, a]`.
    fn channels(&self) -> [Self::Value; 2];
}

/// Read/write access to the alpha channel, used by alpha gradients.
pub trait AlphaColor {
    type Alpha: Copy;

    fn alpha(&self) -> Self::Alpha;
    fn set_alpha(&mut self, a: Self::Alpha);
}

/// Linear mix toward another color, `k` in `[0, 1]`.
pub trait GradientColor: Copy {
    fn gradient(&self, c: &Self, k: f64) -> Self;
}

// ============================================================================
// Rgba (f64 precision color)
// ============================================================================

/// RGBA color with f64 components in range [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl GradientColor for Rgba {
    fn gradient(&self, c: &Rgba, k: f64) -> Rgba {
        Rgba {
            r: self.r + (c.r - self.r) * k,
            g: self.g + (c.g - self.g) * k,
            b: self.b + (c.b - self.b) * k,
            a: self.a + (c.a - self.a) * k,
        }
    }
}

impl AlphaColor for Rgba {
    type Alpha = f64;

    #[inline]
    fn alpha(&self) -> f64 {
        self.a
    }

    #[inline]
    fn set_alpha(&mut self, a: f64) {
        self.a = a;
    }
}

// ============================================================================
// Integer RGBA (8 and 16 bits per channel)
// ============================================================================

macro_rules! int_rgba {
    ($name:ident, $value:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub r: $value,
            pub g: $value,
            pub b: $value,
            pub a: $value,
        }

        impl $name {
            pub const BASE_MASK: u32 = <$value>::MAX as u32;

            pub fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
                Self {
                    r: r as $value,
                    g: g as $value,
                    b: b as $value,
                    a: a as $value,
                }
            }

            pub fn new_opaque(r: u32, g: u32, b: u32) -> Self {
                Self::new(r, g, b, Self::BASE_MASK)
            }

            /// Converts from `Rgba`, rounding and clamping each channel.
            pub fn from_rgba(c: &Rgba) -> Self {
                let conv = |v: f64| uround(v.clamp(0.0, 1.0) * Self::BASE_MASK as f64) as $value;
                Self {
                    r: conv(c.r),
                    g: conv(c.g),
                    b: conv(c.b),
                    a: conv(c.a),
                }
            }
        }

        impl RgbaColor for $name {
            type Value = $value;

            #[inline]
            fn from_channels(r: $value, g: $value, b: $value, a: $value) -> Self {
                Self { r, g, b, a }
            }

            #[inline]
            fn channels(&self) -> [$value; 4] {
                [self.r, self.g, self.b, self.a]
            }
        }

        impl GradientColor for $name {
            fn gradient(&self, c: &Self, k: f64) -> Self {
                let ik = uround(k * Self::BASE_MASK as f64).min(Self::BASE_MASK) as $value;
                Self {
                    r: IntChannel::lerp(self.r, c.r, ik),
                    g: IntChannel::lerp(self.g, c.g, ik),
                    b: IntChannel::lerp(self.b, c.b, ik),
                    a: IntChannel::lerp(self.a, c.a, ik),
                }
            }
        }

        impl AlphaColor for $name {
            type Alpha = $value;

            #[inline]
            fn alpha(&self) -> $value {
                self.a
            }

            #[inline]
            fn set_alpha(&mut self, a: $value) {
                self.a = a;
            }
        }
    };
}

int_rgba!(Rgba8, u8, "RGBA color with u8 components.");
int_rgba!(Rgba16, u16, "RGBA color with u16 components.");

// ============================================================================
// Rgba32 (f32 per channel)
// ============================================================================

/// RGBA color with f32 components, nominal range [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba32 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba32 {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba(c: &Rgba) -> Self {
        Self::new(c.r as f32, c.g as f32, c.b as f32, c.a as f32)
    }
}

impl RgbaColor for Rgba32 {
    type Value = f32;

    #[inline]
    fn from_channels(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    fn channels(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl GradientColor for Rgba32 {
    fn gradient(&self, c: &Self, k: f64) -> Self {
        let k = k as f32;
        Self {
            r: self.r + (c.r - self.r) * k,
            g: self.g + (c.g - self.g) * k,
            b: self.b + (c.b - self.b) * k,
            a: self.a + (c.a - self.a) * k,
        }
    }
}

impl AlphaColor for Rgba32 {
    type Alpha = f32;

    #[inline]
    fn alpha(&self) -> f32 {
        self.a
    }

    #[inline]
    fn set_alpha(&mut self, a: f32) {
        self.a = a;
    }
}

// ============================================================================
// Gray (8 and 16 bits)
// ============================================================================

macro_rules! int_gray {
    ($name:ident, $value:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub v: $value,
            pub a: $value,
        }

        impl $name {
            pub const BASE_MASK: u32 = <$value>::MAX as u32;

            pub fn new(v: u32, a: u32) -> Self {
                Self {
                    v: v as $value,
                    a: a as $value,
                }
            }

            pub fn new_opaque(v: u32) -> Self {
                Self::new(v, Self::BASE_MASK)
            }

            /// Luminance of a linear RGB color (ITU-R BT.709).
            pub fn from_rgba(c: &Rgba) -> Self {
                let lum = (0.2126 * c.r + 0.7152 * c.g + 0.0722 * c.b).clamp(0.0, 1.0);
                let m = Self::BASE_MASK as f64;
                Self {
                    v: uround(lum * m) as $value,
                    a: uround(c.a.clamp(0.0, 1.0) * m) as $value,
                }
            }
        }

        impl GrayColor for $name {
            type Value = $value;

            #[inline]
            fn from_channels(v: $value, a: $value) -> Self {
                Self { v, a }
            }

            #[inline]
            fn channels(&self) -> [$value; 2] {
                [self.v, self.a]
            }
        }

        impl GradientColor for $name {
            fn gradient(&self, c: &Self, k: f64) -> Self {
                let ik = uround(k * Self::BASE_MASK as f64).min(Self::BASE_MASK) as $value;
                Self {
                    v: IntChannel::lerp(self.v, c.v, ik),
                    a: IntChannel::lerp(self.a, c.a, ik),
                }
            }
        }

        impl AlphaColor for $name {
            type Alpha = $value;

            #[inline]
            fn alpha(&self) -> $value {
                self.a
            }

            #[inline]
            fn set_alpha(&mut self, a: $value) {
                self.a = a;
            }
        }
    };
}

int_gray!(Gray8, u8, "Grayscale color with u8 value and alpha.");
int_gray!(Gray16, u16, "Grayscale color with u16 value and alpha.");

// ============================================================================
// Tests
// ============================================================================
