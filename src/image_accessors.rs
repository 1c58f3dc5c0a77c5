//! Pixel sources for the image filters, with boundary handling.
//!
//! `ImageSource` is the interface every image and pattern span generator
//! reads through: a cursor that starts at `span(x, y, len)` and then moves
//! one pixel right (`next_x`) or one row down (`next_y`). The accessors
//! differ in what they return outside the image: a background color
//! (clip), nothing checked (no-clip), the nearest edge pixel (clone), or a
//! tiled pixel (wrap).

use crate::color::ChannelOrder;
use crate::rendering_buffer::RowAccessor;

// ============================================================================
// ImageSource trait
// ============================================================================

/// Cursor-style pixel source. Returned slices hold exactly one pixel of
/// `PIX_WIDTH` bytes.
pub trait ImageSource {
    /// Size of one pixel in bytes.
    const PIX_WIDTH: usize;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn order(&self) -> ChannelOrder;

    /// Raw bytes of row `y`, which must be inside the image.
    fn row(&self, y: u32) -> &[u8];

    /// Positions the cursor at `(x, y)`; `len` pixels will follow on the row.
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8];
    fn next_x(&mut self) -> &[u8];
    fn next_y(&mut self) -> &[u8];
}

// ============================================================================
// WrapMode trait
// ============================================================================

/// Coordinate wrapping for tiled access.
pub trait WrapMode {
    fn new(size: u32) -> Self;

    /// Wraps `v` and remembers it as the current position.
    fn func(&mut self, v: i32) -> u32;

    /// Advances the current position by one.
    fn inc(&mut self) -> u32;
}

/// Large multiple of `size` that makes negative inputs non-negative before
/// the modulo.
#[inline]
fn wrap_bias(size: u32) -> u32 {
    size.wrapping_mul(0x3FFF_FFFF / size)
}

/// Repeat (modulo) wrapping.
#[derive(Debug, Clone)]
pub struct WrapModeRepeat {
    size: u32,
    add: u32,
    value: u32,
}

impl WrapMode for WrapModeRepeat {
    fn new(size: u32) -> Self {
        Self {
            size,
            add: wrap_bias(size),
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = (v as u32).wrapping_add(self.add) % self.size;
        self.value
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.size {
            self.value = 0;
        }
        self.value
    }
}

/// Repeat wrapping by bit mask. Sizes that are not a power of two tile
/// with the largest power of two below them.
#[derive(Debug, Clone)]
pub struct WrapModeRepeatPow2 {
    mask: u32,
    value: u32,
}

impl WrapMode for WrapModeRepeatPow2 {
    fn new(size: u32) -> Self {
        let mut mask = 1u32;
        while mask < size {
            mask = (mask << 1) | 1;
        }
        Self {
            mask: mask >> 1,
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = v as u32 & self.mask;
        self.value
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value > self.mask {
            self.value = 0;
        }
        self.value
    }
}

/// Repeat wrapping that masks for power-of-two sizes and falls back to modulo.
#[derive(Debug, Clone)]
pub struct WrapModeRepeatAutoPow2 {
    size: u32,
    add: u32,
    mask: u32,
    value: u32,
}

impl WrapMode for WrapModeRepeatAutoPow2 {
    fn new(size: u32) -> Self {
        Self {
            size,
            add: wrap_bias(size),
            mask: if size.is_power_of_two() { size - 1 } else { 0 },
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = if self.mask != 0 {
            v as u32 & self.mask
        } else {
            (v as u32).wrapping_add(self.add) % self.size
        };
        self.value
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.size {
            self.value = 0;
        }
        self.value
    }
}

/// Mirror wrapping: `0, 1, .., n-1, n-1, .., 1, 0, 0, 1, ..`.
#[derive(Debug, Clone)]
pub struct WrapModeReflect {
    size: u32,
    size2: u32,
    add: u32,
    value: u32,
}

impl WrapModeReflect {
    #[inline]
    fn fold(&self) -> u32 {
        if self.value >= self.size {
            self.size2 - self.value - 1
        } else {
            self.value
        }
    }
}

impl WrapMode for WrapModeReflect {
    fn new(size: u32) -> Self {
        let size2 = size * 2;
        Self {
            size,
            size2,
            add: wrap_bias(size2),
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = (v as u32).wrapping_add(self.add) % self.size2;
        self.fold()
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.size2 {
            self.value = 0;
        }
        self.fold()
    }
}

/// Mirror wrapping by bit mask over the next power of two.
#[derive(Debug, Clone)]
pub struct WrapModeReflectPow2 {
    size: u32,
    mask: u32,
    value: u32,
}

impl WrapModeReflectPow2 {
    #[inline]
    fn fold(&self) -> u32 {
        if self.value >= self.size {
            self.mask - self.value
        } else {
            self.value
        }
    }
}

impl WrapMode for WrapModeReflectPow2 {
    fn new(size: u32) -> Self {
        let mut mask = 1u32;
        let mut pow = 1u32;
        while mask < size {
            mask = (mask << 1) | 1;
            pow <<= 1;
        }
        Self {
            size: pow,
            mask,
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = v as u32 & self.mask;
        self.fold()
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value = (self.value + 1) & self.mask;
        self.fold()
    }
}

/// Mirror wrapping that masks when `2 * size` is a power of two.
#[derive(Debug, Clone)]
pub struct WrapModeReflectAutoPow2 {
    size: u32,
    size2: u32,
    add: u32,
    mask: u32,
    value: u32,
}

impl WrapModeReflectAutoPow2 {
    #[inline]
    fn fold(&self) -> u32 {
        if self.value >= self.size {
            self.size2 - self.value - 1
        } else {
            self.value
        }
    }
}

impl WrapMode for WrapModeReflectAutoPow2 {
    fn new(size: u32) -> Self {
        let size2 = size * 2;
        Self {
            size,
            size2,
            add: wrap_bias(size2),
            mask: if size2.is_power_of_two() { size2 - 1 } else { 0 },
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = if self.mask != 0 {
            v as u32 & self.mask
        } else {
            (v as u32).wrapping_add(self.add) % self.size2
        };
        self.fold()
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.size2 {
            self.value = 0;
        }
        self.fold()
    }
}

// ============================================================================
// ImageAccessorClip: background color outside the image
// ============================================================================

/// Largest supported pixel: four f32 channels.
const MAX_PIX_WIDTH: usize = 16;

/// Returns a background pixel for coordinates outside the image.
pub struct ImageAccessorClip<'a, const PIX_WIDTH: usize> {
    rbuf: RowAccessor<'a>,
    bk_buf: [u8; MAX_PIX_WIDTH],
    x: i32,
    x0: i32,
    y: i32,
    fast_path: bool,
    pix_off: usize,
}

impl<'a, const PIX_WIDTH: usize> ImageAccessorClip<'a, PIX_WIDTH> {
    /// `bk_color` holds the raw background pixel in the source's layout.
    pub fn new(rbuf: RowAccessor<'a>, bk_color: &[u8]) -> Self {
        debug_assert_eq!(rbuf.pix_width(), PIX_WIDTH);
        let mut bk_buf = [0; MAX_PIX_WIDTH];
        let len = bk_color.len().min(MAX_PIX_WIDTH);
        bk_buf[..len].copy_from_slice(&bk_color[..len]);
        Self {
            rbuf,
            bk_buf,
            x: 0,
            x0: 0,
            y: 0,
            fast_path: false,
            pix_off: 0,
        }
    }

    #[inline]
    fn inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.rbuf.width() as i32 && y < self.rbuf.height() as i32
    }

    #[inline]
    fn pixel(&self) -> &[u8] {
        if self.inside(self.x, self.y) {
            self.rbuf.pixel(self.x as u32, self.y as u32)
        } else {
            &self.bk_buf[..PIX_WIDTH]
        }
    }

    #[inline]
    fn fast_pixel(&self) -> &[u8] {
        &self.rbuf.row_slice(self.y as u32)[self.pix_off..self.pix_off + PIX_WIDTH]
    }
}

impl<'a, const PIX_WIDTH: usize> ImageSource for ImageAccessorClip<'a, PIX_WIDTH> {
    const PIX_WIDTH: usize = PIX_WIDTH;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn order(&self) -> ChannelOrder {
        self.rbuf.order()
    }

    fn row(&self, y: u32) -> &[u8] {
        self.rbuf.row_slice(y)
    }

    #[inline]
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        self.fast_path = y >= 0
            && y < self.rbuf.height() as i32
            && x >= 0
            && x as i64 + len as i64 <= self.rbuf.width() as i64;
        if self.fast_path {
            self.pix_off = x as usize * PIX_WIDTH;
            self.fast_pixel()
        } else {
            self.pixel()
        }
    }

    #[inline]
    fn next_x(&mut self) -> &[u8] {
        if self.fast_path {
            self.pix_off += PIX_WIDTH;
            self.fast_pixel()
        } else {
            self.x += 1;
            self.pixel()
        }
    }

    #[inline]
    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.x = self.x0;
        if self.fast_path && self.y >= 0 && self.y < self.rbuf.height() as i32 {
            self.pix_off = self.x as usize * PIX_WIDTH;
            self.fast_pixel()
        } else {
            self.fast_path = false;
            self.pixel()
        }
    }
}

// ============================================================================
// ImageAccessorNoClip: caller guarantees coordinates are inside
// ============================================================================

/// Reads without boundary handling. Coordinates outside the image panic.
pub struct ImageAccessorNoClip<'a, const PIX_WIDTH: usize> {
    rbuf: RowAccessor<'a>,
    x: i32,
    y: i32,
    pix_off: usize,
}

impl<'a, const PIX_WIDTH: usize> ImageAccessorNoClip<'a, PIX_WIDTH> {
    pub fn new(rbuf: RowAccessor<'a>) -> Self {
        debug_assert_eq!(rbuf.pix_width(), PIX_WIDTH);
        Self {
            rbuf,
            x: 0,
            y: 0,
            pix_off: 0,
        }
    }

    #[inline]
    fn current(&self) -> &[u8] {
        &self.rbuf.row_slice(self.y as u32)[self.pix_off..self.pix_off + PIX_WIDTH]
    }
}

impl<'a, const PIX_WIDTH: usize> ImageSource for ImageAccessorNoClip<'a, PIX_WIDTH> {
    const PIX_WIDTH: usize = PIX_WIDTH;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn order(&self) -> ChannelOrder {
        self.rbuf.order()
    }

    fn row(&self, y: u32) -> &[u8] {
        self.rbuf.row_slice(y)
    }

    #[inline]
    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x = x;
        self.y = y;
        self.pix_off = x as usize * PIX_WIDTH;
        self.current()
    }

    #[inline]
    fn next_x(&mut self) -> &[u8] {
        self.pix_off += PIX_WIDTH;
        self.current()
    }

    #[inline]
    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.pix_off = self.x as usize * PIX_WIDTH;
        self.current()
    }
}

// ============================================================================
// ImageAccessorClone: clamp to the nearest edge pixel
// ============================================================================

/// Snaps out-of-bounds coordinates to the nearest edge pixel.
pub struct ImageAccessorClone<'a, const PIX_WIDTH: usize> {
    rbuf: RowAccessor<'a>,
    x: i32,
    x0: i32,
    y: i32,
    fast_path: bool,
    pix_off: usize,
}

impl<'a, const PIX_WIDTH: usize> ImageAccessorClone<'a, PIX_WIDTH> {
    pub fn new(rbuf: RowAccessor<'a>) -> Self {
        debug_assert_eq!(rbuf.pix_width(), PIX_WIDTH);
        Self {
            rbuf,
            x: 0,
            x0: 0,
            y: 0,
            fast_path: false,
            pix_off: 0,
        }
    }

    #[inline]
    fn pixel(&self) -> &[u8] {
        let cx = self.x.clamp(0, self.rbuf.width() as i32 - 1);
        let cy = self.y.clamp(0, self.rbuf.height() as i32 - 1);
        self.rbuf.pixel(cx as u32, cy as u32)
    }

    #[inline]
    fn fast_pixel(&self) -> &[u8] {
        &self.rbuf.row_slice(self.y as u32)[self.pix_off..self.pix_off + PIX_WIDTH]
    }
}

impl<'a, const PIX_WIDTH: usize> ImageSource for ImageAccessorClone<'a, PIX_WIDTH> {
    const PIX_WIDTH: usize = PIX_WIDTH;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn order(&self) -> ChannelOrder {
        self.rbuf.order()
    }

    fn row(&self, y: u32) -> &[u8] {
        self.rbuf.row_slice(y)
    }

    #[inline]
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        self.fast_path = y >= 0
            && y < self.rbuf.height() as i32
            && x >= 0
            && x as i64 + len as i64 <= self.rbuf.width() as i64;
        if self.fast_path {
            self.pix_off = x as usize * PIX_WIDTH;
            self.fast_pixel()
        } else {
            self.pixel()
        }
    }

    #[inline]
    fn next_x(&mut self) -> &[u8] {
        if self.fast_path {
            self.pix_off += PIX_WIDTH;
            self.fast_pixel()
        } else {
            self.x += 1;
            self.pixel()
        }
    }

    #[inline]
    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.x = self.x0;
        if self.fast_path && self.y >= 0 && self.y < self.rbuf.height() as i32 {
            self.pix_off = self.x as usize * PIX_WIDTH;
            self.fast_pixel()
        } else {
            self.fast_path = false;
            self.pixel()
        }
    }
}

// ============================================================================
// ImageAccessorWrap: tiling
// ============================================================================

/// Tiles the image in both directions using `WX` and `WY`.
pub struct ImageAccessorWrap<'a, const PIX_WIDTH: usize, WX: WrapMode, WY: WrapMode> {
    rbuf: RowAccessor<'a>,
    x: i32,
    wrap_x: WX,
    wrap_y: WY,
    row_y: u32,
    col_x: u32,
}

impl<'a, const PIX_WIDTH: usize, WX: WrapMode, WY: WrapMode>
    ImageAccessorWrap<'a, PIX_WIDTH, WX, WY>
{
    pub fn new(rbuf: RowAccessor<'a>) -> Self {
        debug_assert_eq!(rbuf.pix_width(), PIX_WIDTH);
        Self {
            rbuf,
            x: 0,
            wrap_x: WX::new(rbuf.width()),
            wrap_y: WY::new(rbuf.height()),
            row_y: 0,
            col_x: 0,
        }
    }

    #[inline]
    fn current(&self) -> &[u8] {
        self.rbuf.pixel(self.col_x, self.row_y)
    }
}

impl<'a, const PIX_WIDTH: usize, WX: WrapMode, WY: WrapMode> ImageSource
    for ImageAccessorWrap<'a, PIX_WIDTH, WX, WY>
{
    const PIX_WIDTH: usize = PIX_WIDTH;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn order(&self) -> ChannelOrder {
        self.rbuf.order()
    }

    fn row(&self, y: u32) -> &[u8] {
        self.rbuf.row_slice(y)
    }

    #[inline]
    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x = x;
        self.row_y = self.wrap_y.func(y);
        self.col_x = self.wrap_x.func(x);
        self.current()
    }

    #[inline]
    fn next_x(&mut self) -> &[u8] {
        self.col_x = self.wrap_x.inc();
        self.current()
    }

    #[inline]
    fn next_y(&mut self) -> &[u8] {
        self.row_y = self.wrap_y.inc();
        self.col_x = self.wrap_x.func(self.x);
        self.current()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_image(width: u32, height: u32, pixels: &[(u32, u32, [u8; 4])]) -> Vec<u8> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for &(x, y, rgba) in pixels {
            let off = ((y * width + x) * 4) as usize;
            data[off..off + 4].copy_from_slice(&rgba);
        }
        data
    }

    #[test]
    fn test_wrap_repeat() {
        let mut w = WrapModeRepeat::new(4);
        assert_eq!(w.func(0), 0);
        assert_eq!(w.func(3), 3);
        assert_eq!(w.func(4), 0);
        assert_eq!(w.func(5), 1);
        assert_eq!(w.func(-1), 3);
    }

    #[test]
    fn test_wrap_repeat_inc() {
        let mut w = WrapModeRepeat::new(3);
        w.func(0);
        assert_eq!(w.inc(), 1);
        assert_eq!(w.inc(), 2);
        assert_eq!(w.inc(), 0);
    }

    #[test]
    fn test_wrap_repeat_pow2() {
        let mut w = WrapModeRepeatPow2::new(4);
        assert_eq!(w.func(3), 3);
        assert_eq!(w.func(4), 0);
        assert_eq!(w.func(-1), 3);
        assert_eq!(w.inc(), 0);
    }

    #[test]
    fn test_wrap_repeat_auto_pow2() {
        let mut w = WrapModeRepeatAutoPow2::new(8);
        assert_eq!(w.func(9), 1);
        let mut w = WrapModeRepeatAutoPow2::new(5);
        assert_eq!(w.func(7), 2);
        assert_eq!(w.func(-1), 4);
    }

    #[test]
    fn test_wrap_reflect_sequence() {
        let mut w = WrapModeReflect::new(3);
        let mut seq = vec![w.func(0)];
        for _ in 0..6 {
            seq.push(w.inc());
        }
        assert_eq!(seq, vec![0, 1, 2, 2, 1, 0, 0]);
        assert_eq!(w.func(-1), 0);
    }

    #[test]
    fn test_wrap_reflect_pow2() {
        let mut w = WrapModeReflectPow2::new(4);
        assert_eq!(w.func(3), 3);
        assert_eq!(w.func(4), 3);
        assert_eq!(w.func(7), 0);
        assert_eq!(w.inc(), 0);
    }

    #[test]
    fn test_wrap_reflect_auto_pow2() {
        let mut w = WrapModeReflectAutoPow2::new(4);
        assert_eq!(w.func(5), 2);
        let mut w = WrapModeReflectAutoPow2::new(3);
        assert_eq!(w.func(4), 1);
    }

    #[test]
    fn test_clip_in_and_out_of_bounds() {
        let data = rgba_image(4, 4, &[(1, 1, [10, 20, 30, 40])]);
        let rbuf = RowAccessor::packed(&data, 4, 4, 4).unwrap();
        let mut acc = ImageAccessorClip::<4>::new(rbuf, &[99, 88, 77, 66]);
        assert_eq!(acc.span(1, 1, 1), &[10, 20, 30, 40]);
        assert_eq!(acc.span(-1, 0, 1), &[99, 88, 77, 66]);
        assert_eq!(acc.next_x(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_clip_span_fast_path_and_next_y() {
        let data = rgba_image(
            4,
            2,
            &[(0, 0, [1, 2, 3, 4]), (1, 0, [5, 6, 7, 8]), (0, 1, [9, 9, 9, 9])],
        );
        let rbuf = RowAccessor::packed(&data, 4, 2, 4).unwrap();
        let mut acc = ImageAccessorClip::<4>::new(rbuf, &[0, 0, 0, 0]);
        assert_eq!(acc.span(0, 0, 2), &[1, 2, 3, 4]);
        assert_eq!(acc.next_x(), &[5, 6, 7, 8]);
        assert_eq!(acc.next_y(), &[9, 9, 9, 9]);
        assert_eq!(acc.next_y(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_no_clip_walks_row() {
        let data = rgba_image(
            3,
            1,
            &[(0, 0, [10, 0, 0, 0]), (1, 0, [20, 0, 0, 0]), (2, 0, [30, 0, 0, 0])],
        );
        let rbuf = RowAccessor::packed(&data, 3, 1, 4).unwrap();
        let mut acc = ImageAccessorNoClip::<4>::new(rbuf);
        assert_eq!(acc.span(0, 0, 3)[0], 10);
        assert_eq!(acc.next_x()[0], 20);
        assert_eq!(acc.next_x()[0], 30);
    }

    #[test]
    #[should_panic]
    fn test_no_clip_out_of_range_panics() {
        let data = rgba_image(2, 1, &[]);
        let rbuf = RowAccessor::packed(&data, 2, 1, 4).unwrap();
        let mut acc = ImageAccessorNoClip::<4>::new(rbuf);
        acc.span(1, 0, 1);
        acc.next_x();
    }

    #[test]
    fn test_clone_clamps_to_edges() {
        let data = rgba_image(4, 4, &[(0, 0, [10, 20, 30, 40]), (3, 3, [99, 88, 77, 66])]);
        let rbuf = RowAccessor::packed(&data, 4, 4, 4).unwrap();
        let mut acc = ImageAccessorClone::<4>::new(rbuf);
        assert_eq!(acc.span(-5, -3, 1), &[10, 20, 30, 40]);
        assert_eq!(acc.span(100, 100, 1), &[99, 88, 77, 66]);
    }

    #[test]
    fn test_wrap_repeat_access() {
        let data = rgba_image(
            2,
            2,
            &[
                (0, 0, [10, 0, 0, 0]),
                (1, 0, [20, 0, 0, 0]),
                (0, 1, [30, 0, 0, 0]),
                (1, 1, [40, 0, 0, 0]),
            ],
        );
        let rbuf = RowAccessor::packed(&data, 2, 2, 4).unwrap();
        let mut acc = ImageAccessorWrap::<4, WrapModeRepeat, WrapModeRepeat>::new(rbuf);
        assert_eq!(acc.span(2, 0, 1)[0], 10);
        assert_eq!(acc.next_x()[0], 20);
        assert_eq!(acc.next_y()[0], 30);
        assert_eq!(acc.span(-1, -1, 1)[0], 40);
    }

    #[test]
    fn test_source_metadata() {
        let data = vec![0u8; 6];
        let rbuf = RowAccessor::packed(&data, 2, 1, 3)
            .unwrap()
            .with_order(ChannelOrder::BGR);
        let acc = ImageAccessorClone::<3>::new(rbuf);
        assert_eq!(acc.width(), 2);
        assert_eq!(acc.height(), 1);
        assert_eq!(acc.order(), ChannelOrder::BGR);
        assert_eq!(<ImageAccessorClone<3> as ImageSource>::PIX_WIDTH, 3);
        assert_eq!(acc.row(0).len(), 6);
    }
}
