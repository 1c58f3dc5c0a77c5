//! Read-only row access to caller-owned pixel bytes.
//!
//! `RowAccessor` computes row offsets as `y * stride`. A negative stride
//! means the rows are stored bottom-up (BMP style): row 0 is the last row in
//! memory. The span core never owns image storage; it only borrows it here.

use crate::color::ChannelOrder;
use crate::error::{Result, SpanError};

// ============================================================================
// RowAccessor
// ============================================================================

/// Validated view over `height` rows of `width` pixels.
#[derive(Debug, Clone, Copy)]
pub struct RowAccessor<'a> {
    buf: &'a [u8],
    width: u32,
    height: u32,
    stride: i32,
    pix_width: usize,
    order: ChannelOrder,
}

impl<'a> RowAccessor<'a> {
    /// Attaches to `buf`. `pix_width` is the size of one pixel in bytes.
    ///
    /// Fails when the view is empty, when `|stride|` cannot hold a row of
    /// pixels, or when `buf` is shorter than `height * |stride|` bytes.
    pub fn new(
        buf: &'a [u8],
        width: u32,
        height: u32,
        stride: i32,
        pix_width: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 || pix_width == 0 {
            return Err(SpanError::InvalidDimensions { width, height });
        }
        let min = width as usize * pix_width;
        let stride_abs = stride.unsigned_abs() as usize;
        if stride_abs < min {
            return Err(SpanError::InvalidStride {
                stride: stride_abs,
                min,
            });
        }
        let needed = stride_abs * height as usize;
        if buf.len() < needed {
            return Err(SpanError::BufferTooSmall {
                needed,
                actual: buf.len(),
            });
        }
        Ok(Self {
            buf,
            width,
            height,
            stride,
            pix_width,
            order: ChannelOrder::default(),
        })
    }

    /// Tightly packed, top-down rows.
    pub fn packed(buf: &'a [u8], width: u32, height: u32, pix_width: usize) -> Result<Self> {
        let stride = (width as usize * pix_width) as i32;
        Self::new(buf, width, height, stride, pix_width)
    }

    /// Sets the channel order of the raw pixels.
    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> i32 {
        self.stride
    }

    fn stride_abs(&self) -> u32 {
        self.stride.unsigned_abs()
    }

    pub fn pix_width(&self) -> usize {
        self.pix_width
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Pixel bytes of row `y`, `width * pix_width` long.
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_slice(&self, y: u32) -> &'a [u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let stride = self.stride_abs() as usize;
        let row = if self.stride < 0 {
            self.height - 1 - y
        } else {
            y
        };
        let start = row as usize * stride;
        let buf: &'a [u8] = self.buf;
        &buf[start..start + self.width as usize * self.pix_width]
    }

    /// Bytes of pixel `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &'a [u8] {
        let off = x as usize * self.pix_width;
        &self.row_slice(y)[off..off + self.pix_width]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accessor_basic() {
        let data = vec![0u8; 10 * 4 * 5];
        let ra = RowAccessor::packed(&data, 10, 5, 4).unwrap();
        assert_eq!(ra.width(), 10);
        assert_eq!(ra.height(), 5);
        assert_eq!(ra.stride(), 40);
        assert_eq!(ra.row_slice(4).len(), 40);
        assert_eq!(ra.order(), ChannelOrder::RGBA);
    }

    #[test]
    fn test_row_accessor_reads_rows() {
        let mut data = vec![0u8; 3 * 2];
        data[3..6].copy_from_slice(&[7, 8, 9]);
        let ra = RowAccessor::packed(&data, 1, 2, 3).unwrap();
        assert_eq!(ra.pixel(0, 1), &[7, 8, 9]);
    }

    #[test]
    fn test_row_accessor_padded_stride() {
        let mut data = vec![0u8; 8 * 3];
        data[16] = 42;
        let ra = RowAccessor::new(&data, 2, 3, 8, 3).unwrap();
        assert_eq!(ra.row_slice(2)[0], 42);
        assert_eq!(ra.row_slice(2).len(), 6);
    }

    #[test]
    fn test_row_accessor_negative_stride() {
        let mut data = vec![0u8; 4 * 3];
        data[0] = 11; // first row in memory is the last logical row
        data[8] = 33;
        let ra = RowAccessor::new(&data, 1, 3, -4, 4).unwrap();
        assert_eq!(ra.row_slice(2)[0], 11);
        assert_eq!(ra.row_slice(0)[0], 33);
    }

    #[test]
    fn test_row_accessor_rejects_bad_input() {
        let data = vec![0u8; 16];
        assert_eq!(
            RowAccessor::new(&data, 0, 4, 4, 4).unwrap_err(),
            SpanError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert_eq!(
            RowAccessor::new(&data, 2, 2, 4, 4).unwrap_err(),
            SpanError::InvalidStride { stride: 4, min: 8 }
        );
        assert_eq!(
            RowAccessor::packed(&data, 2, 4, 4).unwrap_err(),
            SpanError::BufferTooSmall {
                needed: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn test_with_order() {
        let data = vec![0u8; 3];
        let ra = RowAccessor::packed(&data, 1, 1, 3)
            .unwrap()
            .with_order(ChannelOrder::BGR);
        assert_eq!(ra.order(), ChannelOrder::BGR);
    }

    #[test]
    #[should_panic]
    fn test_row_out_of_bounds_panics() {
        let data = vec![0u8; 4];
        let ra = RowAccessor::packed(&data, 1, 1, 4).unwrap();
        ra.row_slice(1);
    }
}
