//! Rounding helpers, path commands, and the vertex source interface.
//!
//! Only the pieces the span core consumes live here: fixed-point rounding
//! used by every interpolator, and the path command vocabulary needed to
//! read contour outlines and to emit the Gouraud triangle outline.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer, halves away from zero.
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round to the nearest unsigned integer, halves up.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Ceiling as an unsigned integer.
#[inline]
pub fn uceil(v: f64) -> u32 {
    v.ceil() as u32
}

// ============================================================================
// Path commands
// ============================================================================

pub const PATH_CMD_STOP: u32 = 0;
pub const PATH_CMD_MOVE_TO: u32 = 1;
pub const PATH_CMD_LINE_TO: u32 = 2;
pub const PATH_CMD_END_POLY: u32 = 0x0F;

pub const PATH_FLAGS_CCW: u32 = 0x10;
pub const PATH_FLAGS_CW: u32 = 0x20;
pub const PATH_FLAGS_CLOSE: u32 = 0x40;

/// Returns `true` for move_to and every drawing command, curves included.
#[inline]
pub fn is_vertex(c: u32) -> bool {
    (PATH_CMD_MOVE_TO..PATH_CMD_END_POLY).contains(&c)
}

#[inline]
pub fn is_stop(c: u32) -> bool {
    c == PATH_CMD_STOP
}

#[inline]
pub fn is_move_to(c: u32) -> bool {
    c == PATH_CMD_MOVE_TO
}

/// Returns `true` for an end_poly command carrying the close flag.
#[inline]
pub fn is_close(c: u32) -> bool {
    (c & !(PATH_FLAGS_CW | PATH_FLAGS_CCW)) == (PATH_CMD_END_POLY | PATH_FLAGS_CLOSE)
}

// ============================================================================
// VertexSource trait
// ============================================================================

/// A stream of path vertices.
///
/// `rewind` restarts iteration of the path selected by `path_id`; `vertex`
/// writes the next point and returns its command, `PATH_CMD_STOP` once the
/// path is exhausted.
pub trait VertexSource {
    fn rewind(&mut self, path_id: u32);

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32;
}

impl<T: VertexSource> VertexSource for &mut T {
    fn rewind(&mut self, path_id: u32) {
        (*self).rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        (*self).vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================
