//! Sample storage types and luma weights.
//!
//! # Types
//!
//! - [`Sample`] - Trait for stored component types (`u8`, `u16`)
//! - [`REC601_LUMA`] - Luma weights used by luminance preservation
//!
//! The levels engine works on real-valued intermediates in the integer
//! domain of the sample type (0..=255 or 0..=65535), not on normalized
//! [0, 1] floats. [`Sample`] exposes exactly that view.

use crate::BitDepth;

/// Rec.601 luma coefficient for the red channel.
pub const REC601_LUMA_R: f32 = 0.299;

/// Rec.601 luma coefficient for the green channel.
pub const REC601_LUMA_G: f32 = 0.587;

/// Rec.601 luma coefficient for the blue channel.
pub const REC601_LUMA_B: f32 = 0.114;

/// Rec.601 luma coefficients as an array [R, G, B].
pub const REC601_LUMA: [f32; 3] = [REC601_LUMA_R, REC601_LUMA_G, REC601_LUMA_B];

/// Calculate Rec.601 luma: `Y = 0.299*R + 0.587*G + 0.114*B`.
///
/// # Example
/// ```
/// use levels_core::pixel::luma_rec601;
/// let y = luma_rec601([200.0, 100.0, 50.0]);
/// assert!((y - 124.2).abs() < 1e-3);
/// ```
#[inline]
pub fn luma_rec601(rgb: [f32; 3]) -> f32 {
    rgb[0] * REC601_LUMA_R + rgb[1] * REC601_LUMA_G + rgb[2] * REC601_LUMA_B
}

/// Trait for stored component types.
///
/// Implemented for `u8` and `u16`, the two storage widths of packed RGB
/// layouts. Values are exchanged as `f32` in the integer domain.
///
/// # Example
///
/// ```
/// use levels_core::Sample;
///
/// assert_eq!(<u8 as Sample>::from_f32_clipped(300.0), 255);
/// assert_eq!(<u16 as Sample>::from_f32_clipped(-4.0), 0);
/// assert_eq!(<u8 as Sample>::from_f32_clipped(127.9), 127);
/// ```
pub trait Sample: Copy + Default + Send + Sync + Ord + 'static {
    /// Storage depth of this type.
    const DEPTH: BitDepth;

    /// Largest stored value (`2^bits - 1`).
    const MAX: Self;

    /// Largest stored value as `f32`.
    const MAX_F32: f32;

    /// Stored value as `f32`, unscaled.
    fn to_f32(self) -> f32;

    /// Stored value as `u32`, unscaled.
    fn to_u32(self) -> u32;

    /// Truncates toward zero and saturates into `[0, MAX]`. NaN becomes 0.
    fn from_f32_clipped(v: f32) -> Self;
}

impl Sample for u8 {
    const DEPTH: BitDepth = BitDepth::U8;
    const MAX: Self = u8::MAX;
    const MAX_F32: f32 = 255.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_f32_clipped(v: f32) -> Self {
        // `as` truncates toward zero and saturates, NaN maps to 0
        v as u8
    }
}

impl Sample for u16 {
    const DEPTH: BitDepth = BitDepth::U16;
    const MAX: Self = u16::MAX;
    const MAX_F32: f32 = 65535.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_f32_clipped(v: f32) -> Self {
        v as u16
    }
}
