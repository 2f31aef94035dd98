//! Bit depths, channels and packed pixel layouts.
//!
//! This module provides the canonical description of how samples are laid
//! out in a packed RGB(A) frame.
//!
//! # Types
//!
//! - [`BitDepth`] - Sample width (8 or 16 bits per component)
//! - [`Channel`] - Logical channel (R, G, B, A)
//! - [`PixelLayout`] - Named packed layouts (`rgb24`, `bgra`, `rgba64`, ...)
//! - [`PixelFormatDescriptor`] - Components, depth, pixel step and channel offsets
//!
//! Offsets and the pixel step are counted in **samples** (bytes for 8-bit
//! layouts, 16-bit words for 16-bit layouts).
//!
//! # Usage
//!
//! ```rust
//! use levels_core::format::{BitDepth, Channel, PixelLayout};
//!
//! let desc = PixelLayout::Bgra.descriptor();
//! assert_eq!(desc.components(), 4);
//! assert_eq!(desc.depth(), BitDepth::U8);
//! assert_eq!(desc.offset(Channel::Red), Some(2));
//! assert_eq!(desc.offset(Channel::Alpha), Some(3));
//! ```

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Bit depth of one stored component.
///
/// Only byte-aligned unsigned integer storage is supported:
/// - `U8` - 8-bit unsigned [0, 255]
/// - `U16` - 16-bit unsigned [0, 65535]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 8-bit unsigned integer.
    #[default]
    U8,
    /// 16-bit unsigned integer.
    U16,
}

impl BitDepth {
    /// Number of bits per component.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
        }
    }

    /// Maximum representable integer value (`2^bits - 1`).
    #[inline]
    pub const fn max_value(&self) -> u32 {
        match self {
            Self::U8 => 255,
            Self::U16 => 65535,
        }
    }

    /// Bytes per stored component.
    #[inline]
    pub const fn bytes_per_sample(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Logical color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red.
    Red = 0,
    /// Green.
    Green = 1,
    /// Blue.
    Blue = 2,
    /// Alpha (opacity).
    Alpha = 3,
}

impl Channel {
    /// All channels in R, G, B, A order.
    pub const ALL: [Channel; 4] = [Self::Red, Self::Green, Self::Blue, Self::Alpha];

    /// Color channels only.
    pub const RGB: [Channel; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Index in R, G, B, A order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-letter prefix used in option names (`r`, `g`, `b`, `a`).
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Alpha => 'a',
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Alpha => "alpha",
        };
        f.write_str(name)
    }
}

/// Describes where each channel lives inside one packed pixel.
///
/// This is the only thing the levels engine knows about a pixel format:
/// the number of components, their storage width, the distance between
/// consecutive pixels (`step`) and the position of R, G, B and, for
/// 4-component layouts, A within a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormatDescriptor {
    depth: BitDepth,
    step: usize,
    rgb: [usize; 3],
    alpha: Option<usize>,
}

impl PixelFormatDescriptor {
    /// Builds and validates a descriptor.
    ///
    /// `offsets` is indexed R, G, B, A. The alpha entry is ignored for
    /// 3-component layouts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the component count is not
    /// 3 or 4, an offset falls outside the pixel step, or two channels
    /// share a position.
    ///
    /// # Example
    ///
    /// ```rust
    /// use levels_core::{BitDepth, PixelFormatDescriptor};
    ///
    /// // 16-bit ABGR
    /// let desc = PixelFormatDescriptor::new(4, BitDepth::U16, 4, [3, 2, 1, 0]).unwrap();
    /// assert_eq!(desc.step(), 4);
    ///
    /// assert!(PixelFormatDescriptor::new(2, BitDepth::U8, 2, [0, 1, 0, 0]).is_err());
    /// ```
    pub fn new(components: u8, depth: BitDepth, step: usize, offsets: [usize; 4]) -> Result<Self> {
        let alpha = match components {
            3 => None,
            4 => Some(offsets[3]),
            n => {
                return Err(Error::unsupported_format(format!(
                    "{n} components (expected 3 or 4)"
                )));
            }
        };
        if step < components as usize {
            return Err(Error::unsupported_format(format!(
                "pixel step {step} cannot hold {components} components"
            )));
        }

        let used = &offsets[..components as usize];
        for (i, &off) in used.iter().enumerate() {
            if off >= step {
                return Err(Error::unsupported_format(format!(
                    "{} offset {off} outside pixel step {step}",
                    Channel::ALL[i]
                )));
            }
            if used[..i].contains(&off) {
                return Err(Error::unsupported_format(format!(
                    "{} shares offset {off} with another channel",
                    Channel::ALL[i]
                )));
            }
        }

        Ok(Self {
            depth,
            step,
            rgb: [offsets[0], offsets[1], offsets[2]],
            alpha,
        })
    }

    /// Number of components (3 or 4).
    #[inline]
    pub fn components(&self) -> usize {
        if self.alpha.is_some() { 4 } else { 3 }
    }

    /// Storage width of each component.
    #[inline]
    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// Distance between consecutive pixels, in samples.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Distance between consecutive pixels, in bytes.
    #[inline]
    pub fn step_bytes(&self) -> usize {
        self.step * self.depth.bytes_per_sample()
    }

    /// Offsets of R, G, B within a pixel, in samples.
    #[inline]
    pub fn rgb_offsets(&self) -> [usize; 3] {
        self.rgb
    }

    /// Offset of alpha within a pixel, if the layout carries alpha.
    #[inline]
    pub fn alpha_offset(&self) -> Option<usize> {
        self.alpha
    }

    /// Offset of `channel` within a pixel.
    pub fn offset(&self, channel: Channel) -> Option<usize> {
        match channel {
            Channel::Alpha => self.alpha,
            c => Some(self.rgb[c.index()]),
        }
    }

    /// Logical channels present in this layout.
    pub fn channels(&self) -> &'static [Channel] {
        if self.alpha.is_some() {
            &Channel::ALL
        } else {
            &Channel::RGB
        }
    }

    /// Bytes occupied by one row of `width` pixels (the row "linesize").
    #[inline]
    pub fn linesize(&self, width: u32) -> usize {
        width as usize * self.step_bytes()
    }
}

/// Packed RGB layouts accepted by format negotiation.
///
/// Names follow the usual `rgb24`/`bgra`/`rgba64` vocabulary; `0` marks a
/// padding component that is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// X R G B, 8-bit, padding first.
    Xrgb,
    /// X B G R, 8-bit, padding first.
    Xbgr,
    /// A R G B, 8-bit.
    Argb,
    /// A B G R, 8-bit.
    Abgr,
    /// R G B X, 8-bit, padding last.
    Rgbx,
    /// B G R X, 8-bit, padding last.
    Bgrx,
    /// R G B, 8-bit.
    Rgb24,
    /// B G R, 8-bit.
    Bgr24,
    /// R G B, 16-bit.
    Rgb48,
    /// B G R, 16-bit.
    Bgr48,
    /// R G B A, 16-bit.
    Rgba64,
    /// B G R A, 16-bit.
    Bgra64,
    /// R G B A, 8-bit.
    Rgba,
    /// B G R A, 8-bit.
    Bgra,
}

impl PixelLayout {
    /// Every supported layout, in negotiation preference order.
    pub const fn all() -> &'static [PixelLayout] {
        &[
            Self::Xrgb,
            Self::Xbgr,
            Self::Argb,
            Self::Abgr,
            Self::Rgbx,
            Self::Bgrx,
            Self::Rgb24,
            Self::Bgr24,
            Self::Rgb48,
            Self::Bgr48,
            Self::Rgba64,
            Self::Bgra64,
            Self::Rgba,
            Self::Bgra,
        ]
    }

    /// Short name (`rgb24`, `0bgr`, ...).
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Xrgb => "0rgb",
            Self::Xbgr => "0bgr",
            Self::Argb => "argb",
            Self::Abgr => "abgr",
            Self::Rgbx => "rgb0",
            Self::Bgrx => "bgr0",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgb48 => "rgb48",
            Self::Bgr48 => "bgr48",
            Self::Rgba64 => "rgba64",
            Self::Bgra64 => "bgra64",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
        }
    }

    /// Derives the descriptor for this layout.
    pub fn descriptor(&self) -> PixelFormatDescriptor {
        use BitDepth::{U16, U8};

        // (components, depth, step, [r, g, b, a])
        let (components, depth, step, offsets) = match self {
            Self::Xrgb => (3, U8, 4, [1, 2, 3, 0]),
            Self::Xbgr => (3, U8, 4, [3, 2, 1, 0]),
            Self::Argb => (4, U8, 4, [1, 2, 3, 0]),
            Self::Abgr => (4, U8, 4, [3, 2, 1, 0]),
            Self::Rgbx => (3, U8, 4, [0, 1, 2, 3]),
            Self::Bgrx => (3, U8, 4, [2, 1, 0, 3]),
            Self::Rgb24 => (3, U8, 3, [0, 1, 2, 0]),
            Self::Bgr24 => (3, U8, 3, [2, 1, 0, 0]),
            Self::Rgb48 => (3, U16, 3, [0, 1, 2, 0]),
            Self::Bgr48 => (3, U16, 3, [2, 1, 0, 0]),
            Self::Rgba64 => (4, U16, 4, [0, 1, 2, 3]),
            Self::Bgra64 => (4, U16, 4, [2, 1, 0, 3]),
            Self::Rgba => (4, U8, 4, [0, 1, 2, 3]),
            Self::Bgra => (4, U8, 4, [2, 1, 0, 3]),
        };

        let alpha = (components == 4).then_some(offsets[3]);
        PixelFormatDescriptor {
            depth,
            step,
            rgb: [offsets[0], offsets[1], offsets[2]],
            alpha,
        }
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|layout| layout.name() == lower)
            .ok_or_else(|| Error::unsupported_format(s))
    }
}

impl From<PixelLayout> for PixelFormatDescriptor {
    fn from(layout: PixelLayout) -> Self {
        layout.descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth() {
        assert_eq!(BitDepth::U8.max_value(), 255);
        assert_eq!(BitDepth::U16.max_value(), 65535);
        assert_eq!(BitDepth::U16.bytes_per_sample(), 2);
        assert_eq!(BitDepth::U8.to_string(), "8-bit");
    }

    #[test]
    fn test_layout_descriptors_are_valid() {
        for layout in PixelLayout::all() {
            let d = layout.descriptor();
            let offsets = [
                d.rgb_offsets()[0],
                d.rgb_offsets()[1],
                d.rgb_offsets()[2],
                d.alpha_offset().unwrap_or(0),
            ];
            let rebuilt =
                PixelFormatDescriptor::new(d.components() as u8, d.depth(), d.step(), offsets)
                    .unwrap();
            assert_eq!(rebuilt, d, "{layout}");
        }
    }

    #[test]
    fn test_padding_layouts_have_three_components() {
        for layout in [PixelLayout::Xrgb, PixelLayout::Rgbx, PixelLayout::Bgrx, PixelLayout::Xbgr] {
            let d = layout.descriptor();
            assert_eq!(d.components(), 3);
            assert_eq!(d.step(), 4);
            assert_eq!(d.alpha_offset(), None);
        }
    }

    #[test]
    fn test_channel_offsets() {
        let d = PixelLayout::Abgr.descriptor();
        assert_eq!(d.offset(Channel::Alpha), Some(0));
        assert_eq!(d.offset(Channel::Blue), Some(1));
        assert_eq!(d.offset(Channel::Red), Some(3));

        let d = PixelLayout::Bgr48.descriptor();
        assert_eq!(d.depth(), BitDepth::U16);
        assert_eq!(d.step_bytes(), 6);
        assert_eq!(d.linesize(10), 60);
    }

    #[test]
    fn test_layout_names_roundtrip() {
        for layout in PixelLayout::all() {
            assert_eq!(layout.name().parse::<PixelLayout>().unwrap(), *layout);
        }
        assert_eq!("RGBA".parse::<PixelLayout>().unwrap(), PixelLayout::Rgba);
        assert!("yuv420p".parse::<PixelLayout>().is_err());
    }

    #[test]
    fn test_descriptor_rejects_bad_layouts() {
        // shared offset
        assert!(PixelFormatDescriptor::new(3, BitDepth::U8, 3, [0, 0, 2, 0]).is_err());
        // offset outside step
        assert!(PixelFormatDescriptor::new(4, BitDepth::U8, 4, [0, 1, 2, 4]).is_err());
        // step too small
        assert!(PixelFormatDescriptor::new(4, BitDepth::U8, 3, [0, 1, 2, 3]).is_err());
        // alpha offset ignored for 3 components
        assert!(PixelFormatDescriptor::new(3, BitDepth::U8, 3, [0, 1, 2, 9]).is_ok());
    }
}
