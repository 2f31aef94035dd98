//! Frame buffers for packed RGB(A) images.
//!
//! - [`Frame`] - Owned, reference-counted sample buffer of one storage type
//! - [`FrameBuffer`] - Runtime choice between 8-bit and 16-bit frames
//!
//! # Memory Layout
//!
//! Frames store samples in **row-major** order, top-to-bottom. Each row
//! starts `stride` samples after the previous one; the stride may exceed
//! the bytes actually covered by pixels (row padding):
//!
//! ```text
//! Memory: [B G R A B G R A ... pad]  <- Row 0
//!         [B G R A B G R A ... pad]  <- Row 1
//! ```
//!
//! The frame itself does not know the channel order; that is the job of
//! [`PixelFormatDescriptor`](crate::PixelFormatDescriptor).
//!
//! # Ownership
//!
//! Sample data lives in an [`Arc<Vec<T>>`], so cloning a frame is cheap and
//! shares the buffer. [`Frame::is_exclusive`] tells a host whether the
//! buffer may be reused for output in place; [`Frame::data_mut`] falls back
//! to copy-on-write when it is shared.

use crate::{Error, PixelFormatDescriptor, Result, Sample};
use std::sync::Arc;

/// Owned frame of `T` samples.
///
/// # Example
///
/// ```rust
/// use levels_core::Frame;
///
/// let frame: Frame<u8> = Frame::from_data(2, 1, 6, vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(frame.row(0), &[1, 2, 3, 4, 5, 6]);
/// assert!(frame.is_exclusive());
///
/// let shared = frame.clone();
/// assert!(!frame.is_exclusive());
/// # drop(shared);
/// ```
#[derive(Debug, Clone)]
pub struct Frame<T: Sample> {
    data: Arc<Vec<T>>,
    width: u32,
    height: u32,
    /// Samples per row (may include padding)
    stride: usize,
}

impl<T: Sample> Frame<T> {
    /// Creates a zero-filled frame.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if width or height is zero or the
    ///   buffer size overflows
    /// - [`Error::AllocationFailed`] if the buffer cannot be allocated
    pub fn zeroed(width: u32, height: u32, stride: usize) -> Result<Self> {
        let len = buffer_len(width, height, stride)?;
        let data = try_alloc::<T>(len)?;
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            stride,
        })
    }

    /// Wraps existing sample data.
    ///
    /// `data` must hold at least `stride * height` samples; extra samples
    /// at the end are kept but never touched.
    pub fn from_data(width: u32, height: u32, stride: usize, data: Vec<T>) -> Result<Self> {
        let required = buffer_len(width, height, stride)?;
        if data.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                got: data.len(),
            });
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            stride,
        })
    }

    /// Allocates a zero-filled frame with the same geometry as `self`.
    ///
    /// This is how an output buffer is obtained when the input cannot be
    /// reused in place.
    pub fn try_alloc_like(&self) -> Result<Self> {
        Self::zeroed(self.width, self.height, self.stride)
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Samples covered by the frame rows (`stride * height`).
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data[..self.stride * self.height as usize]
    }

    /// Mutable samples covered by the frame rows.
    ///
    /// If the buffer is shared, it is cloned first (copy-on-write).
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        let len = self.stride * self.height as usize;
        &mut Arc::make_mut(&mut self.data)[..len]
    }

    /// Row `y`, including padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[T] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Returns `true` when no other frame shares this buffer.
    ///
    /// Hosts use this to decide whether the frame may be written in place.
    #[inline]
    pub fn is_exclusive(&self) -> bool {
        Arc::strong_count(&self.data) == 1
    }

    /// Checks that the frame geometry can hold pixels of `desc`.
    pub fn check_layout(&self, desc: &PixelFormatDescriptor) -> Result<()> {
        let min_stride = self.width as usize * desc.step();
        if self.stride < min_stride {
            return Err(Error::InvalidStride {
                stride: self.stride,
                min_stride,
                width: self.width,
            });
        }
        if desc.depth() != T::DEPTH {
            return Err(Error::unsupported_format(format!(
                "{} frame for {} layout",
                T::DEPTH,
                desc.depth()
            )));
        }
        Ok(())
    }

    /// Consumes the frame, returning its samples (cloning if shared).
    pub fn into_vec(self) -> Vec<T> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }
}

/// Computes `stride * height`, validating the geometry.
fn buffer_len(width: u32, height: u32, stride: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    stride
        .checked_mul(height as usize)
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))
}

/// Allocates `len` default samples without aborting on OOM.
fn try_alloc<T: Sample>(len: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        Error::allocation_failed(len.saturating_mul(std::mem::size_of::<T>()), e.to_string())
    })?;
    data.resize(len, T::default());
    Ok(data)
}

/// Frame whose storage depth is only known at runtime.
#[derive(Debug, Clone)]
pub enum FrameBuffer {
    /// 8-bit samples.
    U8(Frame<u8>),
    /// 16-bit samples.
    U16(Frame<u16>),
}

impl FrameBuffer {
    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Self::U8(f) => f.width(),
            Self::U16(f) => f.width(),
        }
    }

    /// Frame height in rows.
    pub fn height(&self) -> u32 {
        match self {
            Self::U8(f) => f.height(),
            Self::U16(f) => f.height(),
        }
    }

    /// Returns `true` when no other frame shares this buffer.
    pub fn is_exclusive(&self) -> bool {
        match self {
            Self::U8(f) => f.is_exclusive(),
            Self::U16(f) => f.is_exclusive(),
        }
    }

    /// Checks that the frame geometry can hold pixels of `desc`.
    pub fn check_layout(&self, desc: &PixelFormatDescriptor) -> Result<()> {
        match self {
            Self::U8(f) => f.check_layout(desc),
            Self::U16(f) => f.check_layout(desc),
        }
    }
}

impl From<Frame<u8>> for FrameBuffer {
    fn from(frame: Frame<u8>) -> Self {
        Self::U8(frame)
    }
}

impl From<Frame<u16>> for FrameBuffer {
    fn from(frame: Frame<u16>) -> Self {
        Self::U16(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelLayout;

    #[test]
    fn test_zeroed() {
        let f: Frame<u16> = Frame::zeroed(4, 3, 12).unwrap();
        assert_eq!(f.data().len(), 36);
        assert_eq!(f.stride(), 12);
        assert!(f.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(Frame::<u8>::zeroed(0, 3, 12).is_err());
        assert!(Frame::<u8>::from_data(3, 0, 9, vec![]).is_err());
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        // the size is representable but far beyond what can be reserved
        let err = Frame::<u16>::zeroed(1, 2, usize::MAX / 4).unwrap_err();
        assert!(err.is_allocation_error(), "{err}");
        assert!(matches!(err, Error::AllocationFailed { .. }));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_buffer_too_small() {
        let err = Frame::<u8>::from_data(2, 2, 6, vec![0; 11]).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { required: 12, got: 11 }));
    }

    #[test]
    fn test_copy_on_write() {
        let mut a: Frame<u8> = Frame::from_data(1, 1, 3, vec![1, 2, 3]).unwrap();
        let b = a.clone();
        assert!(!a.is_exclusive());

        a.data_mut()[0] = 9;
        assert!(a.is_exclusive());
        assert_eq!(a.data(), &[9, 2, 3]);
        assert_eq!(b.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_check_layout() {
        let desc = PixelLayout::Rgba.descriptor();
        let ok: Frame<u8> = Frame::zeroed(4, 2, 16).unwrap();
        assert!(ok.check_layout(&desc).is_ok());

        let narrow: Frame<u8> = Frame::zeroed(4, 2, 12).unwrap();
        assert!(matches!(
            narrow.check_layout(&desc),
            Err(Error::InvalidStride { min_stride: 16, .. })
        ));

        let wrong_depth: Frame<u16> = Frame::zeroed(4, 2, 16).unwrap();
        assert!(wrong_depth.check_layout(&desc).is_err());
    }

    #[test]
    fn test_frame_buffer_dispatch() {
        let fb = FrameBuffer::from(Frame::<u16>::zeroed(5, 2, 15).unwrap());
        assert_eq!((fb.width(), fb.height()), (5, 2));
        assert!(fb.is_exclusive());
        assert!(fb.check_layout(&PixelLayout::Rgb48.descriptor()).is_ok());
        assert!(fb.check_layout(&PixelLayout::Rgb24.descriptor()).is_err());

        let shared = fb.clone();
        assert!(!fb.is_exclusive());
        drop(shared);
    }
}
