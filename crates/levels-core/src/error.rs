//! Error types for levels-core operations.
//!
//! The [`Error`] enum covers the failure modes of the foundation layer:
//! - Pixel format negotiation (unsupported layouts, bad descriptors)
//! - Frame buffer construction (dimensions, strides, buffer sizes)
//! - Buffer allocation
//!
//! # Usage
//!
//! ```rust
//! use levels_core::{Error, Result};
//!
//! fn check_components(n: u8) -> Result<()> {
//!     if n != 3 && n != 4 {
//!         return Err(Error::unsupported_format(format!("{n} components")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_components(2).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing or allocating frames.
///
/// # Categories
///
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat)
/// - **Geometry errors**: [`InvalidDimensions`](Error::InvalidDimensions),
///   [`InvalidStride`](Error::InvalidStride), [`BufferTooSmall`](Error::BufferTooSmall)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel layout is outside the supported component/bit-depth combinations.
    #[error("unsupported pixel format: {format}")]
    UnsupportedFormat {
        /// Format name or description
        format: String,
    },

    /// Invalid frame dimensions.
    ///
    /// Returned when width or height is zero, or dimensions would
    /// overflow the buffer size calculation.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Row stride is too small to hold one row of pixels.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride, in samples
        stride: usize,
        /// Minimum required stride, in samples
        min_stride: usize,
        /// Frame width
        width: u32,
    },

    /// Sample buffer is shorter than the frame geometry requires.
    #[error("buffer holds {got} samples, frame needs {required}")]
    BufferTooSmall {
        /// Samples required by width, height and stride
        required: usize,
        /// Samples actually provided
        got: usize,
    },

    /// Memory allocation failed.
    ///
    /// Returned when an output frame cannot be obtained. Callers treat
    /// this as an out-of-memory condition and drop the frame.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an allocation (out-of-memory) error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Returns `true` if this is a format negotiation error.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(1024 * 1024 * 1024, "out of memory");
        assert!(err.to_string().contains("out of memory"));
        assert!(err.is_allocation_error());
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_unsupported_format() {
        let err = Error::unsupported_format("yuv420p");
        assert!(err.to_string().contains("yuv420p"));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(0, 1080, "width must be > 0");
        let msg = err.to_string();
        assert!(msg.contains("0x1080"));
        assert!(msg.contains("width must be > 0"));
    }
}
