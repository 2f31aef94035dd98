//! # levels-core
//!
//! Core types for per-pixel color levels processing.
//!
//! This crate provides the foundational types used by the levels engine:
//!
//! - [`BitDepth`], [`Channel`] - Sample width and logical channels
//! - [`PixelLayout`], [`PixelFormatDescriptor`] - Packed RGB(A) layouts
//! - [`Sample`] - Stored component types (`u8`, `u16`)
//! - [`Frame`], [`FrameBuffer`] - Reference-counted frame buffers
//!
//! ## Crate Structure
//!
//! ```text
//! levels-core (this crate)
//!    ^
//!    |
//!    +-- levels-ops (calibration, preservation, kernel, scheduler)
//!    +-- levels-cli (host binary)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod frame;
pub mod pixel;

pub use error::*;
pub use format::*;
pub use frame::*;
pub use pixel::{luma_rec601, Sample, REC601_LUMA, REC601_LUMA_B, REC601_LUMA_G, REC601_LUMA_R};

/// Prelude module for convenient imports.
///
/// ```
/// use levels_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{BitDepth, Channel, PixelFormatDescriptor, PixelLayout};
    pub use crate::frame::{Frame, FrameBuffer};
    pub use crate::pixel::{luma_rec601, Sample};
}
