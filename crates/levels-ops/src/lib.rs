//! # levels-ops
//!
//! Per-pixel color levels remapping for packed RGB(A) frames.
//!
//! Each channel's input black/white points are mapped linearly onto its
//! output black/white points, optionally keeping a color property of the
//! original pixel, and the result is clipped to the frame's bit depth.
//!
//! # Modules
//!
//! - [`range`] - Per-channel black and white points
//! - [`config`] - Full configuration and named options
//! - [`calibrate`] - Per-frame resolution of ranges (with auto-detection)
//! - [`preserve`] - Color preservation metrics and correction ratio
//! - [`kernel`] - The per-pixel transform over row runs
//! - [`parallel`] - Row-slice scheduling
//! - [`filter`] - Format negotiation and frame processing
//!
//! # Example
//!
//! ```rust
//! use levels_core::{Frame, PixelLayout};
//! use levels_ops::{ChannelRange, LevelsConfig, LevelsFilter, PreserveMode};
//!
//! // Auto levels on every channel, keeping luminance
//! let config = LevelsConfig::default()
//!     .with_all(ChannelRange::identity().with_auto_in_min().with_auto_in_max())
//!     .with_preserve(PreserveMode::Luminance);
//!
//! let mut filter = LevelsFilter::new(config).unwrap();
//! filter.negotiate_layout(PixelLayout::Bgr24, 2).unwrap();
//!
//! let frame = Frame::from_data(2, 1, 6, vec![20u8, 40, 60, 200, 180, 160]).unwrap();
//! let out = filter.process(frame, false).unwrap();
//! assert_eq!(out.width(), 2);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod calibrate;
pub mod config;
pub mod filter;
pub mod kernel;
pub mod parallel;
pub mod preserve;
pub mod range;

pub use calibrate::{Calibration, FrameCalibration};
pub use config::LevelsConfig;
pub use error::{OpsError, OpsResult};
pub use filter::{LevelsFilter, NegotiatedFormat};
pub use preserve::PreserveMode;
pub use range::ChannelRange;
