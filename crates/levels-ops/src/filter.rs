//! The color levels filter: format negotiation and per-frame processing.
//!
//! [`LevelsFilter`] ties the pieces together for a host that feeds it
//! frames:
//!
//! 1. [`on_format_negotiated`](LevelsFilter::on_format_negotiated) is
//!    called once the concrete pixel layout and width are known.
//! 2. [`on_frame`](LevelsFilter::on_frame) is called per frame. It reads
//!    the current configuration, calibrates every channel (scanning the
//!    frame for auto-detected bounds), then fans the pixel kernel out over
//!    row slices and joins them before returning the output frame.
//!
//! Whether the input buffer may be reused as output is decided by the
//! host (it knows who else holds a reference) and passed in as a flag.
//!
//! # Example
//!
//! ```rust
//! use levels_core::{Frame, FrameBuffer, PixelLayout};
//! use levels_ops::{ChannelRange, LevelsConfig, LevelsFilter};
//!
//! let config = LevelsConfig::default()
//!     .with_all(ChannelRange::new(0.0, 0.5, 0.0, 1.0));
//! let mut filter = LevelsFilter::new(config).unwrap();
//! filter.negotiate_layout(PixelLayout::Rgb24, 2).unwrap();
//!
//! let frame = Frame::from_data(2, 1, 6, vec![0u8, 64, 128, 200, 10, 20]).unwrap();
//! let out = filter.on_frame(FrameBuffer::U8(frame), true).unwrap();
//! let FrameBuffer::U8(out) = out else { unreachable!() };
//! assert_eq!(out.data(), &[0, 127, 255, 255, 19, 39]);
//! ```

use crate::calibrate::FrameCalibration;
use crate::kernel::Kernel;
use crate::parallel::SliceScheduler;
use crate::{LevelsConfig, OpsError, OpsResult};
use levels_core::{Frame, FrameBuffer, PixelFormatDescriptor, PixelLayout, Sample};
use tracing::{debug, trace};

/// Format fixed by negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedFormat {
    /// Channel layout of every frame.
    pub desc: PixelFormatDescriptor,
    /// Frame width in pixels.
    pub width: u32,
    /// Bytes covered by pixels in one row.
    pub linesize: usize,
}

/// Color levels filter instance.
#[derive(Debug, Clone)]
pub struct LevelsFilter {
    config: LevelsConfig,
    scheduler: SliceScheduler,
    format: Option<NegotiatedFormat>,
}

impl LevelsFilter {
    /// Creates a filter with a validated configuration.
    pub fn new(config: LevelsConfig) -> OpsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scheduler: SliceScheduler::default(),
            format: None,
        })
    }

    /// Caps the number of row slices per frame.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.scheduler = SliceScheduler::new(max_workers);
        self
    }

    /// Layouts this filter accepts during negotiation.
    pub fn supported_layouts() -> &'static [PixelLayout] {
        PixelLayout::all()
    }

    /// Current configuration.
    pub fn config(&self) -> &LevelsConfig {
        &self.config
    }

    /// Replaces the configuration; takes effect from the next frame.
    pub fn set_config(&mut self, config: LevelsConfig) -> OpsResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Sets one named option (`rimin`, `preserve`, ...); takes effect
    /// from the next frame.
    pub fn set_option(&mut self, name: &str, value: &str) -> OpsResult<()> {
        self.config.set_option(name, value)?;
        debug!(option = name, value, "levels option changed");
        Ok(())
    }

    /// Maximum slices per frame.
    pub fn max_workers(&self) -> usize {
        self.scheduler.max_workers()
    }

    /// Negotiated format, if any.
    pub fn format(&self) -> Option<&NegotiatedFormat> {
        self.format.as_ref()
    }

    /// Fixes the pixel layout and frame width for subsequent frames.
    ///
    /// Descriptors are validated on construction, so only the width can
    /// be rejected here.
    pub fn on_format_negotiated(&mut self, desc: PixelFormatDescriptor, width: u32) -> OpsResult<()> {
        if width == 0 {
            return Err(levels_core::Error::invalid_dimensions(width, 0, "width must be > 0").into());
        }
        let linesize = desc.linesize(width);
        debug!(
            components = desc.components(),
            depth = %desc.depth(),
            step = desc.step(),
            width,
            linesize,
            "levels format negotiated"
        );
        self.format = Some(NegotiatedFormat {
            desc,
            width,
            linesize,
        });
        Ok(())
    }

    /// Negotiates one of the named [`PixelLayout`]s.
    pub fn negotiate_layout(&mut self, layout: PixelLayout, width: u32) -> OpsResult<()> {
        self.on_format_negotiated(layout.descriptor(), width)
    }

    /// Negotiates a layout by name (`rgb24`, `bgra64`, ...).
    ///
    /// Unknown names fail with an unsupported-format error.
    pub fn negotiate_layout_name(&mut self, name: &str, width: u32) -> OpsResult<()> {
        let layout: PixelLayout = name.parse()?;
        self.negotiate_layout(layout, width)
    }

    /// Processes one frame.
    ///
    /// With `reuse_input` the input buffer is written in place, provided
    /// no other [`Frame`] shares it. Otherwise a new output frame is
    /// allocated; if that fails the input is dropped and an out-of-memory
    /// error returned.
    pub fn on_frame(&self, input: FrameBuffer, reuse_input: bool) -> OpsResult<FrameBuffer> {
        Ok(match input {
            FrameBuffer::U8(frame) => FrameBuffer::U8(self.process(frame, reuse_input)?),
            FrameBuffer::U16(frame) => FrameBuffer::U16(self.process(frame, reuse_input)?),
        })
    }

    /// Typed form of [`on_frame`](Self::on_frame).
    pub fn process<T: Sample>(&self, input: Frame<T>, reuse_input: bool) -> OpsResult<Frame<T>> {
        let format = self.format.as_ref().ok_or(OpsError::NotNegotiated)?;
        let desc = &format.desc;
        input.check_layout(desc)?;
        if input.width() != format.width {
            return Err(OpsError::SizeMismatch(format!(
                "frame is {} pixels wide, negotiated {}",
                input.width(),
                format.width
            )));
        }

        // configuration is read fresh for every frame
        let config = self.config;
        let calibration = FrameCalibration::compute(&config, &input, desc)?;

        let stride = input.stride();
        let workers = self.scheduler.worker_count(input.height() as usize);
        let kernel = Kernel::new(&calibration, desc, input.width(), stride, config.preserve);
        let in_place = writes_in_place(&input, reuse_input);
        trace!(
            width = input.width(),
            height = input.height(),
            workers,
            in_place,
            preserve = %config.preserve,
            "levels frame"
        );

        if in_place {
            let mut output = input;
            self.scheduler.run_rows(output.data_mut(), stride, |_, rows| {
                kernel.transform_rows_in_place(rows);
            });
            Ok(output)
        } else {
            let mut output = input.try_alloc_like()?;
            let src = input.data();
            self.scheduler.run_rows(output.data_mut(), stride, |range, dst| {
                kernel.transform_rows(&src[range.start * stride..range.end * stride], dst);
            });
            Ok(output)
        }
    }
}

/// In-place output needs both the host's consent and an unshared buffer.
///
/// A shared buffer goes through the fallible allocation path instead of
/// being cloned on write.
fn writes_in_place<T: Sample>(input: &Frame<T>, reuse_input: bool) -> bool {
    reuse_input && input.is_exclusive()
}

impl Default for LevelsFilter {
    fn default() -> Self {
        Self {
            config: LevelsConfig::default(),
            scheduler: SliceScheduler::default(),
            format: None,
        }
    }
}
