//! Per-frame channel calibration.
//!
//! Before a frame is transformed, each channel's [`ChannelRange`] is
//! resolved to the integer domain of the frame's bit depth. Auto-detected
//! input bounds are scanned from the frame itself (one full pass for the
//! minimum, a separate one for the maximum). The result is a linear
//! [`Calibration`]:
//!
//! ```text
//! out = (in - in_floor) * coeff + out_floor
//! coeff = (out_max - out_min) / (in_max - in_min)
//! ```
//!
//! `coeff` is kept real-valued rather than rounded, so the error does not
//! accumulate across the transform.
//!
//! A [`FrameCalibration`] lives for one frame only: it is computed at the
//! start of processing, shared read-only by every slice and dropped when
//! the frame is done.

use crate::range::ChannelRange;
use crate::{LevelsConfig, OpsError, OpsResult};
use levels_core::{Channel, Frame, PixelFormatDescriptor, Sample};
use rayon::prelude::*;
use tracing::debug;

/// Linear mapping of one channel in the integer domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Scale applied after subtracting `in_floor`.
    pub coeff: f32,
    /// Resolved input black point.
    pub in_floor: i32,
    /// Resolved output black point.
    pub out_floor: i32,
}

impl Calibration {
    /// Identity mapping.
    pub const IDENTITY: Self = Self {
        coeff: 1.0,
        in_floor: 0,
        out_floor: 0,
    };

    /// Plain adjusted value, not yet clipped.
    #[inline]
    pub fn apply(&self, v: f32) -> f32 {
        (v - self.in_floor as f32) * self.coeff + self.out_floor as f32
    }
}

/// Calibrations of every channel present in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCalibration {
    /// Red, green and blue.
    pub rgb: [Calibration; 3],
    /// Alpha, for 4-component layouts.
    pub alpha: Option<Calibration>,
}

impl FrameCalibration {
    /// Calibrates all channels of `frame` against the current `config`.
    ///
    /// Channels are calibrated in R, G, B, A order; the first degenerate
    /// range aborts the frame.
    pub fn compute<T: Sample>(
        config: &LevelsConfig,
        frame: &Frame<T>,
        desc: &PixelFormatDescriptor,
    ) -> OpsResult<Self> {
        let mut rgb = [Calibration::IDENTITY; 3];
        for channel in Channel::RGB {
            rgb[channel.index()] = calibrate(config.range(channel), channel, frame, desc)?;
        }
        let alpha = match desc.alpha_offset() {
            Some(_) => Some(calibrate(
                config.range(Channel::Alpha),
                Channel::Alpha,
                frame,
                desc,
            )?),
            None => None,
        };
        Ok(Self { rgb, alpha })
    }

    /// Calibration of `channel`, if present.
    pub fn get(&self, channel: Channel) -> Option<&Calibration> {
        match channel {
            Channel::Alpha => self.alpha.as_ref(),
            c => Some(&self.rgb[c.index()]),
        }
    }
}

/// Calibrates one channel of `frame`.
///
/// # Errors
///
/// - [`OpsError::Core`] if the frame geometry or depth does not fit `desc`
/// - [`OpsError::FormatMismatch`] if `channel` is absent from `desc`
/// - [`OpsError::DegenerateRange`] if the input black and white points
///   resolve to the same integer
pub fn calibrate<T: Sample>(
    range: &ChannelRange,
    channel: Channel,
    frame: &Frame<T>,
    desc: &PixelFormatDescriptor,
) -> OpsResult<Calibration> {
    frame.check_layout(desc)?;
    let offset = desc
        .offset(channel)
        .ok_or_else(|| OpsError::FormatMismatch(format!("layout has no {channel} channel")))?;
    let resolved = range.resolve(T::DEPTH);

    let in_min = match resolved.in_min {
        Some(v) => v,
        None => {
            let v = scan_min(frame, desc, offset)? as i32;
            debug!(%channel, min = v, "auto-detected black point");
            v
        }
    };
    let in_max = match resolved.in_max {
        Some(v) => v,
        None => {
            let v = scan_max(frame, desc, offset)? as i32;
            debug!(%channel, max = v, "auto-detected white point");
            v
        }
    };

    if in_min == in_max {
        return Err(OpsError::DegenerateRange {
            channel,
            value: in_min,
        });
    }

    let coeff = (resolved.out_max - resolved.out_min) as f64 / (in_max - in_min) as f64;
    Ok(Calibration {
        coeff: coeff as f32,
        in_floor: in_min,
        out_floor: resolved.out_min,
    })
}

/// Smallest sample at `offset` over every pixel of the frame.
///
/// Rows are scanned in parallel; padding past the last pixel is skipped.
pub fn scan_min<T: Sample>(
    frame: &Frame<T>,
    desc: &PixelFormatDescriptor,
    offset: usize,
) -> OpsResult<u32> {
    let (step, row_len) = scan_geometry(frame, desc, offset)?;
    let min = frame
        .data()
        .par_chunks(frame.stride())
        .map(|row| {
            row[offset..row_len]
                .iter()
                .step_by(step)
                .min()
                .map_or(u32::MAX, |v| v.to_u32())
        })
        .min()
        .unwrap_or(u32::MAX);
    Ok(min)
}

/// Largest sample at `offset` over every pixel of the frame.
pub fn scan_max<T: Sample>(
    frame: &Frame<T>,
    desc: &PixelFormatDescriptor,
    offset: usize,
) -> OpsResult<u32> {
    let (step, row_len) = scan_geometry(frame, desc, offset)?;
    let max = frame
        .data()
        .par_chunks(frame.stride())
        .map(|row| {
            row[offset..row_len]
                .iter()
                .step_by(step)
                .max()
                .map_or(0, |v| v.to_u32())
        })
        .max()
        .unwrap_or(0);
    Ok(max)
}

/// Pixel step and covered row length, once the frame is known to fit `desc`.
fn scan_geometry<T: Sample>(
    frame: &Frame<T>,
    desc: &PixelFormatDescriptor,
    offset: usize,
) -> OpsResult<(usize, usize)> {
    frame.check_layout(desc)?;
    let step = desc.step();
    if offset >= step {
        return Err(OpsError::FormatMismatch(format!(
            "sample offset {offset} outside {step}-sample pixel"
        )));
    }
    Ok((step, frame.width() as usize * step))
}
