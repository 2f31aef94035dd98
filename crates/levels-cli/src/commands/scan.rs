//! Scan command.
//!
//! Reports the smallest and largest sample of each channel, the values
//! auto-detection would pick as black and white points.

use anyhow::Result;
use clap::Args;
use levels_core::{Channel, Frame, FrameBuffer, PixelFormatDescriptor, Sample};
use levels_ops::calibrate::{scan_max, scan_min};
use std::path::PathBuf;

use super::RawArgs;
use crate::io;

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Input image (PNG or raw)
    pub input: PathBuf,

    #[command(flatten)]
    pub raw: RawArgs,
}

/// Per-channel `(channel, min, max)`.
pub fn extremes<T: Sample>(
    frame: &Frame<T>,
    desc: &PixelFormatDescriptor,
) -> Result<Vec<(Channel, u32, u32)>> {
    let mut stats = Vec::with_capacity(desc.channels().len());
    for &c in desc.channels() {
        if let Some(off) = desc.offset(c) {
            stats.push((c, scan_min(frame, desc, off)?, scan_max(frame, desc, off)?));
        }
    }
    Ok(stats)
}

/// Run the scan command.
pub fn run(args: ScanArgs) -> Result<()> {
    let image = io::load(&args.input, args.raw.geometry()?)?;
    let desc = image.layout.descriptor();
    let stats = match &image.buffer {
        FrameBuffer::U8(frame) => extremes(frame, &desc)?,
        FrameBuffer::U16(frame) => extremes(frame, &desc)?,
    };

    let max = desc.depth().max_value() as f64;
    println!(
        "{} ({} {}x{})",
        args.input.display(),
        image.layout,
        image.width(),
        image.height()
    );
    for (channel, lo, hi) in stats {
        println!(
            "  {:<6} min {:>5} ({:.4})  max {:>5} ({:.4})",
            channel.to_string(),
            lo,
            lo as f64 / max,
            hi,
            hi as f64 / max
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use levels_core::PixelLayout;

    #[test]
    fn test_extremes() {
        let desc = PixelLayout::Argb.descriptor();
        let frame = Frame::from_data(2, 2, 8, vec![
            255, 10, 20, 30, 0, 40, 50, 60, //
            7, 90, 5, 200, 9, 11, 12, 13,
        ])
        .unwrap();
        let stats = extremes::<u8>(&frame, &desc).unwrap();
        assert_eq!(
            stats,
            vec![
                (Channel::Red, 10, 90),
                (Channel::Green, 5, 50),
                (Channel::Blue, 13, 200),
                (Channel::Alpha, 0, 255),
            ]
        );
    }
}
