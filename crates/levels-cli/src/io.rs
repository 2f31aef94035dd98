//! Frame loading and saving.
//!
//! Two containers are supported:
//!
//! - PNG: RGB/RGBA at 8 or 16 bits (grayscale is expanded to RGB on read).
//!   Frames in other layouts are repacked to RGB(A) on write.
//! - Raw: headerless packed samples in a named layout, 16-bit samples
//!   little-endian. Layout and size must be supplied by the caller.
//!
//! The container is picked from the file extension.

use anyhow::{bail, Context, Result};
use levels_core::{BitDepth, Frame, FrameBuffer, PixelFormatDescriptor, PixelLayout, Sample};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// A decoded frame together with its layout.
#[derive(Debug, Clone)]
pub struct Image {
    /// Pixel storage.
    pub buffer: FrameBuffer,
    /// Layout of `buffer`.
    pub layout: PixelLayout,
}

impl Image {
    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Frame height in rows.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }
}

/// File container, detected from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Portable Network Graphics.
    Png,
    /// Headerless packed samples.
    Raw,
}

impl Container {
    /// Detects the container of `path`; anything not `.png` is raw.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Raw,
        }
    }
}

/// Geometry of a raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGeometry {
    /// Sample layout.
    pub layout: PixelLayout,
    /// Width in pixels.
    pub width: u32,
    /// Height in rows.
    pub height: u32,
}

/// Parses a `WIDTHxHEIGHT` size.
pub fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("invalid size '{s}', expected WIDTHxHEIGHT"))?;
    let w = w.trim().parse::<u32>().with_context(|| format!("invalid width in '{s}'"))?;
    let h = h.trim().parse::<u32>().with_context(|| format!("invalid height in '{s}'"))?;
    Ok((w, h))
}

/// Loads a frame; `raw` is required for raw files and ignored for PNG.
pub fn load(path: &Path, raw: Option<RawGeometry>) -> Result<Image> {
    let image = match Container::detect(path) {
        Container::Png => read_png(path),
        Container::Raw => match raw {
            Some(geometry) => read_raw(path, geometry),
            None => bail!("raw input {} needs --layout and --size", path.display()),
        },
    }
    .with_context(|| format!("Failed to load: {}", path.display()))?;
    debug!(
        path = %path.display(),
        layout = %image.layout,
        width = image.width(),
        height = image.height(),
        "loaded frame"
    );
    Ok(image)
}

/// Saves a frame in the container named by the extension of `path`.
pub fn save(path: &Path, image: &Image) -> Result<()> {
    image.buffer.check_layout(&image.layout.descriptor())?;
    let written = match Container::detect(path) {
        Container::Png => write_png(path, image),
        Container::Raw => write_raw(path, image),
    };
    written.with_context(|| format!("Failed to save: {}", path.display()))
}

fn read_png(path: &Path) -> Result<Image> {
    let file = File::open(path)?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder.read_info()?;

    let buf_size = reader
        .output_buffer_size()
        .context("cannot determine output buffer size")?;
    let mut buf = vec![0u8; buf_size];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];
    let (width, height) = (info.width, info.height);

    let (layout, buffer) = match (info.color_type, info.bit_depth) {
        (png::ColorType::Rgb, png::BitDepth::Eight) => {
            (PixelLayout::Rgb24, packed(width, height, 3, bytes.to_vec())?)
        }
        (png::ColorType::Rgba, png::BitDepth::Eight) => {
            (PixelLayout::Rgba, packed(width, height, 4, bytes.to_vec())?)
        }
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => {
            (PixelLayout::Rgb48, packed(width, height, 3, be_to_u16(bytes))?)
        }
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => {
            (PixelLayout::Rgba64, packed(width, height, 4, be_to_u16(bytes))?)
        }
        (png::ColorType::Grayscale, png::BitDepth::Eight) => {
            let rgb: Vec<u8> = bytes.iter().flat_map(|&g| [g, g, g]).collect();
            (PixelLayout::Rgb24, packed(width, height, 3, rgb)?)
        }
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => {
            let rgba: Vec<u8> = bytes
                .chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect();
            (PixelLayout::Rgba, packed(width, height, 4, rgba)?)
        }
        (color_type, bit_depth) => {
            bail!("unsupported PNG pixel type: {color_type:?} {bit_depth:?}")
        }
    };
    Ok(Image { buffer, layout })
}

fn packed<T: Sample>(width: u32, height: u32, step: usize, data: Vec<T>) -> Result<FrameBuffer>
where
    FrameBuffer: From<Frame<T>>,
{
    let frame = Frame::from_data(width, height, width as usize * step, data)?;
    Ok(frame.into())
}

fn write_png(path: &Path, image: &Image) -> Result<()> {
    let desc = image.layout.descriptor();
    let color_type = if desc.alpha_offset().is_some() {
        png::ColorType::Rgba
    } else {
        png::ColorType::Rgb
    };

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(color_type);

    let bytes = match &image.buffer {
        FrameBuffer::U8(frame) => {
            encoder.set_depth(png::BitDepth::Eight);
            repack(frame, &desc)
        }
        FrameBuffer::U16(frame) => {
            encoder.set_depth(png::BitDepth::Sixteen);
            repack(frame, &desc)
                .into_iter()
                .flat_map(u16::to_be_bytes)
                .collect()
        }
    };

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&bytes)?;
    png_writer.finish()?;
    Ok(())
}

fn read_raw(path: &Path, geometry: RawGeometry) -> Result<Image> {
    let desc = geometry.layout.descriptor();
    let stride = geometry.width as usize * desc.step();
    let expected = desc.linesize(geometry.width) * geometry.height as usize;
    let bytes = std::fs::read(path)?;
    if bytes.len() != expected {
        bail!(
            "raw size mismatch: {} bytes, {} {}x{} needs {}",
            bytes.len(),
            geometry.layout,
            geometry.width,
            geometry.height,
            expected
        );
    }

    let buffer = match desc.depth() {
        BitDepth::U8 => Frame::from_data(geometry.width, geometry.height, stride, bytes)?.into(),
        BitDepth::U16 => {
            let samples: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect();
            Frame::from_data(geometry.width, geometry.height, stride, samples)?.into()
        }
    };
    Ok(Image {
        buffer,
        layout: geometry.layout,
    })
}

fn write_raw(path: &Path, image: &Image) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    match &image.buffer {
        FrameBuffer::U8(frame) => out.write_all(frame.data())?,
        FrameBuffer::U16(frame) => {
            for v in frame.data() {
                out.write_all(&v.to_le_bytes())?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Extracts R, G, B (and A) in that order, dropping padding.
fn repack<T: Sample>(frame: &Frame<T>, desc: &PixelFormatDescriptor) -> Vec<T> {
    let offsets: Vec<usize> = desc
        .channels()
        .iter()
        .filter_map(|&c| desc.offset(c))
        .collect();
    let row_len = frame.width() as usize * desc.step();
    let mut out =
        Vec::with_capacity(frame.width() as usize * frame.height() as usize * offsets.len());
    for y in 0..frame.height() {
        for px in frame.row(y)[..row_len].chunks_exact(desc.step()) {
            out.extend(offsets.iter().map(|&o| px[o]));
        }
    }
    out
}

/// Converts big-endian byte slice to u16 vector.
fn be_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}
