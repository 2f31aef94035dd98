//! CLI command implementations

pub mod apply;
pub mod formats;
pub mod scan;

use crate::io::RawGeometry;
use anyhow::{bail, Result};
use clap::Args;
use levels_core::PixelLayout;

/// Geometry options for headerless raw input.
#[derive(Args, Debug, Clone, Default)]
pub struct RawArgs {
    /// Pixel layout of raw input (see `levels formats`)
    #[arg(long)]
    pub layout: Option<PixelLayout>,

    /// Size of raw input as WIDTHxHEIGHT
    #[arg(long)]
    pub size: Option<String>,
}

impl RawArgs {
    /// Raw geometry, if any was given. Both options must appear together.
    pub fn geometry(&self) -> Result<Option<RawGeometry>> {
        match (self.layout, self.size.as_deref()) {
            (None, None) => Ok(None),
            (Some(layout), Some(size)) => {
                let (width, height) = crate::io::parse_size(size)?;
                Ok(Some(RawGeometry {
                    layout,
                    width,
                    height,
                }))
            }
            _ => bail!("--layout and --size must be given together"),
        }
    }
}
