//! Apply command.
//!
//! Loads a frame, runs it through the levels filter and saves the result.

use anyhow::{Context, Result};
use clap::Args;
use levels_ops::{LevelsConfig, LevelsFilter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace};

use super::RawArgs;
use crate::io::{self, Image};

/// Arguments for the `apply` command.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Input image (PNG or raw)
    pub input: PathBuf,

    /// Output image, container follows the extension
    #[arg(short, long)]
    pub output: PathBuf,

    /// YAML preset with the starting configuration
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Color preservation: none, lum, max, avg, sum, nrm, pwr
    #[arg(long)]
    pub preserve: Option<String>,

    #[command(flatten)]
    pub raw: RawArgs,

    #[command(flatten)]
    pub levels: LevelArgs,
}

/// Per-channel black and white points. Negative input points auto-detect.
#[derive(Args, Debug, Default)]
pub struct LevelArgs {
    /// Red input black point
    #[arg(long, allow_negative_numbers = true)]
    pub rimin: Option<f64>,
    /// Green input black point
    #[arg(long, allow_negative_numbers = true)]
    pub gimin: Option<f64>,
    /// Blue input black point
    #[arg(long, allow_negative_numbers = true)]
    pub bimin: Option<f64>,
    /// Alpha input black point
    #[arg(long, allow_negative_numbers = true)]
    pub aimin: Option<f64>,
    /// Red input white point
    #[arg(long, allow_negative_numbers = true)]
    pub rimax: Option<f64>,
    /// Green input white point
    #[arg(long, allow_negative_numbers = true)]
    pub gimax: Option<f64>,
    /// Blue input white point
    #[arg(long, allow_negative_numbers = true)]
    pub bimax: Option<f64>,
    /// Alpha input white point
    #[arg(long, allow_negative_numbers = true)]
    pub aimax: Option<f64>,
    /// Red output black point
    #[arg(long)]
    pub romin: Option<f64>,
    /// Green output black point
    #[arg(long)]
    pub gomin: Option<f64>,
    /// Blue output black point
    #[arg(long)]
    pub bomin: Option<f64>,
    /// Alpha output black point
    #[arg(long)]
    pub aomin: Option<f64>,
    /// Red output white point
    #[arg(long)]
    pub romax: Option<f64>,
    /// Green output white point
    #[arg(long)]
    pub gomax: Option<f64>,
    /// Blue output white point
    #[arg(long)]
    pub bomax: Option<f64>,
    /// Alpha output white point
    #[arg(long)]
    pub aomax: Option<f64>,
}

impl LevelArgs {
    /// Options given on the command line, by filter option name.
    fn overrides(&self) -> Vec<(&'static str, f64)> {
        [
            ("rimin", self.rimin),
            ("gimin", self.gimin),
            ("bimin", self.bimin),
            ("aimin", self.aimin),
            ("rimax", self.rimax),
            ("gimax", self.gimax),
            ("bimax", self.bimax),
            ("aimax", self.aimax),
            ("romin", self.romin),
            ("gomin", self.gomin),
            ("bomin", self.bomin),
            ("aomin", self.aomin),
            ("romax", self.romax),
            ("gomax", self.gomax),
            ("bomax", self.bomax),
            ("aomax", self.aomax),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

impl ApplyArgs {
    /// Builds the filter configuration: preset first, then command-line overrides.
    pub fn config(&self) -> Result<LevelsConfig> {
        let mut config = match &self.preset {
            Some(path) => load_preset(path)?,
            None => LevelsConfig::default(),
        };
        for (name, value) in self.levels.overrides() {
            config
                .set_option(name, &value.to_string())
                .with_context(|| format!("invalid --{name}"))?;
        }
        if let Some(mode) = &self.preserve {
            config
                .set_option(LevelsConfig::PRESERVE_OPTION, mode)
                .context("invalid --preserve")?;
        }
        Ok(config)
    }
}

/// Reads a YAML preset.
pub fn load_preset(path: &Path) -> Result<LevelsConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read preset: {}", path.display()))?;
    let config: LevelsConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse preset: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid preset: {}", path.display()))?;
    debug!(preset = %path.display(), ?config, "loaded preset");
    Ok(config)
}

/// Run the apply command.
pub fn run(args: ApplyArgs, threads: usize, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "apply::run");

    let config = args.config()?;
    let image = io::load(&args.input, args.raw.geometry()?)?;

    let mut filter = LevelsFilter::new(config)?;
    if threads > 0 {
        filter = filter.with_max_workers(threads);
    }
    filter.negotiate_layout(image.layout, image.width())?;

    info!(
        input = %args.input.display(),
        layout = %image.layout,
        width = image.width(),
        height = image.height(),
        preserve = %config.preserve,
        workers = filter.max_workers(),
        "Applying levels"
    );

    // the decoded image is ours alone, so the frame is adjusted in place
    let reuse = image.buffer.is_exclusive();
    let start = Instant::now();
    let buffer = filter.on_frame(image.buffer, reuse)?;
    debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "frame processed");

    let output = Image {
        buffer,
        layout: image.layout,
    };
    io::save(&args.output, &output)?;

    if verbose > 0 {
        println!(
            "{} -> {} ({} {}x{})",
            args.input.display(),
            args.output.display(),
            output.layout,
            output.width(),
            output.height()
        );
    }
    Ok(())
}
