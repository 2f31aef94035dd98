//! levels - color levels adjustment CLI
//!
//! Remaps the black and white points of each channel of PNG or raw
//! packed-RGB frames, optionally preserving a color metric.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod io;

use commands::apply::ApplyArgs;
use commands::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "levels")]
#[command(author, version, about = "Color levels adjustment for packed RGB frames")]
#[command(long_about = "
Adjusts input/output black and white points per channel.

Examples:
  levels apply in.png -o out.png --rimin 0.1 --rimax 0.9
  levels apply in.png -o out.png --rimin -1 --gimin -1 --bimin -1 --preserve lum
  levels apply in.png -o out.png --preset warm.yaml
  levels apply frame.raw -o out.raw --layout bgra64 --size 1920x1080
  levels scan in.png                    # Per-channel min/max
  levels formats                        # Supported pixel layouts
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a levels adjustment
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// List supported pixel layouts
    Formats,

    /// Report per-channel sample extremes
    Scan(ScanArgs),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Apply(args) => commands::apply::run(args, cli.threads, cli.verbose),
        Commands::Formats => commands::formats::run(),
        Commands::Scan(args) => commands::scan::run(args),
    }
}
