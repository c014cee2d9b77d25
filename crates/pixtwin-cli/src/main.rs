//! pixtwin - inspect and produce pixtwin image streams
//!
//! Works on files written by `DualImage::save`.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pixtwin_core::AspectRatioMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pixtwin")]
#[command(author, version, about = "Inspect and produce pixtwin image streams")]
#[command(long_about = "
Reads and writes the pixtwin stream format: a buffer format code, the view
geometry, and the pixel data, all big-endian.

Examples:
  pixtwin info image.ptw                     # Show image info
  pixtwin info a.ptw b.ptw --json            # Machine-readable info
  pixtwin new -W 640 -H 480 -f \"RGB 24 bit\" --fill ff8000 -o out.ptw
  pixtwin convert in.ptw out.ptw -f \"Grayscale 8 bit\"
  pixtwin resize in.ptw -o out.ptw -W 320 -H 240 --aspect keep
  pixtwin formats                            # List supported formats
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Create a new image
    New(NewArgs),

    /// Convert to another buffer format
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Resize with nearest-neighbour sampling
    #[command(visible_alias = "r")]
    Resize(ResizeArgs),

    /// List supported buffer formats
    Formats,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NewArgs {
    /// Width in pixels
    #[arg(short = 'W', long)]
    width: u32,

    /// Height in pixels
    #[arg(short = 'H', long)]
    height: u32,

    /// Buffer format label (see `pixtwin formats`)
    #[arg(short, long, default_value = "ARGB 32 bit")]
    format: String,

    /// Fill color as RRGGBB or AARRGGBB hex
    #[arg(long)]
    fill: Option<String>,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    output: PathBuf,

    /// Target buffer format label
    #[arg(short, long)]
    format: String,
}

#[derive(Args)]
struct ResizeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Target width
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Target height
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Aspect ratio handling
    #[arg(long, value_enum, default_value = "ignore")]
    aspect: Aspect,
}

/// CLI spelling of [`AspectRatioMode`].
#[derive(Clone, Copy, ValueEnum)]
enum Aspect {
    Ignore,
    Keep,
    Expand,
}

impl From<Aspect> for AspectRatioMode {
    fn from(a: Aspect) -> Self {
        match a {
            Aspect::Ignore => AspectRatioMode::Ignore,
            Aspect::Keep => AspectRatioMode::Keep,
            Aspect::Expand => AspectRatioMode::KeepByExpanding,
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::New(args) => commands::new::run(args, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Resize(args) => commands::resize::run(args, cli.verbose),
        Commands::Formats => commands::formats::run(cli.verbose),
    }
}
