//! New image command.

use crate::NewArgs;
use anyhow::{Context, Result, bail};
use pixtwin_core::{Color, DualImage};
use tracing::debug;

pub fn run(args: NewArgs, verbose: u8) -> Result<()> {
    let format = super::parse_format(&args.format)?;
    let mut image = DualImage::with_size(args.width, args.height, format);
    if image.is_empty() {
        bail!("Cannot create {}x{} {}", args.width, args.height, args.format);
    }

    if let Some(hex) = &args.fill {
        let color: Color = hex
            .parse()
            .with_context(|| format!("Invalid fill color: {hex}"))?;
        debug!(?color, "filling");
        image.fill_color(color);
    }

    super::save_image(&args.output, &image)?;

    if verbose > 0 {
        println!(
            "Created {}x{} {} -> {}",
            args.width,
            args.height,
            format,
            args.output.display()
        );
    }
    Ok(())
}
