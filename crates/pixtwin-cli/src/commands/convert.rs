//! Format conversion command.

use crate::ConvertArgs;
use anyhow::{Result, bail};
use tracing::debug;

pub fn run(args: ConvertArgs, verbose: u8) -> Result<()> {
    let target = super::parse_format(&args.format)?;
    let image = super::load_image(&args.input)?;
    debug!(from = ?image.format(), to = ?target, "converting");

    let converted = image.convert_to_format(target);
    if converted.is_empty() && !image.is_empty() {
        bail!("Cannot convert {} to {}", image.format(), target);
    }

    super::save_image(&args.output, &converted)?;

    if verbose > 0 {
        println!(
            "Converted {} -> {}: {}",
            image.format(),
            target,
            args.output.display()
        );
    }
    Ok(())
}
