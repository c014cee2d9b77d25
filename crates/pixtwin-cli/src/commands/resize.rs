//! Resize command
//!
//! Nearest-neighbour scaling. A missing width or height is derived from the
//! other keeping the source aspect ratio.

use crate::ResizeArgs;
use anyhow::{Result, bail};
use pixtwin_core::AspectRatioMode;
use tracing::debug;

pub fn run(args: ResizeArgs, verbose: u8) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let (src_w, src_h) = (image.width(), image.height());
    if image.is_empty() {
        bail!("Input image is empty: {}", args.input.display());
    }

    let (dst_w, dst_h) = match (args.width, args.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => {
            let h = (src_h as f64 * w as f64 / src_w as f64).round() as u32;
            (w, h)
        }
        (None, Some(h)) => {
            let w = (src_w as f64 * h as f64 / src_h as f64).round() as u32;
            (w, h)
        }
        (None, None) => bail!("Specify --width and/or --height"),
    };

    let mode = AspectRatioMode::from(args.aspect);
    debug!(src_w, src_h, dst_w, dst_h, ?mode, "resizing");

    let resized = image.resized(dst_w, dst_h, mode);
    if resized.is_empty() {
        bail!("Resize to {}x{} produced an empty image", dst_w, dst_h);
    }

    super::save_image(&args.output, &resized)?;

    if verbose > 0 {
        println!(
            "Resized {}x{} -> {}x{}",
            src_w,
            src_h,
            resized.width(),
            resized.height()
        );
    }
    Ok(())
}
