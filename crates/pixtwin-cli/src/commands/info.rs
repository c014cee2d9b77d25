//! Image info command.
//!
//! Shows buffer and view details for each input, as text or JSON.

use crate::InfoArgs;
use anyhow::Result;
use pixtwin_core::{registry, DualImage};
use serde_json::json;
use std::fs;
use std::path::Path;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let mut reports = Vec::new();
    for path in &args.input {
        let file_size = fs::metadata(path)?.len();
        let image = super::load_image(path)?;

        if args.json {
            reports.push(to_json(path, &image, file_size));
        } else {
            print_text(path, &image, file_size, verbose);
            if args.input.len() > 1 {
                println!();
            }
        }
    }

    if args.json {
        let out = if reports.len() == 1 {
            reports.remove(0)
        } else {
            serde_json::Value::Array(reports)
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}

/// Prints info in human-readable text format.
fn print_text(path: &Path, image: &DualImage, file_size: u64, verbose: u8) {
    let view = image.view();
    println!("{}", path.display());
    println!("  Resolution: {}x{}", image.width(), image.height());
    println!(
        "  Format:     {}",
        registry::label_of(image.format()).unwrap_or("unsupported")
    );
    println!("  View:       {}x{} {}", view.cols(), view.rows(), view.mat_type());
    println!("  Bound:      {}", if image.is_view_bound() { "yes" } else { "no" });
    println!("  Data size:  {}", super::format_size(image.bytes() as u64));
    println!("  File size:  {}", super::format_size(file_size));

    if verbose > 0 {
        println!("  Stride:     {}", image.buffer().stride());
        println!("  View step:  {}", view.step());
        println!("  Format id:  {:?} ({})", image.format(), image.format().code());
    }
}

fn to_json(path: &Path, image: &DualImage, file_size: u64) -> serde_json::Value {
    let view = image.view();
    json!({
        "file": path.display().to_string(),
        "width": image.width(),
        "height": image.height(),
        "format": image.format().to_string(),
        "format_label": registry::label_of(image.format()),
        "stride": image.buffer().stride(),
        "view": {
            "rows": view.rows(),
            "cols": view.cols(),
            "type": view.mat_type().to_string(),
            "type_code": view.mat_type().code(),
            "step": view.step(),
        },
        "bound": image.is_view_bound(),
        "size_bytes": file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixtwin_core::BufferFormat;

    #[test]
    fn test_json_report() {
        let img = DualImage::with_size(5, 2, BufferFormat::Rgb888);
        let v = to_json(Path::new("a.ptw"), &img, 100);
        assert_eq!(v["width"], 5);
        assert_eq!(v["format_label"], "RGB 24 bit");
        assert_eq!(v["view"]["type_code"], 16);
        assert_eq!(v["bound"], true);
    }
}
