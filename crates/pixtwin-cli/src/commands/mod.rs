//! CLI command implementations

pub mod convert;
pub mod formats;
pub mod info;
pub mod new;
pub mod resize;

use anyhow::{Context, Result, bail};
use pixtwin_core::{registry, BufferFormat, DualImage};
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<DualImage> {
    DualImage::load(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &DualImage) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Resolves a format given as a label ("RGB 24 bit") or a variant name ("Rgb888").
pub fn parse_format(name: &str) -> Result<BufferFormat> {
    if let Some(format) = registry::format_from_label(name) {
        return Ok(format);
    }
    let by_name = registry::supported_labels()
        .into_iter()
        .filter_map(registry::format_from_label)
        .find(|f| f.to_string().eq_ignore_ascii_case(name));
    match by_name {
        Some(format) => Ok(format),
        None => bail!(
            "Unknown format '{}'. Supported: {}",
            name,
            registry::supported_labels().join(", ")
        ),
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
