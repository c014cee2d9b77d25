//! Compatibility tables between buffer formats and view types.
//!
//! The buffer and the view taxonomies only overlap on a hand-picked set of
//! formats. The mapping is kept as two separate one-directional tables:
//!
//! | Buffer format  | View type | Reverse winner |
//! |----------------|-----------|----------------|
//! | `Rgb32`        | `U8C4`    |                |
//! | `Argb32`       | `U8C4`    | yes            |
//! | `Rgb888`       | `U8C3`    | yes            |
//! | `Alpha8`       | `U8C1`    |                |
//! | `Grayscale8`   | `U8C1`    | yes            |
//! | `Grayscale16`  | `U16C1`   | yes            |
//!
//! Buffer → view is total on this subset but not injective, so view → buffer
//! cannot be its inverse: each view type names one canonical buffer format
//! explicitly. `Grayscale8` wins over `Alpha8` for `U8C1`; existing streams
//! depend on that choice.
//!
//! A third table maps human-readable labels to buffer formats.
//!
//! The tables are built once on first use and never mutated.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::registry;
//! use pixtwin_core::{BufferFormat, MatType};
//!
//! assert_eq!(registry::to_view_layout(BufferFormat::Alpha8), Some(MatType::U8C1));
//! assert_eq!(registry::to_buffer_format(MatType::U8C1), Some(BufferFormat::Grayscale8));
//! assert!(!registry::is_valid_buffer_format(BufferFormat::Mono));
//! ```

use crate::format::{BufferFormat, MatType};
use std::collections::HashMap;
use std::sync::OnceLock;

const BUFFER_TO_VIEW: &[(BufferFormat, MatType)] = &[
    (BufferFormat::Rgb32, MatType::U8C4),
    (BufferFormat::Argb32, MatType::U8C4),
    (BufferFormat::Rgb888, MatType::U8C3),
    (BufferFormat::Alpha8, MatType::U8C1),
    (BufferFormat::Grayscale8, MatType::U8C1),
    (BufferFormat::Grayscale16, MatType::U16C1),
];

const VIEW_TO_BUFFER: &[(MatType, BufferFormat)] = &[
    (MatType::U8C1, BufferFormat::Grayscale8),
    (MatType::U8C3, BufferFormat::Rgb888),
    (MatType::U8C4, BufferFormat::Argb32),
    (MatType::U16C1, BufferFormat::Grayscale16),
];

const LABELS: &[(&str, BufferFormat)] = &[
    ("Alpha 8 bit", BufferFormat::Alpha8),
    ("ARGB 32 bit", BufferFormat::Argb32),
    ("Grayscale 8 bit", BufferFormat::Grayscale8),
    ("Grayscale 16 bit", BufferFormat::Grayscale16),
    ("RGB 32 bit", BufferFormat::Rgb32),
    ("RGB 24 bit", BufferFormat::Rgb888),
];

/// Immutable lookup maps built from the literal tables.
struct FormatTables {
    to_view: HashMap<BufferFormat, MatType>,
    to_buffer: HashMap<MatType, BufferFormat>,
    by_label: HashMap<&'static str, BufferFormat>,
}

impl FormatTables {
    fn global() -> &'static FormatTables {
        static INSTANCE: OnceLock<FormatTables> = OnceLock::new();
        INSTANCE.get_or_init(|| FormatTables {
            to_view: BUFFER_TO_VIEW.iter().copied().collect(),
            to_buffer: VIEW_TO_BUFFER.iter().copied().collect(),
            by_label: LABELS.iter().copied().collect(),
        })
    }
}

/// View type matching `format`, or `None` when the format is unmapped.
#[inline]
pub fn to_view_layout(format: BufferFormat) -> Option<MatType> {
    FormatTables::global().to_view.get(&format).copied()
}

/// Canonical buffer format for `mat_type`, or `None` when unmapped.
#[inline]
pub fn to_buffer_format(mat_type: MatType) -> Option<BufferFormat> {
    FormatTables::global().to_buffer.get(&mat_type).copied()
}

/// Whether `format` has a view counterpart.
#[inline]
pub fn is_valid_buffer_format(format: BufferFormat) -> bool {
    to_view_layout(format).is_some()
}

/// Whether `mat_type` has a buffer counterpart.
#[inline]
pub fn is_valid_view_format(mat_type: MatType) -> bool {
    to_buffer_format(mat_type).is_some()
}

/// Labels of all supported buffer formats, sorted.
pub fn supported_labels() -> Vec<&'static str> {
    let mut labels: Vec<_> = FormatTables::global().by_label.keys().copied().collect();
    labels.sort_unstable();
    labels
}

/// Buffer format for a human-readable label such as `"RGB 24 bit"`.
pub fn format_from_label(label: &str) -> Option<BufferFormat> {
    FormatTables::global().by_label.get(label).copied()
}

/// Human-readable label of a supported buffer format.
pub fn label_of(format: BufferFormat) -> Option<&'static str> {
    LABELS
        .iter()
        .find(|(_, f)| *f == format)
        .map(|(label, _)| *label)
}
