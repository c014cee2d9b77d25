//! # pixtwin-core
//!
//! An owning pixel buffer and a non-owning matrix view over the same bytes,
//! kept from silently diverging.
//!
//! This crate provides:
//!
//! - [`PixelBuffer`] - owning image buffer with row stride and [`BufferFormat`]
//! - [`MatView`] - matrix descriptor (rows, cols, [`MatType`], step) over
//!   bytes it does not own
//! - [`DualImage`] - one of each, with checkable binding between them
//! - [`registry`] - the curated buffer format / view type correspondence
//! - [`color`] - RGB/BGR handling for 3-channel views
//! - [`stream`] - binary serialization
//!
//! ## Binding
//!
//! A view is *bound* to a buffer when it points at the buffer's first byte,
//! has the buffer's dimensions, and carries the view type the registry maps
//! the buffer format to. Binding is checked on demand
//! ([`DualImage::is_view_bound`]) and restored explicitly
//! ([`DualImage::rebind_view`], [`DualImage::rebind_buffer`]) under a
//! [`RebindPolicy`].
//!
//! ```rust
//! use pixtwin_core::{BufferFormat, DualImage, MatColorOrder, MatType, MatView};
//!
//! let img = DualImage::with_size(320, 240, BufferFormat::Rgb888);
//! assert!(img.is_view_bound());
//! assert_eq!(img.mat_type(), MatType::U8C3);
//!
//! // Views coming from BGR code are reordered on the way in.
//! let bgr = MatView::from_slice(1, 1, MatType::U8C3, &[30, 50, 100]).unwrap();
//! let img = DualImage::from_view(&bgr, MatColorOrder::Bgr);
//! assert_eq!(img.pixel_color(0, 0).unwrap().r, 100);
//! ```
//!
//! ## Threading
//!
//! Storage is shared through `Rc` with `RefCell` borrow tracking, so every
//! type here is `!Send` and `!Sync`.
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize/Deserialize for formats, colors and options

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bind;
pub mod buffer;
pub mod color;
pub mod copy;
pub mod dual;
pub mod error;
pub mod format;
pub mod rebind;
pub mod registry;
pub mod storage;
pub mod stream;
pub mod view;

// Re-exports for convenience
pub use bind::{bind, is_bound, unbind};
pub use buffer::{AspectRatioMode, PixelBuffer};
pub use color::{color_to_scalar, swap_red_blue, to_canonical_order, CanonicalView, Color, MatColorOrder, Scalar};
pub use dual::DualImage;
pub use error::{status_code, Error, Result};
pub use format::{BufferFormat, MatDepth, MatType};
pub use rebind::{RebindDirection, RebindOptions, RebindPolicy};
pub use storage::{Bytes, BytesMut};
pub use view::MatView;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use pixtwin_core::prelude::*;
///
/// let img = DualImage::with_size(4, 4, BufferFormat::Grayscale8);
/// assert!(img.is_view_bound());
/// ```
pub mod prelude {
    pub use crate::buffer::{AspectRatioMode, PixelBuffer};
    pub use crate::color::{Color, MatColorOrder};
    pub use crate::dual::DualImage;
    pub use crate::error::{Error, Result};
    pub use crate::format::{BufferFormat, MatType};
    pub use crate::rebind::{RebindOptions, RebindPolicy};
    pub use crate::view::MatView;
}
