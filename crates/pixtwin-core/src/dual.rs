//! The dual image: one owning buffer plus one view over it.
//!
//! [`DualImage`] is the root type of the crate. It pairs a [`PixelBuffer`]
//! with a [`MatView`] and offers lifecycle operations that keep the view
//! bound to the buffer:
//!
//! | Operation | Buffer | View |
//! |-----------|--------|------|
//! | [`DualImage::new`] | empty | empty |
//! | [`DualImage::with_size`] | allocated | bound |
//! | [`Clone`] | deep copy | bound to the copy |
//! | [`DualImage::take`] | moved out, source empty | moved out, source empty |
//! | [`DualImage::swap`] | exchanged | exchanged |
//!
//! The binding is an invariant that can be *checked* with
//! [`DualImage::is_view_bound`], not one that is enforced: replacing the
//! buffer through [`DualImage::buffer_mut`] leaves the view stale until one
//! of the [`rebind`](crate::rebind) operations runs.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::{BufferFormat, Color, DualImage};
//!
//! let mut img = DualImage::with_size(64, 32, BufferFormat::Argb32);
//! img.fill_color(Color::rgb(255, 0, 0));
//! assert!(img.is_view_bound());
//!
//! let copy = img.clone();
//! assert_eq!(copy, img);
//! assert_ne!(copy.view().data_ptr(), img.view().data_ptr());
//!
//! let mut src = img;
//! let moved = src.take();
//! assert!(src.is_empty());
//! assert!(moved.is_view_bound());
//! ```

use crate::bind::{bind, is_bound};
use crate::buffer::{AspectRatioMode, PixelBuffer};
use crate::color::{Color, MatColorOrder};
use crate::format::{BufferFormat, MatType};
use crate::rebind::RebindPolicy;
use crate::registry;
use crate::view::MatView;
use tracing::{debug, trace};

/// An owning pixel buffer and a matrix view kept over the same bytes.
#[derive(Debug, Default)]
pub struct DualImage {
    pub(crate) buffer: PixelBuffer,
    pub(crate) view: MatView,
}

impl DualImage {
    /// Empty image. No binding is attempted.
    #[inline]
    pub const fn new() -> Self {
        Self {
            buffer: PixelBuffer::empty(),
            view: MatView::empty(),
        }
    }

    /// Allocates a zero-filled `width x height` image and binds the view.
    ///
    /// Returns the empty image for zero dimensions or a format without a
    /// view counterpart.
    pub fn with_size(width: u32, height: u32, format: BufferFormat) -> Self {
        if !registry::is_valid_buffer_format(format) {
            debug!(?format, "with_size: unmapped format");
            return Self::new();
        }
        Self::from_buffer_owned(PixelBuffer::new(width, height, format))
    }

    /// Deep-copies `buffer` into a new image.
    ///
    /// Returns the empty image when the format has no view counterpart.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let mut img = Self::new();
        if img.copy_from_buffer(buffer).is_err() {
            return Self::new();
        }
        img
    }

    /// Adopts `buffer` without copying and binds the view to it.
    ///
    /// Returns the empty image when the format has no view counterpart.
    pub fn from_buffer_owned(buffer: PixelBuffer) -> Self {
        if buffer.is_empty() || !registry::is_valid_buffer_format(buffer.format()) {
            debug!(format = ?buffer.format(), "from_buffer_owned: empty or unmapped buffer");
            return Self::new();
        }
        let view = bind(&buffer);
        Self { buffer, view }
    }

    /// Copies `view`, declared in `order`, into a new image.
    ///
    /// Returns the empty image when the view type has no buffer counterpart.
    pub fn from_view(view: &MatView, order: MatColorOrder) -> Self {
        let mut img = Self::new();
        if img.copy_from_view(view, order).is_err() {
            return Self::new();
        }
        img
    }

    /// The owning buffer.
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Mutable access to the buffer.
    ///
    /// Replacing the buffer leaves the view stale; call
    /// [`rebind_view`](Self::rebind_view) afterwards.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// The matrix view.
    #[inline]
    pub fn view(&self) -> &MatView {
        &self.view
    }

    /// Mutable access to the view.
    #[inline]
    pub fn view_mut(&mut self) -> &mut MatView {
        &mut self.view
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Buffer size in bytes, row padding included.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.buffer.size_in_bytes()
    }

    /// Buffer format.
    #[inline]
    pub fn format(&self) -> BufferFormat {
        self.buffer.format()
    }

    /// View element type.
    #[inline]
    pub fn mat_type(&self) -> MatType {
        self.view.mat_type()
    }

    /// Whether both the buffer and the view are empty.
    ///
    /// The buffer must have zero size and no data; the view must have zero
    /// rows and cols and no data.
    pub fn is_empty(&self) -> bool {
        let buffer_empty = self.buffer.width() == 0
            && self.buffer.height() == 0
            && self.buffer.bits().is_null();
        let view_empty =
            self.view.rows() == 0 && self.view.cols() == 0 && self.view.data_ptr().is_null();
        buffer_empty && view_empty
    }

    /// Whether the view currently describes exactly the buffer's pixels.
    #[inline]
    pub fn is_view_bound(&self) -> bool {
        is_bound(&self.buffer, &self.view)
    }

    /// Drops both sides, leaving the empty image.
    pub fn clear(&mut self) {
        self.buffer = PixelBuffer::empty();
        self.view = MatView::empty();
    }

    /// Moves the contents out, leaving this image empty.
    #[inline]
    pub fn take(&mut self) -> DualImage {
        std::mem::take(self)
    }

    /// Exchanges buffers and views with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut DualImage) {
        std::mem::swap(self, other);
    }

    /// Fills every pixel with a raw value, see [`PixelBuffer::fill`].
    pub fn fill(&mut self, value: u32) {
        self.buffer.fill(value);
    }

    /// Fills every pixel with `color`.
    pub fn fill_color(&mut self, color: Color) {
        self.buffer.fill_color(color);
    }

    /// Color at (x, y), `None` out of bounds.
    pub fn pixel_color(&self, x: u32, y: u32) -> Option<Color> {
        self.buffer.pixel_color(x, y)
    }

    /// Whether (x, y) lies inside the image.
    #[inline]
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        self.buffer.is_valid(x, y)
    }

    /// Converted copy with a bound view.
    ///
    /// Returns the empty image when `format` has no view counterpart.
    pub fn convert_to_format(&self, format: BufferFormat) -> DualImage {
        if !registry::is_valid_buffer_format(format) {
            debug!(?format, "convert_to_format: unmapped target");
            return Self::new();
        }
        trace!(from = ?self.format(), to = ?format, "convert_to_format");
        Self::from_buffer_owned(self.buffer.convert_to(format))
    }

    /// Nearest-neighbour scaled copy with a bound view.
    pub fn resized(&self, width: u32, height: u32, mode: AspectRatioMode) -> DualImage {
        trace!(width, height, ?mode, "resized");
        Self::from_buffer_owned(self.buffer.scaled(width, height, mode))
    }
}

impl Clone for DualImage {
    /// Deep-copies the buffer and binds a fresh view to the copy.
    fn clone(&self) -> Self {
        let mut img = Self {
            buffer: self.buffer.clone(),
            view: MatView::empty(),
        };
        if img.rebind_view(RebindPolicy::ClearBoth).is_err() {
            trace!(format = ?self.format(), "clone: buffer format unmapped, result is empty");
        }
        img
    }
}

impl PartialEq for DualImage {
    /// Equal buffers and equal binding outcome.
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer && self.is_view_bound() == other.is_view_bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty_and_unbound() {
        let img = DualImage::new();
        assert!(img.is_empty());
        assert!(!img.is_view_bound());
        assert_eq!(img.mat_type(), MatType::U8C1);
        assert_eq!(img, DualImage::default());
    }

    #[test]
    fn test_with_size_binds() {
        let img = DualImage::with_size(4, 7, BufferFormat::Grayscale16);
        assert!(!img.is_empty());
        assert!(img.is_view_bound());
        assert_eq!(img.bytes(), 8 * 7);
        assert!(DualImage::with_size(4, 7, BufferFormat::Rgb16).is_empty());
        assert!(DualImage::with_size(0, 7, BufferFormat::Grayscale8).is_empty());
    }

    #[test]
    fn test_with_size_out_of_range_is_empty() {
        let img = DualImage::with_size(u32::MAX, u32::MAX / 2, BufferFormat::Argb32);
        assert!(img.is_empty());
        assert!(!img.is_view_bound());
    }

    #[test]
    fn test_from_buffer_owned_adopts() {
        let buffer = PixelBuffer::new(3, 3, BufferFormat::Rgb888);
        let bits = buffer.bits();
        let img = DualImage::from_buffer_owned(buffer);
        assert_eq!(img.buffer().bits(), bits);
        assert!(img.is_view_bound());
    }

    #[test]
    fn test_clone_never_aliases() {
        let mut img = DualImage::with_size(5, 5, BufferFormat::Rgb32);
        img.fill(0x00ab_cdef);
        let copy = img.clone();
        assert_eq!(copy, img);
        assert!(copy.is_view_bound());
        assert_ne!(copy.buffer().bits(), img.buffer().bits());
        assert_ne!(copy.view().data_ptr(), img.view().data_ptr());
    }

    #[test]
    fn test_clone_of_unmapped_buffer_is_empty() {
        let mut img = DualImage::with_size(2, 2, BufferFormat::Argb32);
        *img.buffer_mut() = PixelBuffer::new(2, 2, BufferFormat::Rgba8888);
        assert!(img.clone().is_empty());
    }

    #[test]
    fn test_take_moves_binding() {
        let mut src = DualImage::with_size(8, 8, BufferFormat::Alpha8);
        let bits = src.buffer().bits();
        let dst = src.take();
        assert!(src.is_empty());
        assert_eq!(dst.view().data_ptr(), bits);
        assert!(dst.is_view_bound());
    }

    #[test]
    fn test_swap_keeps_both_bound() {
        let mut a = DualImage::with_size(2, 3, BufferFormat::Grayscale8);
        let mut b = DualImage::with_size(5, 4, BufferFormat::Argb32);
        a.swap(&mut b);
        assert_eq!(a.format(), BufferFormat::Argb32);
        assert_eq!(b.format(), BufferFormat::Grayscale8);
        assert!(a.is_view_bound());
        assert!(b.is_view_bound());
    }

    #[test]
    fn test_eq_considers_binding() {
        let a = DualImage::with_size(2, 2, BufferFormat::Grayscale8);
        let mut b = a.clone();
        b.view_mut().release();
        assert_eq!(a.buffer(), b.buffer());
        assert_ne!(a, b);
    }

    #[test]
    fn test_fill_visible_through_view() {
        let mut img = DualImage::with_size(3, 1, BufferFormat::Grayscale8);
        img.fill(42);
        assert_eq!(&img.view().row(0)[..], &[42, 42, 42]);
        assert!(img.is_valid(2, 0));
        assert!(!img.is_valid(3, 0));
        assert!(!img.is_valid(-1, 0));
    }

    #[test]
    fn test_convert_to_format() {
        let mut img = DualImage::with_size(2, 2, BufferFormat::Argb32);
        img.fill_color(Color::rgb(100, 100, 100));
        let gray = img.convert_to_format(BufferFormat::Grayscale8);
        assert!(gray.is_view_bound());
        assert_eq!(gray.mat_type(), MatType::U8C1);
        assert_eq!(gray.buffer().pixel(0, 0), Some(100));
        assert!(img.convert_to_format(BufferFormat::Bgr888).is_empty());
    }

    #[test]
    fn test_resized() {
        let img = DualImage::with_size(40, 20, BufferFormat::Rgb888);
        let small = img.resized(10, 10, AspectRatioMode::Keep);
        assert_eq!((small.width(), small.height()), (10, 5));
        assert!(small.is_view_bound());
        assert!(img.resized(0, 0, AspectRatioMode::Ignore).is_empty());
    }
}
