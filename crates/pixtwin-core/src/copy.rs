//! Deep copies into and out of a [`DualImage`].
//!
//! Copying a view in tries three tiers:
//!
//! 1. **In place** - the source has the same rows, cols and type as the
//!    current view: bytes are written through the view and the buffer keeps
//!    its allocation.
//! 2. **Reallocate** - the source type maps to a buffer format: a new buffer
//!    is built from the source and the view is bound to it.
//! 3. **Fail** - neither applies: the image is left untouched.
//!
//! Copies out ([`DualImage::copy_to_view`], [`DualImage::copy_to_buffer`])
//! are always deep and independent of the image.

use crate::bind::{bind, unbind};
use crate::buffer::PixelBuffer;
use crate::color::{to_canonical_order, MatColorOrder};
use crate::dual::DualImage;
use crate::error::{Error, Result};
use crate::registry;
use crate::view::MatView;
use tracing::{debug, trace};

impl DualImage {
    /// Replaces the buffer with a deep copy of `source` and binds the view.
    ///
    /// # Errors
    ///
    /// [`Error::FormatInvalid`] if `source` has a format without a view
    /// counterpart. The image is left untouched.
    pub fn copy_from_buffer(&mut self, source: &PixelBuffer) -> Result<()> {
        if !registry::is_valid_buffer_format(source.format()) {
            debug!(format = ?source.format(), "copy_from_buffer: unmapped format");
            return Err(Error::format_invalid(source.format()));
        }
        trace!(width = source.width(), height = source.height(), "copy_from_buffer");
        self.buffer = source.clone();
        self.view = bind(&self.buffer);
        Ok(())
    }

    /// Copies `source`, declared in `order`, into this image.
    ///
    /// `source` may alias this image's own storage.
    ///
    /// # Errors
    ///
    /// [`Error::FormatInvalid`] if the geometry differs from the current
    /// view and the source type has no buffer counterpart. The image is left
    /// untouched.
    pub fn copy_from_view(&mut self, source: &MatView, order: MatColorOrder) -> Result<()> {
        let canonical = to_canonical_order(source, order);
        let same_shape = canonical.rows() == self.view.rows()
            && canonical.cols() == self.view.cols()
            && canonical.mat_type() == self.view.mat_type();
        if same_shape {
            trace!(rows = source.rows(), cols = source.cols(), "copy_from_view: in place");
            return canonical.copy_to(&mut self.view);
        }
        if !registry::is_valid_view_format(canonical.mat_type()) {
            debug!(mat_type = %source.mat_type(), "copy_from_view: unmapped type");
            return Err(Error::format_invalid(source.mat_type()));
        }
        trace!(rows = source.rows(), cols = source.cols(), "copy_from_view: reallocate");
        match unbind(&canonical) {
            Some(buffer) => {
                self.buffer = buffer;
                self.view = bind(&self.buffer);
            }
            None => self.clear(),
        }
        Ok(())
    }

    /// Independent copy of the view with its own storage.
    pub fn copy_to_view(&self) -> MatView {
        self.view.deep_clone()
    }

    /// Independent copy of the buffer.
    pub fn copy_to_buffer(&self) -> PixelBuffer {
        self.buffer.clone()
    }
}
