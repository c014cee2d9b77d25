//! Building one representation from the other, and checking that they agree.
//!
//! - [`bind`] makes a [`MatView`] that aliases a buffer's bytes
//! - [`unbind`] makes a new [`PixelBuffer`] holding a copy of a view's bytes
//! - [`is_bound`] tells whether a buffer and a view still describe the same
//!   pixels
//!
//! Binding is never maintained automatically. Anything that replaces the
//! buffer leaves the old view pointing at the old storage; [`is_bound`]
//! reports that, and the [`rebind`](crate::rebind) operations repair it.

use crate::buffer::PixelBuffer;
use crate::format::MatType;
use crate::registry;
use crate::view::MatView;
use tracing::{debug, trace};

/// Creates a view aliasing `buffer`'s storage, stride and dimensions.
///
/// The element type comes from [`registry::to_view_layout`]. For an unmapped
/// format the view carries [`MatType::INVALID`], which [`is_bound`] rejects.
/// An empty buffer yields the empty view.
pub fn bind(buffer: &PixelBuffer) -> MatView {
    let Some(storage) = buffer.storage() else {
        return MatView::empty();
    };
    let mat_type = registry::to_view_layout(buffer.format()).unwrap_or(MatType::INVALID);
    trace!(
        width = buffer.width(),
        height = buffer.height(),
        format = ?buffer.format(),
        %mat_type,
        "bind"
    );
    MatView::aliasing(
        storage.clone(),
        0,
        buffer.height(),
        buffer.width(),
        mat_type,
        buffer.stride(),
    )
}

/// Copies `view` into a newly allocated buffer.
///
/// The buffer is `cols x rows` in the canonical format for the view type.
/// Rows are copied one at a time, so any view step works. Returns `None`
/// for an empty view or a type without a buffer counterpart.
pub fn unbind(view: &MatView) -> Option<PixelBuffer> {
    if view.is_empty() {
        return None;
    }
    let Some(format) = registry::to_buffer_format(view.mat_type()) else {
        debug!(mat_type = %view.mat_type(), "unbind: no buffer format for view type");
        return None;
    };
    trace!(rows = view.rows(), cols = view.cols(), ?format, "unbind");
    let mut buffer = PixelBuffer::new(view.cols(), view.rows(), format);
    if buffer.is_empty() {
        debug!(rows = view.rows(), cols = view.cols(), "unbind: view too large for a buffer");
        return None;
    }
    let row_bytes = view.row_bytes();
    for y in 0..view.rows() {
        let src = view.row(y);
        buffer.scan_line_mut(y)[..row_bytes].copy_from_slice(&src);
    }
    Some(buffer)
}

/// Whether `view` still describes exactly `buffer`'s pixels.
///
/// True when all of these hold:
/// - the data pointers are equal (or both null)
/// - `rows == height` and `cols == width`
/// - the view type is the registry mapping of the buffer format
///
/// An empty buffer with the default view is *not* bound: `Invalid` has no
/// mapping.
pub fn is_bound(buffer: &PixelBuffer, view: &MatView) -> bool {
    view.data_ptr() == buffer.bits()
        && view.rows() == buffer.height()
        && view.cols() == buffer.width()
        && registry::to_view_layout(buffer.format()) == Some(view.mat_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::BufferFormat;

    #[test]
    fn test_bind_aliases_storage() {
        let buffer = PixelBuffer::new(15, 4, BufferFormat::Grayscale8);
        let view = bind(&buffer);
        assert_eq!(view.data_ptr(), buffer.bits());
        assert_eq!(view.step(), 16);
        assert_eq!(view.mat_type(), MatType::U8C1);
        assert!(is_bound(&buffer, &view));
    }

    #[test]
    fn test_writes_through_view_reach_buffer() {
        let buffer = PixelBuffer::new(2, 2, BufferFormat::Rgb888);
        let mut view = bind(&buffer);
        view.row_mut(1)[3..6].copy_from_slice(&[9, 8, 7]);
        assert_eq!(
            buffer.pixel_color(1, 1),
            Some(crate::color::Color::rgb(9, 8, 7))
        );
    }

    #[test]
    fn test_bind_unmapped_format() {
        let buffer = PixelBuffer::new(2, 2, BufferFormat::Rgb16);
        let view = bind(&buffer);
        assert_eq!(view.mat_type(), MatType::INVALID);
        assert!(!is_bound(&buffer, &view));
    }

    #[test]
    fn test_empty_is_not_bound() {
        let buffer = PixelBuffer::empty();
        let view = bind(&buffer);
        assert!(view.is_empty());
        assert!(!is_bound(&buffer, &view));
    }

    #[test]
    fn test_replaced_buffer_leaves_view_stale() {
        let mut buffer = PixelBuffer::new(3, 3, BufferFormat::Argb32);
        let view = bind(&buffer);
        buffer = PixelBuffer::new(3, 3, BufferFormat::Argb32);
        assert!(!is_bound(&buffer, &view));
        // the old storage is still alive through the view
        assert_eq!(view.row(2).len(), 12);
    }

    #[test]
    fn test_unbind_honors_strides() {
        // 3 cols of U8C1 with step 5
        let mut mem = vec![1u8, 2, 3, 0, 0, 4, 5, 6];
        let view = unsafe { MatView::from_raw_parts(2, 3, MatType::U8C1, mem.as_mut_ptr(), 5) };
        let buffer = unbind(&view).unwrap();
        assert_eq!(buffer.format(), BufferFormat::Grayscale8);
        assert_eq!(buffer.stride(), 4);
        assert_eq!(&buffer.scan_line(1)[..3], &[4, 5, 6]);
    }

    #[test]
    fn test_unbind_unmapped_type() {
        assert!(unbind(&MatView::new(2, 2, MatType::F32C1)).is_none());
        assert!(unbind(&MatView::empty()).is_none());
    }
}
