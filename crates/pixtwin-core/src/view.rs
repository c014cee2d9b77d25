//! Non-owning matrix view.
//!
//! A [`MatView`] describes pixels the way a numeric matrix library does:
//! `rows` x `cols` elements of one [`MatType`], with `step` bytes between
//! row starts. Where the bytes live is one of:
//!
//! - nowhere (the empty view, null data pointer)
//! - a [`PixelStorage`] allocation plus a byte offset, either shared with a
//!   [`PixelBuffer`](crate::PixelBuffer) or made by [`MatView::new`]
//! - caller-managed memory passed to [`MatView::from_raw_parts`]
//!
//! The default view is empty and typed `U8C1`, like a default-constructed
//! matrix.
//!
//! `MatView` deliberately does not implement [`Clone`]: duplicating a
//! descriptor would silently create a second alias. Use
//! [`deep_clone`](MatView::deep_clone) for an independent copy.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::{MatType, MatView};
//!
//! let mut view = MatView::new(2, 3, MatType::U8C3);
//! view.row_mut(1)[0..3].copy_from_slice(&[30, 50, 100]);
//!
//! let copy = view.deep_clone();
//! assert_eq!(&copy.row(1)[0..3], &[30, 50, 100]);
//! assert_ne!(copy.data_ptr(), view.data_ptr());
//! ```

use crate::error::{Error, Result};
use crate::format::MatType;
use crate::storage::{Bytes, BytesMut, PixelStorage};
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;
use tracing::{trace, warn};

enum ViewData {
    Empty,
    Shared { storage: Rc<PixelStorage>, offset: usize },
    External { ptr: NonNull<u8> },
}

/// Matrix descriptor over pixel bytes it does not own.
pub struct MatView {
    rows: u32,
    cols: u32,
    mat_type: MatType,
    step: usize,
    data: ViewData,
}

impl MatView {
    /// The empty view: no data, zero size, type `U8C1`.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            mat_type: MatType::U8C1,
            step: 0,
            data: ViewData::Empty,
        }
    }

    /// Allocates a zeroed, continuous view with its own storage.
    ///
    /// Returns the empty view for zero dimensions, an invalid type, or a
    /// size that does not fit in `isize`.
    pub fn new(rows: u32, cols: u32, mat_type: MatType) -> Self {
        if rows == 0 || cols == 0 || mat_type.is_invalid() {
            return Self::empty();
        }
        let Some((step, size)) = packed_layout(rows, cols, mat_type) else {
            warn!(rows, cols, %mat_type, "MatView::new: size out of range");
            return Self::empty();
        };
        let storage = PixelStorage::zeroed(size);
        Self::aliasing(storage, 0, rows, cols, mat_type, step)
    }

    /// Copies tightly packed element data into a new view.
    ///
    /// Returns `None` when `data` is not exactly `rows * cols * elem_size`
    /// bytes.
    pub fn from_slice(rows: u32, cols: u32, mat_type: MatType, data: &[u8]) -> Option<Self> {
        let (step, size) = packed_layout(rows, cols, mat_type)?;
        if data.len() != size {
            return None;
        }
        if data.is_empty() {
            return Some(Self::empty());
        }
        let storage = PixelStorage::from_vec(data.to_vec());
        Some(Self::aliasing(storage, 0, rows, cols, mat_type, step))
    }

    /// Wraps caller-managed memory.
    ///
    /// A null `ptr` yields the empty view.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `rows` rows of `step` bytes (the last row needs
    /// only `cols * elem_size` bytes), valid for reads and writes for as long
    /// as the view or anything derived from it is used, and not accessed
    /// through other paths while the view reads or writes it.
    pub unsafe fn from_raw_parts(
        rows: u32,
        cols: u32,
        mat_type: MatType,
        ptr: *mut u8,
        step: usize,
    ) -> Self {
        let Some(ptr) = NonNull::new(ptr) else {
            return Self::empty();
        };
        Self {
            rows,
            cols,
            mat_type,
            step,
            data: ViewData::External { ptr },
        }
    }

    pub(crate) fn aliasing(
        storage: Rc<PixelStorage>,
        offset: usize,
        rows: u32,
        cols: u32,
        mat_type: MatType,
        step: usize,
    ) -> Self {
        Self {
            rows,
            cols,
            mat_type,
            step,
            data: ViewData::Shared { storage, offset },
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Element type.
    #[inline]
    pub fn mat_type(&self) -> MatType {
        self.mat_type
    }

    /// Channels per element.
    #[inline]
    pub fn channels(&self) -> usize {
        self.mat_type.channels()
    }

    /// Bytes per element.
    #[inline]
    pub fn elem_size(&self) -> usize {
        self.mat_type.elem_size()
    }

    /// Bytes between row starts.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Visible bytes of one row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.cols as usize * self.elem_size()
    }

    /// Whether rows are packed without padding.
    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.rows <= 1 || self.step == self.row_bytes()
    }

    /// Address of the first element, null for the empty view.
    pub fn data_ptr(&self) -> *const u8 {
        match &self.data {
            ViewData::Empty => std::ptr::null(),
            ViewData::Shared { storage, offset } => storage.ptr_at(*offset),
            ViewData::External { ptr } => ptr.as_ptr() as *const u8,
        }
    }

    /// Whether the view has no data or no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data_ptr().is_null() || self.rows == 0 || self.cols == 0
    }

    /// Whether the view refers to memory it was not handed by this crate.
    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self.data, ViewData::External { .. })
    }

    /// Bytes spanned from the first element to the end of the last row.
    #[inline]
    pub fn span_bytes(&self) -> usize {
        if self.rows == 0 {
            return 0;
        }
        self.step * (self.rows as usize - 1) + self.row_bytes()
    }

    /// Borrows the visible bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`, or if the bytes are mutably borrowed elsewhere.
    pub fn row(&self, y: u32) -> Bytes<'_> {
        assert!(y < self.rows, "row {y} out of bounds (rows {})", self.rows);
        let start = y as usize * self.step;
        let len = self.row_bytes();
        match &self.data {
            ViewData::Empty => Bytes::empty(),
            ViewData::Shared { storage, offset } => Bytes::shared(storage.range(offset + start, len)),
            // SAFETY: upheld by the caller of `from_raw_parts`.
            ViewData::External { ptr } => unsafe { Bytes::raw(ptr.add(start), len) },
        }
    }

    /// Mutably borrows the visible bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`, or if the bytes are borrowed elsewhere.
    pub fn row_mut(&mut self, y: u32) -> BytesMut<'_> {
        assert!(y < self.rows, "row {y} out of bounds (rows {})", self.rows);
        let start = y as usize * self.step;
        let len = self.row_bytes();
        match &self.data {
            ViewData::Empty => BytesMut::empty(),
            ViewData::Shared { storage, offset } => {
                BytesMut::shared(storage.range_mut(offset + start, len))
            }
            // SAFETY: upheld by the caller of `from_raw_parts`.
            ViewData::External { ptr } => unsafe { BytesMut::raw(ptr.add(start), len) },
        }
    }

    /// Bytes of element (x, y), all channels.
    pub fn element(&self, x: u32, y: u32) -> Option<Vec<u8>> {
        if x >= self.cols || y >= self.rows || self.is_empty() {
            return None;
        }
        let elem = self.elem_size();
        let start = x as usize * elem;
        Some(self.row(y)[start..start + elem].to_vec())
    }

    /// Visible bytes of every row, packed without padding.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.row_bytes() * self.rows as usize);
        for y in 0..self.rows {
            out.extend_from_slice(&self.row(y));
        }
        out
    }

    /// Independent, continuous copy with its own storage.
    pub fn deep_clone(&self) -> MatView {
        if self.is_empty() {
            let mut view = Self::empty();
            view.mat_type = self.mat_type;
            return view;
        }
        let storage = PixelStorage::from_vec(self.to_packed_bytes());
        Self::aliasing(storage, 0, self.rows, self.cols, self.mat_type, self.row_bytes())
    }

    /// Copies this view's elements into `dst` in place.
    ///
    /// `dst` keeps its data pointer. Source and destination may share
    /// storage.
    ///
    /// # Errors
    ///
    /// - [`Error::FormatInvalid`] if the element types differ
    /// - [`Error::SizeMismatch`] if the dimensions differ
    pub fn copy_to(&self, dst: &mut MatView) -> Result<()> {
        if self.mat_type != dst.mat_type {
            return Err(Error::format_invalid(self.mat_type));
        }
        if (self.cols, self.rows) != (dst.cols, dst.rows) {
            return Err(Error::size_mismatch((dst.cols, dst.rows), (self.cols, self.rows)));
        }
        trace!(rows = self.rows, cols = self.cols, "MatView::copy_to");
        let packed = self.to_packed_bytes();
        let row_bytes = self.row_bytes();
        if row_bytes == 0 {
            return Ok(());
        }
        for (y, src) in packed.chunks_exact(row_bytes).enumerate() {
            dst.row_mut(y as u32).copy_from_slice(src);
        }
        Ok(())
    }

    /// Swaps channels `a` and `b` of every element in place.
    ///
    /// # Panics
    ///
    /// Panics if either channel index is out of range.
    pub(crate) fn swap_channels(&mut self, a: usize, b: usize) {
        let channels = self.channels();
        assert!(a < channels && b < channels, "channel out of range");
        if a == b || self.is_empty() {
            return;
        }
        let depth = self.mat_type.depth().size();
        let elem = self.elem_size();
        for y in 0..self.rows {
            let mut row = self.row_mut(y);
            for px in row.chunks_exact_mut(elem) {
                let (lo, hi) = (a.min(b) * depth, a.max(b) * depth);
                let (left, right) = px.split_at_mut(hi);
                left[lo..lo + depth].swap_with_slice(&mut right[..depth]);
            }
        }
    }

    /// Resets to the empty view.
    #[inline]
    pub fn release(&mut self) {
        *self = Self::empty();
    }
}

impl Default for MatView {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for MatView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatView")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("type", &self.mat_type)
            .field("step", &self.step)
            .field("data", &self.data_ptr())
            .field("external", &self.is_external())
            .finish()
    }
}

/// Step and total size of a continuous `rows` x `cols` allocation.
fn packed_layout(rows: u32, cols: u32, mat_type: MatType) -> Option<(usize, usize)> {
    let step = (cols as usize).checked_mul(mat_type.elem_size())?;
    let size = step.checked_mul(rows as usize)?;
    (size <= isize::MAX as usize).then_some((step, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_is_empty_u8c1() {
        let view = MatView::default();
        assert!(view.is_empty());
        assert!(view.data_ptr().is_null());
        assert_eq!(view.mat_type(), MatType::U8C1);
        assert_eq!((view.rows(), view.cols()), (0, 0));
    }

    #[test]
    fn test_new_allocates_continuous() {
        let view = MatView::new(4, 5, MatType::U16C1);
        assert_eq!(view.step(), 10);
        assert!(view.is_continuous());
        assert_eq!(view.span_bytes(), 40);
        assert!(view.row(3).iter().all(|&b| b == 0));
        assert!(MatView::new(0, 5, MatType::U8C1).is_empty());
    }

    #[test]
    fn test_new_rejects_oversized_dimensions() {
        let view = MatView::new(u32::MAX, u32::MAX, MatType::F32C3);
        assert!(view.is_empty());
        assert!(view.data_ptr().is_null());
        assert!(MatView::from_slice(u32::MAX, u32::MAX, MatType::F32C3, &[]).is_none());
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert!(MatView::from_slice(2, 2, MatType::U8C3, &[0; 11]).is_none());
        let view = MatView::from_slice(1, 2, MatType::U8C3, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(view.element(1, 0), Some(vec![4, 5, 6]));
        assert_eq!(view.element(2, 0), None);
    }

    #[test]
    fn test_raw_parts_with_padding() {
        // 2 rows, 3 cols, step 4
        let mut mem = vec![1u8, 2, 3, 0xee, 4, 5, 6, 0xee];
        let view = unsafe { MatView::from_raw_parts(2, 3, MatType::U8C1, mem.as_mut_ptr(), 4) };
        assert!(view.is_external());
        assert!(!view.is_continuous());
        assert_eq!(view.to_packed_bytes(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(view.data_ptr(), mem.as_ptr());

        let null = unsafe { MatView::from_raw_parts(2, 3, MatType::U8C1, std::ptr::null_mut(), 4) };
        assert!(null.is_empty());
    }

    #[test]
    fn test_copy_to_checks_geometry_and_type() {
        let src = MatView::new(2, 2, MatType::U8C1);
        let mut wrong_size = MatView::new(3, 2, MatType::U8C1);
        let mut wrong_type = MatView::new(2, 2, MatType::U8C3);
        assert!(matches!(src.copy_to(&mut wrong_size), Err(Error::SizeMismatch { .. })));
        assert!(src.copy_to(&mut wrong_type).unwrap_err().is_format_error());
    }

    #[test]
    fn test_copy_to_keeps_destination_pointer() {
        let src = MatView::from_slice(1, 3, MatType::U8C1, &[7, 8, 9]).unwrap();
        let mut dst = MatView::new(1, 3, MatType::U8C1);
        let before = dst.data_ptr();
        src.copy_to(&mut dst).unwrap();
        assert_eq!(dst.data_ptr(), before);
        assert_eq!(dst.to_packed_bytes(), vec![7, 8, 9]);
    }

    #[test]
    fn test_swap_channels_u16() {
        let data: Vec<u8> = [1u16, 2, 3].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let mut view = MatView::from_slice(1, 1, MatType::U16C3, &data).unwrap();
        view.swap_channels(0, 2);
        let expect: Vec<u8> = [3u16, 2, 1].iter().flat_map(|v| v.to_ne_bytes()).collect();
        assert_eq!(view.to_packed_bytes(), expect);
    }

    #[test]
    fn test_release() {
        let mut view = MatView::new(2, 2, MatType::U8C4);
        view.release();
        assert!(view.is_empty());
        assert_eq!(view.mat_type(), MatType::U8C1);
    }
}
