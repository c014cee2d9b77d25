//! Shared pixel storage for buffers and the views bound to them.
//!
//! A [`PixelBuffer`](crate::PixelBuffer) owns one [`PixelStorage`]
//! allocation. A [`MatView`](crate::MatView) bound to that buffer holds a
//! second handle to the same allocation plus a byte offset, so:
//!
//! - pointer identity between the two sides is a plain address comparison
//! - replacing the buffer leaves the view *stale* but never dangling
//! - reads and writes through the safe API are borrow-checked at runtime
//!
//! Views built from raw parts bypass this and point at caller-managed memory.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::rc::Rc;

/// One heap allocation of pixel bytes.
pub struct PixelStorage {
    bytes: RefCell<Box<[u8]>>,
    // Address of the first byte, fixed for the lifetime of the allocation.
    addr: usize,
}

impl PixelStorage {
    /// Allocates `len` zeroed bytes.
    pub fn zeroed(len: usize) -> Rc<Self> {
        Self::from_vec(vec![0u8; len])
    }

    /// Takes ownership of `data` as a new allocation.
    pub fn from_vec(data: Vec<u8>) -> Rc<Self> {
        let bytes = data.into_boxed_slice();
        let addr = bytes.as_ptr() as usize;
        Rc::new(Self {
            bytes: RefCell::new(bytes),
            addr,
        })
    }

    /// Allocation size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    /// Whether the allocation holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Address of byte `offset`, for identity comparisons only.
    #[inline]
    pub fn ptr_at(&self, offset: usize) -> *const u8 {
        std::ptr::without_provenance(self.addr + offset)
    }

    /// Borrows `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or the storage is mutably
    /// borrowed.
    pub fn range(&self, offset: usize, len: usize) -> Ref<'_, [u8]> {
        Ref::map(self.bytes.borrow(), |b| &b[offset..offset + len])
    }

    /// Mutably borrows `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or the storage is already
    /// borrowed.
    pub fn range_mut(&self, offset: usize, len: usize) -> RefMut<'_, [u8]> {
        RefMut::map(self.bytes.borrow_mut(), |b| &mut b[offset..offset + len])
    }
}

impl fmt::Debug for PixelStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelStorage")
            .field("addr", &format_args!("{:#x}", self.addr))
            .field("len", &self.len())
            .finish()
    }
}

/// Read guard over a run of pixel bytes.
///
/// Dereferences to an empty slice for empty buffers and views.
pub struct Bytes<'a>(BytesInner<'a>);

enum BytesInner<'a> {
    Empty,
    Shared(Ref<'a, [u8]>),
    Raw(&'a [u8]),
}

impl<'a> Bytes<'a> {
    pub(crate) fn empty() -> Self {
        Self(BytesInner::Empty)
    }

    pub(crate) fn shared(r: Ref<'a, [u8]>) -> Self {
        Self(BytesInner::Shared(r))
    }

    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for `'a` and not be
    /// written through any other path meanwhile.
    pub(crate) unsafe fn raw(ptr: NonNull<u8>, len: usize) -> Self {
        Self(BytesInner::Raw(unsafe {
            std::slice::from_raw_parts(ptr.as_ptr(), len)
        }))
    }
}

impl Deref for Bytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.0 {
            BytesInner::Empty => &[],
            BytesInner::Shared(r) => r,
            BytesInner::Raw(s) => s,
        }
    }
}

/// Write guard over a run of pixel bytes.
pub struct BytesMut<'a>(BytesMutInner<'a>);

enum BytesMutInner<'a> {
    Empty,
    Shared(RefMut<'a, [u8]>),
    Raw(&'a mut [u8]),
}

impl<'a> BytesMut<'a> {
    pub(crate) fn empty() -> Self {
        Self(BytesMutInner::Empty)
    }

    pub(crate) fn shared(r: RefMut<'a, [u8]>) -> Self {
        Self(BytesMutInner::Shared(r))
    }

    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes for `'a`,
    /// with no other access meanwhile.
    pub(crate) unsafe fn raw(ptr: NonNull<u8>, len: usize) -> Self {
        Self(BytesMutInner::Raw(unsafe {
            std::slice::from_raw_parts_mut(ptr.as_ptr(), len)
        }))
    }
}

impl Deref for BytesMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.0 {
            BytesMutInner::Empty => &[],
            BytesMutInner::Shared(r) => r,
            BytesMutInner::Raw(s) => s,
        }
    }
}

impl DerefMut for BytesMut<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.0 {
            BytesMutInner::Empty => &mut [],
            BytesMutInner::Shared(r) => r,
            BytesMutInner::Raw(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_storage() {
        let storage = PixelStorage::zeroed(16);
        assert_eq!(storage.len(), 16);
        assert!(storage.range(0, 16).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_range_mut_is_visible_to_other_handles() {
        let a = PixelStorage::from_vec(vec![1, 2, 3, 4]);
        let b = Rc::clone(&a);
        a.range_mut(1, 2).copy_from_slice(&[9, 9]);
        assert_eq!(&*b.range(0, 4), &[1, 9, 9, 4]);
        assert_eq!(a.ptr_at(2), b.ptr_at(2));
    }

    #[test]
    #[should_panic]
    fn test_conflicting_borrow_panics() {
        let storage = PixelStorage::zeroed(4);
        let _read = storage.range(0, 4);
        let _write = storage.range_mut(0, 4);
    }

    #[test]
    fn test_empty_guards() {
        let bytes = Bytes::empty();
        assert!(bytes.is_empty());
        let mut bytes = BytesMut::empty();
        assert!(bytes.is_empty());
        assert!(bytes.iter_mut().next().is_none());
    }
}
