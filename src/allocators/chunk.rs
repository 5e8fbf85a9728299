use std::{
    alloc::{self, Layout},
    ptr::NonNull,
};

use crate::error::{PoolError, Result};

/// One contiguous, never-moved backing allocation for `capacity` slots of `T`.
#[derive(Debug)]
pub(crate) struct Chunk<T> {
    base: NonNull<T>,
    capacity: usize,
}

impl<T> Chunk<T> {
    pub(crate) fn try_new(capacity: usize) -> Result<Self> {
        let layout = Self::layout(capacity)?;
        debug_assert!(layout.size() > 0);

        // SAFETY: layout has non-zero size, the pool rejects zero-sized `T`
        // and empty chunks.
        let raw = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(raw.cast::<T>()).ok_or(PoolError::OutOfMemory { layout })?;

        Ok(Self { base, capacity })
    }

    pub(crate) fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_| PoolError::CapacityOverflow)
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to slot `idx`. `idx` must be below `capacity`.
    #[inline]
    pub(crate) fn slot(&self, idx: usize) -> NonNull<T> {
        debug_assert!(idx < self.capacity);

        // SAFETY: idx is in bounds of the allocation.
        unsafe { self.base.add(idx) }
    }

    /// Slot index of `ptr` if it lies on a slot boundary inside this chunk.
    #[cfg_attr(not(feature = "validate"), allow(dead_code))]
    pub(crate) fn index_of(&self, ptr: NonNull<T>) -> Option<usize> {
        let start = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        let offset = addr.checked_sub(start)?;
        let idx = offset / size_of::<T>();

        (offset % size_of::<T>() == 0 && idx < self.capacity).then_some(idx)
    }
}

impl<T> Drop for Chunk<T> {
    fn drop(&mut self) {
        tracing::trace!(capacity = self.capacity, "freeing chunk");

        // SAFETY: the layout was valid when the chunk was allocated.
        let layout = unsafe {
            Layout::from_size_align_unchecked(size_of::<T>() * self.capacity, align_of::<T>())
        };

        // SAFETY: base came from `alloc::alloc` with this exact layout.
        unsafe { alloc::dealloc(self.base.as_ptr().cast(), layout) }
    }
}
