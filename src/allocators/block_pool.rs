use std::{alloc, ptr::NonNull};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{chunk::Chunk, GrowthPolicy};
use crate::error::{PoolError, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Fixed-size slot allocator for values of type `T`.
///
/// Memory is carved out of chunks that are never moved or freed before the
/// pool itself is dropped. Released slots go onto a LIFO free list and are
/// handed out again before any new slot is bump-allocated.
///
/// The pool never constructs, drops or zeroes `T`: [`acquire`](Self::acquire)
/// returns storage with unspecified contents and the caller owns whatever
/// it writes there.
pub struct BlockPool<T, const BLOCK_SIZE: usize = DEFAULT_BLOCK_SIZE> {
    state: Mutex<PoolState<T>>,
    growth: GrowthPolicy,
}

struct PoolState<T> {
    chunks: Vec<Chunk<T>>,
    // next never-issued slot of the last chunk
    cursor: usize,
    free: Vec<NonNull<T>>,
    issued: usize,
}

// SAFETY: the state only hands out storage for `T`, it never touches a `T`.
// Moving it to another thread is as sound as moving the `T`s themselves.
unsafe impl<T: Send> Send for PoolState<T> {}

/// Snapshot of a pool's bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PoolStats {
    pub chunks: usize,
    pub capacity: usize,
    /// Slots ever bump-allocated.
    pub issued: usize,
    /// Slots sitting on the free list.
    pub free: usize,
}

impl PoolStats {
    #[inline]
    pub fn live(&self) -> usize {
        self.issued.saturating_sub(self.free)
    }
}

impl<T> PoolState<T> {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            cursor: 0,
            free: Vec::new(),
            issued: 0,
        }
    }

    fn grow(&mut self, growth: GrowthPolicy, block_size: usize) -> Result<()> {
        let n = self.chunks.len() + 1;
        let capacity = growth
            .chunk_capacity(n, block_size)
            .ok_or(PoolError::CapacityOverflow)?;

        let chunk = Chunk::try_new(capacity)?;
        debug!(chunk = n, capacity, "block pool grew");

        self.chunks.push(chunk);
        self.cursor = 0;

        Ok(())
    }

    fn acquire(&mut self, growth: GrowthPolicy, block_size: usize) -> Result<NonNull<T>> {
        if let Some(ptr) = self.free.pop() {
            return Ok(ptr);
        }

        let exhausted = self
            .chunks
            .last()
            .map_or(true, |chunk| self.cursor == chunk.capacity());

        if exhausted {
            self.grow(growth, block_size)?;
        }

        let last = self.chunks.len() - 1;
        let ptr = self.chunks[last].slot(self.cursor);
        self.cursor += 1;
        self.issued += 1;

        Ok(ptr)
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            chunks: self.chunks.len(),
            capacity: self.chunks.iter().map(Chunk::capacity).sum(),
            issued: self.issued,
            free: self.free.len(),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "validate")] {
        fn check_release<T>(state: &PoolState<T>, ptr: NonNull<T>) {
            let owner = state
                .chunks
                .iter()
                .enumerate()
                .find_map(|(i, chunk)| chunk.index_of(ptr).map(|idx| (i, idx)));

            let Some((chunk, idx)) = owner else {
                panic!("released pointer {ptr:p} does not belong to this pool");
            };

            if chunk + 1 == state.chunks.len() && idx >= state.cursor {
                panic!("released pointer {ptr:p} was never issued");
            }

            if state.free.contains(&ptr) {
                panic!("pointer {ptr:p} released twice");
            }
        }
    } else {
        #[inline(always)]
        fn check_release<T>(_state: &PoolState<T>, _ptr: NonNull<T>) {}
    }
}

impl<T, const BLOCK_SIZE: usize> BlockPool<T, BLOCK_SIZE> {
    const VALID: () = {
        assert!(BLOCK_SIZE > 0, "block size must be non-zero");
        assert!(size_of::<T>() > 0, "zero-sized types cannot be pooled");
    };

    /// Creates a pool with [`GrowthPolicy::Linear`] and allocates its first chunk.
    ///
    /// Aborts through [`alloc::handle_alloc_error`] if the chunk cannot be
    /// allocated.
    pub fn new() -> Self {
        Self::with_growth(GrowthPolicy::default())
    }

    pub fn with_growth(growth: GrowthPolicy) -> Self {
        unwrap_alloc(Self::try_with_growth(growth))
    }

    pub fn try_new() -> Result<Self> {
        Self::try_with_growth(GrowthPolicy::default())
    }

    pub fn try_with_growth(growth: GrowthPolicy) -> Result<Self> {
        let () = Self::VALID;

        let mut state = PoolState::new();
        state.grow(growth, BLOCK_SIZE)?;

        debug!(
            elem_size = size_of::<T>(),
            block_size = BLOCK_SIZE,
            ?growth,
            "block pool created"
        );

        Ok(Self {
            state: Mutex::new(state),
            growth,
        })
    }

    /// Hands out storage for one `T`.
    ///
    /// Freed slots are reused most-recently-released first. The contents are
    /// unspecified: either never written or left over from the previous
    /// occupant.
    ///
    /// Aborts through [`alloc::handle_alloc_error`] if a new chunk is needed
    /// and cannot be allocated, and panics if its size overflows.
    #[inline]
    pub fn acquire(&self) -> NonNull<T> {
        unwrap_alloc(self.try_acquire())
    }

    /// Like [`acquire`](Self::acquire), but reports a failed growth instead of
    /// aborting. The pool is left unchanged on error.
    pub fn try_acquire(&self) -> Result<NonNull<T>> {
        self.state.lock().acquire(self.growth, BLOCK_SIZE)
    }

    /// Returns a slot to the pool.
    ///
    /// # Safety
    ///
    /// - `ptr` must have been returned by `acquire` on this pool.
    /// - `ptr` must not have been released since it was last acquired.
    /// - The caller must not access `ptr` again until it is handed out by a
    ///   later `acquire`.
    ///
    /// Any value still stored in the slot is not dropped.
    pub unsafe fn release(&self, ptr: NonNull<T>) {
        let mut state = self.state.lock();
        check_release(&state, ptr);
        state.free.push(ptr);
    }

    pub fn stats(&self) -> PoolStats {
        self.state.lock().stats()
    }

    pub fn chunk_count(&self) -> usize {
        self.state.lock().chunks.len()
    }

    /// Total slots across all chunks.
    pub fn capacity(&self) -> usize {
        self.stats().capacity
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    #[inline]
    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }
}

impl<T, const BLOCK_SIZE: usize> Default for BlockPool<T, BLOCK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const BLOCK_SIZE: usize> std::fmt::Debug for BlockPool<T, BLOCK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("block_size", &BLOCK_SIZE)
            .field("growth", &self.growth)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T, const BLOCK_SIZE: usize> Drop for BlockPool<T, BLOCK_SIZE> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        let stats = state.stats();

        if stats.live() > 0 {
            warn!(live = stats.live(), "block pool dropped with live slots");
        }
        debug!(chunks = stats.chunks, capacity = stats.capacity, "block pool dropped");

        state.free.clear();
        state.chunks.clear();
        state.cursor = 0;
    }
}

#[inline]
#[track_caller]
fn unwrap_alloc<V>(result: Result<V>) -> V {
    match result {
        Ok(v) => v,
        Err(PoolError::OutOfMemory { layout }) => alloc::handle_alloc_error(layout),
        Err(PoolError::CapacityOverflow) => panic!("block pool capacity overflow"),
    }
}
