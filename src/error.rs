use std::alloc::Layout;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The backing allocator could not satisfy a chunk request.
    #[error("out of memory allocating chunk of {} bytes", .layout.size())]
    OutOfMemory { layout: Layout },

    /// Slot count or byte size of the next chunk does not fit in `usize`.
    #[error("chunk capacity overflow")]
    CapacityOverflow,
}
