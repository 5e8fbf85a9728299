pub mod allocators;
pub mod error;

pub use allocators::{BlockPool, GrowthPolicy, PoolStats, DEFAULT_BLOCK_SIZE};
pub use error::{PoolError, Result};
