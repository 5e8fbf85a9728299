pub mod block_pool;
pub mod growth;

mod chunk;

pub use block_pool::*;
pub use growth::*;

use static_assertions::{assert_impl_all, assert_not_impl_any, const_assert};

const_assert!(DEFAULT_BLOCK_SIZE > 0);

assert_impl_all!(BlockPool<u64>: Send, Sync);
assert_impl_all!(BlockPool<std::sync::Arc<u8>>: Send, Sync);
assert_not_impl_any!(BlockPool<std::rc::Rc<u8>>: Send, Sync);
