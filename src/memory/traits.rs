/*!
 * Backing Strategy Traits
 * Storage providers behind the exception gateway
 */

use super::types::PoolStats;
use crate::core::errors::AllocResult;
use std::alloc::Layout;
use std::ptr::NonNull;

/// Storage provider for exception objects
///
/// Implementations are called from whatever thread is propagating an error,
/// possibly several at once, and possibly while the general allocator is
/// unusable. `allocate` must return immediately (success or failure) and
/// must not block on a lock another faulting thread could hold.
pub trait BackingStrategy: Send + Sync {
    /// Obtain a block of at least `layout.size()` bytes aligned to `layout.align()`
    ///
    /// Zero-size layouts must still yield distinct, non-null blocks.
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>>;

    /// Return a block to the strategy
    ///
    /// # Safety
    ///
    /// `block` must come from `allocate` on this strategy with exactly
    /// `layout`, and must not have been returned already.
    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout);

    /// Short identifier used in diagnostics
    fn name(&self) -> &'static str;
}

/// Statistics provider
pub trait PoolInfo: Send + Sync {
    fn stats(&self) -> PoolStats;

    /// Number of blocks that can still be handed out
    fn available(&self) -> usize {
        self.stats().available
    }

    fn capacity(&self) -> usize {
        self.stats().capacity
    }
}
