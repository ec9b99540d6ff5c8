/*!
 * Exception Allocation Gateway
 *
 * The tagged acquire/release pair an error-propagation runtime calls to get
 * storage for in-flight error objects, kept apart from every other
 * allocation in the program.
 *
 * ## Contract
 *
 * - `acquire(size, align, AllocationTag)` returns a block of at least `size`
 *   bytes aligned to `align`, or an [`AllocError`] value. Failure never
 *   allocates, logs, or panics.
 * - `release(block, size, align, AllocationTag)` takes back a block. The
 *   caller re-supplies the exact acquisition size and alignment; the
 *   strategy is not required to remember them. Mismatches, double releases
 *   and foreign blocks are contract violations.
 * - Acquisitions nested on one thread beyond the configured limit are
 *   refused with [`AllocError::Reentrant`].
 */

pub mod global;
pub mod pooled;
pub mod reentrancy;

pub use global::{
    exception_acquire, exception_release, global, global_stats, install_global,
};
pub use pooled::PooledObject;
pub use reentrancy::ReentrancyGuard;

use crate::core::errors::{
    contract_violation, AllocError, AllocResult, ConfigError, ContractViolation,
};
use crate::core::limits::DEFAULT_MAX_NESTING;
use crate::core::types::{Alignment, AllocationTag, Size};
use crate::memory::{BackingStrategy, PoolConfig, PoolInfo, PoolStats, SlotPool};
use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tagged allocation gateway over one backing strategy
pub struct ExceptionAllocator<S: BackingStrategy = SlotPool> {
    strategy: S,
    max_nesting: u32,
    // Every refused acquisition, including re-entrancy and layout refusals
    failed_acquires: AtomicU64,
}

impl ExceptionAllocator<SlotPool> {
    /// Gateway over a default-sized slot pool
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Result<Self, ConfigError> {
        let pool = SlotPool::with_config(config)?;
        Ok(Self::with_strategy(pool).with_max_nesting(config.max_nesting))
    }
}

impl<S: BackingStrategy> ExceptionAllocator<S> {
    /// Gateway over an injected strategy
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            strategy,
            max_nesting: DEFAULT_MAX_NESTING,
            failed_acquires: AtomicU64::new(0),
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: u32) -> Self {
        self.max_nesting = max_nesting.max(1);
        self
    }

    /// Acquire storage for an error object
    #[inline]
    pub fn acquire(
        &self,
        size: Size,
        align: Alignment,
        _tag: AllocationTag,
    ) -> AllocResult<NonNull<u8>> {
        let _guard = match ReentrancyGuard::enter(self.max_nesting) {
            Ok(guard) => guard,
            Err(error) => return Err(self.refuse(error)),
        };

        let layout = match Layout::from_size_align(size, align) {
            Ok(layout) => layout,
            Err(_) => return Err(self.refuse(AllocError::InvalidLayout { size, align })),
        };

        self.strategy
            .allocate(layout)
            .map_err(|error| self.refuse(error))
    }

    /// Release storage obtained from [`acquire`](Self::acquire)
    ///
    /// # Safety
    ///
    /// `block` must come from `acquire` on this gateway with exactly `size`
    /// and `align`, must not have been released already, and must not be
    /// accessed afterwards.
    #[inline]
    pub unsafe fn release(
        &self,
        block: NonNull<u8>,
        size: Size,
        align: Alignment,
        _tag: AllocationTag,
    ) {
        let Ok(layout) = Layout::from_size_align(size, align) else {
            contract_violation(ContractViolation::InvalidLayout { size, align });
        };
        self.strategy.deallocate(block, layout);
    }

    /// Move `value` into gateway storage
    ///
    /// On failure the value is handed back so the caller can fall back to
    /// [`AllocError::fallback_report`].
    pub fn store<T>(&self, value: T) -> Result<PooledObject<'_, T, S>, (AllocError, T)> {
        PooledObject::new(self, value)
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn max_nesting(&self) -> u32 {
        self.max_nesting
    }

    pub fn failed_acquires(&self) -> u64 {
        self.failed_acquires.load(Ordering::Relaxed)
    }

    #[cold]
    fn refuse(&self, error: AllocError) -> AllocError {
        self.failed_acquires.fetch_add(1, Ordering::Relaxed);
        error
    }
}

impl<S: BackingStrategy + PoolInfo> ExceptionAllocator<S> {
    pub fn stats(&self) -> PoolStats {
        self.strategy.stats()
    }
}

impl<S: BackingStrategy + std::fmt::Debug> std::fmt::Debug for ExceptionAllocator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionAllocator")
            .field("strategy", &self.strategy)
            .field("max_nesting", &self.max_nesting)
            .field("failed_acquires", &self.failed_acquires())
            .finish()
    }
}
