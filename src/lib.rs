/*!
 * Exception Allocator Library
 *
 * A dedicated, tagged allocation path for in-flight error objects, kept apart
 * from the process-wide allocator. Acquisition never grows storage, never
 * allocates on failure, and stays usable while the general allocator is
 * exhausted.
 */

pub mod core;
pub mod gateway;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{
    AllocError, AllocResult, Alignment, AllocationTag, ConfigError, ContractViolation, Size,
    OUT_OF_MEMORY_REPORT,
};
pub use gateway::{
    exception_acquire, exception_release, global, global_stats, install_global,
    ExceptionAllocator, PooledObject, ReentrancyGuard,
};
pub use memory::{
    BackingStrategy, PoolConfig, PoolInfo, PoolPressure, PoolStats, SlotPool, SystemDelegate,
};
pub use monitoring::{init_tracing, report_pool};
