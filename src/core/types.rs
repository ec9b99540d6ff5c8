/*!
 * Core Types
 * Common types used across the allocation path
 */

/// Size type for allocation requests
pub type Size = usize;

/// Alignment type for allocation requests (always a power of two)
pub type Alignment = usize;

/// Dispatch marker for the exception allocation path
///
/// Carries no data. Every gateway entry point takes one by value so a call
/// site that reaches exception storage reads differently from an ordinary
/// allocation, and cannot be confused with one during review.
///
/// # Example
///
/// ```ignore
/// let block = gateway.acquire(64, 8, AllocationTag)?;
/// unsafe { gateway.release(block, 64, 8, AllocationTag) };
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AllocationTag;
