/*!
 * Re-entrancy Guard
 *
 * Per-thread nesting counter for gateway acquisitions. A strategy (or
 * anything it calls) that raises another error and re-enters the gateway
 * is refused once the nesting limit is reached, instead of recursing.
 */

use crate::core::errors::{AllocError, AllocResult};
use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    // Const-initialized and drop-free: no lazy registration, no allocation
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Scoped nesting marker, decrements on drop
///
/// # Example
///
/// ```ignore
/// let _guard = ReentrancyGuard::enter(4)?;
/// // Nested gateway calls on this thread now see depth + 1
/// ```
#[derive(Debug)]
pub struct ReentrancyGuard {
    // Must drop on the thread that entered
    _not_send: PhantomData<*const ()>,
}

impl ReentrancyGuard {
    /// Enter one nesting level, refusing when `limit` levels are already active
    #[inline]
    pub fn enter(limit: u32) -> AllocResult<Self> {
        let depth = DEPTH.with(Cell::get);
        if depth >= limit {
            return Err(AllocError::Reentrant { depth });
        }
        DEPTH.with(|cell| cell.set(depth + 1));
        Ok(Self {
            _not_send: PhantomData,
        })
    }

    /// Active nesting levels on the current thread
    #[inline]
    pub fn depth() -> u32 {
        DEPTH.with(Cell::get)
    }
}

impl Drop for ReentrancyGuard {
    #[inline]
    fn drop(&mut self) {
        DEPTH.with(|cell| cell.set(cell.get().saturating_sub(1)));
    }
}
