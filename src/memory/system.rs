/*!
 * System Delegate
 * Backing strategy that forwards to the operating system allocator
 */

use crate::core::errors::{AllocError, AllocResult};
use crate::memory::traits::BackingStrategy;
use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Forwards to [`std::alloc::System`], bypassing any `#[global_allocator]`
///
/// Unbounded, so it cannot promise to work once the system itself is out of
/// memory, and it cannot check release layouts. Useful on hosts where the
/// bounded pool is unwanted, and as a baseline in tests.
#[derive(Debug, Default)]
pub struct SystemDelegate {
    outstanding: AtomicUsize,
    failed_acquires: AtomicU64,
}

impl SystemDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn failed_acquires(&self) -> u64 {
        self.failed_acquires.load(Ordering::Relaxed)
    }

    /// `GlobalAlloc` forbids zero-size requests; both sides round up identically
    #[inline]
    fn padded(layout: Layout) -> Layout {
        if layout.size() == 0 {
            // SAFETY: align came from a valid layout and 1 <= any valid max size
            unsafe { Layout::from_size_align_unchecked(1, layout.align()) }
        } else {
            layout
        }
    }
}

impl BackingStrategy for SystemDelegate {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        // SAFETY: padded layout is never zero-sized
        let raw = unsafe { System.alloc(Self::padded(layout)) };
        match NonNull::new(raw) {
            Some(block) => {
                self.outstanding.fetch_add(1, Ordering::AcqRel);
                Ok(block)
            }
            None => {
                self.failed_acquires.fetch_add(1, Ordering::Relaxed);
                Err(AllocError::SystemExhausted {
                    size: layout.size(),
                    align: layout.align(),
                })
            }
        }
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        System.dealloc(block.as_ptr(), Self::padded(layout));
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }

    fn name(&self) -> &'static str {
        "system"
    }
}
