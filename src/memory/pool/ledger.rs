/*!
 * Slot Ledger
 * Per-slot record of the acquisition layout, used to check releases
 */

use crate::core::errors::{contract_violation, ContractViolation};
use std::alloc::Layout;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Marks a slot that no caller owns
const FREE: usize = usize::MAX;

#[derive(Debug)]
pub(super) struct SlotLedger {
    sizes: Box<[AtomicUsize]>,
    aligns: Box<[AtomicUsize]>,
}

impl SlotLedger {
    pub fn new(slots: usize) -> Self {
        Self {
            sizes: (0..slots).map(|_| AtomicUsize::new(FREE)).collect(),
            aligns: (0..slots).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Record the layout a freshly popped slot was handed out with
    #[inline]
    pub fn claim(&self, index: usize, layout: Layout, address: usize) {
        self.aligns[index].store(layout.align(), Ordering::Relaxed);
        let previous = self.sizes[index].swap(layout.size(), Ordering::AcqRel);
        if previous != FREE {
            // The free list held this slot twice
            contract_violation(ContractViolation::DoubleRelease { address });
        }
    }

    /// Mark a slot free, checking the caller echoed the acquisition layout
    ///
    /// The slot stays claimed until every check passes, so a rejected release
    /// leaves it exactly as it was.
    #[inline]
    pub fn release(&self, index: usize, layout: Layout, address: usize) {
        let acquired_size = self.sizes[index].load(Ordering::Acquire);
        if acquired_size == FREE {
            contract_violation(ContractViolation::DoubleRelease { address });
        }
        if acquired_size != layout.size() {
            contract_violation(ContractViolation::SizeMismatch {
                address,
                acquired: acquired_size,
                released: layout.size(),
            });
        }
        let acquired_align = self.aligns[index].load(Ordering::Relaxed);
        if acquired_align != layout.align() {
            contract_violation(ContractViolation::AlignmentMismatch {
                address,
                acquired: acquired_align,
                released: layout.align(),
            });
        }
        if self.sizes[index]
            .compare_exchange(acquired_size, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // Another thread released the same block first
            contract_violation(ContractViolation::DoubleRelease { address });
        }
    }

    pub fn is_claimed(&self, index: usize) -> bool {
        self.sizes[index].load(Ordering::Acquire) != FREE
    }
}
