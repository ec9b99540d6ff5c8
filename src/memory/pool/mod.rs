/*!
 * Slot Pool
 *
 * Default backing strategy for exception storage: a fixed number of
 * fixed-size, alignment-padded slots reserved once at construction.
 *
 * ## Allocation
 *
 * - **Free list**: `crossbeam_queue::ArrayQueue` of slot indices, preallocated
 *   and lock-free. Acquire is one `pop`, release is one `push`.
 * - **No growth**: an empty free list fails immediately with `Exhausted`,
 *   so the failure path never reaches the general allocator.
 * - **Zero-size requests** consume a whole slot and never alias.
 *
 * ## Release checking
 *
 * The ledger remembers the layout each slot was acquired with. Releasing a
 * foreign pointer, releasing twice, or echoing a different size/alignment is a
 * contract violation (panic in debug builds, abort otherwise).
 *
 * Nothing on the acquire or release path emits tracing events.
 */

mod ledger;
mod storage;

use crate::core::errors::{
    contract_violation, AllocError, AllocResult, ConfigError, ContractViolation,
};
use crate::memory::config::PoolConfig;
use crate::memory::traits::{BackingStrategy, PoolInfo};
use crate::memory::types::PoolStats;
use crossbeam_queue::ArrayQueue;
use ledger::SlotLedger;
use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use storage::SlabStorage;
use tracing::{info, instrument, warn};

/// Fixed-capacity slot pool
///
/// # Performance
/// - Cache-line aligned to keep the hot counters off neighbouring lines
#[repr(C, align(64))]
pub struct SlotPool {
    free: ArrayQueue<usize>,
    storage: SlabStorage,
    ledger: SlotLedger,
    config: PoolConfig,
    outstanding: AtomicUsize,
    high_water: AtomicUsize,
    // Successful acquisitions only
    total_acquires: AtomicU64,
    failed_acquires: AtomicU64,
}

impl SlotPool {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(PoolConfig::default())
    }

    /// Reserve a pool with custom geometry
    #[instrument(level = "debug", skip_all, fields(capacity = config.capacity, slot_size = config.slot_size))]
    pub fn with_config(config: PoolConfig) -> Result<Self, ConfigError> {
        let storage = SlabStorage::reserve(&config)?;

        let free = ArrayQueue::new(config.capacity);
        for index in 0..config.capacity {
            // Sized to capacity, cannot be full
            let _ = free.push(index);
        }

        info!(
            capacity = config.capacity,
            slot_size = config.slot_size,
            slot_align = config.slot_align,
            stride = storage.stride(),
            slab_bytes = storage.bytes(),
            "Exception slot pool reserved"
        );

        Ok(Self {
            free,
            ledger: SlotLedger::new(config.capacity),
            storage,
            config,
            outstanding: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            total_acquires: AtomicU64::new(0),
            failed_acquires: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Whether `block` is the start of one of this pool's slots
    pub fn owns(&self, block: NonNull<u8>) -> bool {
        self.storage.index_of(block).is_some()
    }

    /// Whether `block` is currently handed out
    pub fn is_outstanding(&self, block: NonNull<u8>) -> bool {
        self.storage
            .index_of(block)
            .is_some_and(|index| self.ledger.is_claimed(index))
    }

    #[cold]
    fn refuse(&self, error: AllocError) -> AllocResult<NonNull<u8>> {
        self.failed_acquires.fetch_add(1, Ordering::Relaxed);
        Err(error)
    }
}

impl BackingStrategy for SlotPool {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        if layout.size() > self.config.slot_size {
            return self.refuse(AllocError::TooLarge {
                requested: layout.size(),
                slot_size: self.config.slot_size,
            });
        }
        if layout.align() > self.config.slot_align {
            return self.refuse(AllocError::UnsupportedAlignment {
                requested: layout.align(),
                slot_align: self.config.slot_align,
            });
        }

        let Some(index) = self.free.pop() else {
            return self.refuse(AllocError::Exhausted {
                capacity: self.config.capacity,
            });
        };

        let block = self.storage.slot(index);
        self.ledger.claim(index, layout, block.as_ptr() as usize);

        let outstanding = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        self.high_water.fetch_max(outstanding, Ordering::Relaxed);
        self.total_acquires.fetch_add(1, Ordering::Relaxed);

        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        let address = block.as_ptr() as usize;
        let Some(index) = self.storage.index_of(block) else {
            contract_violation(ContractViolation::ForeignBlock { address });
        };

        self.ledger.release(index, layout, address);

        #[cfg(debug_assertions)]
        self.storage.poison(index);

        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        if self.free.push(index).is_err() {
            contract_violation(ContractViolation::DoubleRelease { address });
        }
    }

    fn name(&self) -> &'static str {
        "slot-pool"
    }
}

impl PoolInfo for SlotPool {
    fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.config.capacity,
            available: self.free.len(),
            outstanding: self.outstanding.load(Ordering::Acquire),
            high_water: self.high_water.load(Ordering::Relaxed),
            total_acquires: self.total_acquires.load(Ordering::Relaxed),
            failed_acquires: self.failed_acquires.load(Ordering::Relaxed),
            slot_size: self.config.slot_size,
            slot_align: self.config.slot_align,
        }
    }

    fn available(&self) -> usize {
        self.free.len()
    }

    fn capacity(&self) -> usize {
        self.config.capacity
    }
}

impl Drop for SlotPool {
    fn drop(&mut self) {
        let outstanding = *self.outstanding.get_mut();
        if outstanding > 0 {
            warn!(
                outstanding,
                capacity = self.config.capacity,
                "Exception slot pool dropped with blocks still outstanding"
            );
        }
    }
}

impl std::fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotPool")
            .field("config", &self.config)
            .field("available", &self.free.len())
            .field("outstanding", &self.outstanding.load(Ordering::Relaxed))
            .finish()
    }
}
