/*!
 * Round-trip Tests
 * Acquire followed by a matching release leaves the pool as it was
 */

use except_alloc::{AllocError, AllocationTag, ExceptionAllocator, PoolConfig, PoolInfo};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const SLOT_SIZE: usize = 256;
const SLOT_ALIGN: usize = 16;
const CAPACITY: usize = 16;

fn gateway() -> ExceptionAllocator {
    ExceptionAllocator::with_config(
        PoolConfig::default()
            .with_slot_size(SLOT_SIZE)
            .with_slot_align(SLOT_ALIGN)
            .with_capacity(CAPACITY),
    )
    .expect("Failed to reserve pool")
}

proptest! {
    #[test]
    fn prop_round_trip_is_neutral(
        size in 0usize..=SLOT_SIZE,
        align_shift in 0u32..=4,
        held in 0usize..CAPACITY,
    ) {
        let align = 1usize << align_shift;
        let gateway = gateway();

        // Some unrelated blocks already in flight
        let outstanding: Vec<_> = (0..held)
            .map(|_| gateway.acquire(8, 8, AllocationTag).unwrap())
            .collect();
        let before = gateway.stats();

        let block = gateway.acquire(size, align, AllocationTag).unwrap();
        prop_assert_eq!(block.as_ptr() as usize % align, 0);
        unsafe { gateway.release(block, size, align, AllocationTag) };

        let after = gateway.stats();
        prop_assert_eq!(after.available, before.available);
        prop_assert_eq!(after.outstanding, before.outstanding);
        prop_assert_eq!(after.failed_acquires, 0);

        for held_block in outstanding {
            unsafe { gateway.release(held_block, 8, 8, AllocationTag) };
        }
        prop_assert_eq!(gateway.strategy().available(), CAPACITY);
    }

    #[test]
    fn prop_refused_requests_leave_pool_untouched(
        excess in 1usize..4096,
        align_shift in 5u32..=12,
    ) {
        let gateway = gateway();

        let too_large = gateway.acquire(SLOT_SIZE + excess, 8, AllocationTag);
        prop_assert_eq!(
            too_large,
            Err(AllocError::TooLarge { requested: SLOT_SIZE + excess, slot_size: SLOT_SIZE })
        );

        let over_aligned = gateway.acquire(8, 1usize << align_shift, AllocationTag);
        let is_unsupported = matches!(over_aligned, Err(AllocError::UnsupportedAlignment { .. }));
        prop_assert!(is_unsupported);

        prop_assert_eq!(gateway.stats().available, CAPACITY);
        prop_assert_eq!(gateway.failed_acquires(), 2);
    }
}

#[test]
fn test_zero_size_acquisitions_are_distinct() {
    let gateway = gateway();

    let first = gateway.acquire(0, 8, AllocationTag).unwrap();
    let second = gateway.acquire(0, 8, AllocationTag).unwrap();

    assert_ne!(first, second);
    assert_eq!(gateway.stats().outstanding, 2);

    unsafe {
        gateway.release(first, 0, 8, AllocationTag);
        gateway.release(second, 0, 8, AllocationTag);
    }
    assert_eq!(gateway.stats().available, CAPACITY);
}

#[test]
fn test_block_is_fully_writable() {
    let gateway = gateway();
    let block = gateway.acquire(SLOT_SIZE, SLOT_ALIGN, AllocationTag).unwrap();

    unsafe {
        block.as_ptr().write_bytes(0xAB, SLOT_SIZE);
        let bytes = std::slice::from_raw_parts(block.as_ptr(), SLOT_SIZE);
        assert!(bytes.iter().all(|&b| b == 0xAB));
        gateway.release(block, SLOT_SIZE, SLOT_ALIGN, AllocationTag);
    }
}

#[test]
fn test_full_release_restores_capacity() {
    let gateway = gateway();
    let mut blocks = Vec::new();
    while let Ok(block) = gateway.acquire(32, 8, AllocationTag) {
        blocks.push(block);
    }
    assert_eq!(blocks.len(), CAPACITY);
    assert!(gateway.stats().is_saturated());

    for block in blocks {
        unsafe { gateway.release(block, 32, 8, AllocationTag) };
    }

    let stats = gateway.stats();
    assert_eq!(stats.available, stats.capacity);
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.high_water, CAPACITY);
    assert_eq!(stats.total_acquires, CAPACITY as u64);
    assert_eq!(stats.failed_acquires, 1);
}
