/*!
 * Release Contract Tests
 * Caller misuse trips an assertion in debug builds
 */

#![cfg(debug_assertions)]

use except_alloc::{AllocationTag, ExceptionAllocator, PoolConfig};
use pretty_assertions::assert_eq;

fn gateway() -> ExceptionAllocator {
    ExceptionAllocator::with_config(PoolConfig::default().with_capacity(4)).unwrap()
}

#[test]
#[should_panic(expected = "size mismatch")]
fn test_release_with_smaller_size_trips() {
    let gateway = gateway();
    let block = gateway.acquire(64, 8, AllocationTag).unwrap();
    unsafe { gateway.release(block, 32, 8, AllocationTag) };
}

#[test]
#[should_panic(expected = "alignment mismatch")]
fn test_release_with_other_alignment_trips() {
    let gateway = gateway();
    let block = gateway.acquire(64, 16, AllocationTag).unwrap();
    unsafe { gateway.release(block, 64, 8, AllocationTag) };
}

#[test]
#[should_panic(expected = "double release")]
fn test_double_release_trips() {
    let gateway = gateway();
    let block = gateway.acquire(64, 8, AllocationTag).unwrap();
    unsafe {
        gateway.release(block, 64, 8, AllocationTag);
        gateway.release(block, 64, 8, AllocationTag);
    }
}

#[test]
#[should_panic(expected = "foreign block")]
fn test_block_from_another_gateway_trips() {
    let first = gateway();
    let second = gateway();
    let block = first.acquire(64, 8, AllocationTag).unwrap();
    unsafe { second.release(block, 64, 8, AllocationTag) };
}

#[test]
#[should_panic(expected = "foreign block")]
fn test_interior_pointer_trips() {
    let gateway = gateway();
    let block = gateway.acquire(64, 8, AllocationTag).unwrap();
    let interior = unsafe { std::ptr::NonNull::new_unchecked(block.as_ptr().add(8)) };
    unsafe { gateway.release(interior, 64, 8, AllocationTag) };
}

#[test]
fn test_rejected_release_leaves_block_outstanding() {
    let gateway = gateway();
    let block = gateway.acquire(64, 8, AllocationTag).unwrap();

    let rejected = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
        gateway.release(block, 32, 8, AllocationTag)
    }));
    assert!(rejected.is_err());
    assert!(gateway.strategy().is_outstanding(block));
    assert_eq!(gateway.stats().outstanding, 1);

    unsafe { gateway.release(block, 64, 8, AllocationTag) };
    let stats = gateway.stats();
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.available, 4);
}
