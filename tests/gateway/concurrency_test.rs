/*!
 * Concurrency Tests
 * Many threads acquiring and releasing from one gateway at once
 */

use except_alloc::{AllocError, AllocationTag, ExceptionAllocator, PoolConfig};
use pretty_assertions::assert_eq;
use std::ptr::NonNull;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

const THREADS: usize = 8;
const CAPACITY: usize = 256;
const REQUEST: usize = 48;

/// Block address that may cross threads inside a test
struct Block(NonNull<u8>);

// SAFETY: tests hand each block to exactly one thread at a time
unsafe impl Send for Block {}

fn gateway() -> ExceptionAllocator {
    ExceptionAllocator::with_config(
        PoolConfig::default()
            .with_slot_size(64)
            .with_slot_align(16)
            .with_capacity(CAPACITY),
    )
    .expect("Failed to reserve pool")
}

#[test]
fn test_concurrent_saturation_never_aliases() {
    let gateway = gateway();
    let barrier = Barrier::new(THREADS);

    let per_thread: Vec<Vec<Block>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let mut mine = Vec::new();
                    loop {
                        match gateway.acquire(REQUEST, 8, AllocationTag) {
                            Ok(block) => mine.push(Block(block)),
                            Err(AllocError::Exhausted { .. }) => break,
                            Err(other) => panic!("Unexpected acquisition failure: {other}"),
                        }
                    }
                    mine
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut addresses: Vec<usize> = per_thread
        .iter()
        .flatten()
        .map(|block| block.0.as_ptr() as usize)
        .collect();
    assert_eq!(addresses.len(), CAPACITY);

    addresses.sort_unstable();
    for pair in addresses.windows(2) {
        assert!(
            pair[0] + REQUEST <= pair[1],
            "Blocks 0x{:x} and 0x{:x} overlap",
            pair[0],
            pair[1]
        );
    }

    let stats = gateway.stats();
    assert_eq!(stats.outstanding, CAPACITY);
    assert_eq!(stats.failed_acquires, THREADS as u64);

    // Release from the threads that own the blocks, concurrently
    thread::scope(|s| {
        for blocks in per_thread {
            let gateway = &gateway;
            s.spawn(move || {
                for block in blocks {
                    unsafe { gateway.release(block.0, REQUEST, 8, AllocationTag) };
                }
            });
        }
    });

    let stats = gateway.stats();
    assert_eq!(stats.available, CAPACITY);
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.high_water, CAPACITY);
}

#[test]
fn test_concurrent_churn_keeps_blocks_private() {
    const ROUNDS: usize = 2_000;
    let gateway = gateway();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for id in 0..THREADS {
            let gateway = &gateway;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                let marker = id as u8 + 1;
                for round in 0..ROUNDS {
                    let size = 1 + (round % 64);
                    let block = match gateway.acquire(size, 8, AllocationTag) {
                        Ok(block) => block,
                        Err(AllocError::Exhausted { .. }) => continue,
                        Err(other) => panic!("Unexpected acquisition failure: {other}"),
                    };
                    unsafe {
                        block.as_ptr().write_bytes(marker, size);
                        thread::yield_now();
                        let bytes = std::slice::from_raw_parts(block.as_ptr(), size);
                        assert!(
                            bytes.iter().all(|&b| b == marker),
                            "Thread {id} saw its block overwritten"
                        );
                        gateway.release(block, size, 8, AllocationTag);
                    }
                }
            });
        }
    });

    let stats = gateway.stats();
    assert_eq!(stats.available, CAPACITY);
    assert_eq!(stats.outstanding, 0);
}

#[test]
fn test_saturated_acquire_fails_immediately() {
    let gateway = ExceptionAllocator::with_config(PoolConfig::compact().with_capacity(2)).unwrap();
    let held: Vec<_> = (0..2)
        .map(|_| gateway.acquire(16, 8, AllocationTag).unwrap())
        .collect();

    let start = Instant::now();
    for _ in 0..10_000 {
        assert_eq!(
            gateway.acquire(16, 8, AllocationTag),
            Err(AllocError::Exhausted { capacity: 2 })
        );
    }
    assert!(start.elapsed() < Duration::from_secs(1));

    for block in held {
        unsafe { gateway.release(block, 16, 8, AllocationTag) };
    }
}
