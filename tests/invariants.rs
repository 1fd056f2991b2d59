//! Property-style checks of the boundary-tag and free-list invariants, run after representative
//! operation sequences rather than as a generated-trace fuzzer.
#![cfg(feature = "std")]

use segfit_heap::{Heap, VecHeapProvider};

fn fresh_heap(capacity: usize) -> Heap<VecHeapProvider> {
    Heap::init(VecHeapProvider::new(capacity)).expect("heap init over a fresh provider")
}

#[test]
fn invariants_hold_after_a_mixed_alloc_free_trace() {
    let mut heap = fresh_heap(1 << 18);
    let mut live = Vec::new();

    let sizes = [8usize, 16, 40, 64, 130, 500, 17, 4097, 24, 1];
    for (i, &size) in sizes.iter().cycle().take(200).enumerate() {
        if i % 3 == 0 && !live.is_empty() {
            let idx = i % live.len();
            let p = live.remove(idx);
            heap.free(Some(p));
        } else if let Some(p) = heap.allocate(size) {
            live.push(p);
        }
        assert!(heap.audit().is_empty(), "violation after step {i}");
    }

    for p in live {
        heap.free(Some(p));
    }
    assert!(heap.audit().is_empty());

    // Invariant 4: free-list count equals the number of free blocks in the block chain.
    let blocks = heap.blocks();
    let walked_free = blocks.iter().filter(|b| b.size != 0 && !b.allocated).count();
    assert!(walked_free >= 1, "everything was freed, so at least one free block must remain");
}

#[test]
fn free_list_blocks_land_in_the_class_their_size_implies() {
    let mut heap = fresh_heap(1 << 16);

    let handles: Vec<_> = [16usize, 40, 100, 300, 600, 1500, 3000, 5000]
        .into_iter()
        .map(|n| heap.allocate(n).unwrap())
        .collect();
    for h in handles {
        heap.free(Some(h));
    }

    assert!(heap.audit().is_empty());
}

#[test]
fn round_trip_payload_bytes_survive_until_freed() {
    let mut heap = fresh_heap(1 << 14);

    let p = heap.allocate(64).unwrap();
    let pattern: Vec<u8> = (0..64).map(|i| i as u8).collect();
    unsafe {
        core::ptr::copy_nonoverlapping(pattern.as_ptr(), p.as_ptr(), 64);
    }

    // Allocate and free unrelated blocks in between; p's bytes must be untouched.
    let q = heap.allocate(32).unwrap();
    heap.free(Some(q));

    unsafe {
        let read_back = core::slice::from_raw_parts(p.as_ptr(), 64);
        assert_eq!(read_back, pattern.as_slice());
    }

    heap.free(Some(p));
}

#[test]
fn idempotence_rules() {
    let mut heap = fresh_heap(1 << 14);

    // free(null) is a no-op.
    heap.free(None);
    assert!(heap.audit().is_empty());

    // resize(null, n) behaves like allocate(n).
    let p = heap.resize(None, 48).expect("resize(null, n) must allocate");
    assert!(heap.audit().is_empty());

    // resize(p, 0) behaves like free(p) and returns null.
    let q = heap.resize(Some(p), 0);
    assert!(q.is_none());
    assert!(heap.audit().is_empty());
}

#[test]
fn calloc_zeroes_memory() {
    let mut heap = fresh_heap(1 << 14);

    let p = heap.allocate(64).unwrap();
    unsafe {
        core::ptr::write_bytes(p.as_ptr(), 0xFF, 64);
    }
    heap.free(Some(p));

    // The freed block's bytes are now garbage-in-waiting; calloc must still hand back zeros.
    let q = heap.calloc(8, 8).expect("calloc should succeed");
    unsafe {
        let bytes = core::slice::from_raw_parts(q.as_ptr(), 64);
        assert!(bytes.iter().all(|&b| b == 0));
    }
}
