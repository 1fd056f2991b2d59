//! `GlobalAlloc` adapter: wraps a [`Heap`] behind a spinlock so a single instance can back
//! `#[global_allocator]`.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};

use spin::Mutex;

use crate::engine::Heap;
use crate::error::HeapError;
use crate::provider::HeapProvider;

/// Wraps a [`Heap`] in a spinlock so it can back `#[global_allocator]`.
///
/// The engine itself has no notion of concurrent access; this is the explicit point where a host
/// opts into sharing one instance across threads. Must be [`LockedHeap::init`]'d before any
/// allocation reaches it; until then every request returns null rather than panicking.
pub struct LockedHeap<P: HeapProvider, const N_CLASSES: usize = 10> {
    inner: Mutex<Option<Heap<P, N_CLASSES>>>,
}

impl<P: HeapProvider, const N_CLASSES: usize> LockedHeap<P, N_CLASSES> {
    /// Constructs an uninitialized instance suitable for a `static`.
    pub const fn uninit() -> Self {
        Self { inner: Mutex::new(None) }
    }

    /// Brings up the wrapped heap over `provider`. Must be called exactly once, before the first
    /// allocation reaches this instance.
    pub fn init(&self, provider: P) -> Result<(), HeapError> {
        let heap = Heap::init(provider)?;
        *self.inner.lock() = Some(heap);
        Ok(())
    }
}

unsafe impl<P: HeapProvider, const N_CLASSES: usize> GlobalAlloc for LockedHeap<P, N_CLASSES> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let mut guard = self.inner.lock();
        let Some(heap) = guard.as_mut() else {
            return ptr::null_mut();
        };
        heap.allocate(layout.size()).map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr_in: *mut u8, _layout: Layout) {
        let mut guard = self.inner.lock();
        if let Some(heap) = guard.as_mut() {
            heap.free(NonNull::new(ptr_in));
        }
    }

    unsafe fn realloc(&self, ptr_in: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        let mut guard = self.inner.lock();
        let Some(heap) = guard.as_mut() else {
            return ptr::null_mut();
        };
        heap.resize(NonNull::new(ptr_in), new_size).map_or(ptr::null_mut(), NonNull::as_ptr)
    }
}

impl<P: HeapProvider, const N_CLASSES: usize> LockedHeap<P, N_CLASSES> {
    /// Allocates `k * n` zeroed bytes. Passthrough to [`Heap::calloc`]; not part of
    /// `GlobalAlloc`, which has no zeroing-allocate entry point of its own.
    pub fn calloc(&self, k: usize, n: usize) -> *mut u8 {
        let mut guard = self.inner.lock();
        guard.as_mut().and_then(|heap| heap.calloc(k, n)).map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Logs a consistency check of the wrapped heap. No-op if not yet initialized.
    pub fn check(&self, verbose: bool) {
        let guard = self.inner.lock();
        if let Some(heap) = guard.as_ref() {
            heap.check(verbose);
        }
    }
}
