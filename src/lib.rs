//! A segregated-fit, boundary-tagged dynamic storage allocator core.
//!
//! This crate implements the *block management engine* of a general-purpose allocator: the
//! on-heap boundary-tagged block layout, a segregated free-list index keyed by size class, the
//! coalescing policy that recovers fragmentation on release, and the placement policy that
//! decides whether to split a selected free block. It does not itself own or map memory — every
//! [`Heap`](engine::Heap) is generic over a [`HeapProvider`] that grows the backing region and
//! reports its bounds, so the same engine runs over a bare-metal memory-map reservation, a hosted
//! `sbrk`-like syscall, or (under the `std` feature) an in-memory buffer for tests.
//!
//! Two entry points:
//!
//! - [`Heap`] — the safe, generic core. Construct one over any [`HeapProvider`] and call
//!   [`Heap::allocate`], [`Heap::free`], [`Heap::resize`], [`Heap::calloc`] directly.
//! - [`LockedHeap`] — a [`core::alloc::GlobalAlloc`] adapter wrapping a `Heap` behind a spinlock,
//!   for hosts that want to declare `#[global_allocator] static ALLOCATOR: LockedHeap<P> =
//!   LockedHeap::uninit();` and call `ALLOCATOR.init(provider)` once at startup.
//!
//! Single-threaded by design: the engine assumes exclusive access to the heap region for the
//! duration of any one operation. [`LockedHeap`] is the only place a lock appears, and it exists
//! purely to let one engine instance be shared across threads — the engine itself never blocks or
//! yields.
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod block;
pub mod checker;
mod coalesce;
pub mod engine;
pub mod error;
mod extend;
mod fit;
pub mod freelist;
pub mod locked;
mod place;
pub mod provider;

#[cfg(feature = "std")]
pub mod vec_provider;

pub use checker::{BlockInfo, Violation};
pub use engine::Heap;
pub use error::HeapError;
pub use locked::LockedHeap;
pub use provider::HeapProvider;

#[cfg(feature = "std")]
pub use vec_provider::VecHeapProvider;
