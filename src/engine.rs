//! The block management engine: ties block layout, the segregated free-list index, the
//! coalescer/extender, and placement/fit search together over a [`HeapProvider`].

use core::ptr::NonNull;

use crate::block::{self, header_addr, read_tag, set_tags, write_tag, BlockTag, ALIGNMENT, DSIZE, WSIZE};
use crate::error::HeapError;
use crate::freelist::FreeLists;
use crate::provider::HeapProvider;

/// Default number of segregated size classes: powers of two from ≤16 up to ≤4096, plus a
/// catch-all class for anything larger.
pub const DEFAULT_SIZE_CLASSES: usize = 10;

/// A segregated-fit, boundary-tagged dynamic storage allocator over a [`HeapProvider`].
///
/// `N_CLASSES` is a tuning knob: it must be at least 1, and the size-class boundaries in
/// [`crate::freelist::class_of`] assume the default of 10 (anything beyond class 8 collapses
/// into the last configured class).
pub struct Heap<P: HeapProvider, const N_CLASSES: usize = DEFAULT_SIZE_CLASSES> {
    pub(crate) provider: P,
    pub(crate) free_lists: FreeLists<N_CLASSES>,
    /// Address of the prologue's footer word: the traversal anchor the checker starts from, and
    /// the "previous block" every real block's coalescing logic reads when it's first in line.
    pub(crate) prologue: usize,
}

impl<P: HeapProvider, const N_CLASSES: usize> Heap<P, N_CLASSES> {
    /// Smallest legal block size: header + two free-list links + footer, 8-aligned.
    pub const MIN_SIZE: usize = block::MIN_SIZE;
    /// Bytes requested from the provider when the heap must grow and the caller's request is
    /// smaller than this.
    pub const CHUNK: usize = 168;
    /// Number of strictly-better candidates a fit search tolerates within one size class before
    /// it settles for the best one found so far.
    pub const FIT_IMPROVEMENT_BOUND: u32 = 50;

    /// Brings up a fresh heap over `provider`: lays out the prologue/epilogue sentinels and
    /// performs the initial heap extension.
    pub fn init(mut provider: P) -> Result<Self, HeapError> {
        let (lo, _) = provider.bounds();
        debug_assert_eq!(lo & (ALIGNMENT - 1), 0, "heap provider must start 8-byte aligned");

        let base = provider.grow(4 * WSIZE)?.as_ptr() as usize;
        unsafe {
            block::write_pad(base);
            write_tag(base + WSIZE, BlockTag::pack(DSIZE, true));
            write_tag(base + 2 * WSIZE, BlockTag::pack(DSIZE, true));
            write_tag(base + 3 * WSIZE, BlockTag::pack(0, true));
        }

        let mut heap = Heap {
            provider,
            free_lists: FreeLists::new(),
            prologue: base + 2 * WSIZE,
        };
        heap.extend_heap(Self::CHUNK / WSIZE)?;
        log::debug!("heap core initialized, prologue at {:#x}", heap.prologue);
        Ok(heap)
    }

    fn adjusted_size(n: usize) -> usize {
        block::align_up(n).saturating_add(DSIZE).max(Self::MIN_SIZE)
    }

    /// Allocates `n` bytes. Returns `None` for `n == 0` or when the heap provider is exhausted.
    pub fn allocate(&mut self, n: usize) -> Option<NonNull<u8>> {
        if n == 0 {
            return None;
        }
        let asize = Self::adjusted_size(n);

        let bp = match self.find_fit(asize) {
            Some(bp) => bp,
            None => {
                let grow_by = asize.max(Self::CHUNK);
                match self.extend_heap(grow_by / WSIZE) {
                    Ok(bp) => bp,
                    Err(_) => {
                        log::warn!("allocate({n} bytes): heap provider out of memory");
                        return None;
                    }
                }
            }
        };

        let placed = unsafe { self.place(bp, asize) };
        NonNull::new(placed as *mut u8)
    }

    /// Frees the block at `p`. A `None` `p` is a no-op.
    pub fn free(&mut self, p: Option<NonNull<u8>>) {
        let Some(p) = p else { return };
        let bp = p.as_ptr() as usize;
        unsafe {
            let size = read_tag(header_addr(bp)).size();
            set_tags(bp, size, false);
            self.coalesce(bp);
        }
    }

    /// Resizes the block at `p` to `n` bytes. `p == None` behaves like [`Heap::allocate`];
    /// `n == 0` behaves like [`Heap::free`] and returns `None`.
    pub fn resize(&mut self, p: Option<NonNull<u8>>, n: usize) -> Option<NonNull<u8>> {
        let Some(p) = p else {
            return self.allocate(n);
        };
        if n == 0 {
            self.free(Some(p));
            return None;
        }

        let bp = p.as_ptr() as usize;
        let old = unsafe { read_tag(header_addr(bp)).size() };
        let asize = Self::adjusted_size(n);

        if asize <= old {
            if old - asize < Self::MIN_SIZE {
                return Some(p);
            }
            unsafe {
                set_tags(bp, asize, true);
                let remainder = bp + asize;
                set_tags(remainder, old - asize, true);
                self.free(NonNull::new(remainder as *mut u8));
            }
            return Some(p);
        }

        let new_p = self.allocate(n)?;
        unsafe {
            let copy_len = n.min(old - DSIZE);
            core::ptr::copy_nonoverlapping(bp as *const u8, new_p.as_ptr(), copy_len);
        }
        self.free(Some(p));
        Some(new_p)
    }

    /// Allocates space for `k` elements of `n` bytes each and zero-initializes it.
    pub fn calloc(&mut self, k: usize, n: usize) -> Option<NonNull<u8>> {
        let bytes = k.checked_mul(n)?;
        let p = self.allocate(bytes)?;
        unsafe {
            core::ptr::write_bytes(p.as_ptr(), 0, bytes);
        }
        Some(p)
    }
}
