//! Placement: consuming a free block for an allocation, splitting off the remainder when worth
//! it.

use crate::block::{header_addr, read_tag, set_tags};
use crate::engine::Heap;
use crate::freelist::class_of;
use crate::provider::HeapProvider;

impl<P: HeapProvider, const N: usize> Heap<P, N> {
    /// Removes the free block at `bp` from its list and marks `asize` bytes of it allocated.
    ///
    /// If the leftover is at least [`Heap::MIN_SIZE`], it's split off into its own free block and
    /// reinserted; otherwise the whole block is handed over allocated; splitting a remainder that
    /// couldn't hold its own links and footer would corrupt the next block's header.
    ///
    /// # Safety
    ///
    /// `bp` must be the payload address of a free block currently linked into this heap's free
    /// lists, with header/footer size at least `asize`.
    pub(crate) unsafe fn place(&mut self, bp: usize, asize: usize) -> usize {
        let csize = read_tag(header_addr(bp)).size();
        self.free_lists.unlink(class_of(csize), bp);

        if csize - asize >= Self::MIN_SIZE {
            set_tags(bp, asize, true);
            let remainder = bp + asize;
            let remainder_size = csize - asize;
            set_tags(remainder, remainder_size, false);
            self.free_lists.push_front(class_of(remainder_size), remainder);
        } else {
            set_tags(bp, csize, true);
        }

        bp
    }
}
