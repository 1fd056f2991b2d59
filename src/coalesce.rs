//! Boundary-tag coalescing: merging a newly-freed block with whichever free neighbors border it.

use crate::block::{header_addr, next_block, prev_block, read_tag, set_tags};
use crate::engine::Heap;
use crate::freelist::class_of;
use crate::provider::HeapProvider;

impl<P: HeapProvider, const N: usize> Heap<P, N> {
    /// Merges the free block at `bp` with a free predecessor and/or successor, if any, and
    /// reinserts the (possibly merged) block into the free-list index.
    ///
    /// `bp` itself must not already be linked into a free list: it's either a block that was just
    /// marked free by the caller, or the result of a heap extension.
    ///
    /// # Safety
    ///
    /// `bp` must be the payload address of a currently-free block with valid header/footer tags.
    pub(crate) unsafe fn coalesce(&mut self, bp: usize) -> usize {
        let prev_alloc = read_tag(bp - crate::block::DSIZE).is_allocated();
        let next_bp = next_block(bp);
        let next_alloc = read_tag(header_addr(next_bp)).is_allocated();
        let mut size = read_tag(header_addr(bp)).size();

        let merged = match (prev_alloc, next_alloc) {
            (true, true) => {
                log::trace!("coalesce {bp:#x}: both neighbors allocated, no merge");
                bp
            }
            (true, false) => {
                log::trace!("coalesce {bp:#x}: merging with free next block {next_bp:#x}");
                let next_size = read_tag(header_addr(next_bp)).size();
                self.free_lists.unlink(class_of(next_size), next_bp);
                size += next_size;
                set_tags(bp, size, false);
                bp
            }
            (false, true) => {
                let prev_bp = prev_block(bp);
                log::trace!("coalesce {bp:#x}: merging with free prev block {prev_bp:#x}");
                let prev_size = read_tag(header_addr(prev_bp)).size();
                self.free_lists.unlink(class_of(prev_size), prev_bp);
                size += prev_size;
                set_tags(prev_bp, size, false);
                prev_bp
            }
            (false, false) => {
                let prev_bp = prev_block(bp);
                log::trace!(
                    "coalesce {bp:#x}: merging with free prev {prev_bp:#x} and next {next_bp:#x}"
                );
                let prev_size = read_tag(header_addr(prev_bp)).size();
                let next_size = read_tag(header_addr(next_bp)).size();
                self.free_lists.unlink(class_of(prev_size), prev_bp);
                self.free_lists.unlink(class_of(next_size), next_bp);
                size += prev_size + next_size;
                set_tags(prev_bp, size, false);
                prev_bp
            }
        };

        self.free_lists.push_front(class_of(size), merged);
        merged
    }
}
