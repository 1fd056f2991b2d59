//! Heap extension: growing the managed region through the provider and folding the new space in
//! as a free block.

use crate::block::{header_addr, next_block, set_tags, write_tag, BlockTag, WSIZE};
use crate::engine::Heap;
use crate::error::HeapError;
use crate::provider::HeapProvider;

impl<P: HeapProvider, const N: usize> Heap<P, N> {
    /// Grows the heap by at least `words` words (rounded up to an even word count to keep 8-byte
    /// alignment, and up to [`Heap::MIN_SIZE`] at minimum), lays the new span out as one free
    /// block, moves the epilogue past it, and coalesces with whatever free block used to be last.
    ///
    /// Returns the payload address of the (possibly coalesced) new free block.
    pub(crate) fn extend_heap(&mut self, words: usize) -> Result<usize, HeapError> {
        let size = if words % 2 != 0 {
            (words + 1) * WSIZE
        } else {
            words * WSIZE
        };
        let size = size.max(Self::MIN_SIZE);

        let bp = self.provider.grow(size)?.as_ptr() as usize;
        log::debug!("extending heap by {size} bytes at {bp:#x}");

        unsafe {
            // `bp` lands exactly where the old epilogue header stood, so this overwrites it with
            // the new block's header and leaves its footer, plus a new epilogue, past the end.
            set_tags(bp, size, false);
            write_tag(header_addr(next_block(bp)), BlockTag::pack(0, true));
            Ok(self.coalesce(bp))
        }
    }
}
