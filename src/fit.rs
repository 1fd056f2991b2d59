//! Bounded best-fit search over the segregated free-list index.

use crate::block::{header_addr, read_next_link, read_tag};
use crate::engine::Heap;
use crate::provider::HeapProvider;

impl<P: HeapProvider, const N: usize> Heap<P, N> {
    /// Searches the free lists for a block of at least `asize` bytes.
    ///
    /// Starts at `asize`'s own size class and widens outward; within a class it walks the list
    /// looking for a best fit, but gives up refining after [`Heap::FIT_IMPROVEMENT_BOUND`]
    /// strictly-better candidates, trading fit quality for a bounded search time. The first
    /// class with any candidate at all wins; the search never continues into a larger class once
    /// one is found.
    pub(crate) fn find_fit(&self, asize: usize) -> Option<usize> {
        let start_class = crate::freelist::class_of(asize);

        for class in start_class..N {
            let mut best: Option<(usize, usize)> = None;
            let mut improvements = 0u32;
            let mut bp = self.free_lists.head(class);

            while bp != 0 {
                let size = unsafe { read_tag(header_addr(bp)).size() };
                if size >= asize {
                    match best {
                        None => best = Some((bp, size)),
                        Some((_, best_size)) if size <= best_size => {
                            best = Some((bp, size));
                            improvements += 1;
                            if improvements >= Self::FIT_IMPROVEMENT_BOUND {
                                return Some(bp);
                            }
                        }
                        _ => {}
                    }
                }
                bp = unsafe { read_next_link(bp) };
            }

            if let Some((bp, _)) = best {
                return Some(bp);
            }
        }

        None
    }
}
